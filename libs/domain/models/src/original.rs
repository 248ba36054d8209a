// [libs/domain/models/src/original.rs]
//! Entidad `Original`: el registro deduplicado, direccionado por contenido,
//! de un archivo subido una sola vez y compartido por cualquier número de
//! solicitudes de puesta en escena (spec §3, §4.1).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Original {
    /// SHA-256 del flujo de bytes, en hexadecimal minúscula (64 caracteres).
    pub id: String,
    /// Llave de almacenamiento: `originals/<hh>/<hash>`.
    pub storage_key: String,
    pub byte_size: i64,
    pub media_type: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    /// Número de Images vivas (no eliminadas) que referencian este original.
    /// Invariante: nunca negativo, incluso bajo decrementos concurrentes.
    pub reference_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Original {
    /// Deriva la llave de almacenamiento a partir del hash, usando los dos
    /// primeros dígitos hexadecimales como partición (spec §3).
    pub fn storage_key_for_hash(hash_hex: &str) -> String {
        let prefix = &hash_hex[..2.min(hash_hex.len())];
        format!("originals/{prefix}/{hash_hex}")
    }
}

/// Estadísticas agregadas de observabilidad del almacén (spec §4.1 `stats()`).
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OriginalStoreStats {
    pub total_count: i64,
    pub total_bytes: i64,
    pub orphan_count: i64,
    pub orphan_bytes: i64,
    pub average_references: f64,
}
