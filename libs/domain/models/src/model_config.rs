// [libs/domain/models/src/model_config.rs]
//! `ModelConfig`: la fila persistida por modelo (spec §3, §4.6) y el
//! esquema de campos tunables que el surface de administración renderiza.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    pub model_id: String,
    pub config: serde_json::Value,
    pub updated_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConfigFieldType {
    String,
    Int,
    Float,
    Bool,
}

/// Describe un campo tunable de un adaptador, usado por el admin surface
/// para renderizar un formulario de configuración (spec §4.6).
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigFieldSchema {
    pub name: String,
    pub field_type: ConfigFieldType,
    pub default: serde_json::Value,
    pub description: String,
    pub options: Option<Vec<String>>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub required: bool,
}
