// [libs/infra/db/src/repositories/original.rs]
/*!
 * =================================================================
 * APARATO: ORIGINAL STORE REPOSITORY (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: CONTABILIDAD DE REFERENCIAS DEL ALMACÉN DE ORIGINALES
 *
 * VISION HOLÍSTICA:
 * Implementa el contrato de §4.1: insert-or-increment atómico, decremento
 * con piso en cero, y el barrido periódico de huérfanos. La escritura del
 * blob subyacente vive en `realstage-infra-blob`; este repositorio
 * solamente gobierna la fila de contabilidad.
 * =================================================================
 */

use crate::errors::DbError;
use chrono::{DateTime, Duration, Utc};
use libsql::{params, Connection};
use realstage_core_models::Original;
use tracing::{info, instrument, warn};

pub struct OriginalRepository {
    database_connection: Connection,
}

impl OriginalRepository {
    pub fn new(connection: Connection) -> Self {
        Self { database_connection: connection }
    }

    /**
     * Inserta la fila de contabilidad de un original recién visto, o
     * incrementa su contador de referencias si el hash ya existía.
     *
     * # Errors:
     * - `DbError::TransactionError` si la secuencia atómica falla al abrirse o comprometerse.
     */
    #[instrument(skip(self))]
    pub async fn upsert_or_increment(
        &self,
        hash_hex: &str,
        media_type: &str,
        byte_size: i64,
        width: Option<i32>,
        height: Option<i32>,
    ) -> Result<(Original, bool), DbError> {
        let transaction = self.database_connection.transaction().await.map_err(|_| DbError::TransactionError)?;

        let mut existing = transaction
            .query("SELECT id FROM original_images WHERE id = ?1", params![hash_hex])
            .await?;

        let was_new = existing.next().await?.is_none();

        if was_new {
            let storage_key = Original::storage_key_for_hash(hash_hex);
            transaction
                .execute(
                    "INSERT INTO original_images (id, storage_key, byte_size, media_type, width, height, reference_count, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)",
                    params![hash_hex, storage_key, byte_size, media_type, width, height],
                )
                .await?;
        } else {
            transaction
                .execute(
                    "UPDATE original_images SET reference_count = reference_count + 1, updated_at = CURRENT_TIMESTAMP WHERE id = ?1",
                    params![hash_hex],
                )
                .await?;
        }

        let mut row = transaction
            .query("SELECT id, storage_key, byte_size, media_type, width, height, reference_count, created_at, updated_at FROM original_images WHERE id = ?1", params![hash_hex])
            .await?;
        let original = map_row(row.next().await?.ok_or(DbError::OriginalNotFound)?)?;

        transaction.commit().await.map_err(|_| DbError::TransactionError)?;

        if was_new {
            info!("🆕 [CAOS]: Original {} admitted with reference_count=1.", hash_hex);
        }
        Ok((original, was_new))
    }

    /// Incrementa el contador de referencias de un original ya existente;
    /// falla si el original ya fue endurecido-eliminado (no existe la fila).
    #[instrument(skip(self))]
    pub async fn acquire(&self, original_id: &str) -> Result<(), DbError> {
        let rows_affected = self
            .database_connection
            .execute(
                "UPDATE original_images SET reference_count = reference_count + 1, updated_at = CURRENT_TIMESTAMP WHERE id = ?1",
                params![original_id],
            )
            .await?;
        if rows_affected == 0 {
            return Err(DbError::OriginalNotFound);
        }
        Ok(())
    }

    /**
     * Decrementa el contador de referencias con piso en cero; si llega a
     * cero, elimina la fila y reporta que el original quedó huérfano para
     * que el llamador borre también el blob subyacente.
     */
    #[instrument(skip(self))]
    pub async fn release(&self, original_id: &str) -> Result<bool, DbError> {
        let transaction = self.database_connection.transaction().await.map_err(|_| DbError::TransactionError)?;

        transaction
            .execute(
                "UPDATE original_images SET reference_count = MAX(reference_count - 1, 0), updated_at = CURRENT_TIMESTAMP WHERE id = ?1",
                params![original_id],
            )
            .await?;

        let mut row = transaction
            .query("SELECT reference_count FROM original_images WHERE id = ?1", params![original_id])
            .await?;
        let remaining: i64 = match row.next().await? {
            Some(row) => row.get(0)?,
            None => {
                transaction.commit().await.map_err(|_| DbError::TransactionError)?;
                return Err(DbError::OriginalNotFound);
            }
        };

        let was_hard_deleted = remaining == 0;
        if was_hard_deleted {
            transaction.execute("DELETE FROM original_images WHERE id = ?1", params![original_id]).await?;
        }

        transaction.commit().await.map_err(|_| DbError::TransactionError)?;
        Ok(was_hard_deleted)
    }

    /// Barre periódicamente los originales huérfanos (reference_count=0)
    /// más antiguos que `older_than`, devolviendo cuántos fueron reclamados.
    #[instrument(skip(self))]
    pub async fn sweep(&self, older_than: DateTime<Utc>, limit: i64) -> Result<i64, DbError> {
        let cutoff = older_than.to_rfc3339();
        let mut rows = self
            .database_connection
            .query(
                "SELECT id FROM original_images WHERE reference_count = 0 AND updated_at < ?1 LIMIT ?2",
                params![cutoff, limit],
            )
            .await?;

        let mut reclaimed_ids = Vec::new();
        while let Some(row) = rows.next().await? {
            let id: String = row.get(0)?;
            reclaimed_ids.push(id);
        }

        for id in &reclaimed_ids {
            self.database_connection.execute("DELETE FROM original_images WHERE id = ?1", params![id]).await?;
        }

        if !reclaimed_ids.is_empty() {
            warn!("🧹 [SWEEP]: Reclaimed {} orphaned originals.", reclaimed_ids.len());
        }
        Ok(reclaimed_ids.len() as i64)
    }

    /// Considera también los huérfanos ya con el piso fijado en cero:
    /// sweep se invoca con una ventana de gracia de 24h por defecto desde
    /// los llamadores (admin sweep CLI, cron interno del worker).
    pub fn default_sweep_grace_period() -> Duration {
        Duration::hours(24)
    }

    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<realstage_core_models::original::OriginalStoreStats, DbError> {
        let mut row = self
            .database_connection
            .query(
                "SELECT
                    COUNT(*),
                    COALESCE(SUM(byte_size), 0),
                    COALESCE(SUM(CASE WHEN reference_count = 0 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN reference_count = 0 THEN byte_size ELSE 0 END), 0),
                    COALESCE(AVG(reference_count), 0.0)
                 FROM original_images",
                (),
            )
            .await?;

        let data = row.next().await?.ok_or(DbError::OriginalNotFound)?;
        Ok(realstage_core_models::original::OriginalStoreStats {
            total_count: data.get(0)?,
            total_bytes: data.get(1)?,
            orphan_count: data.get(2)?,
            orphan_bytes: data.get(3)?,
            average_references: data.get(4)?,
        })
    }
}

fn map_row(row: libsql::Row) -> Result<Original, DbError> {
    Ok(Original {
        id: row.get(0)?,
        storage_key: row.get(1)?,
        byte_size: row.get(2)?,
        media_type: row.get(3)?,
        width: row.get(4)?,
        height: row.get(5)?,
        reference_count: row.get(6)?,
        created_at: parse_timestamp(row.get::<String>(7)?)?,
        updated_at: parse_timestamp(row.get::<String>(8)?)?,
    })
}

pub(crate) fn parse_timestamp(raw: String) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S")
                .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
        })
        .map_err(|e| DbError::MappingError(format!("unparseable timestamp {raw}: {e}")))
}
