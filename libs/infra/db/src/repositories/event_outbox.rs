// [libs/infra/db/src/repositories/event_outbox.rs]
/*!
 * =================================================================
 * APARATO: EVENT OUTBOX REPOSITORY (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: PUENTE DURABLE ENTRE EL PROCESO DEL WORKER Y EL BUS
 *
 * VISION HOLÍSTICA:
 * El Event Bus en proceso (`apps/api::event_bus::EventBus`) no es visible
 * desde el proceso separado del Staging Worker. Esta tabla hace de
 * relevo: el worker escribe una fila por transición terminal, y un
 * daemon de la API la sondea periódicamente y la reenvía al bus en
 * memoria antes de marcarla como relevada.
 * =================================================================
 */

use crate::errors::DbError;
use chrono::{DateTime, Utc};
use libsql::{params, Connection};
use tracing::instrument;

pub struct EventOutboxRepository {
    database_connection: Connection,
}

/// Fila sin relevar, lista para publicarse en el bus en memoria.
#[derive(Debug, Clone)]
pub struct PendingStatusEvent {
    pub id: String,
    pub image_id: String,
    pub owner_user_id: String,
    pub status: String,
    pub staged_url: Option<String>,
    pub error: Option<String>,
}

impl EventOutboxRepository {
    pub fn new(connection: Connection) -> Self {
        Self { database_connection: connection }
    }

    /// Registra una transición terminal de Image. Escritura best-effort
    /// desde el worker: una falla aquí nunca debe impedir el `ack`/`nack`
    /// del job que ya completó su trabajo de verdad.
    #[instrument(skip(self))]
    pub async fn record(
        &self,
        image_id: &str,
        owner_user_id: &str,
        status: &str,
        staged_url: Option<&str>,
        error: Option<&str>,
    ) -> Result<(), DbError> {
        let id = uuid::Uuid::new_v4().to_string();
        self.database_connection
            .execute(
                "INSERT INTO image_status_events (id, image_id, owner_user_id, status, staged_url, error, relayed, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, CURRENT_TIMESTAMP)",
                params![id, image_id, owner_user_id, status, staged_url, error],
            )
            .await?;
        Ok(())
    }

    /// Recupera el siguiente lote de eventos sin relevar, en orden de
    /// llegada.
    #[instrument(skip(self))]
    pub async fn fetch_unrelayed(&self, limit: i64) -> Result<Vec<PendingStatusEvent>, DbError> {
        let mut rows = self
            .database_connection
            .query(
                "SELECT id, image_id, owner_user_id, status, staged_url, error FROM image_status_events
                 WHERE relayed = 0 ORDER BY created_at ASC LIMIT ?1",
                params![limit],
            )
            .await?;

        let mut events = Vec::new();
        while let Some(row) = rows.next().await? {
            events.push(PendingStatusEvent {
                id: row.get(0)?,
                image_id: row.get(1)?,
                owner_user_id: row.get(2)?,
                status: row.get(3)?,
                staged_url: row.get(4)?,
                error: row.get(5)?,
            });
        }
        Ok(events)
    }

    /// Marca un evento como ya relevado al bus en memoria; idempotente.
    #[instrument(skip(self))]
    pub async fn mark_relayed(&self, event_id: &str) -> Result<(), DbError> {
        self.database_connection
            .execute("UPDATE image_status_events SET relayed = 1 WHERE id = ?1", params![event_id])
            .await?;
        Ok(())
    }

    /// Purga eventos ya relevados más antiguos que `older_than`, para que
    /// la tabla no crezca sin límite (simétrico al barrido de originales).
    #[instrument(skip(self))]
    pub async fn purge_relayed_before(&self, older_than: DateTime<Utc>) -> Result<i64, DbError> {
        let cutoff = older_than.to_rfc3339();
        let rows_affected = self
            .database_connection
            .execute("DELETE FROM image_status_events WHERE relayed = 1 AND created_at < ?1", params![cutoff])
            .await?;
        Ok(rows_affected as i64)
    }
}
