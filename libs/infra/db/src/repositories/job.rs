// [libs/infra/db/src/repositories/job.rs]
/*!
 * =================================================================
 * APARATO: JOB QUEUE REPOSITORY (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: ENTREGA DURABLE AL MENOS-UNA-VEZ CON REINTENTOS ACOTADOS
 *
 * VISION HOLÍSTICA:
 * La Cola de Trabajos vive como filas en el mismo almacén relacional que
 * el Registro de Imágenes (spec §9 Open Question, resuelta en
 * SPEC_FULL.md). `claim` usa una transacción para marcar invisibilidad
 * e incrementar el intento atómicamente; `nack` aplica el backoff
 * exponencial con jitter de `realstage-core-models::job`.
 * =================================================================
 */

use crate::errors::DbError;
use crate::repositories::original::parse_timestamp;
use chrono::{Duration, Utc};
use libsql::{params, Connection};
use realstage_core_models::job::backoff_delay_seconds;
use realstage_core_models::{Job, JobDisposition};
use tracing::{info, instrument, warn};

/// Tiempo de visibilidad nominal de un job reclamado, antes de
/// considerarse zombie y elegible para reclamación forense.
const VISIBILITY_TIMEOUT_SECONDS: i64 = 300;

pub struct JobRepository {
    database_connection: Connection,
}

impl JobRepository {
    pub fn new(connection: Connection) -> Self {
        Self { database_connection: connection }
    }

    #[instrument(skip(self, payload))]
    pub async fn enqueue(&self, id: &str, image_id: &str, payload: &serde_json::Value, max_attempts: i64) -> Result<Job, DbError> {
        self.database_connection
            .execute(
                "INSERT INTO jobs (id, image_id, kind, payload_json, attempt_count, max_attempts, next_attempt_after, visible, disposition, created_at, updated_at)
                 VALUES (?1, ?2, 'run_staging_prediction', ?3, 0, ?4, CURRENT_TIMESTAMP, 1, 'pending', CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)",
                params![id, image_id, payload.to_string(), max_attempts],
            )
            .await?;
        self.get(id).await?.ok_or(DbError::JobNotFound)
    }

    /**
     * Reclama el siguiente job visible y vencido, marcándolo invisible
     * por la duración del timeout de visibilidad e incrementando su
     * contador de intentos, todo dentro de una transacción.
     */
    #[instrument(skip(self, worker_id))]
    pub async fn claim(&self, worker_id: &str) -> Result<Option<Job>, DbError> {
        let transaction = self.database_connection.transaction().await.map_err(|_| DbError::TransactionError)?;

        let mut candidate = transaction
            .query(
                "SELECT id FROM jobs WHERE visible = 1 AND disposition = 'pending' AND next_attempt_after <= CURRENT_TIMESTAMP ORDER BY next_attempt_after ASC LIMIT 1",
                (),
            )
            .await?;

        let job_id: String = match candidate.next().await? {
            Some(row) => row.get(0)?,
            None => {
                transaction.commit().await.map_err(|_| DbError::TransactionError)?;
                return Ok(None);
            }
        };

        transaction
            .execute(
                "UPDATE jobs SET visible = 0, claimed_by = ?1, attempt_count = attempt_count + 1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
                params![worker_id, job_id.clone()],
            )
            .await?;

        let mut row = transaction
            .query(&format!("SELECT {SELECT_COLUMNS} FROM jobs WHERE id = ?1"), params![job_id.clone()])
            .await?;
        let job = map_row(row.next().await?.ok_or(DbError::JobNotFound)?)?;

        transaction.commit().await.map_err(|_| DbError::TransactionError)?;

        info!("📥 [CLAIM]: Job {} claimed by {} (attempt {}).", job_id, worker_id, job.attempt_count);
        Ok(Some(job))
    }

    /// Confirma la finalización exitosa de un job; operación terminal.
    #[instrument(skip(self))]
    pub async fn ack(&self, job_id: &str) -> Result<(), DbError> {
        let rows_affected = self
            .database_connection
            .execute(
                "UPDATE jobs SET disposition = 'completed', visible = 0, updated_at = CURRENT_TIMESTAMP WHERE id = ?1",
                params![job_id],
            )
            .await?;
        if rows_affected == 0 {
            return Err(DbError::JobNotFound);
        }
        Ok(())
    }

    /**
     * Agenda otro intento con backoff exponencial y jitter, o mueve el
     * job al estado muerto si se alcanzó `max_attempts`.
     */
    #[instrument(skip(self, jitter_unit))]
    pub async fn nack(&self, job_id: &str, jitter_unit: f64) -> Result<JobDisposition, DbError> {
        let job = self.get(job_id).await?.ok_or(DbError::JobNotFound)?;

        if job.attempt_count >= job.max_attempts {
            self.database_connection
                .execute(
                    "UPDATE jobs SET disposition = 'dead_lettered', visible = 0, updated_at = CURRENT_TIMESTAMP WHERE id = ?1",
                    params![job_id],
                )
                .await?;
            warn!("☠️ [DEAD_LETTER]: Job {} exhausted {} attempts.", job_id, job.max_attempts);
            return Ok(JobDisposition::DeadLettered);
        }

        let delay_seconds = backoff_delay_seconds(job.attempt_count, jitter_unit);
        let next_attempt_after = (Utc::now() + Duration::seconds(delay_seconds)).to_rfc3339();

        self.database_connection
            .execute(
                "UPDATE jobs SET visible = 1, next_attempt_after = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
                params![next_attempt_after, job_id],
            )
            .await?;

        info!("🔁 [RETRY_SCHEDULED]: Job {} retry in {}s (attempt {}/{}).", job_id, delay_seconds, job.attempt_count, job.max_attempts);
        Ok(JobDisposition::Pending)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, job_id: &str) -> Result<Option<Job>, DbError> {
        let mut rows = self
            .database_connection
            .query(&format!("SELECT {SELECT_COLUMNS} FROM jobs WHERE id = ?1"), params![job_id])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(map_row(row)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn get_by_image(&self, image_id: &str) -> Result<Option<Job>, DbError> {
        let mut rows = self
            .database_connection
            .query(&format!("SELECT {SELECT_COLUMNS} FROM jobs WHERE image_id = ?1"), params![image_id])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(map_row(row)?)),
            None => Ok(None),
        }
    }

    /// Recupera jobs reclamados cuyo worker nunca hizo ack/nack dentro del
    /// timeout de visibilidad (proceso de worker caído a media ejecución).
    #[instrument(skip(self))]
    pub async fn reclaim_zombies(&self) -> Result<i64, DbError> {
        let cutoff = (Utc::now() - Duration::seconds(VISIBILITY_TIMEOUT_SECONDS)).to_rfc3339();
        let rows_affected = self
            .database_connection
            .execute(
                "UPDATE jobs SET visible = 1, claimed_by = NULL, updated_at = CURRENT_TIMESTAMP
                 WHERE visible = 0 AND disposition = 'pending' AND updated_at < ?1",
                params![cutoff],
            )
            .await?;
        if rows_affected > 0 {
            warn!("♻️ [ZOMBIE_RECLAIM]: {} stuck jobs returned to the visible pool.", rows_affected);
        }
        Ok(rows_affected as i64)
    }

    /// Requiere por un operador: vuelve a hacer visible un job huérfano
    /// (p. ej. cuando el enqueue de la tarea falló tras escribirse la fila).
    #[instrument(skip(self))]
    pub async fn requeue(&self, job_id: &str) -> Result<(), DbError> {
        let rows_affected = self
            .database_connection
            .execute(
                "UPDATE jobs SET visible = 1, disposition = 'pending', next_attempt_after = CURRENT_TIMESTAMP, claimed_by = NULL, updated_at = CURRENT_TIMESTAMP WHERE id = ?1",
                params![job_id],
            )
            .await?;
        if rows_affected == 0 {
            return Err(DbError::JobNotFound);
        }
        Ok(())
    }
}

const SELECT_COLUMNS: &str = "id, image_id, kind, payload_json, attempt_count, max_attempts, next_attempt_after, visible, disposition, claimed_by, created_at, updated_at";

fn map_row(row: libsql::Row) -> Result<Job, DbError> {
    let disposition_key: String = row.get(8)?;
    let disposition = JobDisposition::from_key(&disposition_key)
        .ok_or_else(|| DbError::MappingError(format!("unknown job disposition: {disposition_key}")))?;
    let payload_json: String = row.get(3)?;
    let payload: serde_json::Value = serde_json::from_str(&payload_json)
        .map_err(|e| DbError::MappingError(format!("invalid job payload json: {e}")))?;
    let visible: i64 = row.get(7)?;

    Ok(Job {
        id: row.get(0)?,
        image_id: row.get(1)?,
        kind: row.get(2)?,
        payload,
        attempt_count: row.get(4)?,
        max_attempts: row.get(5)?,
        next_attempt_after: parse_timestamp(row.get::<String>(6)?)?,
        visible: visible != 0,
        disposition,
        claimed_by: row.get(9)?,
        created_at: parse_timestamp(row.get::<String>(10)?)?,
        updated_at: parse_timestamp(row.get::<String>(11)?)?,
    })
}
