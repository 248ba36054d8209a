// [libs/infra/db/src/repositories/image.rs]
/*!
 * =================================================================
 * APARATO: IMAGE REGISTRY REPOSITORY (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: FUENTE DE VERDAD DE TODA SOLICITUD DE PUESTA EN ESCENA
 *
 * VISION HOLÍSTICA:
 * Implementa el contrato de §4.3. La transición de estado es de una sola
 * vía: `update_status` rechaza cualquier intento de reescribir un estado
 * terminal, delegando la decisión a `ImageStatus::can_transition_to`
 * para que la regla viva en un único lugar (el dominio, no el SQL).
 * =================================================================
 */

use crate::errors::DbError;
use crate::repositories::original::parse_timestamp;
use libsql::{params, Connection};
use realstage_core_models::{Image, ImageStatus, RoomType, Style};
use tracing::{info, instrument, warn};

pub struct ImageRepository {
    database_connection: Connection,
}

impl ImageRepository {
    pub fn new(connection: Connection) -> Self {
        Self { database_connection: connection }
    }

    #[instrument(skip(self))]
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_queued(
        &self,
        id: &str,
        project_id: &str,
        owner_user_id: &str,
        original_id: Option<&str>,
        source_url: Option<&str>,
        room_type: Option<RoomType>,
        style: Option<Style>,
        prompt: Option<&str>,
        seed: Option<u32>,
    ) -> Result<Image, DbError> {
        self.database_connection
            .execute(
                "INSERT INTO images (id, project_id, owner_user_id, original_id, source_url, room_type, style, prompt, seed, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 'queued', CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)",
                params![
                    id,
                    project_id,
                    owner_user_id,
                    original_id,
                    source_url,
                    room_type.map(|r| r.as_key()),
                    style.map(|s| s.as_key()),
                    prompt,
                    seed.map(|s| s as i64),
                ],
            )
            .await?;

        self.get(id).await?.ok_or(DbError::ImageNotFound)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, image_id: &str) -> Result<Option<Image>, DbError> {
        let mut rows = self
            .database_connection
            .query(&format!("SELECT {SELECT_COLUMNS} FROM images WHERE id = ?1 AND deleted_at IS NULL"), params![image_id])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(map_row(row)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_by_project(&self, project_id: &str) -> Result<Vec<Image>, DbError> {
        let mut rows = self
            .database_connection
            .query(
                &format!("SELECT {SELECT_COLUMNS} FROM images WHERE project_id = ?1 AND deleted_at IS NULL ORDER BY created_at DESC"),
                params![project_id],
            )
            .await?;
        let mut images = Vec::new();
        while let Some(row) = rows.next().await? {
            images.push(map_row(row)?);
        }
        Ok(images)
    }

    /// Agrupa las imágenes vivas de un proyecto por su `original_id`, para
    /// que el cliente pueda renderizar todas las variantes de un mismo
    /// upload fuente juntas.
    #[instrument(skip(self))]
    pub async fn list_grouped_by_original(&self, project_id: &str) -> Result<Vec<(Option<String>, Vec<Image>)>, DbError> {
        let images = self.list_by_project(project_id).await?;
        let mut groups: Vec<(Option<String>, Vec<Image>)> = Vec::new();
        for image in images {
            match groups.iter_mut().find(|(key, _)| *key == image.original_id) {
                Some((_, bucket)) => bucket.push(image),
                None => groups.push((image.original_id.clone(), vec![image])),
            }
        }
        Ok(groups)
    }

    /**
     * Aplica una transición de estado terminal, aplicada únicamente por el
     * Staging Worker tras completar o fallar un Job.
     *
     * # Errors:
     * - `DbError::ImageNotFound` si la fila no existe o ya fue eliminada.
     * - `DbError::InvalidStatusTransition` si la transición viola la regla
     *   de una sola vía (p. ej. de `ready` a `failed`).
     */
    #[instrument(skip(self, staged_url, error))]
    pub async fn update_status(
        &self,
        image_id: &str,
        new_status: ImageStatus,
        staged_url: Option<&str>,
        error: Option<&str>,
        cost: Option<f64>,
        model_id: Option<&str>,
        processing_ms: Option<i64>,
        provider_prediction_id: Option<&str>,
    ) -> Result<Image, DbError> {
        let current = self.get_including_deleted(image_id).await?.ok_or(DbError::ImageNotFound)?;

        if !current.status.can_transition_to(new_status) {
            warn!(
                "🚫 [TRANSITION_REJECTED]: Image {} cannot move {:?} -> {:?}.",
                image_id, current.status, new_status
            );
            return Err(DbError::InvalidStatusTransition);
        }

        self.database_connection
            .execute(
                "UPDATE images SET status = ?1, staged_url = ?2, error = ?3, cost = ?4, model_id = ?5, processing_ms = ?6, provider_prediction_id = ?7, updated_at = CURRENT_TIMESTAMP WHERE id = ?8",
                params![
                    new_status.as_key(),
                    staged_url,
                    error,
                    cost,
                    model_id,
                    processing_ms,
                    provider_prediction_id,
                    image_id,
                ],
            )
            .await?;

        info!("➡️ [IMAGE_STATUS]: {} transitioned {:?} -> {:?}.", image_id, current.status, new_status);
        self.get_including_deleted(image_id).await?.ok_or(DbError::ImageNotFound)
    }

    /// Marca la fila como borrada-suave y devuelve el `original_id`
    /// referenciado ANTES de aplicar el borrado, para que el llamador
    /// pueda invocar `release` sobre el Almacén de Originales.
    #[instrument(skip(self))]
    pub async fn soft_delete(&self, image_id: &str) -> Result<Option<String>, DbError> {
        let current = self.get(image_id).await?.ok_or(DbError::ImageNotFound)?;
        self.database_connection
            .execute(
                "UPDATE images SET deleted_at = CURRENT_TIMESTAMP, updated_at = CURRENT_TIMESTAMP WHERE id = ?1 AND deleted_at IS NULL",
                params![image_id],
            )
            .await?;
        Ok(current.original_id)
    }

    #[instrument(skip(self))]
    pub async fn get_owner(&self, image_id: &str) -> Result<(String, String), DbError> {
        let mut rows = self
            .database_connection
            .query(
                "SELECT owner_user_id, project_id FROM images WHERE id = ?1 AND deleted_at IS NULL",
                params![image_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok((row.get(0)?, row.get(1)?)),
            None => Err(DbError::ImageNotFound),
        }
    }

    async fn get_including_deleted(&self, image_id: &str) -> Result<Option<Image>, DbError> {
        let mut rows = self
            .database_connection
            .query(&format!("SELECT {SELECT_COLUMNS} FROM images WHERE id = ?1"), params![image_id])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(map_row(row)?)),
            None => Ok(None),
        }
    }
}

const SELECT_COLUMNS: &str = "id, project_id, original_id, source_url, room_type, style, prompt, seed, status, staged_url, error, cost, model_id, processing_ms, provider_prediction_id, created_at, updated_at, deleted_at";

fn map_row(row: libsql::Row) -> Result<Image, DbError> {
    let status_key: String = row.get(8)?;
    let status = ImageStatus::from_key(&status_key)
        .ok_or_else(|| DbError::MappingError(format!("unknown image status: {status_key}")))?;

    let room_type: Option<String> = row.get(4)?;
    let style: Option<String> = row.get(5)?;
    let deleted_at: Option<String> = row.get(17)?;

    Ok(Image {
        id: row.get(0)?,
        project_id: row.get(1)?,
        original_id: row.get(2)?,
        source_url: row.get(3)?,
        room_type: room_type.and_then(|key| RoomType::from_key(&key)),
        style: style.and_then(|key| Style::from_key(&key)),
        prompt: row.get(6)?,
        seed: row.get::<Option<i64>>(7)?.map(|s| s as u32),
        status,
        staged_url: row.get(9)?,
        error: row.get(10)?,
        cost: row.get(11)?,
        model_id: row.get(12)?,
        processing_ms: row.get(13)?,
        provider_prediction_id: row.get(14)?,
        created_at: parse_timestamp(row.get::<String>(15)?)?,
        updated_at: parse_timestamp(row.get::<String>(16)?)?,
        deleted_at: deleted_at.map(parse_timestamp).transpose()?,
    })
}
