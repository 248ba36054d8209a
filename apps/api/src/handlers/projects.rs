// [apps/api/src/handlers/projects.rs]
/*!
 * =================================================================
 * APARATO: PROJECT CRUD HANDLERS (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION LAYER (ESTRATO L1-APP)
 * RESPONSABILIDAD: CONTENEDOR ADMINISTRATIVO DE IMAGES (spec §3, §6)
 *
 * `delete` es el único handler que orquesta una cascada: el Project no
 * sabe nada del esquema de Image, así que la cascada vive aquí y
 * reutiliza `images::soft_delete_image_and_release` por cada fila viva.
 * =================================================================
 */

use crate::errors::ApiResult;
use crate::handlers::images::soft_delete_image_and_release;
use crate::middleware::CallerIdentity;
use crate::state::AppState;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use realstage_core_models::StagingError;
use serde::Deserialize;
use tracing::{info, instrument};

pub struct ProjectsHandler;

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
}

impl ProjectsHandler {
    #[instrument(skip(state, caller))]
    pub async fn create(
        State(state): State<AppState>,
        Extension(caller): Extension<CallerIdentity>,
        Json(request): Json<CreateProjectRequest>,
    ) -> ApiResult<impl IntoResponse> {
        if request.name.trim().is_empty() {
            return Err(StagingError::ValidationFailed("name must be non-empty".to_string()).into());
        }
        let project_id = uuid::Uuid::new_v4().to_string();
        let project = state.projects()?.insert(&project_id, &caller.user_id, request.name.trim()).await?;
        Ok((StatusCode::CREATED, Json(project)))
    }

    #[instrument(skip(state, caller))]
    pub async fn list(State(state): State<AppState>, Extension(caller): Extension<CallerIdentity>) -> ApiResult<impl IntoResponse> {
        let projects = state.projects()?.list_by_owner(&caller.user_id).await?;
        Ok(Json(projects))
    }

    /// Elimina el proyecto y en cascada borra-suave cada Image viva,
    /// liberando su referencia en CAOS (spec §3 Project lifecycle).
    #[instrument(skip(state))]
    pub async fn delete(State(state): State<AppState>, Path(project_id): Path<String>) -> ApiResult<impl IntoResponse> {
        let images = state.images()?.list_by_project(&project_id).await?;
        for image in &images {
            soft_delete_image_and_release(&state, &image.id).await?;
        }
        state.projects()?.delete(&project_id).await?;
        info!("🗑️ [PROJECT_DELETE]: {} removed, {} images cascaded.", project_id, images.len());
        Ok(StatusCode::NO_CONTENT)
    }

    #[instrument(skip(state))]
    pub async fn list_images(State(state): State<AppState>, Path(project_id): Path<String>) -> ApiResult<impl IntoResponse> {
        let images = state.images()?.list_by_project(&project_id).await?;
        Ok(Json(images))
    }

    #[instrument(skip(state))]
    pub async fn list_images_grouped(State(state): State<AppState>, Path(project_id): Path<String>) -> ApiResult<impl IntoResponse> {
        let groups = state.images()?.list_grouped_by_original(&project_id).await?;
        let payload: Vec<serde_json::Value> = groups
            .into_iter()
            .map(|(original_id, images)| serde_json::json!({ "original_id": original_id, "images": images }))
            .collect();
        Ok(Json(payload))
    }

    #[instrument(skip(state))]
    pub async fn cost(State(state): State<AppState>, Path(project_id): Path<String>) -> ApiResult<impl IntoResponse> {
        let total_cost = state.projects()?.cost_summary(&project_id).await?;
        Ok(Json(serde_json::json!({ "project_id": project_id, "total_cost": total_cost })))
    }
}
