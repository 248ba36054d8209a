// [apps/api/src/handlers/uploads.rs]
/*!
 * =================================================================
 * APARATO: PRESIGNED UPLOAD HANDLER (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION LAYER (ESTRATO L1-APP)
 * RESPONSABILIDAD: EMITIR URLS DE PUT DIRECTO CLIENTE→OBJECT-STORE (spec §6)
 *
 * Rechaza con `subscription_required` (402) a operadores sin suscripción
 * calificante antes de emitir ninguna URL firmada.
 * =================================================================
 */

use crate::errors::ApiResult;
use crate::middleware::CallerIdentity;
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::Json;
use realstage_core_models::StagingError;
use serde::{Deserialize, Serialize};
use tracing::instrument;

const PRESIGN_EXPIRES_IN_SECONDS: u32 = 900;

pub struct UploadsHandler;

#[derive(Debug, Deserialize)]
pub struct PresignUploadRequest {
    pub filename: String,
    pub content_type: String,
    pub file_size: i64,
}

#[derive(Debug, Serialize)]
pub struct PresignUploadResponse {
    pub upload_url: String,
    pub file_key: String,
    pub expires_in: u32,
}

impl UploadsHandler {
    #[instrument(skip(state, caller, request))]
    pub async fn presign(
        State(state): State<AppState>,
        Extension(caller): Extension<CallerIdentity>,
        Json(request): Json<PresignUploadRequest>,
    ) -> ApiResult<Json<PresignUploadResponse>> {
        if request.filename.trim().is_empty() || request.content_type.trim().is_empty() || request.file_size <= 0 {
            return Err(StagingError::ValidationFailed("filename, content_type and a positive file_size are required".to_string()).into());
        }

        let usage = state.billing()?.usage(&caller.user_id).await?;
        if !usage.has_subscription {
            return Err(StagingError::SubscriptionRequired.into());
        }

        let file_key = format!("uploads/{}/{}", uuid::Uuid::new_v4(), sanitize_filename(&request.filename));
        let upload_url = state.blob_gateway.presign_put(&file_key, PRESIGN_EXPIRES_IN_SECONDS)?;

        Ok(Json(PresignUploadResponse { upload_url, file_key, expires_in: PRESIGN_EXPIRES_IN_SECONDS }))
    }
}

fn sanitize_filename(filename: &str) -> String {
    filename.chars().map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' }).collect()
}
