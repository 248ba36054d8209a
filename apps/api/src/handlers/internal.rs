// [apps/api/src/handlers/internal.rs]
/*!
 * =================================================================
 * APARATO: INTERNAL EDGE-AUTHORIZATION HANDLER (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION LAYER (ESTRATO L1-APP)
 * RESPONSABILIDAD: RESOLVER PROPIEDAD PARA EL BORDE/CDN (spec §6)
 *
 * Vive detrás de `internal_edge_guard`; el `X-User-ID` lo consume este
 * handler directamente, no la guardia, porque la guardia solo conoce el
 * secreto compartido del worker, no la identidad del operador final.
 * =================================================================
 */

use crate::errors::ApiResult;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use realstage_core_models::ImageStatus;
use realstage_infra_blob::staged_storage_key;
use tracing::instrument;

pub struct InternalHandler;

impl InternalHandler {
    #[instrument(skip(state, headers))]
    pub async fn owner(State(state): State<AppState>, Path(image_id): Path<String>, headers: HeaderMap) -> ApiResult<impl IntoResponse> {
        let requesting_user_id = headers.get("x-user-id").and_then(|h| h.to_str().ok()).unwrap_or_default();

        let (owner_user_id, _project_id) = state.images()?.get_owner(&image_id).await?;
        let has_access = !requesting_user_id.is_empty() && requesting_user_id == owner_user_id;

        let s3_key = if has_access {
            state
                .images()?
                .get(&image_id)
                .await?
                .filter(|image| image.status == ImageStatus::Ready)
                .map(|_| staged_storage_key(&image_id))
        } else {
            None
        };

        Ok(Json(serde_json::json!({
            "image_id": image_id,
            "owner_id": owner_user_id,
            "has_access": has_access,
            "s3_key": s3_key,
        })))
    }
}
