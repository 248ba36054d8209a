// [apps/api/src/handlers/admin.rs]
/*!
 * =================================================================
 * APARATO: MODEL ADAPTER ADMIN SURFACE (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION LAYER (ESTRATO L1-APP)
 * RESPONSABILIDAD: LECTURA/ESCRITURA DE OVERRIDES POR MODELO (spec §4.6, §6)
 * =================================================================
 */

use crate::errors::ApiResult;
use crate::middleware::CallerIdentity;
use crate::state::AppState;
use axum::extract::{Extension, Path, State};
use axum::response::IntoResponse;
use axum::Json;
use realstage_domain_adapters::{resolve_config, validate_against_schema};
use tracing::instrument;

pub struct AdminHandler;

impl AdminHandler {
    #[instrument(skip(state))]
    pub async fn get_config(State(state): State<AppState>, Path(model_id): Path<String>) -> ApiResult<impl IntoResponse> {
        let adapter = state.adapter_registry.get(&model_id)?;
        let stored = state.model_configs()?.get(&model_id).await?;
        let resolved = resolve_config(&adapter.default_config(), stored.as_ref().map(|row| &row.config), None);
        Ok(Json(serde_json::json!({ "model_id": model_id, "config": resolved, "updated_by": stored.and_then(|row| row.updated_by) })))
    }

    #[instrument(skip(state, caller, body))]
    pub async fn put_config(
        State(state): State<AppState>,
        Extension(caller): Extension<CallerIdentity>,
        Path(model_id): Path<String>,
        Json(body): Json<serde_json::Value>,
    ) -> ApiResult<impl IntoResponse> {
        let adapter = state.adapter_registry.get(&model_id)?;
        let resolved = resolve_config(&adapter.default_config(), None, Some(&body));
        validate_against_schema(&adapter.config_schema(), &resolved)?;
        adapter.validate(&resolved)?;

        let updated = state.model_configs()?.update(&model_id, &resolved, &caller.user_id).await?;
        Ok(Json(updated))
    }

    #[instrument(skip(state))]
    pub async fn config_schema(State(state): State<AppState>, Path(model_id): Path<String>) -> ApiResult<impl IntoResponse> {
        let adapter = state.adapter_registry.get(&model_id)?;
        Ok(Json(adapter.config_schema()))
    }
}
