// [apps/api/src/errors.rs]
/*!
 * =================================================================
 * APARATO: API ERROR ENVELOPE (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION LAYER (ESTRATO L1-APP)
 * RESPONSABILIDAD: PROYECCIÓN DE StagingError AL SOBRE JSON DE LA FRONTERA
 *
 * `realstage-core-models` se mantiene libre de `axum` a propósito (spec
 * §7 describe la taxonomía, no el transporte); este newtype es la única
 * frontera que sabe traducir un `StagingError` a una `Response` HTTP.
 * =================================================================
 */

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use realstage_core_models::StagingError;
use realstage_domain_adapters::AdapterError;
use realstage_infra_blob::BlobError;
use realstage_infra_db::DbError;
use realstage_infra_provider::ProviderError;
use serde_json::json;

pub struct ApiError(pub StagingError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(json!({
            "error": {
                "code": self.0.code(),
                "message": self.0.to_string(),
            }
        }));
        (status, body).into_response()
    }
}

impl From<StagingError> for ApiError {
    fn from(err: StagingError) -> Self {
        ApiError(err)
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        ApiError(err.into())
    }
}

impl From<AdapterError> for ApiError {
    fn from(err: AdapterError) -> Self {
        ApiError(err.into())
    }
}

impl From<BlobError> for ApiError {
    fn from(err: BlobError) -> Self {
        ApiError(err.into())
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        ApiError(err.into())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
