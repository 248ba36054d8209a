// [apps/api/src/extractors.rs]
/*!
 * =================================================================
 * APARATO: VALIDATED JSON EXTRACTOR (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION LAYER (ESTRATO L1-APP)
 * RESPONSABILIDAD: PROYECTAR FALLOS DE DESERIALIZACIÓN A validation_failed
 *
 * `axum::Json` por defecto rechaza cuerpos malformados con 400 plano; la
 * taxonomía de spec §7 exige `validation_failed` (422) en la frontera.
 * Este extractor envuelve el rechazo nativo en el mismo sobre de error
 * que el resto de la API.
 * =================================================================
 */

use crate::errors::ApiError;
use axum::extract::{FromRequest, Json, Request};
use realstage_core_models::StagingError;
use serde::de::DeserializeOwned;

pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError(StagingError::ValidationFailed(rejection.to_string())))?;
        Ok(ValidatedJson(value))
    }
}
