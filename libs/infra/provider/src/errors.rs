// [libs/infra/provider/src/errors.rs]
/*!
 * =================================================================
 * APARATO: PROVIDER ERROR CATALOG (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * =================================================================
 */

use realstage_core_models::StagingError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("[L3_PROVIDER_NET_FAULT]: UPLINK_FAILURE -> {0}")]
    Transport(#[from] reqwest::Error),

    #[error("[L3_PROVIDER_REJECTED]: PREDICTION_REJECTED -> HTTP_{0}: {1}")]
    Rejected(u16, String),

    #[error("[L3_PROVIDER_FAULT]: PREDICTION_FAILED -> {0}")]
    PredictionFailed(String),

    #[error("[L3_PROVIDER_FAULT]: PREDICTION_CANCELED")]
    PredictionCanceled,

    #[error("[L3_PROVIDER_FAULT]: PREDICTION_TIMED_OUT")]
    Timeout,
}

impl From<ProviderError> for StagingError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::PredictionFailed(msg) => StagingError::ProviderFailed(msg),
            ProviderError::PredictionCanceled => StagingError::ProviderCanceled,
            ProviderError::Timeout => StagingError::ProviderTimeout,
            other => StagingError::ProviderFailed(other.to_string()),
        }
    }
}
