// [libs/domain/adapters/src/errors.rs]
use realstage_core_models::StagingError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error("unknown model identifier: {0}")]
    UnknownModel(String),

    #[error("validation_failed: {0}")]
    ValidationFailed(String),
}

impl From<AdapterError> for StagingError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::UnknownModel(id) => StagingError::BadRequest(format!("unknown model identifier: {id}")),
            AdapterError::ValidationFailed(msg) => StagingError::ValidationFailed(msg),
        }
    }
}
