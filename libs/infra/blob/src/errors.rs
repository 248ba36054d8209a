// [libs/infra/blob/src/errors.rs]
/*!
 * =================================================================
 * APARATO: BLOB GATEWAY ERROR CATALOG (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * =================================================================
 */

use realstage_core_models::StagingError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlobError {
    #[error("[L3_BLOB_NET_FAULT]: OBJECT_TRANSPORT_FAILURE -> {0}")]
    Transport(#[from] reqwest::Error),

    #[error("[L3_BLOB_REJECTED]: OBJECT_STORE_REJECTION -> HTTP_{0}")]
    Rejected(u16),

    #[error("[L3_BLOB_CONFIG_FAULT]: SIGNING_CONFIG_INVALID -> {0}")]
    Configuration(String),

    #[error("[L3_BLOB_FAULT]: OBJECT_NOT_FOUND")]
    NotFound,
}

impl From<BlobError> for StagingError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::NotFound => StagingError::NotFound("blob object not found".to_string()),
            other => StagingError::StorageFailed(other.to_string()),
        }
    }
}
