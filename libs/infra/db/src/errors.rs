// [libs/infra/db/src/errors.rs]
/*!
 * =================================================================
 * APARATO: DATABASE ERROR CATALOG (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE PERSISTENCIA
 * =================================================================
 */

use realstage_core_models::StagingError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("[L3_DB_NET_FAULT]: DATABASE_UPLINK_SEVERED -> {0}")]
    ConnectionError(String),

    #[error("[L3_DB_CONFIG_FAULT]: STRATEGIC_ENV_VOID -> {0}")]
    ConfigurationError(String),

    #[error("[L3_DB_QUERY_FAULT]: SQL_QUERY_REJECTED -> {0}")]
    QueryError(#[from] libsql::Error),

    #[error("[L3_DB_MAPPING_FAULT]: DATA_MAPPING_VIOLATION -> {0}")]
    MappingError(String),

    #[error("[L3_DB_FAULT]: TRANSACTION_COLLAPSE")]
    TransactionError,

    #[error("[L3_IMAGE_FAULT]: IMAGE_NOT_FOUND")]
    ImageNotFound,

    #[error("[L3_IMAGE_FAULT]: INVALID_STATUS_TRANSITION")]
    InvalidStatusTransition,

    #[error("[L3_ORIGINAL_FAULT]: ORIGINAL_NOT_FOUND")]
    OriginalNotFound,

    #[error("[L3_ORIGINAL_FAULT]: ORIGINAL_ALREADY_HARD_DELETED")]
    OriginalHardDeleted,

    #[error("[L3_JOB_FAULT]: JOB_NOT_FOUND")]
    JobNotFound,

    #[error("[L3_QUOTA_FAULT]: USAGE_LIMIT_EXCEEDED")]
    UsageLimitExceeded,

    #[error("[L3_QUOTA_FAULT]: SUBSCRIPTION_REQUIRED")]
    SubscriptionRequired,
}

impl From<DbError> for StagingError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ImageNotFound | DbError::OriginalNotFound | DbError::JobNotFound => {
                StagingError::NotFound(err.to_string())
            }
            DbError::InvalidStatusTransition => StagingError::ValidationFailed(err.to_string()),
            DbError::UsageLimitExceeded => StagingError::UsageLimitExceeded,
            DbError::SubscriptionRequired => StagingError::SubscriptionRequired,
            other => StagingError::Internal(other.to_string()),
        }
    }
}
