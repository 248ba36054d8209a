// [libs/domain/models/src/error.rs]
/*!
 * =================================================================
 * APARATO: STAGING ERROR CATALOG (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS TRANSVERSALES
 *
 * Taxonomía única de errores (spec §7) compartida entre la capa HTTP
 * y la capa interna del trabajador. Cada variante lleva su código de
 * máquina y el estado HTTP al que se proyecta en la frontera de la API.
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StagingError {
    #[error("validation_failed: {0}")]
    ValidationFailed(String),

    #[error("bad_request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("not_found: {0}")]
    NotFound(String),

    #[error("usage_limit_exceeded")]
    UsageLimitExceeded,

    #[error("subscription_required")]
    SubscriptionRequired,

    #[error("enqueue_failed: {0}")]
    EnqueueFailed(String),

    #[error("provider_failed: {0}")]
    ProviderFailed(String),

    #[error("provider_timeout")]
    ProviderTimeout,

    #[error("provider_canceled")]
    ProviderCanceled,

    #[error("storage_failed: {0}")]
    StorageFailed(String),

    #[error("internal_server_error: {0}")]
    Internal(String),
}

impl StagingError {
    /// Código de máquina estable, expuesto en el sobre de error JSON (spec §6).
    pub fn code(&self) -> &'static str {
        match self {
            StagingError::ValidationFailed(_) => "validation_failed",
            StagingError::BadRequest(_) => "bad_request",
            StagingError::Unauthorized => "unauthorized",
            StagingError::Forbidden => "forbidden",
            StagingError::NotFound(_) => "not_found",
            StagingError::UsageLimitExceeded => "usage_limit_exceeded",
            StagingError::SubscriptionRequired => "subscription_required",
            StagingError::EnqueueFailed(_) => "enqueue_failed",
            StagingError::ProviderFailed(_) => "provider_failed",
            StagingError::ProviderTimeout => "provider_timeout",
            StagingError::ProviderCanceled => "provider_canceled",
            StagingError::StorageFailed(_) => "storage_failed",
            StagingError::Internal(_) => "internal_server_error",
        }
    }

    /// Mensaje legible por humanos para persistir en `Image.error` (spec
    /// §4.7 paso 8, §7: "a human-readable error"). A diferencia de `Display`
    /// / `code()`, nunca devuelve el código de máquina desnudo.
    pub fn human_message(&self) -> String {
        match self {
            StagingError::ProviderTimeout => "prediction timed out after 5 minutes".to_string(),
            StagingError::ProviderCanceled => "prediction was canceled by the provider".to_string(),
            StagingError::ProviderFailed(msg) => format!("the generative provider failed: {msg}"),
            StagingError::StorageFailed(msg) => format!("object storage operation failed: {msg}"),
            StagingError::Internal(msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    /// Distingue los fallos transitorios del worker (§7: `storage_failed`
    /// "Retry with backoff inside the worker; surfaces as failed job on
    /// exhaustion") de los fallos permanentes del proveedor (§7:
    /// `provider_failed`/`provider_timeout`/`provider_canceled` —
    /// "Terminal model error"), que nunca deben programar un reintento.
    pub fn is_transient_worker_error(&self) -> bool {
        matches!(self, StagingError::StorageFailed(_) | StagingError::Internal(_))
    }

    /// Código de estado HTTP al que se proyecta este error en la frontera
    /// de la API (spec §7). Devuelto como un entero simple para mantener
    /// esta crate libre de una dependencia directa en `axum`/`http`.
    pub fn http_status(&self) -> u16 {
        match self {
            StagingError::ValidationFailed(_) => 422,
            StagingError::BadRequest(_) => 400,
            StagingError::Unauthorized => 401,
            StagingError::Forbidden => 403,
            StagingError::NotFound(_) => 404,
            StagingError::UsageLimitExceeded => 402,
            StagingError::SubscriptionRequired => 402,
            StagingError::EnqueueFailed(_) => 503,
            StagingError::ProviderFailed(_) => 502,
            StagingError::ProviderTimeout => 504,
            StagingError::ProviderCanceled => 502,
            StagingError::StorageFailed(_) => 502,
            StagingError::Internal(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_timeout_human_message_matches_spec_wording() {
        assert_eq!(StagingError::ProviderTimeout.human_message(), "prediction timed out after 5 minutes");
        assert_eq!(StagingError::ProviderTimeout.code(), "provider_timeout");
    }

    #[test]
    fn storage_and_internal_errors_are_transient() {
        assert!(StagingError::StorageFailed("GET failed".to_string()).is_transient_worker_error());
        assert!(StagingError::Internal("unexpected".to_string()).is_transient_worker_error());
    }

    #[test]
    fn provider_errors_are_not_transient() {
        assert!(!StagingError::ProviderFailed("rejected".to_string()).is_transient_worker_error());
        assert!(!StagingError::ProviderTimeout.is_transient_worker_error());
        assert!(!StagingError::ProviderCanceled.is_transient_worker_error());
    }
}
