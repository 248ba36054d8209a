// [apps/api/src/handlers/billing.rs]
/*!
 * =================================================================
 * APARATO: BILLING MANAGEMENT HANDLERS (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION LAYER (ESTRATO L1-APP)
 * RESPONSABILIDAD: SUPERFICIE DE CUOTA Y GESTIÓN DE SUSCRIPCIÓN (spec §6)
 *
 * El procesador de pagos es un colaborador externo no respecificado
 * (spec §1): ninguna de estas rutas habla su API directamente salvo el
 * webhook firmado. Las rutas de gestión (upgrade, cancel, payment
 * method) redirigen al frontend público hacia el flujo hospedado del
 * procesador; el estado real de la suscripción solo entra al sistema
 * por `POST /stripe/webhook`.
 * =================================================================
 */

use crate::errors::{ApiError, ApiResult};
use crate::middleware::CallerIdentity;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Extension, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use hmac::{Hmac, Mac};
use realstage_core_models::StagingError;
use realstage_domain_billing::{Subscription, SubscriptionStatus};
use serde::Deserialize;
use sha2::Sha256;
use tracing::{instrument, warn};

pub struct BillingHandler;

impl BillingHandler {
    #[instrument(skip(state, caller))]
    pub async fn usage(State(state): State<AppState>, Extension(caller): Extension<CallerIdentity>) -> ApiResult<impl IntoResponse> {
        let usage = state.billing()?.usage(&caller.user_id).await?;
        Ok(Json(serde_json::json!({
            "images_used": usage.used,
            "monthly_limit": usage.limit,
            "plan_code": usage.plan_code,
            "period_start": usage.period_start,
            "period_end": usage.period_end,
            "has_subscription": usage.has_subscription,
            "remaining_images": usage.remaining,
        })))
    }

    #[instrument(skip(state, caller))]
    pub async fn subscriptions(State(state): State<AppState>, Extension(caller): Extension<CallerIdentity>) -> ApiResult<impl IntoResponse> {
        let subscription = state.billing()?.get_subscription_for_user(&caller.user_id).await?;
        Ok(Json(subscription))
    }

    #[instrument(skip(state, caller))]
    pub async fn create_subscription_elements(
        State(state): State<AppState>,
        Extension(caller): Extension<CallerIdentity>,
    ) -> ApiResult<impl IntoResponse> {
        redirect_response(&state, &caller, "subscribe")
    }

    #[instrument(skip(state, caller))]
    pub async fn upgrade_subscription(State(state): State<AppState>, Extension(caller): Extension<CallerIdentity>) -> ApiResult<impl IntoResponse> {
        redirect_response(&state, &caller, "upgrade")
    }

    #[instrument(skip(state, caller))]
    pub async fn cancel_subscription(State(state): State<AppState>, Extension(caller): Extension<CallerIdentity>) -> ApiResult<impl IntoResponse> {
        redirect_response(&state, &caller, "cancel")
    }

    #[instrument(skip(state, caller))]
    pub async fn set_default_payment_method(
        State(state): State<AppState>,
        Extension(caller): Extension<CallerIdentity>,
    ) -> ApiResult<impl IntoResponse> {
        redirect_response(&state, &caller, "payment-method/default")
    }

    #[instrument(skip(state, caller))]
    pub async fn remove_payment_method(
        State(state): State<AppState>,
        Extension(caller): Extension<CallerIdentity>,
    ) -> ApiResult<impl IntoResponse> {
        redirect_response(&state, &caller, "payment-method/remove")
    }

    /// Sin un SDK del procesador de pagos integrado (spec §1: colaborador
    /// externo), los métodos de pago reales solo viven del lado del
    /// procesador; esta superficie reporta la lista vacía hasta que el
    /// webhook de suscripción haya reflejado al menos un método por
    /// `customer_id`, que hoy no persistimos localmente.
    #[instrument(skip(_state, _caller))]
    pub async fn payment_methods(State(_state): State<AppState>, Extension(_caller): Extension<CallerIdentity>) -> ApiResult<impl IntoResponse> {
        Ok(Json(serde_json::json!({ "payment_methods": [] })))
    }

    /// Webhook firmado del procesador de pagos (spec §6): verifica la
    /// firma HMAC-SHA256 contra `payment_provider_webhook_secret` antes
    /// de tocar cualquier fila de Subscription.
    #[instrument(skip(state, headers, body))]
    pub async fn stripe_webhook(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> ApiResult<impl IntoResponse> {
        let provided_signature = headers
            .get("stripe-signature")
            .and_then(|h| h.to_str().ok())
            .ok_or(StagingError::Unauthorized)?;

        verify_webhook_signature(&state.settings.payment_provider_webhook_secret, &body, provided_signature)?;

        let envelope: WebhookEnvelope = serde_json::from_slice(&body)
            .map_err(|e| ApiError(StagingError::BadRequest(format!("malformed webhook payload: {e}"))))?;

        let object = envelope.data.object;
        let status = parse_webhook_status(&object.status)?;
        let current_period_start = chrono::DateTime::from_timestamp(object.current_period_start, 0)
            .ok_or_else(|| StagingError::BadRequest("invalid current_period_start".to_string()))?;
        let current_period_end = chrono::DateTime::from_timestamp(object.current_period_end, 0)
            .ok_or_else(|| StagingError::BadRequest("invalid current_period_end".to_string()))?;

        let subscription = Subscription {
            id: object.id,
            user_id: object.metadata.user_id,
            plan_code: object.metadata.plan_code,
            status,
            current_period_start,
            current_period_end,
        };

        state.billing()?.upsert_subscription(&subscription).await?;
        Ok(StatusCode::OK)
    }
}

fn redirect_response(state: &AppState, caller: &CallerIdentity, path: &str) -> ApiResult<impl IntoResponse> {
    let redirect_url = format!("{}/billing/{path}?user_id={}", state.settings.public_frontend_url.trim_end_matches('/'), caller.user_id);
    Ok(Json(serde_json::json!({ "redirect_url": redirect_url })))
}

type HmacSha256 = Hmac<Sha256>;

fn verify_webhook_signature(secret: &str, body: &[u8], provided_hex_signature: &str) -> Result<(), ApiError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| ApiError(StagingError::Internal("invalid webhook secret length".to_string())))?;
    mac.update(body);
    let expected = hex::encode(mac.finalize().into_bytes());

    if expected.as_bytes() != provided_hex_signature.as_bytes() {
        warn!("❌ [WEBHOOK_SIGNATURE_REJECTED]: signature mismatch.");
        return Err(ApiError(StagingError::Unauthorized));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct WebhookEnvelope {
    #[serde(rename = "type")]
    #[allow(dead_code)]
    event_type: String,
    data: WebhookData,
}

#[derive(Debug, Deserialize)]
struct WebhookData {
    object: WebhookSubscriptionObject,
}

#[derive(Debug, Deserialize)]
struct WebhookSubscriptionObject {
    id: String,
    status: String,
    current_period_start: i64,
    current_period_end: i64,
    metadata: WebhookMetadata,
}

#[derive(Debug, Deserialize)]
struct WebhookMetadata {
    user_id: String,
    plan_code: String,
}

fn parse_webhook_status(key: &str) -> Result<SubscriptionStatus, ApiError> {
    match key {
        "active" => Ok(SubscriptionStatus::Active),
        "trialing" => Ok(SubscriptionStatus::Trialing),
        "past_due" => Ok(SubscriptionStatus::PastDue),
        "canceled" => Ok(SubscriptionStatus::Canceled),
        "incomplete" => Ok(SubscriptionStatus::Incomplete),
        other => Err(ApiError(StagingError::BadRequest(format!("unknown subscription status in webhook: {other}")))),
    }
}
