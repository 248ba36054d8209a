// [apps/api/src/routes.rs]
/*!
 * =================================================================
 * APARATO: V1 ROUTING MATRIX (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L1-APP)
 * RESPONSABILIDAD: COMPOSICIÓN DE LA SUPERFICIE HTTP COMPLETA (spec §6)
 *
 * Tres estratos de autorización conviven bajo /v1:
 * 1. Público: únicamente el webhook del procesador de pagos, firmado por
 *    su propio HMAC y por tanto sin necesidad del guardia de portador.
 * 2. Interno borde→API: `GET /images/{id}/owner`, protegido por el
 *    secreto compartido del worker, nunca por un token de portador.
 * 3. Autenticado: el resto de la superficie, detrás de `auth_guard`.
 * =================================================================
 */

use crate::handlers::admin::AdminHandler;
use crate::handlers::billing::BillingHandler;
use crate::handlers::images::ImagesHandler;
use crate::handlers::internal::InternalHandler;
use crate::handlers::projects::ProjectsHandler;
use crate::handlers::stream::StreamHandler;
use crate::handlers::uploads::UploadsHandler;
use crate::middleware::{auth_guard, internal_edge_guard};
use crate::state::AppState;
use axum::http::{header, Method};
use axum::routing::{delete, get, post};
use axum::{middleware, Router};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    let public_routes = Router::new().route("/stripe/webhook", post(BillingHandler::stripe_webhook));

    let internal_routes = Router::new()
        .route("/images/:image_id/owner", get(InternalHandler::owner))
        .layer(middleware::from_fn_with_state(state.clone(), internal_edge_guard));

    let authenticated_routes = Router::new()
        .route("/projects", post(ProjectsHandler::create).get(ProjectsHandler::list))
        .route("/projects/:project_id", delete(ProjectsHandler::delete))
        .route("/projects/:project_id/images", get(ProjectsHandler::list_images))
        .route("/projects/:project_id/images/grouped", get(ProjectsHandler::list_images_grouped))
        .route("/projects/:project_id/cost", get(ProjectsHandler::cost))
        .route("/uploads/presign", post(UploadsHandler::presign))
        .route("/images", post(ImagesHandler::create_one))
        .route("/images/batch", post(ImagesHandler::create_batch))
        .route("/images/:image_id", get(ImagesHandler::get).delete(ImagesHandler::delete))
        .route("/images/:image_id/presign", get(ImagesHandler::presign))
        .route("/billing/usage", get(BillingHandler::usage))
        .route("/billing/subscriptions", get(BillingHandler::subscriptions))
        .route("/billing/create-subscription-elements", post(BillingHandler::create_subscription_elements))
        .route("/billing/upgrade-subscription", post(BillingHandler::upgrade_subscription))
        .route("/billing/cancel-subscription", post(BillingHandler::cancel_subscription))
        .route("/billing/set-default-payment-method", post(BillingHandler::set_default_payment_method))
        .route("/billing/remove-payment-method", post(BillingHandler::remove_payment_method))
        .route("/billing/payment-methods", get(BillingHandler::payment_methods))
        .route("/admin/models/:model_id/config", get(AdminHandler::get_config).put(AdminHandler::put_config))
        .route("/admin/models/:model_id/config/schema", get(AdminHandler::config_schema))
        .route("/stream", get(StreamHandler::subscribe))
        .layer(middleware::from_fn(auth_guard));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest(
            "/v1",
            Router::new().merge(public_routes).merge(internal_routes).merge(authenticated_routes),
        )
        .layer(cors)
        .with_state(state)
}
