// [apps/api/src/handlers/stream.rs]
/*!
 * =================================================================
 * APARATO: EVENT STREAM HANDLER (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION LAYER (ESTRATO L1-APP)
 * RESPONSABILIDAD: FAN-OUT SSE DE TRANSICIONES DE ESTADO (spec §4.8, §6)
 *
 * Entrega best-effort: un suscriptor que se queda atrás pierde eventos
 * (`broadcast::error::RecvError::Lagged`) en lugar de bloquear al
 * publicador; el cliente se espera que reconcilie con una llamada de
 * listado regular al reconectar (spec §4.8).
 * =================================================================
 */

use crate::middleware::CallerIdentity;
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::instrument;

pub struct StreamHandler;

impl StreamHandler {
    #[instrument(skip(state, caller))]
    pub async fn subscribe(
        State(state): State<AppState>,
        Extension(caller): Extension<CallerIdentity>,
    ) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
        let receiver = state.event_bus.subscribe();
        let owner_user_id = caller.user_id;

        let filtered = BroadcastStream::new(receiver).filter_map(move |item| match item {
            Ok(event) if event.owner_user_id == owner_user_id => {
                serde_json::to_string(&event).ok().map(|json| Ok(Event::default().event("image_status").data(json)))
            }
            Ok(_) => None,
            Err(BroadcastStreamRecvError::Lagged(_)) => None,
        });

        Sse::new(filtered).keep_alive(KeepAlive::default())
    }
}
