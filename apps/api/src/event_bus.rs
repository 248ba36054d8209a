// [apps/api/src/event_bus.rs]
/*!
 * =================================================================
 * APARATO: EVENT BUS (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION SERVICE (ESTRATO L1-APP)
 * RESPONSABILIDAD: DIFUSIÓN DE TRANSICIONES DE ESTADO A SUSCRIPTORES (§4.8)
 *
 * Implementa el contrato de la Cola de Trabajos §4.8: un mensaje compacto
 * de cambio de estado por transición terminal, entregado best-effort a
 * cada suscriptor conectado del usuario propietario. No hay reintento ni
 * persistencia; un cliente reconecta y reconcilia vía `list`.
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use typeshare::typeshare;

const CHANNEL_CAPACITY: usize = 256;

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageStatusEvent {
    pub image_id: String,
    pub owner_user_id: String,
    pub status: String,
    pub staged_url: Option<String>,
    pub error: Option<String>,
}

/// Bus de difusión en proceso, respaldado por un canal `broadcast`. Cada
/// suscriptor del flujo SSE obtiene su propio receptor; los eventos de
/// otros usuarios se descartan en el handler antes de llegar al socket.
pub struct EventBus {
    sender: broadcast::Sender<ImageStatusEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _receiver) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, event: ImageStatusEvent) {
        // Un bus sin suscriptores no es un fallo: el envío simplemente no
        // tiene receptores vivos en ese instante.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ImageStatusEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
