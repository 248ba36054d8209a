// [apps/api/src/kernel.rs]
/*!
 * =================================================================
 * APARATO: API SOVEREIGN KERNEL (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: COMPOSITION ROOT (ESTRATO L1-APP)
 * RESPONSABILIDAD: IGNICIÓN DE INFRAESTRUCTURA, DAEMONS Y SERVIDOR HTTP
 *
 * VISION HOLÍSTICA:
 * Conecta la base de datos, arma el `AppState` y lanza tres daemons de
 * mantenimiento de fondo antes de levantar el servidor Axum: la
 * reclamación de jobs zombie (spec §4.4, visibility timeout), el
 * barrido periódico de originales huérfanos (spec §4.1 `sweep`), y el
 * relevo del buzón de eventos escrito por el proceso separado del
 * Staging Worker hacia el Event Bus en memoria de este proceso (spec §4.9).
 * =================================================================
 */

use crate::event_bus::ImageStatusEvent;
use crate::routes::build_router;
use crate::settings::Settings;
use crate::state::AppState;
use realstage_infra_db::TursoClient;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use tracing::{error, info, instrument, warn};

const ZOMBIE_RECLAIM_INTERVAL: Duration = Duration::from_secs(60);
const ORPHAN_SWEEP_INTERVAL: Duration = Duration::from_secs(3600);
const ORPHAN_SWEEP_BATCH_LIMIT: i64 = 500;
const EVENT_RELAY_INTERVAL: Duration = Duration::from_secs(2);
const EVENT_RELAY_BATCH_LIMIT: i64 = 100;
const EVENT_PURGE_INTERVAL: Duration = Duration::from_secs(3600);
const EVENT_RETENTION: Duration = Duration::from_secs(86400);

pub struct ApiKernel {
    listening_port: u16,
    application_state: AppState,
}

impl ApiKernel {
    #[instrument(skip(settings))]
    pub async fn ignite(settings: Settings) -> anyhow::Result<Self> {
        let database_client = TursoClient::connect(&settings.database_url, settings.turso_auth_token.clone()).await?;
        let listening_port = settings.server_port;

        Ok(Self { listening_port, application_state: AppState::new(database_client, settings) })
    }

    pub async fn launch(self) -> anyhow::Result<()> {
        spawn_zombie_reclaim_daemon(self.application_state.clone());
        spawn_orphan_sweep_daemon(self.application_state.clone());
        spawn_event_relay_daemon(self.application_state.clone());

        let router = build_router(self.application_state);
        let bind_address = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), self.listening_port);

        info!("🚀 [KERNEL_ONLINE]: listening at {bind_address}.");
        let listener = tokio::net::TcpListener::bind(bind_address).await?;
        axum::serve(listener, router).await?;
        Ok(())
    }
}

fn spawn_zombie_reclaim_daemon(state: AppState) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(ZOMBIE_RECLAIM_INTERVAL);
        loop {
            ticker.tick().await;
            match state.jobs() {
                Ok(jobs) => {
                    if let Err(error) = jobs.reclaim_zombies().await {
                        error!("🚨 [ZOMBIE_RECLAIM_DAEMON]: {error}");
                    }
                }
                Err(error) => warn!("⚠️ [ZOMBIE_RECLAIM_DAEMON]: connection unavailable: {error}"),
            }
        }
    });
}

fn spawn_orphan_sweep_daemon(state: AppState) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(ORPHAN_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            let cutoff = chrono::Utc::now() - realstage_infra_db::OriginalRepository::default_sweep_grace_period();
            match state.originals() {
                Ok(originals) => match originals.sweep(cutoff, ORPHAN_SWEEP_BATCH_LIMIT).await {
                    Ok(reclaimed) if reclaimed > 0 => info!("🧹 [ORPHAN_SWEEP_DAEMON]: reclaimed {reclaimed} originals."),
                    Ok(_) => {}
                    Err(error) => error!("🚨 [ORPHAN_SWEEP_DAEMON]: {error}"),
                },
                Err(error) => warn!("⚠️ [ORPHAN_SWEEP_DAEMON]: connection unavailable: {error}"),
            }
        }
    });
}

/// Sondea el buzón de eventos escrito por el proceso del Staging Worker y
/// reenvía cada fila pendiente al `EventBus` en memoria de este proceso,
/// marcándola relevada. Sin este relevo, los suscriptores SSE conectados
/// a la API nunca verían las transiciones producidas por un worker que
/// corre como un binario separado (spec §4.7, §4.9).
fn spawn_event_relay_daemon(state: AppState) {
    tokio::spawn(async move {
        let mut relay_ticker = tokio::time::interval(EVENT_RELAY_INTERVAL);
        let mut purge_ticker = tokio::time::interval(EVENT_PURGE_INTERVAL);
        loop {
            tokio::select! {
                _ = relay_ticker.tick() => relay_pending_events(&state).await,
                _ = purge_ticker.tick() => purge_relayed_events(&state).await,
            }
        }
    });
}

async fn relay_pending_events(state: &AppState) {
    let outbox = match state.event_outbox() {
        Ok(outbox) => outbox,
        Err(error) => {
            warn!("⚠️ [EVENT_RELAY_DAEMON]: connection unavailable: {error}");
            return;
        }
    };

    let pending = match outbox.fetch_unrelayed(EVENT_RELAY_BATCH_LIMIT).await {
        Ok(pending) => pending,
        Err(error) => {
            error!("🚨 [EVENT_RELAY_DAEMON]: fetch failed: {error}");
            return;
        }
    };

    for event in pending {
        state.event_bus.publish(ImageStatusEvent {
            image_id: event.image_id.clone(),
            owner_user_id: event.owner_user_id,
            status: event.status,
            staged_url: event.staged_url,
            error: event.error,
        });
        if let Err(error) = outbox.mark_relayed(&event.id).await {
            error!("🚨 [EVENT_RELAY_DAEMON]: failed to mark {} relayed: {error}", event.id);
        }
    }
}

async fn purge_relayed_events(state: &AppState) {
    let cutoff = chrono::Utc::now() - chrono::Duration::from_std(EVENT_RETENTION).expect("constant retention fits Duration");
    match state.event_outbox() {
        Ok(outbox) => match outbox.purge_relayed_before(cutoff).await {
            Ok(purged) if purged > 0 => info!("🧹 [EVENT_PURGE_DAEMON]: purged {purged} relayed events."),
            Ok(_) => {}
            Err(error) => error!("🚨 [EVENT_PURGE_DAEMON]: {error}"),
        },
        Err(error) => warn!("⚠️ [EVENT_PURGE_DAEMON]: connection unavailable: {error}"),
    }
}
