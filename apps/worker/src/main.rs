// [apps/worker/src/main.rs]
/*!
 * =================================================================
 * APARATO: WORKER MAIN ENTRY POINT (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: BOOTSTRAP DE ENTORNO Y ARRANQUE DEL POOL DE EJECUTORES
 *
 * Levanta `settings.worker_pool_size` instancias de `StagingWorkerEngine`
 * contra la misma cola compartida (spec §8: "a pool of independent
 * concurrent executors"), y las detiene ordenadamente ante SIGINT sin
 * interrumpir un Job a media ejecución.
 * =================================================================
 */

use dotenvy::dotenv;
use realstage_domain_adapters::AdapterRegistry;
use realstage_infra_blob::{BlobGateway, S3BlobGateway};
use realstage_infra_db::TursoClient;
use realstage_infra_provider::ProviderClient;
use realstage_shared_telemetry::init_tracing;
use realstage_worker_lib::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing("realstage_worker");

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().thread_stack_size(4 * 1024 * 1024).build()?;

    runtime.block_on(async {
        let settings = Arc::new(Settings::from_env()?);
        info!("🛰️  [WORKER_BOOT]: ignition sequence starting with pool size {}...", settings.worker_pool_size);

        let database_client = TursoClient::connect(&settings.database_url, settings.turso_auth_token.clone()).await?;
        let blob_gateway: Arc<dyn BlobGateway> = Arc::new(S3BlobGateway::new(settings.blob_gateway_config()));
        let provider_client = Arc::new(ProviderClient::new(settings.provider_base_url.clone(), settings.provider_api_token.clone()));
        let adapter_registry = Arc::new(AdapterRegistry::new());

        let shutdown = Arc::new(AtomicBool::new(false));
        spawn_shutdown_listener(Arc::clone(&shutdown));

        let mut executors = Vec::with_capacity(settings.worker_pool_size);
        for index in 0..settings.worker_pool_size {
            let engine = StagingWorkerEngine::new(
                database_client.clone(),
                Arc::clone(&blob_gateway),
                Arc::clone(&provider_client),
                Arc::clone(&adapter_registry),
                Arc::clone(&settings),
                settings.executor_identity(index),
                Arc::clone(&shutdown),
            );
            executors.push(tokio::spawn(engine.run()));
        }

        info!("🚀 [WORKER_ONLINE]: {} executors claiming against the shared queue.", executors.len());

        for executor in executors {
            if let Err(join_error) = executor.await {
                error!("❌ [EXECUTOR_PANIC]: {join_error}");
            }
        }

        info!("🏁 [WORKER_OFFLINE]: all executors drained.");
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

fn spawn_shutdown_listener(shutdown: Arc<AtomicBool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("⚠️ [SIGNAL]: termination requested; draining in-flight jobs before exit.");
            shutdown.store(true, Ordering::SeqCst);
        }
    });
}
