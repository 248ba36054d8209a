// [apps/api/src/main.rs]
/*!
 * =================================================================
 * APARATO: API MAIN ENTRY POINT (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: BOOTSTRAP DE ENTORNO Y ARRANQUE DEL SERVIDOR HTTP
 * =================================================================
 */

use dotenvy::dotenv;
use realstage_api::prelude::*;
use realstage_shared_telemetry::init_tracing;
use tracing::{error, info};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing("realstage_api");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_stack_size(4 * 1024 * 1024)
        .build()?;

    runtime.block_on(async {
        let settings = Settings::from_env()?;
        let server_port = settings.server_port;

        info!("🛰️  [API_BOOT]: ignition sequence starting on port {server_port}...");

        let kernel = ApiKernel::ignite(settings).await?;

        info!("🚀 [API_ONLINE]: system fully operational on port {server_port}.");
        if let Err(launch_error) = kernel.launch().await {
            error!("❌ [API_CRASHED]: {launch_error}");
            std::process::exit(1);
        }

        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
