// [apps/worker/src/settings.rs]
/*!
 * =================================================================
 * APARATO: WORKER SETTINGS (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION CONFIGURATION (ESTRATO L1-APP)
 * RESPONSABILIDAD: LECTURA ÚNICA DE ENTORNO AL ARRANQUE DEL PROCESO
 *
 * Mismo insumo de entorno que `apps/api` para el acceso a base de datos,
 * object store y proveedor generativo (spec §6), más los parámetros
 * propios del pool de ejecutores: tamaño, intervalo ocioso, intervalo
 * de sondeo de predicción y timeout total (spec §4.7 paso 6, §8).
 * =================================================================
 */

use clap::Parser;
use realstage_infra_blob::BlobGatewayConfig;
use std::time::Duration;

/// Directivas de arranque del pool de ejecutores, leídas de CLI o de
/// variables de entorno.
#[derive(Parser, Debug)]
#[command(author, version, about = "Pool de ejecutores de la puesta en escena virtual.")]
struct WorkerDirectives {
    #[arg(long, env = "WORKER_POOL_SIZE")]
    worker_pool_size: Option<usize>,

    #[arg(long, env = "WORKER_NODE_IDENTIFIER")]
    worker_node_identifier: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub turso_auth_token: Option<String>,

    pub blob_endpoint: String,
    pub blob_region: String,
    pub blob_access_key_id: String,
    pub blob_secret_access_key: String,

    pub provider_base_url: String,
    pub provider_api_token: String,

    pub default_active_model_id: String,

    /// Número de ejecutores concurrentes corriendo el algoritmo §4.7 en
    /// paralelo contra la misma cola compartida; spec §8 sugiere 4-16.
    pub worker_pool_size: usize,
    /// Prefijo de identidad de nodo, combinado con el índice de ejecutor
    /// para formar el `claimed_by` de cada Job.
    pub worker_node_identifier: String,
    /// Pausa antes de volver a intentar `claim` cuando la cola está vacía.
    pub idle_poll_interval: Duration,
    /// Intervalo fijo de sondeo de una predicción en curso (spec §4.7 paso 6).
    pub prediction_poll_interval: Duration,
    /// Timeout total impuesto sobre una predicción, independiente de lo
    /// que el proveedor reporte (spec §4.7 paso 6: "a total timeout of 5 minutes").
    pub prediction_total_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let directives = WorkerDirectives::parse();

        Ok(Self {
            database_url: require_env("DATABASE_URL")?,
            turso_auth_token: std::env::var("TURSO_AUTH_TOKEN").ok(),

            blob_endpoint: require_env("BLOB_ENDPOINT")?,
            blob_region: std::env::var("BLOB_REGION").unwrap_or_else(|_| "auto".to_string()),
            blob_access_key_id: require_env("BLOB_ACCESS_KEY_ID")?,
            blob_secret_access_key: require_env("BLOB_SECRET_ACCESS_KEY")?,

            provider_base_url: require_env("PROVIDER_BASE_URL")?,
            provider_api_token: require_env("PROVIDER_API_TOKEN")?,

            default_active_model_id: std::env::var("ACTIVE_MODEL_ID")
                .unwrap_or_else(|_| "black-forest-labs/flux-kontext-max".to_string()),

            worker_pool_size: directives.worker_pool_size.unwrap_or_else(num_cpus::get).clamp(1, 64),
            worker_node_identifier: directives.worker_node_identifier.unwrap_or_else(|| "staging-worker".to_string()),
            idle_poll_interval: Duration::from_millis(500),
            prediction_poll_interval: Duration::from_secs(2),
            prediction_total_timeout: Duration::from_secs(300),
        })
    }

    pub fn blob_gateway_config(&self) -> BlobGatewayConfig {
        BlobGatewayConfig {
            endpoint: self.blob_endpoint.clone(),
            access_key_id: self.blob_access_key_id.clone(),
            secret_access_key: self.blob_secret_access_key.clone(),
            region: self.blob_region.clone(),
        }
    }

    /// Identidad de `claimed_by` para el ejecutor número `index` del pool.
    pub fn executor_identity(&self, index: usize) -> String {
        format!("{}-{index}", self.worker_node_identifier)
    }
}

fn require_env(key: &str) -> anyhow::Result<String> {
    std::env::var(key).map_err(|_| anyhow::anyhow!("CRITICAL_FAULT: {key} undefined in runtime environment."))
}
