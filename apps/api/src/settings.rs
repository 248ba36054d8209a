// [apps/api/src/settings.rs]
/*!
 * =================================================================
 * APARATO: API SETTINGS (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION CONFIGURATION (ESTRATO L1-APP)
 * RESPONSABILIDAD: LECTURA ÚNICA DE ENTORNO AL ARRANQUE DEL PROCESO
 *
 * Representa los insumos de entorno enumerados en spec §6: DSN de base
 * de datos, endpoint/región/llaves del object store, token del proveedor
 * generativo, dominio/audiencia del identity provider, secretos del
 * procesador de pagos, URL pública del frontend, secreto compartido del
 * worker, identificador de modelo activo por defecto.
 * =================================================================
 */

use realstage_infra_blob::BlobGatewayConfig;

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

    pub identity_provider_domain: String,
    pub identity_provider_audience: String,

    pub payment_provider_secret_key: String,
    pub payment_provider_webhook_secret: String,

    pub public_frontend_url: String,
    pub worker_shared_secret: String,

    /// Respaldo compilado si la fila `settings.active_model_id` aún no
    /// fue sembrada (spec §4.6: "adapter's compiled-in defaults").
    pub default_active_model_id: String,

    pub server_port: u16,
}

impl Settings {
    /// Lee el entorno una sola vez al arranque (tras `dotenvy::dotenv()`),
    /// siguiendo la convención del `main.rs` del equipo.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: require_env("DATABASE_URL")?,
            turso_auth_token: std::env::var("TURSO_AUTH_TOKEN").ok(),

            blob_endpoint: require_env("BLOB_ENDPOINT")?,
            blob_region: std::env::var("BLOB_REGION").unwrap_or_else(|_| "auto".to_string()),
            blob_access_key_id: require_env("BLOB_ACCESS_KEY_ID")?,
            blob_secret_access_key: require_env("BLOB_SECRET_ACCESS_KEY")?,

            provider_base_url: require_env("PROVIDER_BASE_URL")?,
            provider_api_token: require_env("PROVIDER_API_TOKEN")?,

            identity_provider_domain: std::env::var("IDENTITY_PROVIDER_DOMAIN").unwrap_or_default(),
            identity_provider_audience: std::env::var("IDENTITY_PROVIDER_AUDIENCE").unwrap_or_default(),

            payment_provider_secret_key: std::env::var("PAYMENT_PROVIDER_SECRET_KEY").unwrap_or_default(),
            payment_provider_webhook_secret: std::env::var("PAYMENT_PROVIDER_WEBHOOK_SECRET").unwrap_or_default(),

            public_frontend_url: std::env::var("PUBLIC_FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            worker_shared_secret: require_env("WORKER_SHARED_SECRET")?,

            default_active_model_id: std::env::var("ACTIVE_MODEL_ID")
                .unwrap_or_else(|_| "black-forest-labs/flux-kontext-max".to_string()),

            server_port: std::env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(8080),
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
}

fn require_env(key: &str) -> anyhow::Result<String> {
    std::env::var(key).map_err(|_| anyhow::anyhow!("CRITICAL_FAULT: {key} undefined in terminal context."))
}
