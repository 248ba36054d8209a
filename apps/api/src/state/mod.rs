// [apps/api/src/state/mod.rs]
/*!
 * =================================================================
 * APARATO: APPLICATION STATE (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION LAYER (ESTRATO L1-APP)
 * RESPONSABILIDAD: DEPENDENCIAS COMPARTIDAS INYECTADAS EN CADA HANDLER
 *
 * VISION HOLÍSTICA:
 * Un único `Clone` barato propagado por axum a cada handler. Los
 * repositorios no se mantienen vivos aquí (cada uno envuelve una
 * `Connection` de corta vida); en su lugar `AppState` guarda el
 * `TursoClient` y construye el repositorio correspondiente a demanda en
 * cada llamada, siguiendo la misma convención que el equipo aplica en
 * sus propios handlers.
 * =================================================================
 */

use crate::event_bus::EventBus;
use crate::settings::Settings;
use realstage_domain_adapters::AdapterRegistry;
use realstage_infra_blob::{BlobGateway, S3BlobGateway};
use realstage_infra_db::{
    BillingRepository, DbError, EventOutboxRepository, ImageRepository, JobRepository, ModelConfigRepository, OriginalRepository,
    ProjectRepository, TursoClient,
};
use realstage_infra_provider::ProviderClient;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub database_client: TursoClient,
    pub blob_gateway: Arc<dyn BlobGateway>,
    pub provider_client: Arc<ProviderClient>,
    pub adapter_registry: Arc<AdapterRegistry>,
    pub event_bus: Arc<EventBus>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(database_client: TursoClient, settings: Settings) -> Self {
        let blob_gateway: Arc<dyn BlobGateway> = Arc::new(S3BlobGateway::new(settings.blob_gateway_config()));
        let provider_client = Arc::new(ProviderClient::new(settings.provider_base_url.clone(), settings.provider_api_token.clone()));

        Self {
            database_client,
            blob_gateway,
            provider_client,
            adapter_registry: Arc::new(AdapterRegistry::new()),
            event_bus: Arc::new(EventBus::new()),
            settings: Arc::new(settings),
        }
    }

    pub fn projects(&self) -> Result<ProjectRepository, DbError> {
        Ok(ProjectRepository::new(self.database_client.get_connection()?))
    }

    pub fn originals(&self) -> Result<OriginalRepository, DbError> {
        Ok(OriginalRepository::new(self.database_client.get_connection()?))
    }

    pub fn images(&self) -> Result<ImageRepository, DbError> {
        Ok(ImageRepository::new(self.database_client.get_connection()?))
    }

    pub fn jobs(&self) -> Result<JobRepository, DbError> {
        Ok(JobRepository::new(self.database_client.get_connection()?))
    }

    pub fn billing(&self) -> Result<BillingRepository, DbError> {
        Ok(BillingRepository::new(self.database_client.get_connection()?))
    }

    pub fn model_configs(&self) -> Result<ModelConfigRepository, DbError> {
        Ok(ModelConfigRepository::new(self.database_client.get_connection()?))
    }

    pub fn event_outbox(&self) -> Result<EventOutboxRepository, DbError> {
        Ok(EventOutboxRepository::new(self.database_client.get_connection()?))
    }
}
