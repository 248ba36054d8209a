// [apps/worker/src/engine.rs]
/*!
 * =================================================================
 * APARATO: STAGING WORKER ENGINE (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: DOMAIN EXECUTION LOOP (ESTRATO L1-APP)
 * RESPONSABILIDAD: EJECUCIÓN DE UN JOB DE PUNTA A PUNTA (spec §4.7)
 *
 * VISION HOLÍSTICA:
 * Cada instancia de `StagingWorkerEngine` es un ejecutor independiente
 * del pool: reclama el siguiente Job visible, carga la Image referenciada,
 * la lleva a `processing`, construye la data URL del original, compone el
 * prompt, resuelve modelo y configuración, invoca al proveedor generativo
 * y sondea hasta un estado terminal, y persiste el resultado. Step 7/8 de
 * la especificación siempre completan antes del ack/nack del Job, de modo
 * que una caída a media ejecución deja al Job reclamable de nuevo por otro
 * ejecutor (spec §4.4 zombie reclaim) en vez de perderse.
 * =================================================================
 */

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use bytes::Bytes;
use realstage_core_models::{sniff_media_type, Image, ImageStatus, Job, JobDisposition, StagingError};
use realstage_domain_adapters::{AdapterRegistry, ModelAdapterRequest};
use realstage_infra_blob::BlobGateway;
use realstage_infra_db::{DbError, EventOutboxRepository, ImageRepository, JobRepository, ModelConfigRepository, TursoClient};
use realstage_infra_provider::ProviderClient;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

use crate::settings::Settings;

/// Salida de un provider run exitoso, lista para escribirse en la Image.
struct StagedResult {
    staged_url: String,
    model_id: String,
    cost: f64,
    processing_ms: i64,
    prediction_id: String,
}

pub struct StagingWorkerEngine {
    database_client: TursoClient,
    blob_gateway: Arc<dyn BlobGateway>,
    provider_client: Arc<ProviderClient>,
    adapter_registry: Arc<AdapterRegistry>,
    settings: Arc<Settings>,
    executor_id: String,
    shutdown: Arc<AtomicBool>,
}

impl StagingWorkerEngine {
    pub fn new(
        database_client: TursoClient,
        blob_gateway: Arc<dyn BlobGateway>,
        provider_client: Arc<ProviderClient>,
        adapter_registry: Arc<AdapterRegistry>,
        settings: Arc<Settings>,
        executor_id: String,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self { database_client, blob_gateway, provider_client, adapter_registry, settings, executor_id, shutdown }
    }

    /// Bucle perpetuo del ejecutor: reclama, procesa, repite. Se detiene
    /// limpiamente una vez que la señal de apagado se observa entre dos
    /// ciclos de reclamación (nunca a media ejecución de un Job).
    pub async fn run(self) {
        info!("🧵 [EXECUTOR_ONLINE]: {} entering claim loop.", self.executor_id);
        while !self.shutdown.load(Ordering::SeqCst) {
            match self.claim_and_process_one().await {
                Ok(true) => continue,
                Ok(false) => tokio::time::sleep(self.settings.idle_poll_interval).await,
                Err(error) => {
                    error!("🚨 [EXECUTOR_FAULT]: {} hit a fault outside job scope: {error}", self.executor_id);
                    tokio::time::sleep(self.settings.idle_poll_interval).await;
                }
            }
        }
        info!("🏁 [EXECUTOR_OFFLINE]: {} left the claim loop.", self.executor_id);
    }

    #[instrument(skip(self))]
    async fn claim_and_process_one(&self) -> Result<bool, StagingError> {
        let jobs = JobRepository::new(self.database_client.get_connection()?);
        let Some(job) = jobs.claim(&self.executor_id).await? else {
            return Ok(false);
        };

        if let Err(error) = self.run_claimed_job(&jobs, job.clone()).await {
            error!("🚨 [JOB_FAULT]: {} failed to drive job {}: {error}", self.executor_id, job.id);
        }
        Ok(true)
    }

    /// Ejecuta los pasos 1-9 de spec §4.7 para un Job ya reclamado.
    /// Siempre deja el Job en un estado terminal de cola (`ack` o `nack`)
    /// antes de retornar, incluso cuando la puesta en escena falla.
    async fn run_claimed_job(&self, jobs: &JobRepository, job: Job) -> Result<(), StagingError> {
        let images = ImageRepository::new(self.database_client.get_connection()?);
        let outbox = EventOutboxRepository::new(self.database_client.get_connection()?);

        let Some(image) = images.get(&job.image_id).await? else {
            warn!("🗑️ [JOB_ORPHANED]: Job {} references vanished image {}; acking.", job.id, job.image_id);
            jobs.ack(&job.id).await?;
            return Ok(());
        };

        if image.status.is_terminal() {
            info!("✅ [ALREADY_TERMINAL]: Image {} is already {:?}; acking without side effects.", image.id, image.status);
            jobs.ack(&job.id).await?;
            return Ok(());
        }

        let (owner_user_id, _project_id) = images.get_owner(&image.id).await?;

        let processing_image = match images
            .update_status(&image.id, ImageStatus::Processing, None, None, None, None, None, None)
            .await
        {
            Ok(updated) => updated,
            Err(DbError::InvalidStatusTransition) => {
                info!("⏭️ [RACE_DETECTED]: Image {} moved terminal concurrently; acking.", image.id);
                jobs.ack(&job.id).await?;
                return Ok(());
            }
            Err(other) => return Err(other.into()),
        };

        match self.stage_image(&processing_image).await {
            Ok(result) => {
                images
                    .update_status(
                        &image.id,
                        ImageStatus::Ready,
                        Some(&result.staged_url),
                        None,
                        Some(result.cost),
                        Some(&result.model_id),
                        Some(result.processing_ms),
                        Some(&result.prediction_id),
                    )
                    .await?;
                info!("🎉 [STAGING_COMPLETE]: Image {} ready at {}.", image.id, result.staged_url);

                if let Err(error) = outbox.record(&image.id, &owner_user_id, "ready", Some(&result.staged_url), None).await {
                    warn!("⚠️ [EVENT_OUTBOX_FAILED]: {}: {error}", image.id);
                }
                jobs.ack(&job.id).await?;
            }
            Err(staging_error) => {
                let message = staging_error.human_message();
                warn!("💥 [STAGING_FAILED]: Image {}: {message}", image.id);

                if staging_error.is_transient_worker_error() {
                    // §7 `storage_failed`: "Retry with backoff inside the worker; surfaces
                    // as failed job on exhaustion." Leave the Image in `processing` so the
                    // retried attempt can still claim it; only write `Failed` once `nack`
                    // reports the attempts are exhausted.
                    let jitter_unit = jitter_unit_from_job_id(&job.id);
                    let disposition = jobs.nack(&job.id, jitter_unit).await?;
                    if disposition == JobDisposition::DeadLettered {
                        self.finalize_failed_image(&images, &outbox, &image.id, &owner_user_id, &message).await;
                    }
                } else {
                    // §7: provider_failed/provider_timeout/provider_canceled are terminal
                    // model errors — §4.7 step 9 marks the Image failed and ack's, it never
                    // schedules a retry.
                    self.finalize_failed_image(&images, &outbox, &image.id, &owner_user_id, &message).await;
                    jobs.ack(&job.id).await?;
                }
            }
        }

        Ok(())
    }

    /// Escribe la transición terminal `Failed` y su evento de outbox; usado
    /// tanto por los fallos permanentes del proveedor como por los
    /// transitorios de almacenamiento que agotaron sus reintentos.
    async fn finalize_failed_image(
        &self,
        images: &ImageRepository,
        outbox: &EventOutboxRepository,
        image_id: &str,
        owner_user_id: &str,
        message: &str,
    ) {
        if let Err(error) = images.update_status(image_id, ImageStatus::Failed, None, Some(message), None, None, None, None).await {
            error!("🚨 [TERMINAL_WRITE_FAILED]: Image {} could not be marked failed: {error}", image_id);
        }
        if let Err(error) = outbox.record(image_id, owner_user_id, "failed", None, Some(message)).await {
            warn!("⚠️ [EVENT_OUTBOX_FAILED]: {}: {error}", image_id);
        }
    }

    /// Pasos 3-7 de spec §4.7: resolver bytes, componer prompt, resolver
    /// modelo/configuración, invocar al proveedor y materializar el
    /// resultado bajo la llave de staging.
    async fn stage_image(&self, image: &Image) -> Result<StagedResult, StagingError> {
        let started_at = Instant::now();

        let original_bytes = self.resolve_original_bytes(image).await?;
        let media_type = sniff_media_type(&original_bytes);
        let image_data_url = format!("data:{media_type};base64,{}", BASE64.encode(&original_bytes));

        let prompt = realstage_domain_prompt::compose(image.room_type, image.style, image.prompt.as_deref());

        let model_configs = ModelConfigRepository::new(self.database_client.get_connection()?);
        let active_model_id = model_configs
            .get_active_model_id()
            .await?
            .unwrap_or_else(|| self.settings.default_active_model_id.clone());

        let adapter = self.adapter_registry.get(&active_model_id)?;
        let stored_config = model_configs.get(&active_model_id).await?.map(|config| config.config);

        let adapter_request = ModelAdapterRequest {
            image_data_url: &image_data_url,
            prompt: &prompt,
            requested_seed: image.seed,
            request_override_config: None,
            stored_config: stored_config.as_ref(),
        };
        let provider_input = adapter.build_input(&adapter_request)?;

        let prediction = self.provider_client.create_prediction(&active_model_id, &provider_input).await?;
        let outcome = self
            .provider_client
            .poll_to_completion(&prediction.prediction_id, self.settings.prediction_poll_interval, self.settings.prediction_total_timeout)
            .await?;

        let produced_bytes = self.download_produced_image(&outcome.output_url).await?;
        let staged_key = realstage_infra_blob::staged_storage_key(&image.id);
        self.blob_gateway
            .put(&staged_key, produced_bytes, "image/jpeg", "public, max-age=31536000, immutable")
            .await?;

        let staged_url = format!("{}/{staged_key}", self.settings.blob_endpoint.trim_end_matches('/'));
        let processing_ms = started_at.elapsed().as_millis() as i64;

        Ok(StagedResult {
            staged_url,
            model_id: active_model_id,
            cost: estimated_cost_usd(&outcome.prediction_id),
            processing_ms,
            prediction_id: outcome.prediction_id,
        })
    }

    /// Resuelve los bytes del Original referenciado por la Image (spec §4.7
    /// paso 3): por su Original deduplicado si ya migró a CAOS, o por la
    /// URL heredada durante la ventana de transición (spec §9).
    async fn resolve_original_bytes(&self, image: &Image) -> Result<Bytes, StagingError> {
        if let Some(original_id) = &image.original_id {
            let key = realstage_infra_blob::original_storage_key(original_id);
            return Ok(self.blob_gateway.get(&key).await?);
        }

        if let Some(source_url) = &image.source_url {
            let key = legacy_key_from_reference(&self.settings.blob_endpoint, source_url);
            return Ok(self.blob_gateway.get(&key).await?);
        }

        Err(StagingError::Internal(format!("image {} carries neither original_id nor source_url", image.id)))
    }

    async fn download_produced_image(&self, output_url: &str) -> Result<Bytes, StagingError> {
        let response = reqwest::get(output_url)
            .await
            .map_err(|error| StagingError::ProviderFailed(format!("failed to download produced image: {error}")))?;
        if !response.status().is_success() {
            return Err(StagingError::ProviderFailed(format!("produced image fetch returned HTTP {}", response.status())));
        }
        response
            .bytes()
            .await
            .map_err(|error| StagingError::ProviderFailed(format!("failed to read produced image bytes: {error}")))
    }
}

/// Extrae la clave de objeto de una URL heredada, recortando el endpoint
/// del object store y cualquier query string, igual convención aplicada
/// en la admisión CAOS de `apps/api`.
fn legacy_key_from_reference(blob_endpoint: &str, reference: &str) -> String {
    let without_query = reference.split('?').next().unwrap_or(reference);
    let trimmed_endpoint = blob_endpoint.trim_end_matches('/');
    without_query
        .strip_prefix(trimmed_endpoint)
        .map(|rest| rest.trim_start_matches('/').to_string())
        .unwrap_or_else(|| without_query.trim_start_matches('/').to_string())
}

/// Deriva un jitter determinista en [0, 1) a partir del id del Job, sin
/// depender de una fuente de aleatoriedad en tiempo de ejecución.
fn jitter_unit_from_job_id(job_id: &str) -> f64 {
    let digest: u32 = job_id.bytes().fold(2166136261u32, |hash, byte| (hash ^ byte as u32).wrapping_mul(16777619));
    (digest % 1000) as f64 / 1000.0
}

/// No existe una tabla de precios del proveedor en el alcance de esta
/// especificación; se registra un costo nominal fijo por predicción para
/// que `GET /projects/{id}/cost` tenga una cifra no trivial que agregar.
/// TODO: sustituir por el costo real reportado por el proveedor cuando
/// ese campo se incorpore al sobre de predicción.
fn estimated_cost_usd(_prediction_id: &str) -> f64 {
    0.04
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_key_strips_endpoint_and_query() {
        let endpoint = "https://blob.example.com";
        assert_eq!(legacy_key_from_reference(endpoint, "https://blob.example.com/uploads/abc.jpg?X-Sig=1"), "uploads/abc.jpg");
    }

    #[test]
    fn legacy_key_passes_through_relative_keys() {
        assert_eq!(legacy_key_from_reference("https://blob.example.com", "uploads/already-relative.jpg"), "uploads/already-relative.jpg");
    }

    #[test]
    fn jitter_unit_is_deterministic_and_bounded() {
        let a = jitter_unit_from_job_id("job-123");
        let b = jitter_unit_from_job_id("job-123");
        assert_eq!(a, b);
        assert!((0.0..1.0).contains(&a));
    }

    #[test]
    fn jitter_unit_varies_across_job_ids() {
        assert_ne!(jitter_unit_from_job_id("job-1"), jitter_unit_from_job_id("job-2"));
    }
}
