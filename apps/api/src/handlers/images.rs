// [apps/api/src/handlers/images.rs]
/*!
 * =================================================================
 * APARATO: IMAGE CREATION & LIFECYCLE HANDLERS (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION LAYER (ESTRATO L1-APP)
 * RESPONSABILIDAD: ADMISIÓN CAOS + CUOTA, ENCOLADO Y CICLO DE VIDA (spec §4.3)
 *
 * `create_one` y `create_batch` comparten la misma secuencia de admisión:
 * CAOS fingerprinting → cuota → inserción de Image → Job emparejado →
 * encolado. El encolado fallido deja la Image en `queued` para barrido
 * de operador, nunca la descarta en silencio (spec §4.3, §4.4).
 * =================================================================
 */

use crate::errors::{ApiError, ApiResult};
use crate::extractors::ValidatedJson;
use crate::middleware::CallerIdentity;
use crate::state::AppState;
use crate::validation::validate_create_image_request;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use realstage_core_models::image::{BatchCreateOutcome, BatchItemError, CreateImageRequest};
use realstage_core_models::job::DEFAULT_MAX_ATTEMPTS;
use realstage_core_models::{sniff_media_type, Image, Original, StagingError};
use realstage_infra_blob::original_storage_key;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::{error, instrument, warn};

const MAX_BATCH_SIZE: usize = 50;

pub struct ImagesHandler;

impl ImagesHandler {
    #[instrument(skip(state, caller, request))]
    pub async fn create_one(
        State(state): State<AppState>,
        Extension(caller): Extension<CallerIdentity>,
        ValidatedJson(request): ValidatedJson<CreateImageRequest>,
    ) -> ApiResult<impl IntoResponse> {
        validate_create_image_request(&request)?;

        let usage = state.billing()?.usage(&caller.user_id).await?;
        if !usage.can_create() {
            return Err(ApiError(StagingError::UsageLimitExceeded));
        }

        let image = admit_and_enqueue(&state, &caller.user_id, &request).await?;
        Ok((StatusCode::CREATED, Json(image)))
    }

    #[instrument(skip(state, caller, requests))]
    pub async fn create_batch(
        State(state): State<AppState>,
        Extension(caller): Extension<CallerIdentity>,
        ValidatedJson(requests): ValidatedJson<Vec<CreateImageRequest>>,
    ) -> ApiResult<impl IntoResponse> {
        if requests.is_empty() || requests.len() > MAX_BATCH_SIZE {
            return Err(ApiError(StagingError::ValidationFailed(format!(
                "batch size must be between 1 and {MAX_BATCH_SIZE}, got {}",
                requests.len()
            ))));
        }

        let usage = state.billing()?.usage(&caller.user_id).await?;
        let admitted_count = usage.admit_up_to_remaining(requests.len());

        let mut images = Vec::new();
        let mut errors = Vec::new();

        for (index, request) in requests.into_iter().enumerate() {
            if index >= admitted_count {
                errors.push(BatchItemError {
                    index,
                    code: StagingError::UsageLimitExceeded.code().to_string(),
                    message: StagingError::UsageLimitExceeded.to_string(),
                });
                continue;
            }

            if let Err(validation_error) = validate_create_image_request(&request) {
                errors.push(BatchItemError { index, code: validation_error.code().to_string(), message: validation_error.to_string() });
                continue;
            }

            match admit_and_enqueue(&state, &caller.user_id, &request).await {
                Ok(image) => images.push(image),
                Err(api_error) => errors.push(BatchItemError { index, code: api_error.0.code().to_string(), message: api_error.0.to_string() }),
            }
        }

        let status = if errors.is_empty() {
            StatusCode::CREATED
        } else if images.is_empty() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::MULTI_STATUS
        };

        Ok((status, Json(BatchCreateOutcome { images, errors })))
    }

    #[instrument(skip(state))]
    pub async fn get(State(state): State<AppState>, Path(image_id): Path<String>) -> ApiResult<impl IntoResponse> {
        let image = state.images()?.get(&image_id).await?.ok_or_else(|| StagingError::NotFound(format!("image {image_id}")))?;
        Ok(Json(image))
    }

    #[instrument(skip(state))]
    pub async fn delete(State(state): State<AppState>, Path(image_id): Path<String>) -> ApiResult<impl IntoResponse> {
        soft_delete_image_and_release(&state, &image_id).await?;
        Ok(StatusCode::NO_CONTENT)
    }

    #[instrument(skip(state))]
    pub async fn presign(
        State(state): State<AppState>,
        Path(image_id): Path<String>,
        Query(params): Query<HashMap<String, String>>,
    ) -> ApiResult<impl IntoResponse> {
        let image = state.images()?.get(&image_id).await?.ok_or_else(|| StagingError::NotFound(format!("image {image_id}")))?;
        let kind = params.get("kind").map(String::as_str).unwrap_or("original");
        let download = params.get("download").map(|v| v == "1").unwrap_or(false);

        let key = match kind {
            "staged" => realstage_infra_blob::staged_storage_key(&image.id),
            "original" => {
                let original_id = image.original_id.ok_or_else(|| StagingError::NotFound("image has no original reference".to_string()))?;
                original_storage_key(&original_id)
            }
            other => return Err(ApiError(StagingError::BadRequest(format!("unknown presign kind: {other}")))),
        };

        let url = state.blob_gateway.presign_get(&key, 300, download)?;
        Ok(Json(serde_json::json!({ "url": url })))
    }
}

/// Lista de parámetros de CAOS ya resueltos (hash + metadatos) antes de
/// insertar la fila de Image; empaqueta la respuesta de
/// `caos_admit_from_url` para mantener la firma de `admit_and_enqueue` legible.
struct AdmittedOriginal {
    original: Original,
}

async fn admit_and_enqueue(state: &AppState, owner_user_id: &str, request: &CreateImageRequest) -> ApiResult<Image> {
    assert_project_ownership(state, owner_user_id, &request.project_id).await?;

    let admitted = caos_admit_from_url(state, &request.original_url).await?;

    let image_id = uuid::Uuid::new_v4().to_string();
    let image = state
        .images()?
        .insert_queued(
            &image_id,
            &request.project_id,
            owner_user_id,
            Some(&admitted.original.id),
            Some(&request.original_url),
            request.room_type,
            request.style,
            request.prompt.as_deref(),
            request.seed,
        )
        .await?;

    enqueue_staging_job(state, &image).await?;
    Ok(image)
}

/// Encola el Job emparejado con la Image recién admitida. Una falla aquí
/// no revierte la escritura de la Image: queda en `queued` lista para un
/// re-encolado de operador (spec §4.3, §4.4).
async fn enqueue_staging_job(state: &AppState, image: &Image) -> ApiResult<()> {
    let payload = serde_json::json!({
        "image_id": image.id,
        "project_id": image.project_id,
        "original_id": image.original_id,
        "source_url": image.source_url,
        "room_type": image.room_type,
        "style": image.style,
        "prompt": image.prompt,
        "seed": image.seed,
    });

    let job_id = uuid::Uuid::new_v4().to_string();
    match state.jobs()?.enqueue(&job_id, &image.id, &payload, DEFAULT_MAX_ATTEMPTS).await {
        Ok(_) => Ok(()),
        Err(db_error) => {
            error!("🚨 [ENQUEUE_FAILED]: image {} left queued for operator sweep: {db_error}", image.id);
            Err(ApiError(StagingError::EnqueueFailed(image.id.clone())))
        }
    }
}

/// Valida que `project_id` exista y pertenezca al llamador (spec §4.3:
/// "project_id must be a valid UUID and belong to the caller"), antes de
/// tocar CAOS o la cuota.
async fn assert_project_ownership(state: &AppState, owner_user_id: &str, project_id: &str) -> ApiResult<()> {
    let project = state.projects()?.get(project_id).await?.ok_or_else(|| StagingError::NotFound(format!("project {project_id}")))?;
    if project.owner_user_id != owner_user_id {
        return Err(ApiError(StagingError::Forbidden));
    }
    Ok(())
}

/// Resuelve `original_url` (la clave/URL bajo la cual el cliente ya subió
/// los bytes vía presigned PUT) a una fila CAOS: descarga el objeto
/// temporal, lo huelle por contenido, y si es un hash nunca visto lo
/// re-escribe bajo su clave canónica hash-derivada antes de liberar el
/// objeto temporal (spec §4.1, §6 `POST /uploads/presign`).
async fn caos_admit_from_url(state: &AppState, original_url: &str) -> ApiResult<AdmittedOriginal> {
    let upload_key = upload_key_from_reference(&state.settings.blob_endpoint, original_url);
    let bytes = state.blob_gateway.get(&upload_key).await?;

    let media_type = sniff_media_type(&bytes);
    let byte_size = bytes.len() as i64;
    let hash_hex = hex::encode(Sha256::digest(&bytes));

    let (original, was_new) = state.originals()?.upsert_or_increment(&hash_hex, media_type, byte_size, None, None).await?;

    if was_new {
        let canonical_key = original_storage_key(&hash_hex);
        state
            .blob_gateway
            .put(&canonical_key, bytes, media_type, "public, max-age=31536000, immutable")
            .await?;
    }

    if upload_key != original_storage_key(&hash_hex) {
        if let Err(delete_error) = state.blob_gateway.delete(&upload_key).await {
            warn!("🧹 [TEMP_UPLOAD_CLEANUP_FAILED]: {upload_key}: {delete_error}");
        }
    }

    Ok(AdmittedOriginal { original })
}

/// Extrae la clave de objeto de una referencia de subida: si ya es una
/// clave relativa (`uploads/...`) se usa tal cual; si es una URL absoluta
/// bajo el endpoint del object store, se recorta el prefijo y la query.
fn upload_key_from_reference(blob_endpoint: &str, reference: &str) -> String {
    let without_query = reference.split('?').next().unwrap_or(reference);
    let trimmed_endpoint = blob_endpoint.trim_end_matches('/');
    without_query.strip_prefix(trimmed_endpoint).map(|rest| rest.trim_start_matches('/').to_string()).unwrap_or_else(|| without_query.trim_start_matches('/').to_string())
}

/// Borra-suave una Image y libera su referencia en CAOS; compartida por
/// `DELETE /images/{id}` y la cascada de `DELETE /projects/{id}`.
pub(crate) async fn soft_delete_image_and_release(state: &AppState, image_id: &str) -> ApiResult<()> {
    let original_id = state.images()?.soft_delete(image_id).await?;

    if let Some(original_id) = original_id {
        match state.originals()?.release(&original_id).await {
            Ok(was_hard_deleted) if was_hard_deleted => {
                let key = original_storage_key(&original_id);
                if let Err(blob_error) = state.blob_gateway.delete(&key).await {
                    warn!("🧹 [ORPHAN_BLOB_DELETE_FAILED]: {key}: {blob_error}");
                }
            }
            Ok(_) => {}
            Err(release_error) => warn!("🧹 [CAOS_RELEASE_FAILED]: {original_id}: {release_error}"),
        }
    }

    Ok(())
}
