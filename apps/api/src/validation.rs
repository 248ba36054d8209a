// [apps/api/src/validation.rs]
/*!
 * =================================================================
 * APARATO: IMAGE CREATION VALIDATION (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION LAYER (ESTRATO L1-APP)
 * RESPONSABILIDAD: REGLAS DE FRONTERA PREVIAS A CUALQUIER ESCRITURA (§4.3)
 * =================================================================
 */

use realstage_core_models::image::CreateImageRequest;
use realstage_core_models::StagingError;

const PROMPT_MIN_LENGTH: usize = 10;
const PROMPT_MAX_LENGTH: usize = 2000;

pub fn validate_create_image_request(request: &CreateImageRequest) -> Result<(), StagingError> {
    if uuid::Uuid::parse_str(&request.project_id).is_err() {
        return Err(StagingError::ValidationFailed("project_id must be a valid UUID".to_string()));
    }

    if request.original_url.trim().is_empty() {
        return Err(StagingError::ValidationFailed("original_url must be non-empty".to_string()));
    }

    if let Some(prompt) = &request.prompt {
        let length = prompt.chars().count();
        if !(PROMPT_MIN_LENGTH..=PROMPT_MAX_LENGTH).contains(&length) {
            return Err(StagingError::ValidationFailed(format!(
                "prompt must be between {PROMPT_MIN_LENGTH} and {PROMPT_MAX_LENGTH} characters, got {length}"
            )));
        }
    }

    if let Some(seed) = request.seed {
        if seed == 0 {
            return Err(StagingError::ValidationFailed("seed must be in [1, 4294967295]".to_string()));
        }
    }

    Ok(())
}
