// [libs/domain/adapters/src/adapters/qwen_image_edit.rs]
use crate::{resolve_config, resolve_seed, validate_against_schema, AdapterError, ModelAdapter, ModelAdapterRequest};
use realstage_core_models::{ConfigFieldSchema, ConfigFieldType};
use serde_json::{json, Value};

/// Adaptador para `qwen/qwen-image-edit`: modelo de edición de imagen
/// guiada por instrucción, tunable por escala de guía e intensidad.
pub struct QwenImageEditAdapter;

impl ModelAdapter for QwenImageEditAdapter {
    fn id(&self) -> &'static str {
        "qwen/qwen-image-edit"
    }

    fn default_config(&self) -> Value {
        json!({
            "guidance_scale": 4.0,
            "num_inference_steps": 30,
            "strength": 0.85,
        })
    }

    fn config_schema(&self) -> Vec<ConfigFieldSchema> {
        vec![
            ConfigFieldSchema {
                name: "guidance_scale".to_string(),
                field_type: ConfigFieldType::Float,
                default: json!(4.0),
                description: "How strongly the output follows the prompt.".to_string(),
                options: None,
                min: Some(1.0),
                max: Some(10.0),
                required: false,
            },
            ConfigFieldSchema {
                name: "num_inference_steps".to_string(),
                field_type: ConfigFieldType::Int,
                default: json!(30),
                description: "Number of denoising steps.".to_string(),
                options: None,
                min: Some(10.0),
                max: Some(60.0),
                required: false,
            },
            ConfigFieldSchema {
                name: "strength".to_string(),
                field_type: ConfigFieldType::Float,
                default: json!(0.85),
                description: "How much of the original image is preserved.".to_string(),
                options: None,
                min: Some(0.1),
                max: Some(1.0),
                required: false,
            },
        ]
    }

    fn validate(&self, resolved_config: &Value) -> Result<(), AdapterError> {
        validate_against_schema(&self.config_schema(), resolved_config)
    }

    fn build_input(&self, request: &ModelAdapterRequest<'_>) -> Result<Value, AdapterError> {
        let resolved = resolve_config(&self.default_config(), request.stored_config, request.request_override_config);
        self.validate(&resolved)?;
        let seed = resolve_seed(&resolved, request.requested_seed);

        let mut input = json!({
            "image": request.image_data_url,
            "prompt": request.prompt,
            "guidance_scale": resolved["guidance_scale"],
            "num_inference_steps": resolved["num_inference_steps"],
            "strength": resolved["strength"],
        });
        if let Some(seed) = seed {
            input["seed"] = json!(seed);
        }
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_input_includes_prompt_and_image_data_url() {
        let adapter = QwenImageEditAdapter;
        let request = ModelAdapterRequest {
            image_data_url: "data:image/png;base64,abc",
            prompt: "Stage the room.",
            requested_seed: None,
            request_override_config: None,
            stored_config: None,
        };
        let input = adapter.build_input(&request).unwrap();
        assert_eq!(input["image"], "data:image/png;base64,abc");
        assert_eq!(input["prompt"], "Stage the room.");
        assert_eq!(input["guidance_scale"], 4.0);
    }

    #[test]
    fn out_of_range_override_is_rejected() {
        let adapter = QwenImageEditAdapter;
        let override_value = json!({"guidance_scale": 99.0});
        let request = ModelAdapterRequest {
            image_data_url: "data:image/png;base64,abc",
            prompt: "Stage the room.",
            requested_seed: None,
            request_override_config: Some(&override_value),
            stored_config: None,
        };
        assert!(adapter.build_input(&request).is_err());
    }
}
