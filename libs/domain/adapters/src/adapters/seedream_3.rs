// [libs/domain/adapters/src/adapters/seedream_3.rs]
use crate::{resolve_config, resolve_seed, validate_against_schema, AdapterError, ModelAdapter, ModelAdapterRequest};
use realstage_core_models::{ConfigFieldSchema, ConfigFieldType};
use serde_json::{json, Value};

/// Adaptador para `bytedance/seedream-3`: primera generación Seedream,
/// soporta tamaños de salida fijos y un control de calidad de guía.
pub struct BytedanceSeedream3Adapter;

impl ModelAdapter for BytedanceSeedream3Adapter {
    fn id(&self) -> &'static str {
        "bytedance/seedream-3"
    }

    fn default_config(&self) -> Value {
        json!({
            "size": "1024x1024",
            "guidance_scale": 2.5,
        })
    }

    fn config_schema(&self) -> Vec<ConfigFieldSchema> {
        vec![
            ConfigFieldSchema {
                name: "size".to_string(),
                field_type: ConfigFieldType::String,
                default: json!("1024x1024"),
                description: "Output resolution.".to_string(),
                options: Some(vec!["1024x1024".to_string(), "1024x1792".to_string(), "1792x1024".to_string()]),
                min: None,
                max: None,
                required: false,
            },
            ConfigFieldSchema {
                name: "guidance_scale".to_string(),
                field_type: ConfigFieldType::Float,
                default: json!(2.5),
                description: "How strongly the output follows the prompt.".to_string(),
                options: None,
                min: Some(1.0),
                max: Some(5.0),
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
            "size": resolved["size"],
            "guidance_scale": resolved["guidance_scale"],
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
    fn invalid_size_is_rejected() {
        let adapter = BytedanceSeedream3Adapter;
        let override_value = json!({"size": "640x480"});
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
