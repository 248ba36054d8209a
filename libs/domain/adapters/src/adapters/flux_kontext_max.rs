// [libs/domain/adapters/src/adapters/flux_kontext_max.rs]
use crate::{resolve_config, resolve_seed, validate_against_schema, AdapterError, ModelAdapter, ModelAdapterRequest};
use realstage_core_models::{ConfigFieldSchema, ConfigFieldType};
use serde_json::{json, Value};

/// Adaptador para `black-forest-labs/flux-kontext-max`: variante de mayor
/// fidelidad del modelo Flux Kontext, con un costo por predicción más alto.
pub struct BlackForestLabsFluxKontextMaxAdapter;

impl ModelAdapter for BlackForestLabsFluxKontextMaxAdapter {
    fn id(&self) -> &'static str {
        "black-forest-labs/flux-kontext-max"
    }

    fn default_config(&self) -> Value {
        json!({
            "aspect_ratio": "match_input_image",
            "output_format": "png",
            "safety_tolerance": 2,
        })
    }

    fn config_schema(&self) -> Vec<ConfigFieldSchema> {
        vec![
            ConfigFieldSchema {
                name: "aspect_ratio".to_string(),
                field_type: ConfigFieldType::String,
                default: json!("match_input_image"),
                description: "Output aspect ratio, or match the input image.".to_string(),
                options: Some(vec![
                    "match_input_image".to_string(),
                    "1:1".to_string(),
                    "16:9".to_string(),
                    "4:3".to_string(),
                ]),
                min: None,
                max: None,
                required: false,
            },
            ConfigFieldSchema {
                name: "output_format".to_string(),
                field_type: ConfigFieldType::String,
                default: json!("png"),
                description: "Encoding of the produced image.".to_string(),
                options: Some(vec!["png".to_string(), "jpg".to_string(), "webp".to_string()]),
                min: None,
                max: None,
                required: false,
            },
            ConfigFieldSchema {
                name: "safety_tolerance".to_string(),
                field_type: ConfigFieldType::Int,
                default: json!(2),
                description: "Content safety strictness, 1 (strictest) to 6.".to_string(),
                options: None,
                min: Some(1.0),
                max: Some(6.0),
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
            "input_image": request.image_data_url,
            "prompt": request.prompt,
            "aspect_ratio": resolved["aspect_ratio"],
            "output_format": resolved["output_format"],
            "safety_tolerance": resolved["safety_tolerance"],
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
    fn stored_config_overlay_is_respected() {
        let adapter = BlackForestLabsFluxKontextMaxAdapter;
        let stored = json!({"output_format": "webp"});
        let request = ModelAdapterRequest {
            image_data_url: "data:image/png;base64,abc",
            prompt: "Stage the room.",
            requested_seed: None,
            request_override_config: None,
            stored_config: Some(&stored),
        };
        let input = adapter.build_input(&request).unwrap();
        assert_eq!(input["output_format"], "webp");
    }

    #[test]
    fn unknown_aspect_ratio_is_rejected() {
        let adapter = BlackForestLabsFluxKontextMaxAdapter;
        let override_value = json!({"aspect_ratio": "21:9"});
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
