// [libs/domain/adapters/src/lib.rs]
/*!
 * =================================================================
 * APARATO: MODEL ADAPTER REGISTRY (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: DESPACHO POLIMÓRFICO HACIA PROVEEDORES GENERATIVOS
 *
 * VISION HOLÍSTICA:
 * Desacopla al Staging Worker de cualquier proveedor-modelo concreto.
 * Cada ModelAdapter se registra bajo un identificador de cadena estable
 * y expone su propio esquema de configuración tunable para el surface
 * de administración. La resolución de configuración sigue el orden:
 * override de la solicitud > fila ModelConfig persistida > valores
 * por defecto compilados en el adaptador.
 * =================================================================
 */

mod adapters;
mod errors;
mod registry;

pub use adapters::{
    BlackForestLabsFluxKontextMaxAdapter, BlackForestLabsFluxKontextProAdapter,
    BytedanceSeedream3Adapter, BytedanceSeedream4Adapter, QwenImageEditAdapter,
};
pub use errors::AdapterError;
pub use registry::AdapterRegistry;

use realstage_core_models::ConfigFieldSchema;
use serde_json::Value;

/// Parámetros de entrada, independientes de proveedor, que el Staging
/// Worker pasa a `ModelAdapter::build_input` (spec §4.6, §4.7 paso 5).
#[derive(Debug, Clone)]
pub struct ModelAdapterRequest<'a> {
    pub image_data_url: &'a str,
    pub prompt: &'a str,
    pub requested_seed: Option<u32>,
    /// Override enviado en el cuerpo de la solicitud HTTP, si alguno.
    pub request_override_config: Option<&'a Value>,
    /// Fila `ModelConfig` persistida para este modelo, si ya fue sembrada.
    pub stored_config: Option<&'a Value>,
}

/// Contrato implementado por cada proveedor-modelo soportado.
pub trait ModelAdapter: Send + Sync {
    /// Identificador estable bajo el cual se registra el adaptador
    /// (p. ej. "qwen/qwen-image-edit").
    fn id(&self) -> &'static str;

    /// Configuración por defecto compilada en el adaptador; última
    /// prioridad en la cadena de resolución.
    fn default_config(&self) -> Value;

    /// Esquema de campos tunables, usado por el surface de administración
    /// para renderizar un formulario (spec §4.6).
    fn config_schema(&self) -> Vec<ConfigFieldSchema>;

    /// Valida límites y pertenencia a enumeraciones de la configuración
    /// resuelta; se invoca tanto en escritura (admin update) como en
    /// tiempo de construcción (spec §4.6).
    fn validate(&self, resolved_config: &Value) -> Result<(), AdapterError>;

    /// Traduce la solicitud independiente de proveedor al diccionario de
    /// parámetros específico del modelo.
    fn build_input(&self, request: &ModelAdapterRequest<'_>) -> Result<Value, AdapterError>;
}

/// Mezcla la configuración resuelta siguiendo el orden de precedencia
/// override > stored > default; cada nivel sobrescribe únicamente las
/// llaves que define, preservando las del nivel inferior.
pub fn resolve_config(default: &Value, stored: Option<&Value>, override_value: Option<&Value>) -> Value {
    let mut resolved = default.clone();
    if let Some(stored) = stored {
        merge_object_into(&mut resolved, stored);
    }
    if let Some(override_value) = override_value {
        merge_object_into(&mut resolved, override_value);
    }
    resolved
}

fn merge_object_into(base: &mut Value, overlay: &Value) {
    let (Value::Object(base_map), Value::Object(overlay_map)) = (base, overlay) else {
        return;
    };
    for (key, value) in overlay_map {
        base_map.insert(key.clone(), value.clone());
    }
}

/// Valida una configuración resuelta contra el esquema declarado por un
/// adaptador: pertenencia a `options`, y límites `min`/`max` para los
/// campos numéricos. Compartida por los cinco adaptadores para evitar
/// reimplementar la misma lógica de frontera cinco veces.
pub fn validate_against_schema(schema: &[ConfigFieldSchema], config: &Value) -> Result<(), AdapterError> {
    for field in schema {
        let Some(value) = config.get(&field.name) else {
            if field.required {
                return Err(AdapterError::ValidationFailed(format!("missing required field: {}", field.name)));
            }
            continue;
        };

        if let Some(options) = &field.options {
            let as_str = value.as_str().ok_or_else(|| {
                AdapterError::ValidationFailed(format!("field {} must be a string", field.name))
            })?;
            if !options.iter().any(|opt| opt == as_str) {
                return Err(AdapterError::ValidationFailed(format!(
                    "field {} value {as_str} is not one of {options:?}"
                )));
            }
        }

        if field.min.is_some() || field.max.is_some() {
            let as_number = value.as_f64().ok_or_else(|| {
                AdapterError::ValidationFailed(format!("field {} must be numeric", field.name))
            })?;
            if let Some(min) = field.min {
                if as_number < min {
                    return Err(AdapterError::ValidationFailed(format!(
                        "field {} value {as_number} is below minimum {min}"
                    )));
                }
            }
            if let Some(max) = field.max {
                if as_number > max {
                    return Err(AdapterError::ValidationFailed(format!(
                        "field {} value {as_number} exceeds maximum {max}"
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Extrae el seed efectivo aplicando la precedencia de spec §4.6: un seed
/// presente en la configuración resuelta ("seed" key) prevalece sobre el
/// de la solicitud, habilitando pruebas A/B reproducibles.
pub fn resolve_seed(resolved_config: &Value, requested_seed: Option<u32>) -> Option<u32> {
    resolved_config
        .get("seed")
        .and_then(Value::as_u64)
        .and_then(|s| u32::try_from(s).ok())
        .or(requested_seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolve_config_layers_override_over_stored_over_default() {
        let default = json!({"guidance_scale": 2.5, "steps": 30});
        let stored = json!({"steps": 40});
        let override_value = json!({"guidance_scale": 4.0});
        let resolved = resolve_config(&default, Some(&stored), Some(&override_value));
        assert_eq!(resolved["guidance_scale"], 4.0);
        assert_eq!(resolved["steps"], 40);
    }

    #[test]
    fn resolve_config_with_no_overlays_returns_defaults_untouched() {
        let default = json!({"steps": 30});
        let resolved = resolve_config(&default, None, None);
        assert_eq!(resolved, default);
    }

    #[test]
    fn resolved_config_seed_overrides_requested_seed() {
        let resolved = json!({"seed": 777});
        assert_eq!(resolve_seed(&resolved, Some(42)), Some(777));
    }

    #[test]
    fn requested_seed_is_used_when_config_has_none() {
        let resolved = json!({"steps": 30});
        assert_eq!(resolve_seed(&resolved, Some(42)), Some(42));
    }
}
