// [libs/domain/adapters/src/registry.rs]
use crate::adapters::{
    BlackForestLabsFluxKontextMaxAdapter, BlackForestLabsFluxKontextProAdapter,
    BytedanceSeedream3Adapter, BytedanceSeedream4Adapter, QwenImageEditAdapter,
};
use crate::{AdapterError, ModelAdapter};
use std::collections::HashMap;
use tracing::instrument;

/// Registro de adaptadores disponible al arranque del proceso worker/API.
/// No se admite registro dinámico en caliente: los cinco adaptadores
/// conocidos se insertan en `new()` y el conjunto es inmutable en runtime.
pub struct AdapterRegistry {
    adapters: HashMap<&'static str, Box<dyn ModelAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        let mut adapters: HashMap<&'static str, Box<dyn ModelAdapter>> = HashMap::new();
        for adapter in Self::known_adapters() {
            adapters.insert(adapter.id(), adapter);
        }
        Self { adapters }
    }

    fn known_adapters() -> Vec<Box<dyn ModelAdapter>> {
        vec![
            Box::new(QwenImageEditAdapter),
            Box::new(BlackForestLabsFluxKontextMaxAdapter),
            Box::new(BlackForestLabsFluxKontextProAdapter),
            Box::new(BytedanceSeedream3Adapter),
            Box::new(BytedanceSeedream4Adapter),
        ]
    }

    #[instrument(skip(self))]
    pub fn get(&self, model_id: &str) -> Result<&dyn ModelAdapter, AdapterError> {
        self.adapters
            .get(model_id)
            .map(|boxed| boxed.as_ref())
            .ok_or_else(|| AdapterError::UnknownModel(model_id.to_string()))
    }

    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<&'static str> = self.adapters.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_knows_all_five_spec_models() {
        let registry = AdapterRegistry::new();
        let mut ids = registry.ids();
        ids.sort_unstable();
        assert_eq!(
            ids,
            vec![
                "black-forest-labs/flux-kontext-max",
                "black-forest-labs/flux-kontext-pro",
                "bytedance/seedream-3",
                "bytedance/seedream-4",
                "qwen/qwen-image-edit",
            ]
        );
    }

    #[test]
    fn unknown_model_id_is_rejected() {
        let registry = AdapterRegistry::new();
        assert!(registry.get("unknown/model").is_err());
    }
}
