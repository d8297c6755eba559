//! Model registry - single source of truth for the selectable models

use serde::{Deserialize, Serialize};

/// One selectable model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelSpec {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub owned_by: String,
}

/// The completion provider and the closed set of models it serves
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSpec {
    pub name: String,
    pub display_name: String,
    pub env_key: String,
    pub default_api_base: String,
    pub default_model: String,
    pub models: Vec<ModelSpec>,
}

/// Registry of available models
pub struct ProviderRegistry {
    spec: ProviderSpec,
}

impl ProviderRegistry {
    /// Create a registry from the built-in model list
    pub fn new() -> Self {
        Self {
            spec: Self::default_spec(),
        }
    }

    /// Provider metadata
    pub fn spec(&self) -> &ProviderSpec {
        &self.spec
    }

    /// All models in selector order
    pub fn models(&self) -> &[ModelSpec] {
        &self.spec.models
    }

    /// Model ids in selector order
    pub fn model_ids(&self) -> Vec<&str> {
        self.spec.models.iter().map(|m| m.id.as_str()).collect()
    }

    /// Find a model by exact id. Ids are matched literally, no normalization.
    pub fn find_model(&self, id: &str) -> Option<&ModelSpec> {
        self.spec.models.iter().find(|m| m.id == id)
    }

    pub fn is_supported(&self, id: &str) -> bool {
        self.find_model(id).is_some()
    }

    pub fn default_model(&self) -> &str {
        &self.spec.default_model
    }

    fn default_spec() -> ProviderSpec {
        let yaml = include_str!("models.yaml");
        serde_yaml::from_str(yaml).expect("Failed to parse built-in model list")
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_models_in_selector_order() {
        let registry = ProviderRegistry::new();
        assert_eq!(
            registry.model_ids(),
            vec![
                "gemma2-9b-it",
                "llama3-groq-70b-8192-tool-use-preview",
                "llama-3.1-8b-instant",
                "lama3-groq-8b-8192-tool-use-preview",
            ]
        );
    }

    #[test]
    fn test_default_model_is_listed() {
        let registry = ProviderRegistry::new();
        assert_eq!(registry.default_model(), "gemma2-9b-it");
        assert!(registry.is_supported(registry.default_model()));
    }

    #[test]
    fn test_model_ids_match_literally() {
        let registry = ProviderRegistry::new();
        assert!(registry.is_supported("lama3-groq-8b-8192-tool-use-preview"));
        assert!(!registry.is_supported("llama3-groq-8b-8192-tool-use-preview"));
        assert!(!registry.is_supported("GEMMA2-9B-IT"));
    }

    #[test]
    fn test_provider_metadata() {
        let registry = ProviderRegistry::new();
        let spec = registry.spec();
        assert_eq!(spec.name, "groq");
        assert_eq!(spec.env_key, "GROQ_API_KEY");
        assert_eq!(spec.default_api_base, "https://api.groq.com/openai/v1");
    }
}
