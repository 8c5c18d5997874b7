//! Persona registry
//!
//! Personas are defined once at startup and exposed through a read-only
//! lookup. The built-in set mirrors the production configuration; deployments
//! may also construct a registry from their own persona list.

use std::collections::HashMap;

use crate::types::persona::{
    GenerationParams, Guardrails, ModelRef, PersonaConfig, RetrievalSettings,
};

mod builtin;

/// Read-only persona lookup, populated once at startup
pub struct PersonaRegistry {
    personas: HashMap<String, PersonaConfig>,
}

impl PersonaRegistry {
    /// Build a registry from an explicit persona list
    pub fn new(personas: Vec<PersonaConfig>) -> Self {
        let personas = personas
            .into_iter()
            .map(|p| (p.key.clone(), p))
            .collect();
        Self { personas }
    }

    /// Registry with the built-in persona set (general, education, finance,
    /// medical)
    pub fn builtin() -> Self {
        Self::new(builtin::personas())
    }

    /// Look up a persona by key
    pub fn get(&self, key: &str) -> Option<&PersonaConfig> {
        self.personas.get(key)
    }

    /// All configured personas
    pub fn all(&self) -> impl Iterator<Item = &PersonaConfig> {
        self.personas.values()
    }

    /// Number of configured personas
    pub fn len(&self) -> usize {
        self.personas.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}

/// Convenience constructor used by the built-in definitions
fn persona(
    key: &str,
    display_name: &str,
    system_prompt: &str,
    guardrails: Guardrails,
    enabled_tools: &[&str],
    collections: &[&str],
    top_k: usize,
    temperature: f32,
    max_output_tokens: u32,
) -> PersonaConfig {
    PersonaConfig {
        key: key.to_string(),
        display_name: display_name.to_string(),
        system_prompt: system_prompt.to_string(),
        guardrails,
        enabled_tools: enabled_tools.iter().map(|s| s.to_string()).collect(),
        retrieval: RetrievalSettings {
            collections: collections.iter().map(|s| s.to_string()).collect(),
            top_k,
        },
        model: ModelRef {
            provider: "google".to_string(),
            name: "gemini-2.5-flash".to_string(),
        },
        generation: GenerationParams {
            temperature,
            max_output_tokens,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_has_expected_personas() {
        let registry = PersonaRegistry::builtin();
        assert_eq!(registry.len(), 4);
        for key in ["general", "education", "finance", "medical"] {
            assert!(registry.get(key).is_some(), "missing persona {}", key);
        }
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn guardrails_match_domains() {
        let registry = PersonaRegistry::builtin();
        assert!(registry.get("medical").unwrap().guardrails.medical_disclaimer);
        assert!(registry.get("finance").unwrap().guardrails.financial_disclaimer);
        assert!(!registry.get("general").unwrap().guardrails.medical_disclaimer);
    }

    #[test]
    fn retrieval_scopes_are_per_persona() {
        let registry = PersonaRegistry::builtin();
        let education = registry.get("education").unwrap();
        assert!(education
            .retrieval
            .collections
            .contains(&"edu_faq".to_string()));
        assert_eq!(education.retrieval.top_k, 6);
    }
}
