//! Persona configuration types
//!
//! A persona is a named bundle of prompt, model, retrieval scope, and
//! guardrails selected per conversation. Personas are defined once at startup
//! and never mutated; every chat request looks one up by key.

use serde::{Deserialize, Serialize};

/// Immutable configuration for one persona
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Stable identifier (e.g. "medical")
    pub key: String,
    /// Human-readable name
    pub display_name: String,
    /// Base system prompt text (opaque configuration data)
    pub system_prompt: String,
    /// Guardrail flags
    #[serde(default)]
    pub guardrails: Guardrails,
    /// Names of tools this persona may call
    #[serde(default)]
    pub enabled_tools: Vec<String>,
    /// Retrieval scope
    pub retrieval: RetrievalSettings,
    /// Model reference
    pub model: ModelRef,
    /// Generation parameters
    pub generation: GenerationParams,
}

/// Disclaimer guardrail flags
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Guardrails {
    /// Responses must carry a medical disclaimer
    #[serde(default)]
    pub medical_disclaimer: bool,
    /// Responses must carry a financial disclaimer
    #[serde(default)]
    pub financial_disclaimer: bool,
    /// Responses must carry a legal disclaimer
    #[serde(default)]
    pub legal_disclaimer: bool,
}

/// Which collections a persona retrieves from, and how many results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalSettings {
    /// Collection names; may reference collections that do not exist yet,
    /// in which case retrieval degrades to empty results
    pub collections: Vec<String>,
    /// Number of results to retrieve
    pub top_k: usize,
}

/// Reference to a hosted model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRef {
    /// Provider identifier (e.g. "google")
    pub provider: String,
    /// Model name (e.g. "gemini-2.5-flash")
    pub name: String,
}

/// Per-persona generation parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum output tokens
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.4,
            max_output_tokens: 1200,
        }
    }
}
