//! Augmented system prompt construction
//!
//! The system prompt sent to the model is the persona's base prompt, a
//! rendered context block built from the retrieval results, a citation
//! instruction when context is present, and guardrail reminders.

use std::fmt::Write;

use crate::types::chunk::RetrievalResult;
use crate::types::persona::PersonaConfig;

const CITATION_INSTRUCTION: &str = "When you use information from the \
context above, cite it as [Source N]. If the context does not cover the \
question, say so honestly instead of inventing an answer.";

const MEDICAL_REMINDER: &str = "Remember: you provide general health \
information only, never diagnosis or treatment advice. Direct users to a \
qualified clinician for personal medical concerns.";

const FINANCIAL_REMINDER: &str = "Remember: you provide financial education \
only, never personalised investment advice or recommendations to buy or \
sell specific securities.";

const LEGAL_REMINDER: &str = "Remember: you provide legal information only, \
never legal advice. Direct users to a qualified attorney for personal legal \
matters.";

#[derive(Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Render retrieval results into a numbered source block.
    /// Empty input renders nothing.
    pub fn build_context(&self, results: &[RetrievalResult]) -> String {
        let mut block = String::new();
        for (i, result) in results.iter().enumerate() {
            let title = result.title.as_deref().unwrap_or("Untitled");
            let _ = write!(block, "[Source {}] {}\n{}", i + 1, title, result.text);
            if let Some(url) = &result.url {
                let _ = write!(block, "\nURL: {url}");
            }
            block.push_str("\n\n");
        }
        block.trim_end().to_string()
    }

    /// Assemble the full system prompt for one chat turn
    pub fn build_system_prompt(
        &self,
        persona: &PersonaConfig,
        results: &[RetrievalResult],
    ) -> String {
        let mut prompt = persona.system_prompt.clone();

        if !results.is_empty() {
            prompt.push_str("\n\n## Relevant Context\n\n");
            prompt.push_str(&self.build_context(results));
            prompt.push_str("\n\n");
            prompt.push_str(CITATION_INSTRUCTION);
        }

        if persona.guardrails.medical_disclaimer {
            prompt.push_str("\n\n");
            prompt.push_str(MEDICAL_REMINDER);
        }
        if persona.guardrails.financial_disclaimer {
            prompt.push_str("\n\n");
            prompt.push_str(FINANCIAL_REMINDER);
        }
        if persona.guardrails.legal_disclaimer {
            prompt.push_str("\n\n");
            prompt.push_str(LEGAL_REMINDER);
        }

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::PersonaRegistry;
    use crate::types::chunk::RetrievalResult;

    fn result(title: Option<&str>, url: Option<&str>, text: &str) -> RetrievalResult {
        RetrievalResult {
            text: text.to_string(),
            doc_id: "doc-1".to_string(),
            title: title.map(str::to_string),
            url: url.map(str::to_string),
            score: 0.9,
            metadata: Default::default(),
        }
    }

    #[test]
    fn context_block_numbers_sources_and_includes_urls() {
        let builder = PromptBuilder::new();
        let block = builder.build_context(&[
            result(Some("Guide"), Some("https://example.com/guide"), "First."),
            result(None, None, "Second."),
        ]);
        assert!(block.contains("[Source 1] Guide\nFirst.\nURL: https://example.com/guide"));
        assert!(block.contains("[Source 2] Untitled\nSecond."));
    }

    #[test]
    fn prompt_without_context_omits_citation_instruction() {
        let registry = PersonaRegistry::builtin();
        let persona = registry.get("general").unwrap();
        let prompt = PromptBuilder::new().build_system_prompt(persona, &[]);
        assert!(prompt.starts_with(&persona.system_prompt));
        assert!(!prompt.contains("Relevant Context"));
        assert!(!prompt.contains("[Source N]"));
    }

    #[test]
    fn guardrail_reminders_follow_persona_flags() {
        let registry = PersonaRegistry::builtin();
        let builder = PromptBuilder::new();

        let medical = builder.build_system_prompt(registry.get("medical").unwrap(), &[]);
        assert!(medical.contains("general health information only"));
        assert!(!medical.contains("financial education"));

        let finance =
            builder.build_system_prompt(registry.get("finance").unwrap(), &[result(None, None, "x")]);
        assert!(finance.contains("financial education"));
        assert!(finance.contains("Relevant Context"));
        assert!(finance.contains("cite it as [Source N]"));
    }
}
