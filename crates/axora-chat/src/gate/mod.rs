//! Output safety gate
//!
//! Every generated response passes through a three-stage check before it is
//! shown to the user: a lenient domain-relevance check (advisory only), an
//! unsafe-content pattern scan (blocking), and a disclaimer requirement check
//! (annotating). Each call is independent; the gate holds no per-request
//! state.

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::Result;
use crate::types::chunk::RetrievalResult;
use crate::types::persona::PersonaConfig;

pub mod domains;
pub mod patterns;

/// What the caller should do with a gated response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    Refuse,
    Regenerate,
    AddDisclaimer,
}

/// Public outcome of a gate check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputGateResult {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<SuggestedAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_response: Option<String>,
}

impl OutputGateResult {
    fn refuse(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
            suggested_action: Some(SuggestedAction::Refuse),
            modified_response: None,
        }
    }

    fn allow(reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: Some(reason.into()),
            suggested_action: None,
            modified_response: None,
        }
    }
}

/// Internal evaluation carried between the stages and logged for diagnostics
#[derive(Debug, Clone)]
pub struct SafetyCheck {
    pub is_out_of_domain: bool,
    pub contains_unsafe_content: bool,
    pub needs_disclaimer: bool,
    /// Diagnostic score in [0, 1]; logged but never gates the decision
    pub confidence: f32,
    pub details: Vec<String>,
}

#[derive(Default)]
pub struct OutputGateService;

impl OutputGateService {
    pub fn new() -> Self {
        Self
    }

    /// Run the full gate pipeline on a generated response.
    ///
    /// Never returns an error: an evaluation failure is treated as a refusal
    /// so an unchecked response can never reach the user.
    pub fn check_response(
        &self,
        persona: &PersonaConfig,
        user_query: &str,
        response: &str,
        retrieval_results: &[RetrievalResult],
    ) -> OutputGateResult {
        info!(
            persona = %persona.key,
            response_len = response.len(),
            has_context = !retrieval_results.is_empty(),
            "running output gate checks"
        );

        let evaluation = self.evaluate(persona, user_query, response, retrieval_results);
        self.decide(persona, user_query, response, retrieval_results, evaluation)
    }

    /// Turn an evaluation into the final verdict. Factored out so the
    /// fail-closed path is reachable directly.
    fn decide(
        &self,
        persona: &PersonaConfig,
        user_query: &str,
        response: &str,
        retrieval_results: &[RetrievalResult],
        evaluation: Result<SafetyCheck>,
    ) -> OutputGateResult {
        let check = match evaluation {
            Ok(check) => check,
            Err(err) => {
                error!(persona = %persona.key, error = %err, "output gate check failed");
                return OutputGateResult::refuse("Safety check failed due to technical error");
            }
        };

        info!(
            persona = %persona.key,
            confidence = check.confidence,
            details = ?check.details,
            "output gate evaluation"
        );

        // Domain mismatch is advisory: trust the user's persona selection
        // and keep going.
        if check.is_out_of_domain {
            warn!(
                persona = %persona.key,
                query = user_query,
                "domain mismatch detected, allowing under lenient policy"
            );
        }

        if check.contains_unsafe_content {
            return OutputGateResult::refuse("Response contains potentially unsafe content");
        }

        if check.needs_disclaimer {
            let modified = self.add_disclaimers(persona, response);
            return OutputGateResult {
                allowed: true,
                reason: Some("Response needs disclaimer".to_string()),
                suggested_action: Some(SuggestedAction::AddDisclaimer),
                modified_response: Some(modified),
            };
        }

        if retrieval_results.is_empty() && self.requires_context(persona, user_query) {
            info!(persona = %persona.key, "missing retrieval context but proceeding");
        }

        OutputGateResult::allow("Response passed all safety checks")
    }

    fn evaluate(
        &self,
        persona: &PersonaConfig,
        user_query: &str,
        response: &str,
        retrieval_results: &[RetrievalResult],
    ) -> Result<SafetyCheck> {
        let mut details = Vec::new();
        let mut confidence: f32 = 1.0;

        let is_out_of_domain = match self.check_domain_relevance(persona, user_query, response) {
            Relevance::Relevant => false,
            Relevance::NotRelevant(reason) => {
                details.push(format!(
                    "content not relevant to {} domain: {}",
                    persona.key, reason
                ));
                confidence -= 0.3;
                true
            }
        };

        let matched: Vec<&str> = patterns::UNSAFE_PATTERNS
            .iter()
            .filter(|p| p.is_match(response))
            .map(|p| p.as_str())
            .collect();
        let contains_unsafe_content = !matched.is_empty();
        if contains_unsafe_content {
            details.push(format!("unsafe content detected: {}", matched.join(", ")));
            confidence -= 0.5;
        }

        let needs_disclaimer = self.needs_disclaimer(persona, response);
        if needs_disclaimer {
            details.push("disclaimer required for this content".to_string());
        }

        if retrieval_results.is_empty() {
            confidence -= 0.2;
            details.push("no retrieval context available".to_string());
        } else {
            let avg = retrieval_results.iter().map(|r| r.score).sum::<f32>()
                / retrieval_results.len() as f32;
            if avg < 0.7 {
                confidence -= 0.1;
                details.push("low retrieval confidence".to_string());
            }
        }

        Ok(SafetyCheck {
            is_out_of_domain,
            contains_unsafe_content,
            needs_disclaimer,
            confidence: confidence.max(0.0),
            details,
        })
    }

    /// Stage 1. Deliberately lenient: the user picked this persona, so nearly
    /// everything counts as relevant. Only spam-shaped queries are flagged,
    /// and even those are not blocked by the caller.
    fn check_domain_relevance(
        &self,
        persona: &PersonaConfig,
        user_query: &str,
        response: &str,
    ) -> Relevance {
        if persona.key == "general" {
            return Relevance::Relevant;
        }

        let query = user_query.to_lowercase();
        if let Some(profile) = domains::profile(&persona.key) {
            if profile.keywords.iter().any(|k| query.contains(k))
                || profile.phrases.iter().any(|p| query.contains(p))
            {
                return Relevance::Relevant;
            }
            if !response.trim().is_empty() {
                let resp = response.to_lowercase();
                if profile.keywords.iter().any(|k| resp.contains(k))
                    || profile.phrases.iter().any(|p| resp.contains(p))
                {
                    return Relevance::Relevant;
                }
            }
        }

        if GENERIC_QUESTION_OPENERS
            .iter()
            .any(|w| query.starts_with(w))
            || GENERIC_REQUEST_WORDS.iter().any(|w| query.contains(w))
        {
            return Relevance::Relevant;
        }

        if query.contains('?') || query.unicode_words().count() > 2 {
            return Relevance::Relevant;
        }

        if patterns::SPAM_PATTERNS
            .iter()
            .any(|p| p.is_match(query.trim()))
        {
            return Relevance::NotRelevant("query appears to be too brief or unclear".to_string());
        }

        Relevance::Relevant
    }

    /// Stage 3 predicate: persona guardrails, or topical mentions in the
    /// response text itself.
    fn needs_disclaimer(&self, persona: &PersonaConfig, response: &str) -> bool {
        let resp = response.to_lowercase();
        persona.guardrails.medical_disclaimer
            || persona.guardrails.financial_disclaimer
            || persona.guardrails.legal_disclaimer
            || resp.contains("medical")
            || resp.contains("health")
            || resp.contains("investment")
            || resp.contains("financial")
    }

    /// Append the disclaimers the persona's guardrails call for. A response
    /// flagged only by topical mention gets the matching topical disclaimer.
    /// Idempotent: a disclaimer already present is not appended again.
    fn add_disclaimers(&self, persona: &PersonaConfig, response: &str) -> String {
        let resp = response.to_lowercase();
        let mut modified = response.to_string();

        if (persona.guardrails.medical_disclaimer
            || resp.contains("medical")
            || resp.contains("health"))
            && !modified.contains(patterns::MEDICAL_DISCLAIMER.trim_start())
        {
            modified.push_str(patterns::MEDICAL_DISCLAIMER);
        }
        if (persona.guardrails.financial_disclaimer
            || resp.contains("investment")
            || resp.contains("financial"))
            && !modified.contains(patterns::FINANCIAL_DISCLAIMER.trim_start())
        {
            modified.push_str(patterns::FINANCIAL_DISCLAIMER);
        }
        if persona.guardrails.legal_disclaimer
            && !modified.contains(patterns::LEGAL_DISCLAIMER.trim_start())
        {
            modified.push_str(patterns::LEGAL_DISCLAIMER);
        }

        modified
    }

    /// Whether the query's shape suggests the user expects grounded material.
    /// Logged only; missing context never blocks.
    fn requires_context(&self, persona: &PersonaConfig, user_query: &str) -> bool {
        if persona.key == "general" {
            return false;
        }
        patterns::CONTEXT_EXPECTED_PATTERNS
            .iter()
            .any(|p| p.is_match(user_query))
    }

    /// Persona-flavored message shown in place of a refused response
    pub fn refusal_message(&self, persona: &PersonaConfig) -> String {
        patterns::refusal_template(&persona.key).replace("{name}", &persona.display_name)
    }
}

enum Relevance {
    Relevant,
    NotRelevant(String),
}

const GENERIC_QUESTION_OPENERS: &[&str] = &[
    "what", "how", "why", "when", "where", "who", "can", "should", "could", "would", "will", "do",
    "does", "is", "are",
];

const GENERIC_REQUEST_WORDS: &[&str] = &[
    "tell me", "explain", "help", "advice", "guide", "tips", "show", "give", "create", "make",
    "write", "build", "more information", "learn about", "understand", "solve", "fix", "debug",
    "develop", "design",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::persona::PersonaRegistry;

    fn registry() -> PersonaRegistry {
        PersonaRegistry::builtin()
    }

    fn context(score: f32) -> Vec<RetrievalResult> {
        vec![RetrievalResult {
            text: "Spaced repetition improves retention.".to_string(),
            doc_id: "doc-1".to_string(),
            title: Some("Study guide".to_string()),
            url: None,
            score,
            metadata: Default::default(),
        }]
    }

    #[test]
    fn clean_on_domain_response_is_allowed_unmodified() {
        let registry = registry();
        let persona = registry.get("education").unwrap();
        let gate = OutputGateService::new();

        let result = gate.check_response(
            persona,
            "How can I study more effectively for my exams?",
            "Try spacing your revision sessions and testing yourself often.",
            &context(0.9),
        );
        assert!(result.allowed);
        assert!(result.suggested_action.is_none());
        assert!(result.modified_response.is_none());
    }

    #[test]
    fn unsafe_response_is_refused() {
        let registry = registry();
        let persona = registry.get("education").unwrap();
        let gate = OutputGateService::new();

        let result = gate.check_response(
            persona,
            "What should I do about my grades?",
            "You should call 911 and also invest in this sure thing.",
            &context(0.9),
        );
        assert!(!result.allowed);
        assert_eq!(result.suggested_action, Some(SuggestedAction::Refuse));
    }

    #[test]
    fn medical_persona_response_gets_disclaimer() {
        let registry = registry();
        let persona = registry.get("medical").unwrap();
        let gate = OutputGateService::new();

        let result = gate.check_response(
            persona,
            "What helps with a mild headache?",
            "Rest and hydration often help with mild headaches.",
            &context(0.8),
        );
        assert!(result.allowed);
        assert_eq!(result.suggested_action, Some(SuggestedAction::AddDisclaimer));
        let modified = result.modified_response.unwrap();
        assert!(modified.contains("Medical Disclaimer"));
        assert!(!modified.contains("Financial Disclaimer"));
    }

    #[test]
    fn finance_disclaimer_is_appended_after_the_answer() {
        let registry = registry();
        let persona = registry.get("finance").unwrap();
        let gate = OutputGateService::new();

        let response = "Index funds spread risk across many holdings.";
        let finance_context = vec![RetrievalResult {
            text: "Index funds track a market benchmark at low cost.".to_string(),
            doc_id: "doc-2".to_string(),
            title: Some("Investing basics".to_string()),
            url: None,
            score: 0.85,
            metadata: Default::default(),
        }];
        let result = gate.check_response(
            persona,
            "What is an index fund?",
            response,
            &finance_context,
        );

        assert!(result.allowed);
        assert_eq!(result.suggested_action, Some(SuggestedAction::AddDisclaimer));
        let modified = result.modified_response.unwrap();
        // The original text keeps the lead, the notice trails it
        assert!(modified.starts_with(response));
        assert!(modified.ends_with(patterns::FINANCIAL_DISCLAIMER));
        assert!(!modified.contains("Medical Disclaimer"));
    }

    #[test]
    fn disclaimer_injection_is_idempotent() {
        let registry = registry();
        let persona = registry.get("medical").unwrap();
        let gate = OutputGateService::new();
        let query = "What helps with a mild headache?";

        let first = gate
            .check_response(persona, query, "Rest and hydration often help.", &[])
            .modified_response
            .unwrap();
        let second = gate
            .check_response(persona, query, &first, &[])
            .modified_response
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(second.matches("Medical Disclaimer").count(), 1);
    }

    #[test]
    fn topical_mention_triggers_disclaimer_on_unguarded_persona() {
        let registry = registry();
        let persona = registry.get("education").unwrap();
        let gate = OutputGateService::new();

        let result = gate.check_response(
            persona,
            "Should I take a gap year?",
            "Consider the financial impact of a gap year on your studies.",
            &[],
        );
        assert!(result.allowed);
        let modified = result.modified_response.unwrap();
        assert!(modified.contains("Financial Disclaimer"));
    }

    #[test]
    fn unsafe_scan_takes_precedence_over_disclaimer() {
        let registry = registry();
        let persona = registry.get("medical").unwrap();
        let gate = OutputGateService::new();

        let result = gate.check_response(
            persona,
            "I have a headache, what should I do?",
            "Take this medication twice a day; the dosage is on the label.",
            &context(0.8),
        );
        assert!(!result.allowed);
        assert_eq!(result.suggested_action, Some(SuggestedAction::Refuse));
    }

    #[test]
    fn domain_mismatch_never_blocks() {
        let registry = registry();
        let persona = registry.get("finance").unwrap();
        let gate = OutputGateService::new();

        // Bare greeting trips the spam check in stage 1, but the verdict
        // still allows the response through.
        let result = gate.check_response(persona, "hi", "Hello! How can I help?", &[]);
        assert!(result.allowed);
    }

    #[test]
    fn evaluation_failure_fails_closed() {
        let registry = registry();
        let persona = registry.get("general").unwrap();
        let gate = OutputGateService::new();

        let result = gate.decide(
            persona,
            "anything",
            "anything",
            &[],
            Err(Error::internal("evaluation blew up")),
        );
        assert!(!result.allowed);
        assert_eq!(result.suggested_action, Some(SuggestedAction::Refuse));
    }

    #[test]
    fn confidence_accumulates_penalties() {
        let registry = registry();
        let persona = registry.get("finance").unwrap();
        let gate = OutputGateService::new();

        let check = gate
            .evaluate(persona, "hi", "If that happens, call 911 right away.", &[])
            .unwrap();
        assert!(check.is_out_of_domain);
        assert!(check.contains_unsafe_content);
        // 1.0 - 0.3 (domain) - 0.5 (unsafe) - 0.2 (no context)
        assert!(check.confidence.abs() < 1e-6);
    }

    #[test]
    fn refusal_message_uses_display_name() {
        let registry = registry();
        let persona = registry.get("finance").unwrap();
        let gate = OutputGateService::new();
        let message = gate.refusal_message(persona);
        assert!(message.contains(&persona.display_name));
    }
}
