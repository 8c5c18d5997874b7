//! Unsafe-content patterns, disclaimers, and refusal templates

use once_cell::sync::Lazy;
use regex::Regex;

/// Patterns whose presence in a generated response blocks delivery.
///
/// Scoped deliberately narrowly: they target directive emergency, medical,
/// and financial advice rather than mere mention of the topics, so ordinary
/// informational answers pass.
pub static UNSAFE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Medical emergencies
        r"(?i)call 911|call your local emergency|emergency number",
        r"(?i)go to (?:the )?(?:hospital|er|emergency room)",
        r"(?i)seek\s+(?:immediate|emergency)\s+medical\s+attention",
        r"(?i)suicide|self-harm|kill myself|end my life",
        r"(?i)overdose|poisoning|bleeding heavily",
        // Directive financial advice
        r"(?i)buy this stock|sell that|invest in|guaranteed return|sure thing",
        r"(?i)personal financial advice|your money|your investment",
        // Directive medical advice
        r"(?i)take this medication|prescribe|dosage|treatment plan",
        r"(?i)(?:start|stop) (?:medication|taking|dosage)",
        r"(?i)self-medicate|use leftover antibiotics|share prescriptions",
        // Generally inappropriate
        r"(?i)illegal|unlawful|harmful|dangerous",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap_or_else(|e| panic!("invalid unsafe pattern {p}: {e}")))
    .collect()
});

/// Question shapes that suggest the user expects grounded material
pub static CONTEXT_EXPECTED_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)what is",
        r"(?i)how does",
        r"(?i)explain",
        r"(?i)tell me about",
        r"(?i)describe",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap_or_else(|e| panic!("invalid context pattern {p}: {e}")))
    .collect()
});

/// Queries too thin to act on at all: single letters, bare greetings,
/// bare acknowledgments
pub static SPAM_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)^[a-z]$",
        r"(?i)^(hi|hello|hey)$",
        r"(?i)^(ok|okay|yes|no)$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap_or_else(|e| panic!("invalid spam pattern {p}: {e}")))
    .collect()
});

pub const MEDICAL_DISCLAIMER: &str = "\n\n⚠️ **Medical Disclaimer**: This \
information is for educational purposes only and should not be considered \
medical advice. Please consult with a qualified healthcare professional for \
medical concerns.";

pub const FINANCIAL_DISCLAIMER: &str = "\n\n⚠️ **Financial Disclaimer**: \
This information is for educational purposes only and should not be \
considered financial advice. Please consult with a qualified financial \
advisor for personal financial decisions.";

pub const LEGAL_DISCLAIMER: &str = "\n\n⚠️ **Legal Disclaimer**: This \
information is for educational purposes only and should not be considered \
legal advice. Please consult with a qualified attorney for personal legal \
matters.";

/// Per-persona refusal template. `{name}` is replaced with the persona's
/// display name.
pub fn refusal_template(key: &str) -> &'static str {
    match key {
        "general" => {
            "I can help with almost anything! Could you please provide a bit \
             more detail or context so I can assist you better?"
        }
        "education" => {
            "I'm {name}. Could you rephrase your question to be about \
             learning, studying, or academic topics? I'm here to help you \
             excel!"
        }
        "finance" => {
            "I'm {name}. I can help explain financial concepts and \
             education. Could you rephrase your question to be about \
             financial topics?"
        }
        "medical" => {
            "I'm {name}. I provide general health education. For urgent \
             medical concerns, please consult a healthcare professional \
             immediately. Otherwise, feel free to ask health-related \
             questions!"
        }
        _ => {
            "I'm {name} and I'm here to help! Could you provide more details \
             about what you'd like assistance with?"
        }
    }
}
