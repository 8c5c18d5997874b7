//! Domain relevance vocabulary
//!
//! Keyword and phrase lists used by the lenient domain check. Lists are
//! intentionally broad; the check only ever flags queries that match nothing
//! at all, and even then the flag is advisory.

/// Vocabulary for one domain: topical keywords plus common question phrasings
pub struct DomainProfile {
    pub key: &'static str,
    pub keywords: &'static [&'static str],
    pub phrases: &'static [&'static str],
}

/// Look up the vocabulary for a persona key
pub fn profile(key: &str) -> Option<&'static DomainProfile> {
    PROFILES.iter().find(|p| p.key == key)
}

pub static PROFILES: &[DomainProfile] = &[
    DomainProfile {
        key: "general",
        keywords: &["general", "help", "assist", "question", "information"],
        phrases: &[
            "can you", "how to", "what is", "tell me about", "explain",
            "help me", "i need", "give me", "show me", "define",
        ],
    },
    DomainProfile {
        key: "education",
        keywords: &[
            "education", "learning", "study", "academic", "school", "university",
            "course", "syllabus", "curriculum", "studies", "studying", "improve",
            "performance", "grades", "exam", "test", "assignment", "homework",
            "class", "lecture", "student", "teacher", "professor", "tutor",
            "learn", "understand", "practice", "knowledge", "skill",
            "improvement", "teaching", "revision", "notes", "textbook", "score",
        ],
        phrases: &[
            "how can i", "help me", "tell me", "explain", "understand",
            "better", "improve", "learn", "study", "topic", "teach",
            "practice", "remember", "prepare", "review", "tips",
            "strategy", "method", "technique", "comprehend",
        ],
    },
    DomainProfile {
        key: "finance",
        keywords: &[
            "finance", "financial", "money", "investment", "trading", "market",
            "economy", "budget", "savings",
        ],
        phrases: &[
            "money", "cost", "price", "worth", "value", "spend",
            "save", "invest", "budget", "payment", "expense",
            "income", "profit", "loss", "debt", "credit",
            "mortgage", "loan", "tax", "insurance",
        ],
    },
    DomainProfile {
        key: "medical",
        keywords: &[
            "medical", "health", "healthcare", "medicine", "symptom", "symptoms",
            "diagnosis", "treatment", "doctor", "patient", "disease", "illness",
            "sick", "sickness", "condition", "disorder", "syndrome", "infection",
            "virus", "bacteria", "pain", "ache", "hurt", "sore", "discomfort",
            "suffering", "fever", "cold", "flu", "cough", "headache", "stomach",
            "gastric", "intestinal", "digestive", "bowel", "nausea", "vomit",
            "diarrhea", "injury", "wound", "bleeding", "bruise", "fracture",
            "sprain", "strain", "trauma", "chronic", "acute", "severe", "mild",
            "moderate", "persistent", "recurring", "anxiety", "depression",
            "stress", "mental", "psychological", "emotional", "mood", "heart",
            "cardiac", "blood", "pressure", "diabetes", "cancer", "tumor",
            "respiratory", "lung", "allergy", "allergic", "asthma", "rash",
            "skin", "dermatology", "eczema", "psoriasis", "pregnancy",
            "pregnant", "prenatal", "postnatal", "maternal", "pediatric",
            "child", "baby", "infant", "vaccination", "vaccine", "immunization",
            "shot", "dose", "medication", "drug", "prescription", "pill",
            "therapy", "therapist", "counseling", "rehabilitation", "recovery",
            "healing", "cure", "hospital", "clinic", "emergency", "urgent",
            "care", "nurse", "physician", "specialist", "wellness", "wellbeing",
            "fitness", "nutrition", "diet", "exercise", "lifestyle",
            "preventive", "test", "screening", "examination", "checkup", "scan",
            "xray", "lab", "blood work", "problem", "issue", "concern", "worry",
            "question", "advice", "help", "what should i do",
        ],
        phrases: &[
            "health", "feel", "feeling", "pain", "symptoms", "symptom",
            "condition", "treatment", "medicine", "doctor", "hospital", "sick",
            "illness", "disease", "infection", "injury", "wellness", "diet",
            "exercise", "therapy", "care", "prevention", "healing", "suffering",
            "suffering from", "diagnosed with", "have been", "experiencing",
            "i am", "i have", "i feel", "what should i", "what can i",
            "how do i", "is it normal", "is this", "should i worry",
            "worried about", "concerned about", "tell me about", "explain",
            "what is", "why do i", "causes of", "remedies", "cure", "relief",
            "help with", "advice for", "tips for",
        ],
    },
    DomainProfile {
        key: "coding",
        keywords: &[
            "code", "coding", "program", "programming", "script", "function",
            "class", "method", "variable", "algorithm", "data structure",
            "debug", "bug", "error", "compile", "build", "deploy", "api",
            "database", "frontend", "backend", "server", "client", "framework",
            "library", "package", "module", "import", "python", "javascript",
            "java", "c++", "rust", "go", "typescript", "html", "css", "sql",
            "react", "node", "django", "flask", "spring", "git", "docker",
            "kubernetes", "aws", "azure", "devops", "write", "create",
            "develop", "implement", "fix", "solve", "optimize", "refactor",
            "test", "unit test", "integration", "architecture",
            "design pattern", "microservice", "rest", "linked list", "array",
            "tree", "graph", "stack", "queue", "hash", "sort", "search",
            "recursion",
        ],
        phrases: &[
            "write", "create", "build", "develop", "make", "implement",
            "fix", "debug", "solve", "code", "program", "script",
            "function", "algorithm", "help me", "how to", "can you",
            "show me", "example", "tutorial", "guide", "explain",
            "optimize", "refactor", "test", "review", "design",
        ],
    },
    DomainProfile {
        key: "technology",
        keywords: &[
            "technology", "tech", "software", "hardware", "digital", "computer",
            "system", "network", "cloud",
        ],
        phrases: &[
            "how does", "what is", "explain", "tell me about", "understand",
            "work", "use", "setup", "configure", "install", "deploy",
        ],
    },
    DomainProfile {
        key: "legal",
        keywords: &[
            "legal", "law", "regulation", "compliance", "rights", "contract",
            "attorney", "court", "justice",
        ],
        phrases: &[
            "rights", "law", "legal", "regulation", "contract", "agreement",
            "can i", "am i allowed", "is it legal", "what happens if",
        ],
    },
    DomainProfile {
        key: "creative",
        keywords: &[
            "creative", "creativity", "art", "artistic", "design", "write",
            "writing", "story", "poem", "poetry", "song", "lyrics", "music",
            "musical", "compose", "composition", "paint", "painting", "draw",
            "drawing", "create", "craft", "make", "imagine", "imagination",
            "inspire", "inspiration", "idea", "brainstorm", "novel", "fiction",
            "narrative", "character", "plot", "dialogue", "scene", "verse",
            "rhyme", "sketch", "illustration", "artwork", "handmade", "diy",
            "for my", "for her", "for him", "for someone", "gift", "present",
            "special", "romantic",
        ],
        phrases: &[
            "write", "create", "make", "design", "compose", "draw",
            "paint", "craft", "imagine", "generate", "inspire",
        ],
    },
    DomainProfile {
        key: "language",
        keywords: &[
            "language", "translate", "grammar", "vocabulary", "speak", "write",
            "read", "pronunciation", "fluent",
        ],
        phrases: &[
            "translate", "how do you say", "what does", "mean",
            "pronunciation", "grammar", "speak", "write", "read", "learn",
        ],
    },
    DomainProfile {
        key: "business",
        keywords: &[
            "business", "company", "startup", "entrepreneur", "market",
            "strategy", "customer", "sales", "revenue",
        ],
        phrases: &[
            "strategy", "plan", "grow", "market", "startup", "company",
            "business", "revenue", "customer", "competitor", "analysis",
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_profile_resolves_by_key() {
        for p in PROFILES {
            assert!(profile(p.key).is_some());
            assert!(!p.keywords.is_empty());
            assert!(!p.phrases.is_empty());
        }
        assert!(profile("astrology").is_none());
    }
}
