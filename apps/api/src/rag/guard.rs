//! Prompt-injection guard for user questions.
//!
//! A phrase blocklist checked before any retrieval or LLM call. The answer prompt also
//! instructs the model to refuse override attempts; this catches the blatant ones cheaply.

pub const SUSPICIOUS_PATTERNS: [&str; 5] = [
    "ignore previous instructions",
    "disregard",
    "override",
    "instead do",
    "just output",
];

pub const REFUSAL: &str = "The question contains instructions unrelated to the CV context.";

pub fn is_suspicious(query: &str) -> bool {
    let lowered = query.to_lowercase();
    SUSPICIOUS_PATTERNS.iter().any(|p| lowered.contains(p))
}
