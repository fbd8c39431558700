// CV ingestion LLM prompt templates.

/// System prompt for structural CV parsing. Enforces JSON-only output.
pub const CV_PARSE_SYSTEM: &str = "\
You are a precise CV parser. \
You MUST respond with valid JSON only, no markdown fences, no explanations. \
Copy section text verbatim; never summarize or invent content.";

/// Structural chunking prompt. Replace `{cv_text}` before sending.
pub const CV_PARSE_PROMPT: &str = r#"You are an expert CV parser.

Read the CV below and do two things:
1. Extract the candidate's full name.
2. Split the CV into its logical sections. Each section should have:
   - A short descriptive title (e.g. "Education", "Work Experience", "Skills", "Projects", "Summary", or whatever the CV actually contains).
   - The full text content of that section, exactly as it appears.

Important rules:
- Do NOT skip any section, even if it has an unusual name.
- Do NOT invent or summarize content. Copy the text as-is.
- Every part of the CV must belong to exactly one section.

Respond ONLY with valid JSON. No markdown, no code fences, no extra text:
{
  "candidate_name": "Full Name Here",
  "sections": [
    {"section_title": "Summary", "content": "...full text of this section..."},
    {"section_title": "Education", "content": "...full text of this section..."},
    {"section_title": "Work Experience", "content": "...full text of this section..."}
  ]
}

CV Text:
{cv_text}
"#;
