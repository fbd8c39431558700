// CV strength & weakness report prompt templates.

pub const REPORT_SYSTEM: &str =
    "You are an expert HR evaluator. Be analytical, structured, and precise.";

/// Report prompt template.
/// Replace: {grounding_instruction}, {language_instruction}, {job_description}, {cv_text}
pub const REPORT_PROMPT_TEMPLATE: &str = r#"You are a senior HR and Talent Acquisition expert.

Your task:
Compare the candidate CV with the Job Description and generate a structured evaluation report.

STRICT RULES:
{grounding_instruction}
- Be objective and analytical.
- Use bullet points.
{language_instruction}

=== JOB DESCRIPTION ===
{job_description}

=== CANDIDATE CV ===
{cv_text}

Generate the following structured report:

1. Overall Match Summary (short paragraph)

2. Strengths (Strong Alignment with Job)

3. Weaknesses / Gaps

4. Missing Keywords or Skills

5. Estimated Match Score (0–100%)
Explain briefly why.
"#;
