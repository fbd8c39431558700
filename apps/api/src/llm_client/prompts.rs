// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Instruction appended to every prompt that answers from CV material.
pub const GROUNDING_INSTRUCTION: &str = "\
- Only use facts explicitly stated in the CV material provided.
- Do NOT invent or infer experience that is not written down.
- If the information is not in the material, clearly say so.";

/// Instruction that keeps the response language aligned with the user's input.
pub fn language_instruction(source: &str) -> String {
    format!("- Respond in the same language as the {source}.")
}

/// Fills `{name}` placeholders in a single pass over the template.
///
/// Substituted values are never rescanned, so user text that happens to contain
/// `{question}` or `{cv_text}` lands in the prompt verbatim. Braces that do not name a
/// known placeholder (JSON examples in a template) are kept as-is.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_fills_known_placeholders() {
        let out = render("Hi {name}, you are {age}.", &[("name", "Ada"), ("age", "36")]);
        assert_eq!(out, "Hi Ada, you are 36.");
    }

    #[test]
    fn test_render_does_not_rescan_values() {
        let out = render(
            "Context: {context}\nQuestion: {question}",
            &[("context", "wrote {question} forms"), ("question", "Who knows Rust?")],
        );
        assert_eq!(out, "Context: wrote {question} forms\nQuestion: Who knows Rust?");
    }

    #[test]
    fn test_render_keeps_unknown_braces() {
        let out = render(r#"{"candidate_name": "{x}"} {cv_text}"#, &[("cv_text", "CV")]);
        assert_eq!(out, r#"{"candidate_name": "{x}"} CV"#);
    }
}
