// Cross-cutting prompt fragments. Each feature keeps its own prompts.rs
// next to its service and appends these where needed.

/// Appended to every prompt that expects structured output.
pub const JSON_ONLY_INSTRUCTION: &str = "Respond with strict JSON only. \
    Do NOT wrap it in markdown code fences. \
    Do NOT include any text outside the JSON.";

/// Demands verbatim quoting so excerpts can be located in the source text.
pub const VERBATIM_EXCERPT_INSTRUCTION: &str = "Every `excerpt` MUST be copied \
    character for character from the original text, including punctuation. \
    Do NOT paraphrase, summarise or merge separate passages into one excerpt.";

/// Fills `{name}` placeholders in a template in a single pass. Each
/// placeholder is replaced at its first occurrence in the template only;
/// substituted values are emitted verbatim and never scanned for placeholders.
/// Unknown `{...}` tokens are left as they are.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut filled = vec![false; values.len()];
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let slot = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .position(|(key, _)| *key == name)
                .filter(|&i| !filled[i])
                .map(|i| (i, close))
        });

        match slot {
            Some((i, close)) => {
                filled[i] = true;
                out.push_str(values[i].1);
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
    fn test_fill_template_replaces_first_occurrence_only() {
        let out = fill_template("{jd} / {resume} / {jd}", &[("jd", "A"), ("resume", "B")]);
        assert_eq!(out, "A / B / {jd}");
    }

    #[test]
    fn test_fill_template_value_containing_placeholder_is_not_expanded() {
        let out = fill_template("{contract} end", &[("contract", "literal {contract}")]);
        assert_eq!(out, "literal {contract} end");
    }

    #[test]
    fn test_fill_template_value_naming_later_placeholder() {
        let out = fill_template(
            "JD: {jd}\nRESUME: {resume}\nSCORE: {score}",
            &[
                ("jd", "needs {resume} and {score} skills"),
                ("resume", "built a {score} engine"),
                ("score", "78"),
            ],
        );
        assert_eq!(
            out,
            "JD: needs {resume} and {score} skills\nRESUME: built a {score} engine\nSCORE: 78"
        );
    }

    #[test]
    fn test_fill_template_keeps_unknown_and_literal_braces() {
        let out = fill_template(r#"{"k": {x}} {unknown} {"#, &[("x", "1")]);
        assert_eq!(out, r#"{"k": 1} {unknown} {"#);
    }
}
