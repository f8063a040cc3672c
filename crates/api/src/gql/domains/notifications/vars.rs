//! Message variable substitution.
//!
//! Notification messages are stored as templates with `{key}` placeholders
//! next to a JSON map of values, so the same notification renders correctly
//! even after the referenced objects are renamed or deleted. Unknown keys are
//! left intact rather than erased, which keeps a typo visible instead of
//! silently mangling the message.

/// Render `template`, replacing each `{key}` with the matching entry of
/// `vars`. String values are inserted bare; other JSON values use their
/// compact JSON form.
pub fn render_message(template: &str, vars: &serde_json::Value) -> String {
    let map = vars.as_object();

    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        output.push_str(&rest[..start]);
        let after_brace = &rest[start + 1..];

        match after_brace.find('}') {
            Some(end) => {
                let key = &after_brace[..end];
                let value = map.and_then(|map| map.get(key));

                match value {
                    Some(serde_json::Value::String(s)) => output.push_str(s),
                    Some(other) => output.push_str(&other.to_string()),
                    None => {
                        output.push('{');
                        output.push_str(key);
                        output.push('}');
                    }
                }
                rest = &after_brace[end + 1..];
            }
            None => {
                // Unterminated placeholder; keep the rest verbatim.
                output.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    output.push_str(rest);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn substitutes_known_keys() {
        let rendered = render_message(
            "{user} invited you to {team}",
            &json!({"user": "peppy", "team": "mouse only"}),
        );
        assert_eq!(rendered, "peppy invited you to mouse only");
    }

    #[test]
    fn unknown_keys_are_left_intact() {
        let rendered = render_message("Welcome to {tournament}!", &json!({}));
        assert_eq!(rendered, "Welcome to {tournament}!");
    }

    #[test]
    fn non_string_values_render_as_json() {
        let rendered = render_message("You placed #{seed}", &json!({"seed": 12}));
        assert_eq!(rendered, "You placed #12");
    }

    #[test]
    fn handles_braces_at_the_edges() {
        assert_eq!(render_message("{a}", &json!({"a": "x"})), "x");
        assert_eq!(render_message("tail {", &json!({})), "tail {");
        assert_eq!(render_message("plain text", &json!({})), "plain text");
    }

    #[test]
    fn repeated_keys_each_substitute() {
        let rendered = render_message("{name} vs {name}", &json!({"name": "red"}));
        assert_eq!(rendered, "red vs red");
    }
}
