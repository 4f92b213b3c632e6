//! Prompt assembly for persona calls.
//!
//! Everything here is a pure function of its inputs: the same blueprint,
//! history and message always render to the same bytes.

use serde_json::Value;

use super::types::ConversationTurn;

/// Largest float that still converts to an integer exactly (2^53).
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Blueprint as 2-space-indented JSON. `null` renders as `null`.
///
/// Whole-number floats print without a fraction (`5000.0` becomes `5000`),
/// matching how browser clients serialize the same blueprint.
pub fn render_blueprint(blueprint: &Value) -> String {
    let blueprint = integral_floats_as_integers(blueprint);
    // Serializing a `Value` cannot fail; fall back to the compact form regardless.
    serde_json::to_string_pretty(&blueprint).unwrap_or_else(|_| blueprint.to_string())
}

fn integral_floats_as_integers(value: &Value) -> Value {
    match value {
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < EXACT_INTEGER_LIMIT => Value::from(f as i64),
            _ => value.clone(),
        },
        Value::Array(items) => Value::Array(items.iter().map(integral_floats_as_integers).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, v)| (key.clone(), integral_floats_as_integers(v)))
                .collect(),
        ),
        _ => value.clone(),
    }
}

/// History as `role: content` lines, oldest first.
pub fn render_history(history: &[ConversationTurn]) -> String {
    history
        .iter()
        .map(|turn| format!("{}: {}", turn.role, turn.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The persona-independent part of a prompt, rendered once per consultation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedContext {
    pub blueprint: String,
    pub history: String,
}

impl RenderedContext {
    pub fn render(blueprint: &Value, history: &[ConversationTurn]) -> Self {
        Self {
            blueprint: render_blueprint(blueprint),
            history: render_history(history),
        }
    }

    /// Full user prompt for the persona with the given role label.
    pub fn persona_prompt(&self, user_message: &str, role: &str) -> String {
        format!(
            "Blueprint Context:\n{}\n\nPrevious Conversation:\n{}\n\nUser Message: {}\n\nProvide a focused response from your perspective as the {}.",
            self.blueprint, self.history, user_message, role
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_whole_number_floats_drop_fraction() {
        let blueprint: Value =
            serde_json::from_str(r#"{"budget": 5000.0, "share": 0.25, "tiers": [1.0, -3.0], "n": 7}"#)
                .unwrap();
        assert_eq!(
            render_blueprint(&blueprint),
            "{\n  \"budget\": 5000,\n  \"share\": 0.25,\n  \"tiers\": [\n    1,\n    -3\n  ],\n  \"n\": 7\n}"
        );
    }

    #[test]
    fn test_render_blueprint_pretty() {
        let rendered = render_blueprint(&json!({"title": "Solar Kiosk", "stage": 2}));
        assert_eq!(rendered, "{\n  \"title\": \"Solar Kiosk\",\n  \"stage\": 2\n}");
    }

    #[test]
    fn test_render_blueprint_keeps_key_order() {
        let rendered = render_blueprint(&json!({"zeta": 1, "alpha": 2}));
        assert!(rendered.find("zeta").unwrap() < rendered.find("alpha").unwrap());
    }

    #[test]
    fn test_render_null_blueprint() {
        assert_eq!(render_blueprint(&Value::Null), "null");
    }

    #[test]
    fn test_render_history_order() {
        let history = vec![
            ConversationTurn::new("user", "first"),
            ConversationTurn::new("assistant", "second"),
            ConversationTurn::new("user", "third"),
        ];
        assert_eq!(
            render_history(&history),
            "user: first\nassistant: second\nuser: third"
        );
    }

    #[test]
    fn test_render_empty_history() {
        assert_eq!(render_history(&[]), "");
    }

    #[test]
    fn test_persona_prompt_format() {
        let ctx = RenderedContext::render(
            &json!({"idea": "x"}),
            &[ConversationTurn::new("user", "hi")],
        );
        let prompt = ctx.persona_prompt("What next?", "Strategist");

        assert_eq!(
            prompt,
            "Blueprint Context:\n{\n  \"idea\": \"x\"\n}\n\n\
             Previous Conversation:\nuser: hi\n\n\
             User Message: What next?\n\n\
             Provide a focused response from your perspective as the Strategist."
        );
    }

    #[test]
    fn test_prompt_with_empty_context() {
        let ctx = RenderedContext::render(&Value::Null, &[]);
        let prompt = ctx.persona_prompt("Go", "Impact Analyst");
        assert!(prompt.starts_with("Blueprint Context:\nnull\n\nPrevious Conversation:\n\n\nUser Message: Go"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let blueprint = json!({"a": [1, 2, {"b": null}], "c": "d"});
        let history = vec![ConversationTurn::new("user", "q")];
        let first = RenderedContext::render(&blueprint, &history).persona_prompt("m", "Technologist");
        let second = RenderedContext::render(&blueprint, &history).persona_prompt("m", "Technologist");
        assert_eq!(first, second);
    }
}
