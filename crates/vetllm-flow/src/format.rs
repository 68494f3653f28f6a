//! Render relay payloads as readable text.
//!
//! Sequences become numbered lines and mappings become `Key: value` lines.
//! Nested containers start on a new line, indented two spaces per level.

use serde_json::Value;

const INDENT: &str = "  ";

/// Format a `response` payload.
///
/// A string that parses as JSON is rendered structurally; any other string
/// is returned unmodified. Non-string payloads are rendered directly.
pub fn format_response(response: &Value) -> String {
    match response {
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(parsed) => format_value(&parsed),
            Err(_) => text.clone(),
        },
        other => format_value(other),
    }
}

/// Recursively format a value. `null` renders as the empty string.
pub fn format_value(value: &Value) -> String {
    format_at(value, 0)
}

fn format_at(value: &Value, depth: usize) -> String {
    let pad = INDENT.repeat(depth);
    match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}{}.{}", pad, i + 1, format_child(item, depth)))
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(map) => map
            .iter()
            .map(|(key, item)| format!("{}{}:{}", pad, capitalize(key), format_child(item, depth)))
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Text following a `1.` or `Key:` label.
fn format_child(value: &Value, depth: usize) -> String {
    if is_container(value) {
        format!("\n{}", format_at(value, depth + 1))
    } else {
        format!(" {}", format_at(value, depth))
    }
}

fn is_container(value: &Value) -> bool {
    match value {
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => false,
    }
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_list_becomes_numbered_lines() {
        assert_eq!(format_response(&json!("[\"A\",\"B\"]")), "1. A\n2. B");
    }

    #[test]
    fn test_plain_text_is_unmodified() {
        let text = "Parvovirus, CPV-2\n  (canine)";
        assert_eq!(format_response(&json!(text)), text);
        assert_eq!(format_response(&json!("")), "");
    }

    #[test]
    fn test_object_keys_are_capitalized_in_order() {
        let formatted = format_response(&json!(r#"{"dose": "10 mg/kg", "route": "PO"}"#));
        assert_eq!(formatted, "Dose: 10 mg/kg\nRoute: PO");
    }

    #[test]
    fn test_scalars_render_as_text() {
        assert_eq!(format_response(&json!("42")), "42");
        assert_eq!(format_response(&json!("true")), "true");
        assert_eq!(format_response(&json!("\"quoted\"")), "quoted");
        assert_eq!(format_value(&json!(null)), "");
        assert_eq!(format_value(&json!(2.5)), "2.5");
    }

    #[test]
    fn test_nested_containers_are_indented() {
        let value = json!([
            { "drug": "Amoxicillin", "species": ["dog", "cat"] },
            "Cefalexin"
        ]);
        assert_eq!(
            format_value(&value),
            "1.\n  Drug: Amoxicillin\n  Species:\n    1. dog\n    2. cat\n2. Cefalexin"
        );
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(format_value(&json!([])), "");
        assert_eq!(format_value(&json!({ "signs": [] })), "Signs: ");
    }

    #[test]
    fn test_structured_response_value() {
        assert_eq!(format_response(&json!({ "prognosis": "Guarded" })), "Prognosis: Guarded");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("dose"), "Dose");
        assert_eq!(capitalize("Dose"), "Dose");
        assert_eq!(capitalize("émesis"), "Émesis");
        assert_eq!(capitalize(""), "");
    }
}
