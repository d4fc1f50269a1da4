//! Response-shape flattening
//!
//! Gantree: L5_Suggest → Flatten
//!
//! Suggesters are asked for a flat array of instruction strings but replies
//! arrive in other shapes too: wrapped in an object, grouped by gate
//! category, or fenced as markdown code.

use serde_json::Value;

/// Flatten a suggester reply into instruction strings
///
/// - array: string elements in order, anything else dropped
/// - object with `gates` or `custom_gates`: that value, flattened
/// - other object: each value in key order (arrays spliced, strings kept)
/// - string: one instruction
///
/// Gantree: flatten_instructions(&Value) -> Vec<String> // 평탄화
pub fn flatten_instructions(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => strings_of(items),
        Value::Object(map) => {
            if let Some(inner) = map.get("gates").or_else(|| map.get("custom_gates")) {
                return flatten_instructions(inner);
            }
            log::warn!("instructions grouped by key, flattening {} group(s)", map.len());
            let mut out = Vec::new();
            for (group, v) in map {
                match v {
                    Value::Array(items) => out.extend(strings_of(items)),
                    Value::String(s) => out.push(s.clone()),
                    other => log::warn!("unexpected format for group '{}': {}", group, other),
                }
            }
            out
        }
        Value::String(s) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn strings_of(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            other => {
                log::warn!("non-string instruction skipped: {}", other);
                None
            }
        })
        .collect()
}

/// Check for a non-empty array whose first element is a string
pub fn is_flat_instruction_list(value: &Value) -> bool {
    matches!(value, Value::Array(items) if matches!(items.first(), Some(Value::String(_))))
}

/// Parse the JSON payload of a model reply
///
/// Accepts bare JSON, a fenced ```` ```json ```` block, or JSON embedded in
/// surrounding prose.
/// Gantree: parse_json_reply(&str) -> Option<Value> // 응답 파싱
pub fn parse_json_reply(reply: &str) -> Option<Value> {
    let body = strip_code_fence(reply);
    if let Ok(value) = serde_json::from_str(body) {
        return Some(value);
    }

    // Outermost object or array inside prose
    let start = body.find(|c: char| c == '{' || c == '[')?;
    let close = if body[start..].starts_with('{') { '}' } else { ']' };
    let end = body.rfind(close)?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&body[start..=end]).ok()
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(open) = trimmed.find("```") else {
        return trimmed;
    };
    let after = &trimmed[open + 3..];
    // Skip the info string (`json`) up to the end of the line
    let after = match after.find('\n') {
        Some(nl) => &after[nl + 1..],
        None => after.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    match after.find("```") {
        Some(close) => after[..close].trim(),
        None => after.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_list() {
        let v = json!(["h 0", "cx 0 1"]);
        assert_eq!(flatten_instructions(&v), vec!["h 0", "cx 0 1"]);
    }

    #[test]
    fn test_grouped_object_in_key_order() {
        let v = json!({"single_qubit": ["h 0"], "two_qubit": ["cx 0 1"]});
        assert_eq!(flatten_instructions(&v), vec!["h 0", "cx 0 1"]);

        // Insertion order, not alphabetical
        let v: Value =
            serde_json::from_str(r#"{"z_gates": ["z 1"], "a_gates": ["h 0"], "tail": "measure 0 0"}"#)
                .unwrap();
        assert_eq!(flatten_instructions(&v), vec!["z 1", "h 0", "measure 0 0"]);
    }

    #[test]
    fn test_gates_wrapper() {
        let v = json!({"gates": ["h 0", 7, null, "x 1"], "num_qubits": 2});
        assert_eq!(flatten_instructions(&v), vec!["h 0", "x 1"]);

        let v = json!({"custom_gates": {"a": ["h 0"]}});
        assert_eq!(flatten_instructions(&v), vec!["h 0"]);
    }

    #[test]
    fn test_degenerate_shapes() {
        assert!(flatten_instructions(&json!([])).is_empty());
        assert!(flatten_instructions(&json!({})).is_empty());
        assert!(flatten_instructions(&json!(42)).is_empty());
        assert!(flatten_instructions(&json!([1, 2, {"h": 0}])).is_empty());
        assert_eq!(flatten_instructions(&json!("h 0")), vec!["h 0"]);
    }

    #[test]
    fn test_is_flat_instruction_list() {
        assert!(is_flat_instruction_list(&json!(["h 0"])));
        assert!(!is_flat_instruction_list(&json!([])));
        assert!(!is_flat_instruction_list(&json!([1, "h 0"])));
        assert!(!is_flat_instruction_list(&json!({"gates": ["h 0"]})));
    }

    #[test]
    fn test_parse_json_reply() {
        assert_eq!(parse_json_reply(r#"["h 0"]"#), Some(json!(["h 0"])));
        assert_eq!(
            parse_json_reply("```json\n{\"gates\": [\"h 0\"]}\n```"),
            Some(json!({"gates": ["h 0"]}))
        );
        assert_eq!(
            parse_json_reply("Here you go:\n{\"num_qubits\": 2}\nEnjoy."),
            Some(json!({"num_qubits": 2}))
        );
        assert_eq!(parse_json_reply("no json here"), None);
    }
}
