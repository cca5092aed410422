//! Helpers for reading loosely-shaped step results.

use serde_json::Value;

/// Truthiness of a JSON value: `null`, `false`, `0`, `""` are false,
/// everything else (including empty arrays and objects) is true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Extract the `reason` field of a result as text, if present.
///
/// Strings are taken as-is; any other non-null value becomes its JSON text.
pub fn reason_of(result: &Value) -> Option<String> {
    match result.get("reason")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("yes")));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!([])));
    }

    #[test]
    fn reason_reads_strings_and_stringifies_others() {
        assert_eq!(reason_of(&json!({"reason": "x"})), Some("x".into()));
        assert_eq!(reason_of(&json!({"reason": 3})), Some("3".into()));
        assert_eq!(reason_of(&json!({"stop": true})), None);
    }
}
