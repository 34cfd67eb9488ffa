//! Parsing of numeric ids received as query, path or body values

use serde_json::Value;

/// Parse a positive integer id; anything else yields `None`
pub fn parse_id(raw: Option<&str>) -> Option<i64> {
    raw.map(str::trim)
        .and_then(|s| s.parse::<i64>().ok())
        .filter(|id| *id > 0)
}

/// Same as [`parse_id`] for a JSON value holding a number or a string
pub fn id_from_json(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().filter(|id| *id > 0),
        Value::String(s) => parse_id(Some(s.as_str())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_positive_integers_only() {
        assert_eq!(parse_id(Some("42")), Some(42));
        assert_eq!(parse_id(Some(" 7 ")), Some(7));
        assert_eq!(parse_id(Some("0")), None);
        assert_eq!(parse_id(Some("-3")), None);
        assert_eq!(parse_id(Some("2.5")), None);
        assert_eq!(parse_id(Some("NaN")), None);
        assert_eq!(parse_id(Some("")), None);
        assert_eq!(parse_id(None), None);
    }

    #[test]
    fn json_ids() {
        assert_eq!(id_from_json(&json!(5)), Some(5));
        assert_eq!(id_from_json(&json!("5")), Some(5));
        assert_eq!(id_from_json(&json!(5.5)), None);
        assert_eq!(id_from_json(&json!(null)), None);
        assert_eq!(id_from_json(&json!([5])), None);
    }
}
