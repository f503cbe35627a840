use serde_json::Value as JsonValue;

/// Keys under which list endpoints wrap their items.
pub const LIST_KEYS: &[&str] = &["results", "attempts", "applications"];

/// Reduces a bare array or an object wrapping one under any of `keys` to a list.
/// A wrapped value may itself be a JSON-encoded string.
pub fn as_collection(value: &JsonValue, keys: &[&str]) -> Option<Vec<JsonValue>> {
    match value {
        JsonValue::Array(items) => Some(items.clone()),
        JsonValue::Object(map) => keys.iter().find_map(|key| match map.get(*key) {
            Some(JsonValue::Array(items)) => Some(items.clone()),
            Some(JsonValue::String(encoded)) => match serde_json::from_str(encoded) {
                Ok(JsonValue::Array(items)) => Some(items),
                _ => None,
            },
            _ => None,
        }),
        _ => None,
    }
}

pub fn is_recognizable_collection(value: &JsonValue) -> bool {
    as_collection(value, LIST_KEYS).is_some()
}

/// First present, non-null field among `keys`.
pub fn first_field<'a>(value: &'a JsonValue, keys: &[&str]) -> Option<&'a JsonValue> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find(|v| !v.is_null())
}

/// Strings and numbers as trimmed text; empty strings count as missing.
pub fn text_field(value: &JsonValue, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find_map(scalar_text)
}

pub fn scalar_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numbers, or numeric strings such as serialized decimals.
pub fn lenient_f64(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().trim_end_matches('%').parse().ok(),
        _ => None,
    }
}

pub fn lenient_u32(value: &JsonValue) -> Option<u32> {
    lenient_f64(value)
        .filter(|v| *v >= 0.0 && v.fract() == 0.0)
        .map(|v| v as u32)
}

/// Booleans, plus the string and integer spellings some serializers emit.
pub fn lenient_bool(value: &JsonValue) -> Option<bool> {
    match value {
        JsonValue::Bool(b) => Some(*b),
        JsonValue::Number(n) => n.as_i64().map(|v| v != 0),
        JsonValue::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collection_shapes_reduce_to_one_list() {
        let expected = vec![json!({"id": 1})];
        for shape in [
            json!([{"id": 1}]),
            json!({"results": [{"id": 1}]}),
            json!({"attempts": [{"id": 1}]}),
        ] {
            assert_eq!(as_collection(&shape, LIST_KEYS), Some(expected.clone()));
        }
        assert_eq!(
            as_collection(&json!({"questions_json": "[{\"id\": 1}]"}), &["questions_json"]),
            Some(expected)
        );
        assert_eq!(as_collection(&json!({"detail": "nope"}), LIST_KEYS), None);
        assert_eq!(as_collection(&json!("text"), LIST_KEYS), None);
    }

    #[test]
    fn lenient_numbers_accept_decimal_strings() {
        assert_eq!(lenient_f64(&json!("86.00")), Some(86.0));
        assert_eq!(lenient_f64(&json!(71.5)), Some(71.5));
        assert_eq!(lenient_u32(&json!("7")), Some(7));
        assert_eq!(lenient_u32(&json!(-1)), None);
        assert_eq!(lenient_bool(&json!("True")), Some(true));
        assert_eq!(lenient_bool(&json!(null)), None);
    }
}
