//! Flattens nested values so a record fits in scalar columns, and restores them on read.
//!
//! Only one level is handled. A nested value that itself contains an encoded string is
//! left as-is on decode, and a plain string that happens to start with `{` will be
//! mistaken for an encoded object.

use serde_json::{Map, Value};

/// Marks a string as an encoded object.
pub const OBJECT_MARKER: char = '{';

/// Replaces every object or array field with its compact JSON string. Scalars pass through.
pub fn encode(record: &Map<String, Value>) -> Map<String, Value> {
    record
        .iter()
        .map(|(key, value)| {
            let flat = match value {
                Value::Object(_) | Value::Array(_) => Value::String(value.to_string()),
                scalar => scalar.clone(),
            };
            (key.clone(), flat)
        })
        .collect()
}

/// Parses every string field that starts with [`OBJECT_MARKER`] back into a value.
///
/// Strings that look encoded but don't parse are kept as strings.
pub fn decode(record: &Map<String, Value>) -> Map<String, Value> {
    record
        .iter()
        .map(|(key, value)| {
            let restored = match value {
                Value::String(s) if s.starts_with(OBJECT_MARKER) => {
                    serde_json::from_str(s).unwrap_or_else(|err| {
                        log::warn!("[decode] Field '{key}' looks encoded but isn't JSON: {err}");
                        value.clone()
                    })
                }
                other => other.clone(),
            };
            (key.clone(), restored)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn nested_objects_round_trip() {
        let original = record(json!({
            "songID": "4uLU6hMCjMI75M1A2tKUQC",
            "q1": 4,
            "q2": { "liked": true, "comment": "too fast" },
            "q3": null,
        }));

        let encoded = encode(&original);
        assert_eq!(encoded["q2"], json!(r#"{"comment":"too fast","liked":true}"#));
        assert_eq!(encoded["q1"], json!(4));
        assert_eq!(decode(&encoded), original);
    }

    #[test]
    fn arrays_are_flattened_but_not_restored() {
        let encoded = encode(&record(json!({ "q5": [1, 2, 3] })));
        assert_eq!(encoded["q5"], json!("[1,2,3]"));
        assert_eq!(decode(&encoded)["q5"], json!("[1,2,3]"));
    }

    #[test]
    fn only_one_level_is_decoded() {
        let inner = json!({ "deep": true }).to_string();
        let encoded = encode(&record(json!({ "q1": { "inner": inner } })));
        let decoded = decode(&encoded);

        assert_eq!(decoded["q1"]["inner"], json!(r#"{"deep":true}"#));
    }

    #[test]
    fn unparseable_marker_strings_pass_through() {
        let decoded = decode(&record(json!({ "q1": "{not json" })));
        assert_eq!(decoded["q1"], json!("{not json"));
    }
}
