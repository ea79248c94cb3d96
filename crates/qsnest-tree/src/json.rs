//! Conversions between values and JSON.
//!
//! Mappings keep their key order in both directions. JSON has no notion of a
//! naked key, so `null` stands for one. Booleans and numbers become their
//! JSON text, since every query-string scalar is text.

use serde::ser::{Serialize, Serializer};

use crate::value::Value;

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Scalar(None) => serializer.serialize_none(),
            Value::Scalar(Some(text)) => serializer.serialize_str(text),
            Value::Sequence(seq) => serializer.collect_seq(seq.iter()),
            Value::Mapping(map) => serializer.collect_map(map.iter()),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::null(),
            serde_json::Value::Bool(b) => Value::scalar(b.to_string()),
            serde_json::Value::Number(n) => Value::scalar(n.to_string()),
            serde_json::Value::String(s) => Value::scalar(s),
            serde_json::Value::Array(items) => Value::seq(items.into_iter().map(Value::from)),
            serde_json::Value::Object(entries) => Value::Mapping(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Scalar(None) => serde_json::Value::Null,
            Value::Scalar(Some(text)) => serde_json::Value::String(text.clone()),
            Value::Sequence(seq) => seq.iter().map(serde_json::Value::from).collect(),
            Value::Mapping(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), serde_json::Value::from(value)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_json_keeps_order() {
        let value = Value::from(json!({"b": "1", "a": ["x", null], "": {"z": "2"}}));
        insta::assert_snapshot!(
            serde_json::to_string(&value).unwrap(),
            @r#"{"b":"1","a":["x",null],"":{"z":"2"}}"#
        );
        assert_eq!(
            serde_json::Value::from(&value),
            json!({"b": "1", "a": ["x", null], "": {"z": "2"}})
        );
    }

    #[test]
    fn test_from_json_stringifies() {
        let value = Value::from(json!({"n": 3, "f": 1.5, "t": true}));
        assert_eq!(value.get("n").and_then(Value::as_str), Some("3"));
        assert_eq!(value.get("f").and_then(Value::as_str), Some("1.5"));
        assert_eq!(value.get("t").and_then(Value::as_str), Some("true"));
    }
}
