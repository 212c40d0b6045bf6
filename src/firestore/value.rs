use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A typed Firestore field value, in the REST API's `{"<type>Value": ...}` encoding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    #[serde(rename = "nullValue")]
    Null(()),

    #[serde(rename = "booleanValue")]
    Boolean(bool),

    /// Firestore transports 64-bit integers as decimal strings
    #[serde(rename = "integerValue")]
    Integer(#[serde(with = "integer_string")] i64),

    #[serde(rename = "doubleValue")]
    Double(f64),

    #[serde(rename = "timestampValue")]
    Timestamp(DateTime<Utc>),

    #[serde(rename = "stringValue")]
    String(String),

    #[serde(rename = "bytesValue")]
    Bytes(String),

    #[serde(rename = "referenceValue")]
    Reference(String),

    #[serde(rename = "geoPointValue")]
    GeoPoint(GeoPoint),

    #[serde(rename = "arrayValue")]
    Array(ArrayValue),

    #[serde(rename = "mapValue")]
    Map(MapValue),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MapValue {
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

impl Value {
    pub fn string(value: impl Into<String>) -> Self {
        Value::String(value.into())
    }

    /// `Some` becomes a string value, `None` an explicit null
    pub fn optional_string(value: Option<impl Into<String>>) -> Self {
        value.map_or(Value::Null(()), |v| Value::String(v.into()))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(()))
    }
}

mod integer_string {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Number(i64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Text(text) => text.parse().map_err(D::Error::custom),
            Repr::Number(n) => Ok(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_is_encoded_as_string() {
        assert_eq!(serde_json::to_value(Value::Integer(1200)).unwrap(), json!({"integerValue": "1200"}));
    }

    #[test]
    fn test_integer_accepts_string_and_number() {
        let a: Value = serde_json::from_value(json!({"integerValue": "42"})).unwrap();
        let b: Value = serde_json::from_value(json!({"integerValue": 42})).unwrap();
        assert_eq!(a, Value::Integer(42));
        assert_eq!(b, Value::Integer(42));
    }

    #[test]
    fn test_null_encoding() {
        assert_eq!(serde_json::to_value(Value::Null(())).unwrap(), json!({"nullValue": null}));
        let parsed: Value = serde_json::from_value(json!({"nullValue": null})).unwrap();
        assert!(parsed.is_null());
    }

    #[test]
    fn test_optional_string() {
        assert_eq!(Value::optional_string(Some("-20%")), Value::string("-20%"));
        assert!(Value::optional_string(None::<String>).is_null());
    }

    #[test]
    fn test_timestamp_encoding() {
        let ts = DateTime::parse_from_rfc3339("2025-03-01T08:30:00Z").unwrap().with_timezone(&Utc);
        let encoded = serde_json::to_value(Value::Timestamp(ts)).unwrap();
        assert_eq!(encoded, json!({"timestampValue": "2025-03-01T08:30:00Z"}));
    }

    #[test]
    fn test_nested_server_values() {
        let parsed: Value = serde_json::from_value(json!({
            "mapValue": {"fields": {
                "tags": {"arrayValue": {"values": [{"stringValue": "mall"}, {"booleanValue": true}]}}
            }}
        }))
        .unwrap();

        let Value::Map(map) = parsed else { panic!("expected map") };
        let Value::Array(tags) = &map.fields["tags"] else { panic!("expected array") };
        assert_eq!(tags.values.len(), 2);
    }
}
