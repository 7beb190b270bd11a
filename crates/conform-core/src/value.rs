//! # Dynamic Values
//!
//! [`Value`] is the untyped value crossing the validation boundary. It is a
//! superset of the JSON data model: besides the JSON kinds it carries
//! dates, sets and maps with arbitrary keys, so every schema kind has a
//! native input representation.
//!
//! Conversion from `serde_json::Value` is lossless. Conversion back to JSON
//! (and `Serialize`) renders:
//!
//! - dates as ISO 8601 strings (`1980-01-01T00:00:00.000Z`),
//! - sets as arrays,
//! - maps as objects when every key is a string, otherwise as an array of
//!   `[key, value]` pairs,
//! - integral numbers as JSON integers, non-finite numbers as `null`.

use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::temporal;

/// An untyped input or validated output value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Date(DateTime<Utc>),
    Array(Vec<Value>),
    /// Unordered collection; may hold duplicates until validated by a set schema.
    Set(Vec<Value>),
    /// Key/value pairs in insertion order.
    Map(Vec<(Value, Value)>),
    Object(IndexMap<String, Value>),
}

/// The kind of a [`Value`], used in type-mismatch messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    String,
    Date,
    Array,
    Set,
    Map,
    Object,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Date => "date",
            Self::Array => "array",
            Self::Set => "set",
            Self::Map => "map",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    /// Build a set value from any iterator of values.
    pub fn set<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::Set(items.into_iter().map(Into::into).collect())
    }

    /// Build a map value from key/value pairs.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build an object value from string-keyed entries.
    pub fn object<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Boolean,
            Self::Number(_) => ValueKind::Number,
            Self::String(_) => ValueKind::String,
            Self::Date(_) => ValueKind::Date,
            Self::Array(_) => ValueKind::Array,
            Self::Set(_) => ValueKind::Set,
            Self::Map(_) => ValueKind::Map,
            Self::Object(_) => ValueKind::Object,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::Date(dt) => Some(dt),
            _ => None,
        }
    }

    /// Elements of an array or set.
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) | Self::Set(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Look up an object field, or a map entry whose key is the given string.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Object(fields) => fields.get(key),
            Self::Map(entries) => entries
                .iter()
                .find(|(k, _)| k.as_str() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Number of elements for arrays, sets, maps and objects.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Array(items) | Self::Set(items) => Some(items.len()),
            Self::Map(entries) => Some(entries.len()),
            Self::Object(fields) => Some(fields.len()),
            _ => None,
        }
    }

    /// Text used when this value appears as a path segment (map keys).
    pub fn to_key_string(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Bool(b) => b.to_string(),
            Self::Date(dt) => temporal::to_iso8601(dt),
            other => other.to_json().to_string(),
        }
    }

    /// Render as a `serde_json::Value`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Self::Null => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Number(n) => number_to_json(*n),
            Self::String(s) => Json::String(s.clone()),
            Self::Date(dt) => Json::String(temporal::to_iso8601(dt)),
            Self::Array(items) | Self::Set(items) => {
                Json::Array(items.iter().map(Value::to_json).collect())
            }
            Self::Map(entries) => {
                if entries.iter().all(|(k, _)| matches!(k, Value::String(_))) {
                    Json::Object(
                        entries
                            .iter()
                            .map(|(k, v)| (k.to_key_string(), v.to_json()))
                            .collect(),
                    )
                } else {
                    Json::Array(
                        entries
                            .iter()
                            .map(|(k, v)| Json::Array(vec![k.to_json(), v.to_json()]))
                            .collect(),
                    )
                }
            }
            Self::Object(fields) => Json::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Format a number the way it is written in JSON source: integral values
/// without a fractional part (`10000`, not `10000.0`). Non-finite values
/// render as `Infinity`, `-Infinity` and `NaN`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
        serde_json::Value::Number(serde_json::Number::from(n as i64))
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Self::String(s),
            Json::Array(items) => Self::Array(items.into_iter().map(Value::from).collect()),
            Json::Object(fields) => Self::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Date(dt)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Self::Null)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_preserves_key_order() {
        let v = Value::from(json!({"username": "dani", "password": "rahasia"}));
        let keys: Vec<&String> = v.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 2);
        assert_eq!(v.get("username"), Some(&Value::from("dani")));
    }

    #[test]
    fn test_integral_numbers_render_as_integers() {
        assert_eq!(Value::from(10000).to_json(), json!(10000));
        assert_eq!(Value::from(1.5).to_json(), json!(1.5));
        assert_eq!(Value::Number(f64::NAN).to_json(), json!(null));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1000.0), "1000");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(0.25), "0.25");
    }

    #[test]
    fn test_format_non_finite_numbers() {
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn test_set_renders_as_array() {
        let v = Value::set(["a", "b"]);
        assert_eq!(v.to_json(), json!(["a", "b"]));
        assert_eq!(v.kind(), ValueKind::Set);
    }

    #[test]
    fn test_map_with_string_keys_renders_as_object() {
        let v = Value::map([("dani", "dani@example.com")]);
        assert_eq!(v.to_json(), json!({"dani": "dani@example.com"}));
        assert_eq!(v.get("dani"), Some(&Value::from("dani@example.com")));
    }

    #[test]
    fn test_map_with_non_string_keys_renders_as_pairs() {
        let v = Value::map([(1, "one")]);
        assert_eq!(v.to_json(), json!([[1, "one"]]));
    }

    #[test]
    fn test_date_renders_iso8601() {
        let dt = temporal::parse_date("2020-01-01").unwrap();
        assert_eq!(Value::Date(dt).to_json(), json!("2020-01-01T00:00:00.000Z"));
    }

    #[test]
    fn test_serialize_and_deserialize_through_json() {
        let v = Value::object([("a", Value::from(1)), ("b", Value::from(vec!["x"]))]);
        let text = serde_json::to_string(&v).unwrap();
        assert_eq!(text, r#"{"a":1,"b":["x"]}"#);
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn test_option_into_value() {
        assert_eq!(Value::from(None::<&str>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Value::Null.kind().to_string(), "null");
        assert_eq!(Value::from(true).kind().to_string(), "boolean");
        assert_eq!(Value::object::<_, String, Value>([]).kind().to_string(), "object");
    }
}
