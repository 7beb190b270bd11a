//! # Coercion
//!
//! Converts an input value toward a schema's primitive target kind before
//! any constraint is checked. Coercion is opt-in per schema
//! (`string().coerce()`, `conform_schema::coerce::number()`, ...).
//!
//! | target  | accepted inputs                                                   |
//! |---------|-------------------------------------------------------------------|
//! | string  | string, number (`12345` → `"12345"`), boolean, date (ISO 8601)     |
//! | number  | number, trimmed numeric string or `±Infinity`, boolean, date (millis) |
//! | boolean | boolean, `"true"`/`"false"`/`"1"`/`"0"` (any case), number (≠ 0)   |
//! | date    | date, `YYYY-MM-DD` / RFC 3339 string, number (epoch millis)        |
//!
//! Everything else is not coercible; the caller records an
//! `invalid_type` issue naming the original kind.

use chrono::{DateTime, Utc};
use conform_core::{format_number, temporal, Value, ValueKind};

use crate::schema::{BooleanSchema, DateSchema, NumberSchema, StringSchema};

/// String schema with coercion enabled.
pub fn string() -> StringSchema {
    StringSchema::new().coerce()
}

/// Number schema with coercion enabled.
pub fn number() -> NumberSchema {
    NumberSchema::new().coerce()
}

/// Boolean schema with coercion enabled.
pub fn boolean() -> BooleanSchema {
    BooleanSchema::new().coerce()
}

/// Date schema with coercion enabled.
pub fn date() -> DateSchema {
    DateSchema::new().coerce()
}

pub fn to_string(value: Value) -> Result<String, ValueKind> {
    let kind = value.kind();
    let out = match value {
        Value::String(s) => Ok(s),
        Value::Number(n) if n.is_nan() => Err(kind),
        Value::Number(n) => Ok(format_number(n)),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Date(dt) => Ok(temporal::to_iso8601(&dt)),
        _ => Err(kind),
    };
    trace_outcome("string", kind, out.is_ok());
    out
}

pub fn to_number(value: Value) -> Result<f64, ValueKind> {
    let kind = value.kind();
    let out = match value {
        Value::Number(n) => Ok(n),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Err(kind)
            } else {
                parse_number_text(trimmed).ok_or(kind)
            }
        }
        Value::Bool(b) => Ok(if b { 1.0 } else { 0.0 }),
        Value::Date(dt) => Ok(temporal::to_epoch_millis(&dt)),
        _ => Err(kind),
    };
    trace_outcome("number", kind, out.is_ok());
    out
}

pub fn to_boolean(value: Value) -> Result<bool, ValueKind> {
    let kind = value.kind();
    let out = match value {
        Value::Bool(b) => Ok(b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(kind),
        },
        Value::Number(n) if n.is_nan() => Err(kind),
        Value::Number(n) => Ok(n != 0.0),
        _ => Err(kind),
    };
    trace_outcome("boolean", kind, out.is_ok());
    out
}

pub fn to_date(value: Value) -> Result<DateTime<Utc>, ValueKind> {
    let kind = value.kind();
    let out = match value {
        Value::Date(dt) => Ok(dt),
        Value::String(s) => temporal::parse_date(&s).map_err(|_| kind),
        Value::Number(n) => temporal::from_epoch_millis(n).map_err(|_| kind),
        _ => Err(kind),
    };
    trace_outcome("date", kind, out.is_ok());
    out
}

/// Numeric text: decimal or exponent notation, or a signed `Infinity`.
/// Other spellings `f64::from_str` accepts (`inf`, `infinity`, `NaN`, any
/// case) are rejected.
fn parse_number_text(text: &str) -> Option<f64> {
    match text {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn trace_outcome(target: &str, from: ValueKind, ok: bool) {
    tracing::trace!(target_kind = target, from = from.as_str(), ok, "coercion");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_to_string() {
        assert_eq!(to_string(Value::from(12345)).unwrap(), "12345");
        assert_eq!(to_string(Value::from(1.5)).unwrap(), "1.5");
    }

    #[test]
    fn test_bool_and_date_to_string() {
        assert_eq!(to_string(Value::from(true)).unwrap(), "true");
        let dt = temporal::parse_date("2020-01-01").unwrap();
        assert_eq!(to_string(Value::Date(dt)).unwrap(), "2020-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_null_and_composites_not_coercible_to_string() {
        assert_eq!(to_string(Value::Null), Err(ValueKind::Null));
        assert_eq!(to_string(Value::from(vec![1])), Err(ValueKind::Array));
    }

    #[test]
    fn test_numeric_string_to_number() {
        assert_eq!(to_number(Value::from("10000")).unwrap(), 10000.0);
        assert_eq!(to_number(Value::from(" 2.5 ")).unwrap(), 2.5);
    }

    #[test]
    fn test_non_numeric_string_rejected() {
        assert_eq!(to_number(Value::from("abc")), Err(ValueKind::String));
        assert_eq!(to_number(Value::from("")), Err(ValueKind::String));
        assert_eq!(to_number(Value::from("NaN")), Err(ValueKind::String));
    }

    #[test]
    fn test_only_signed_infinity_spelling_accepted() {
        assert_eq!(to_number(Value::from("Infinity")).unwrap(), f64::INFINITY);
        assert_eq!(to_number(Value::from("+Infinity")).unwrap(), f64::INFINITY);
        assert_eq!(to_number(Value::from(" -Infinity ")).unwrap(), f64::NEG_INFINITY);
        for text in ["inf", "infinity", "+inf", "-INF", "INFINITY", "nan"] {
            assert_eq!(to_number(Value::from(text)), Err(ValueKind::String), "accepted {text}");
        }
    }

    #[test]
    fn test_infinite_number_to_string() {
        assert_eq!(to_string(Value::from(f64::INFINITY)).unwrap(), "Infinity");
        assert_eq!(to_string(Value::from(f64::NEG_INFINITY)).unwrap(), "-Infinity");
        let back = to_number(Value::from(to_string(Value::from(f64::INFINITY)).unwrap())).unwrap();
        assert_eq!(back, f64::INFINITY);
    }

    #[test]
    fn test_bool_and_date_to_number() {
        assert_eq!(to_number(Value::from(true)).unwrap(), 1.0);
        let dt = temporal::parse_date("1970-01-02").unwrap();
        assert_eq!(to_number(Value::Date(dt)).unwrap(), 86_400_000.0);
    }

    #[test]
    fn test_string_to_boolean() {
        assert!(to_boolean(Value::from("true")).unwrap());
        assert!(to_boolean(Value::from("TRUE")).unwrap());
        assert!(!to_boolean(Value::from("false")).unwrap());
        assert!(!to_boolean(Value::from("0")).unwrap());
        assert_eq!(to_boolean(Value::from("yes")), Err(ValueKind::String));
    }

    #[test]
    fn test_number_to_boolean() {
        assert!(to_boolean(Value::from(2)).unwrap());
        assert!(!to_boolean(Value::from(0)).unwrap());
    }

    #[test]
    fn test_string_and_number_to_date() {
        let from_str = to_date(Value::from("1980-01-01")).unwrap();
        assert_eq!(temporal::to_iso8601(&from_str), "1980-01-01T00:00:00.000Z");
        let from_millis = to_date(Value::from(0)).unwrap();
        assert_eq!(temporal::to_iso8601(&from_millis), "1970-01-01T00:00:00.000Z");
        assert_eq!(to_date(Value::from("yesterday")), Err(ValueKind::String));
        assert_eq!(to_date(Value::from(true)), Err(ValueKind::Boolean));
    }
}
