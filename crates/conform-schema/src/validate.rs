//! # Validation
//!
//! The recursive validator behind [`Schema::parse`] and
//! [`Schema::safe_parse`].
//!
//! ## Algorithm
//!
//! For every value the validator:
//!
//! 1. returns `null` untouched if the schema is nullable;
//! 2. coerces (when enabled) and type-checks the value against the schema
//!    kind, recording `invalid_type` and skipping everything below on
//!    mismatch;
//! 3. runs every declared check in declaration order, accumulating issues
//!    instead of stopping at the first one;
//! 4. recurses into fields/elements/entries of composite kinds, prefixing
//!    child issue paths;
//! 5. runs transforms and refinements, but only if steps 2-4 recorded no
//!    issue for this value. Once a refinement has failed, consecutive
//!    refinements still run but the next transform ends the chain.
//!
//! A value is returned only when the whole run recorded zero issues.

use std::collections::HashMap;
use std::fmt;

use conform_core::{
    format_number, temporal, ConformError, Issue, IssueCode, Issues, Path, ValidationError,
    Value, ValueKind,
};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::coerce;
use crate::format;
use crate::refine::RefinementCtx;
use crate::schema::{
    BooleanSchema, Check, CollectionSchema, DateRule, DateSchema, MapSchema, NumberRule,
    NumberSchema, ObjectSchema, Schema, SchemaKind, SizeRule, StringRule, StringSchema,
    UnknownKeys,
};

/// Outcome of [`Schema::safe_parse`].
///
/// Serializes as `{"success": true, "data": ...}` or
/// `{"success": false, "error": {"issues": [...]}}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Success(Value),
    Failure(ValidationError),
}

impl ValidationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Success(data) => Some(data),
            Self::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(err) => Some(err),
        }
    }

    pub fn into_result(self) -> Result<Value, ValidationError> {
        self.into()
    }
}

impl From<ValidationResult> for Result<Value, ValidationError> {
    fn from(result: ValidationResult) -> Self {
        match result {
            ValidationResult::Success(data) => Ok(data),
            ValidationResult::Failure(err) => Err(err),
        }
    }
}

impl From<Result<Value, ValidationError>> for ValidationResult {
    fn from(result: Result<Value, ValidationError>) -> Self {
        match result {
            Ok(data) => Self::Success(data),
            Err(err) => Self::Failure(err),
        }
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationResult", 2)?;
        match self {
            Self::Success(data) => {
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
            }
            Self::Failure(err) => {
                state.serialize_field("success", &false)?;
                state.serialize_field("error", err)?;
            }
        }
        state.end()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(data) => write!(f, "ok: {data}"),
            Self::Failure(err) => write!(f, "{err}"),
        }
    }
}

impl Schema {
    /// Validate `input`, returning the validated (and transformed) value.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] holding every issue recorded during
    /// the run, in encounter order.
    pub fn parse(&self, input: impl Into<Value>) -> Result<Value, ValidationError> {
        let mut issues = Issues::new();
        let output = self.check(input.into(), &Path::root(), &mut issues);
        match output {
            Some(value) if issues.is_empty() => {
                tracing::debug!(kind = self.kind.name(), "validation succeeded");
                Ok(value)
            }
            _ => {
                if issues.is_empty() {
                    issues.push(Issue::new(IssueCode::Custom, "Invalid input"));
                }
                tracing::debug!(
                    kind = self.kind.name(),
                    issues = issues.len(),
                    "validation failed"
                );
                Err(ValidationError::new(issues))
            }
        }
    }

    /// Validate `input` without an error path: the outcome is returned as data.
    pub fn safe_parse(&self, input: impl Into<Value>) -> ValidationResult {
        self.parse(input).into()
    }

    /// Validate `input`, then deserialize the validated value into `T`.
    ///
    /// Dates reach `T` as ISO 8601 strings, which `chrono` types accept.
    ///
    /// # Errors
    ///
    /// [`ConformError::Validation`] if validation fails,
    /// [`ConformError::Deserialize`] if the validated value does not fit `T`.
    pub fn parse_into<T: DeserializeOwned>(&self, input: impl Into<Value>) -> Result<T, ConformError> {
        let value = self.parse(input)?;
        Ok(serde_json::from_value(value.to_json())?)
    }

    /// Validate one value at `path`, appending issues. Returns the output
    /// value when no issue was recorded for this subtree.
    pub(crate) fn check(&self, input: Value, path: &Path, issues: &mut Issues) -> Option<Value> {
        if input.is_null() && self.nullable {
            return Some(Value::Null);
        }

        let before = issues.len();
        let output = match &self.kind {
            SchemaKind::String(s) => check_string(s, input, path, issues).map(Value::String),
            SchemaKind::Number(s) => check_number(s, input, path, issues).map(Value::Number),
            SchemaKind::Boolean(s) => check_boolean(s, input, path, issues),
            SchemaKind::Date(s) => check_date(s, input, path, issues),
            SchemaKind::Object(s) => check_object(s, input, path, issues),
            SchemaKind::Array(s) => check_array(s, input, path, issues),
            SchemaKind::Set(s) => check_set(s, input, path, issues),
            SchemaKind::Map(s) => check_map(s, input, path, issues),
        };
        let mut value = match output {
            Some(value) if issues.len() == before => value,
            _ => return None,
        };

        if self.effects.is_empty() {
            return Some(value);
        }
        let mut ctx = RefinementCtx::new(path.clone());
        for effect in &self.effects {
            // A failed refinement stops the chain at the next transform;
            // later refinements still run.
            if ctx.has_issues() && !effect.is_refinement() {
                issues.extend(ctx.into_issues());
                return None;
            }
            match effect.apply(value, &mut ctx) {
                Some(next) => value = next,
                None => {
                    if !ctx.has_issues() {
                        ctx.add_custom("Invalid input");
                    }
                    issues.extend(ctx.into_issues());
                    return None;
                }
            }
        }
        if ctx.has_issues() {
            issues.extend(ctx.into_issues());
            return None;
        }
        Some(value)
    }
}

fn push(issues: &mut Issues, path: &Path, code: IssueCode, message: String) {
    issues.push(Issue::new(code, message).at(path.clone()));
}

fn push_check<R>(
    issues: &mut Issues,
    path: &Path,
    check: &Check<R>,
    code: IssueCode,
    default_message: impl FnOnce() -> String,
) {
    let message = check.message.clone().unwrap_or_else(default_message);
    push(issues, path, code, message);
}

fn invalid_type(issues: &mut Issues, path: &Path, expected: &str, received: ValueKind) {
    push(
        issues,
        path,
        IssueCode::InvalidType,
        format!("Expected {expected}, received {received}"),
    );
}

fn check_string(schema: &StringSchema, input: Value, path: &Path, issues: &mut Issues) -> Option<String> {
    let coerced = if schema.coerce {
        coerce::to_string(input)
    } else {
        match input {
            Value::String(s) => Ok(s),
            other => Err(other.kind()),
        }
    };
    let mut s = match coerced {
        Ok(s) => s,
        Err(received) => {
            invalid_type(issues, path, "string", received);
            return None;
        }
    };

    for check in &schema.checks {
        let len = s.chars().count();
        match &check.rule {
            StringRule::Min(min) if len < *min => {
                push_check(issues, path, check, IssueCode::TooSmall, || {
                    format!("String must contain at least {min} character(s)")
                });
            }
            StringRule::Max(max) if len > *max => {
                push_check(issues, path, check, IssueCode::TooBig, || {
                    format!("String must contain at most {max} character(s)")
                });
            }
            StringRule::Length(exact) if len != *exact => {
                let code = if len < *exact {
                    IssueCode::TooSmall
                } else {
                    IssueCode::TooBig
                };
                push_check(issues, path, check, code, || {
                    format!("String must contain exactly {exact} character(s)")
                });
            }
            StringRule::Email if !format::is_email(&s) => {
                push_check(issues, path, check, IssueCode::InvalidFormat, || "Invalid email".to_string());
            }
            StringRule::Url if !format::is_url(&s) => {
                push_check(issues, path, check, IssueCode::InvalidFormat, || "Invalid url".to_string());
            }
            StringRule::Uuid if !format::is_uuid(&s) => {
                push_check(issues, path, check, IssueCode::InvalidFormat, || "Invalid uuid".to_string());
            }
            StringRule::Pattern(re) if !re.is_match(&s) => {
                push_check(issues, path, check, IssueCode::InvalidFormat, || {
                    format!("String must match pattern /{}/", re.as_str())
                });
            }
            StringRule::StartsWith(prefix) if !s.starts_with(prefix.as_str()) => {
                push_check(issues, path, check, IssueCode::InvalidFormat, || {
                    format!("Invalid input: must start with \"{prefix}\"")
                });
            }
            StringRule::EndsWith(suffix) if !s.ends_with(suffix.as_str()) => {
                push_check(issues, path, check, IssueCode::InvalidFormat, || {
                    format!("Invalid input: must end with \"{suffix}\"")
                });
            }
            StringRule::Includes(needle) if !s.contains(needle.as_str()) => {
                push_check(issues, path, check, IssueCode::InvalidFormat, || {
                    format!("Invalid input: must include \"{needle}\"")
                });
            }
            StringRule::Trim => s = s.trim().to_string(),
            StringRule::ToLowerCase => s = s.to_lowercase(),
            StringRule::ToUpperCase => s = s.to_uppercase(),
            _ => {}
        }
    }
    Some(s)
}

fn check_number(schema: &NumberSchema, input: Value, path: &Path, issues: &mut Issues) -> Option<f64> {
    let coerced = if schema.coerce {
        coerce::to_number(input)
    } else {
        match input {
            Value::Number(n) => Ok(n),
            other => Err(other.kind()),
        }
    };
    let n = match coerced {
        Ok(n) if n.is_nan() => {
            push(issues, path, IssueCode::InvalidType, "Expected number, received nan".to_string());
            return None;
        }
        Ok(n) => n,
        Err(received) => {
            invalid_type(issues, path, "number", received);
            return None;
        }
    };

    for check in &schema.checks {
        match &check.rule {
            NumberRule::Min(min) if n < *min => {
                push_check(issues, path, check, IssueCode::TooSmall, || {
                    format!("Number must be greater than or equal to {}", format_number(*min))
                });
            }
            NumberRule::Max(max) if n > *max => {
                push_check(issues, path, check, IssueCode::TooBig, || {
                    format!("Number must be less than or equal to {}", format_number(*max))
                });
            }
            NumberRule::Gt(bound) if n <= *bound => {
                push_check(issues, path, check, IssueCode::TooSmall, || {
                    format!("Number must be greater than {}", format_number(*bound))
                });
            }
            NumberRule::Lt(bound) if n >= *bound => {
                push_check(issues, path, check, IssueCode::TooBig, || {
                    format!("Number must be less than {}", format_number(*bound))
                });
            }
            NumberRule::Int if n.fract() != 0.0 || !n.is_finite() => {
                push_check(issues, path, check, IssueCode::InvalidType, || {
                    "Expected integer, received float".to_string()
                });
            }
            NumberRule::MultipleOf(step) if !is_multiple_of(n, *step) => {
                push_check(issues, path, check, IssueCode::InvalidFormat, || {
                    format!("Number must be a multiple of {}", format_number(*step))
                });
            }
            NumberRule::Finite if !n.is_finite() => {
                push_check(issues, path, check, IssueCode::InvalidFormat, || {
                    "Number must be finite".to_string()
                });
            }
            _ => {}
        }
    }
    Some(n)
}

/// Remainder test tolerant to binary floating-point error (`0.3 % 0.1`).
fn is_multiple_of(n: f64, step: f64) -> bool {
    if step == 0.0 || !n.is_finite() {
        return false;
    }
    let ratio = n / step;
    (ratio - ratio.round()).abs() < 1e-9
}

fn check_boolean(schema: &BooleanSchema, input: Value, path: &Path, issues: &mut Issues) -> Option<Value> {
    let coerced = if schema.coerce {
        coerce::to_boolean(input)
    } else {
        match input {
            Value::Bool(b) => Ok(b),
            other => Err(other.kind()),
        }
    };
    match coerced {
        Ok(b) => Some(Value::Bool(b)),
        Err(received) => {
            invalid_type(issues, path, "boolean", received);
            None
        }
    }
}

fn check_date(schema: &DateSchema, input: Value, path: &Path, issues: &mut Issues) -> Option<Value> {
    let coerced = if schema.coerce {
        coerce::to_date(input)
    } else {
        match input {
            Value::Date(dt) => Ok(dt),
            other => Err(other.kind()),
        }
    };
    let dt = match coerced {
        Ok(dt) => dt,
        Err(received) => {
            invalid_type(issues, path, "date", received);
            return None;
        }
    };

    for check in &schema.checks {
        match &check.rule {
            DateRule::Min(min) if dt < *min => {
                push_check(issues, path, check, IssueCode::TooSmall, || {
                    format!("Date must be greater than or equal to {}", temporal::to_iso8601(min))
                });
            }
            DateRule::Max(max) if dt > *max => {
                push_check(issues, path, check, IssueCode::TooBig, || {
                    format!("Date must be smaller than or equal to {}", temporal::to_iso8601(max))
                });
            }
            _ => {}
        }
    }
    Some(Value::Date(dt))
}

fn check_object(schema: &ObjectSchema, input: Value, path: &Path, issues: &mut Issues) -> Option<Value> {
    let mut fields = match input {
        Value::Object(fields) => fields,
        other => {
            invalid_type(issues, path, "object", other.kind());
            return None;
        }
    };

    let mut output = IndexMap::with_capacity(schema.fields.len());
    for (name, field_schema) in &schema.fields {
        let field_path = path.child(name.as_str());
        let field_value = match fields.shift_remove(name) {
            Some(value) => value,
            None => match &field_schema.default {
                Some(default) => default.clone(),
                None if field_schema.optional => continue,
                None => {
                    push(issues, &field_path, IssueCode::Required, "Required".to_string());
                    continue;
                }
            },
        };
        if let Some(value) = field_schema.check(field_value, &field_path, issues) {
            output.insert(name.clone(), value);
        }
    }

    match schema.unknown_keys {
        UnknownKeys::Strip => {}
        UnknownKeys::Passthrough => output.extend(fields),
        UnknownKeys::Strict if !fields.is_empty() => {
            let listed: Vec<String> = fields.keys().map(|k| format!("'{k}'")).collect();
            push(
                issues,
                path,
                IssueCode::UnrecognizedKeys,
                format!("Unrecognized key(s) in object: {}", listed.join(", ")),
            );
        }
        UnknownKeys::Strict => {}
    }
    Some(Value::Object(output))
}

fn check_size(schema: &CollectionSchema, count: usize, path: &Path, issues: &mut Issues) {
    let label = schema.kind.label();
    for check in &schema.checks {
        match check.rule {
            SizeRule::Min(min) if count < min => {
                push_check(issues, path, check, IssueCode::TooSmall, || {
                    format!("{label} must contain at least {min} element(s)")
                });
            }
            SizeRule::Max(max) if count > max => {
                push_check(issues, path, check, IssueCode::TooBig, || {
                    format!("{label} must contain at most {max} element(s)")
                });
            }
            SizeRule::Length(exact) if count != exact => {
                let code = if count < exact {
                    IssueCode::TooSmall
                } else {
                    IssueCode::TooBig
                };
                push_check(issues, path, check, code, || {
                    format!("{label} must contain exactly {exact} element(s)")
                });
            }
            _ => {}
        }
    }
}

fn check_elements(
    schema: &CollectionSchema,
    items: Vec<Value>,
    path: &Path,
    issues: &mut Issues,
) -> Vec<Value> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| schema.element.check(item, &path.child(i), issues))
        .collect()
}

fn check_array(schema: &CollectionSchema, input: Value, path: &Path, issues: &mut Issues) -> Option<Value> {
    let items = match input {
        Value::Array(items) => items,
        other => {
            invalid_type(issues, path, "array", other.kind());
            return None;
        }
    };
    check_size(schema, items.len(), path, issues);
    Some(Value::Array(check_elements(schema, items, path, issues)))
}

fn check_set(schema: &CollectionSchema, input: Value, path: &Path, issues: &mut Issues) -> Option<Value> {
    let items = match input {
        Value::Set(items) | Value::Array(items) => dedup(items),
        other => {
            invalid_type(issues, path, "set", other.kind());
            return None;
        }
    };
    check_size(schema, items.len(), path, issues);
    // Element transforms may map distinct inputs onto equal outputs.
    Some(Value::Set(dedup(check_elements(schema, items, path, issues))))
}

/// Drop later duplicates, keeping first-seen order.
///
/// Elements are bucketed by `to_key_string()` so equality is only tested
/// within a bucket (`1` and `"1"` share one). Linear for distinct keys.
fn dedup(items: Vec<Value>) -> Vec<Value> {
    let mut buckets: HashMap<String, Vec<usize>> = HashMap::with_capacity(items.len());
    let mut unique: Vec<Value> = Vec::with_capacity(items.len());
    for item in items {
        let bucket = buckets.entry(item.to_key_string()).or_default();
        if bucket.iter().any(|&i| unique[i] == item) {
            continue;
        }
        bucket.push(unique.len());
        unique.push(item);
    }
    unique
}

/// Key and value issues of an entry are both reported at `[key]`, with the
/// key rendered by `to_key_string()`; keys `1` and `"1"` therefore share a
/// path segment. The issue code and message tell key from value failures.
fn check_map(schema: &MapSchema, input: Value, path: &Path, issues: &mut Issues) -> Option<Value> {
    let entries = match input {
        Value::Map(entries) => entries,
        Value::Object(fields) => fields
            .into_iter()
            .map(|(k, v)| (Value::String(k), v))
            .collect(),
        other => {
            invalid_type(issues, path, "map", other.kind());
            return None;
        }
    };

    let mut output = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let entry_path = path.child(key.to_key_string());
        let key_out = schema.key.check(key, &entry_path, issues);
        let value_out = schema.value.check(value, &entry_path, issues);
        if let (Some(k), Some(v)) = (key_out, value_out) {
            output.push((k, v));
        }
    }
    Some(Value::Map(output))
}


#[cfg(test)]
mod proptests {
    use crate::prelude::*;
    use proptest::prelude::*;

    proptest! {
        /// A string passes `min(lo).max(hi)` exactly when its char count is in range.
        #[test]
        fn string_length_bounds(s in "\\PC{0,30}", lo in 0usize..10, span in 0usize..15) {
            let hi = lo + span;
            let schema = crate::string().min(lo).max(hi).into_schema();
            let len = s.chars().count();
            prop_assert_eq!(schema.parse(s.as_str()).is_ok(), (lo..=hi).contains(&len));
        }

        /// Array issues are reported at the index of each failing element.
        #[test]
        fn array_issue_paths_match_failing_indices(items in proptest::collection::vec(-50i32..50, 0..20)) {
            let schema = crate::array(crate::number().nonnegative()).into_schema();
            let expected: Vec<String> = items
                .iter()
                .enumerate()
                .filter(|(_, n)| **n < 0)
                .map(|(i, _)| format!("[{i}]"))
                .collect();
            let input: Vec<Value> = items.iter().map(|n| Value::from(*n)).collect();
            match schema.parse(input) {
                Ok(_) => prop_assert!(expected.is_empty()),
                Err(err) => {
                    let got: Vec<String> = err.issues().iter().map(|i| i.path.to_string()).collect();
                    prop_assert_eq!(got, expected);
                }
            }
        }

        /// Sets never contain equal elements after validation.
        #[test]
        fn set_output_has_no_duplicates(items in proptest::collection::vec(0i32..5, 0..20)) {
            let schema = crate::set(crate::number()).into_schema();
            let out = schema.parse(Value::from(items.iter().map(|n| Value::from(*n)).collect::<Vec<_>>())).unwrap();
            let elems = out.as_slice().unwrap();
            for (i, a) in elems.iter().enumerate() {
                prop_assert!(!elems[i + 1..].contains(a));
            }
        }
    }
}
