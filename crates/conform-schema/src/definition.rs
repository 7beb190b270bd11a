//! # Schema Definitions
//!
//! A [`SchemaDefinition`] is the serializable form of a [`Schema`], so
//! schemas can live in configuration files instead of code:
//!
//! ```yaml
//! type: object
//! fields:
//!   username:
//!     type: string
//!     checks:
//!       - { check: email, message: "username harus email" }
//!   password:
//!     type: string
//!     checks:
//!       - { check: min, value: 6 }
//!       - { check: max, value: 20 }
//! ```
//!
//! ## Loading Pipeline
//!
//! 1. Read the file; pick the format from the extension (`.yaml`/`.yml`
//!    for YAML, anything else JSON).
//! 2. Convert YAML to a JSON value tree.
//! 3. Check the raw document against the embedded Draft 2020-12
//!    meta-schema (`schemas/definition.schema.json`). Violations are
//!    reported with instance path, schema path and message.
//! 4. Deserialize into `SchemaDefinition`.
//! 5. [`SchemaDefinition::compile`] builds the [`Schema`], rejecting
//!    checks that do not apply to the declared kind.
//!
//! Callbacks cannot be expressed in a definition; the built-in string
//! transforms (`trim`, `to_lower_case`, `to_upper_case`) can.

use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use conform_core::{temporal, ConformError, Value};
use indexmap::IndexMap;
use jsonschema::Validator;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::{
    BooleanSchema, CollectionKind, CollectionSchema, DateSchema, MapSchema, NumberSchema,
    ObjectSchema, Schema, SchemaBuilder, StringSchema, UnknownKeys,
};

const META_SCHEMA: &str = include_str!("../schemas/definition.schema.json");

static META_VALIDATOR: OnceLock<Result<Validator, String>> = OnceLock::new();

/// Error while loading or compiling a schema definition.
#[derive(Error, Debug)]
pub enum DefinitionError {
    /// The definition could not be read or parsed.
    #[error("definition load error for '{source_name}': {reason}")]
    Load {
        /// File path or caller-supplied name of the definition.
        source_name: String,
        /// Reason the definition could not be loaded.
        reason: String,
    },

    /// The definition document does not match the meta-schema.
    #[error("definition '{source_name}' does not match the definition meta-schema:\n{violations}")]
    Invalid {
        /// File path or caller-supplied name of the definition.
        source_name: String,
        /// Structured list of individual violations.
        violations: MetaViolations,
    },

    /// The definition is well-formed but cannot be turned into a schema.
    #[error("cannot compile definition at '{at}': {reason}")]
    Compile {
        /// JSON Pointer to the offending node within the definition.
        at: String,
        /// Reason the node was rejected.
        reason: String,
    },

    /// The embedded meta-schema could not be compiled.
    #[error("meta-schema build error: {0}")]
    MetaSchema(String),
}

impl From<DefinitionError> for ConformError {
    fn from(err: DefinitionError) -> Self {
        ConformError::Definition(err.to_string())
    }
}

/// A single meta-schema violation with structured context.
#[derive(Debug, Clone)]
pub struct MetaViolation {
    /// JSON Pointer path to the violating node in the definition.
    pub instance_path: String,
    /// JSON Pointer path within the meta-schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for MetaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of meta-schema violations.
#[derive(Debug, Clone)]
pub struct MetaViolations {
    violations: Vec<MetaViolation>,
}

impl MetaViolations {
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[MetaViolation] {
        &self.violations
    }
}

impl fmt::Display for MetaViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Schema kind tag of a definition (`type:`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    String,
    Number,
    Boolean,
    Date,
    Object,
    Array,
    Set,
    Map,
}

impl DefinitionKind {
    fn is_primitive(&self) -> bool {
        matches!(self, Self::String | Self::Number | Self::Boolean | Self::Date)
    }
}

/// Name of a built-in check (`check:`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckName {
    Min,
    Max,
    Length,
    Gt,
    Lt,
    Int,
    MultipleOf,
    Finite,
    Email,
    Url,
    Uuid,
    Regex,
    StartsWith,
    EndsWith,
    Includes,
    Trim,
    ToLowerCase,
    ToUpperCase,
}

impl CheckName {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
            Self::Length => "length",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Int => "int",
            Self::MultipleOf => "multiple_of",
            Self::Finite => "finite",
            Self::Email => "email",
            Self::Url => "url",
            Self::Uuid => "uuid",
            Self::Regex => "regex",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::Includes => "includes",
            Self::Trim => "trim",
            Self::ToLowerCase => "to_lower_case",
            Self::ToUpperCase => "to_upper_case",
        }
    }
}

/// One check entry: `{ check: min, value: 6, message: "..." }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckDefinition {
    pub check: CheckName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn is_strip(policy: &UnknownKeys) -> bool {
    *policy == UnknownKeys::Strip
}

/// Serializable description of a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDefinition {
    #[serde(rename = "type")]
    pub kind: DefinitionKind,
    #[serde(default, skip_serializing_if = "is_false")]
    pub coerce: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<CheckDefinition>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub fields: IndexMap<String, SchemaDefinition>,
    #[serde(default, skip_serializing_if = "is_strip")]
    pub unknown_keys: UnknownKeys,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<Box<SchemaDefinition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Box<SchemaDefinition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Box<SchemaDefinition>>,
}

impl SchemaDefinition {
    /// Load a definition from a `.json`, `.yaml` or `.yml` file.
    ///
    /// # Errors
    ///
    /// [`DefinitionError::Load`] if the file cannot be read or parsed,
    /// [`DefinitionError::Invalid`] if it does not match the meta-schema.
    pub fn from_path(path: &Path) -> Result<Self, DefinitionError> {
        let source_name = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| DefinitionError::Load {
            source_name: source_name.clone(),
            reason: format!("cannot read file: {e}"),
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let json_value = match ext {
            "yaml" | "yml" => parse_yaml(&content, &source_name)?,
            _ => serde_json::from_str(&content).map_err(|e| DefinitionError::Load {
                source_name: source_name.clone(),
                reason: format!("invalid JSON: {e}"),
            })?,
        };
        Self::from_json_value(json_value, &source_name)
    }

    /// Parse a YAML document (JSON is a subset of YAML).
    pub fn from_yaml_str(content: &str, source_name: &str) -> Result<Self, DefinitionError> {
        let json_value = parse_yaml(content, source_name)?;
        Self::from_json_value(json_value, source_name)
    }

    /// Check a JSON value against the meta-schema, then deserialize it.
    pub fn from_json_value(
        json_value: serde_json::Value,
        source_name: &str,
    ) -> Result<Self, DefinitionError> {
        check_meta_schema(&json_value, source_name)?;
        serde_json::from_value(json_value).map_err(|e| DefinitionError::Load {
            source_name: source_name.to_string(),
            reason: format!("definition shape error: {e}"),
        })
    }

    /// Build the [`Schema`] this definition describes.
    ///
    /// # Errors
    ///
    /// [`DefinitionError::Compile`] naming the offending node when a check
    /// does not apply to its kind, a check value has the wrong type, a
    /// regex does not compile, or a kind-specific member is misplaced.
    pub fn compile(&self) -> Result<Schema, DefinitionError> {
        self.compile_at("")
    }

    fn compile_at(&self, at: &str) -> Result<Schema, DefinitionError> {
        if self.coerce && !self.kind.is_primitive() {
            return Err(compile_error(at, "coerce applies only to string, number, boolean and date"));
        }
        let expects_fields = self.kind == DefinitionKind::Object;
        let expects_element = matches!(self.kind, DefinitionKind::Array | DefinitionKind::Set);
        let expects_entries = self.kind == DefinitionKind::Map;
        if !expects_fields && (!self.fields.is_empty() || !is_strip(&self.unknown_keys)) {
            return Err(compile_error(at, "fields and unknown_keys apply only to objects"));
        }
        if !expects_element && self.element.is_some() {
            return Err(compile_error(at, "element applies only to arrays and sets"));
        }
        if !expects_entries && (self.key.is_some() || self.value.is_some()) {
            return Err(compile_error(at, "key and value apply only to maps"));
        }

        let mut schema: Schema = match self.kind {
            DefinitionKind::String => self.compile_string(at)?.into(),
            DefinitionKind::Number => self.compile_number(at)?.into(),
            DefinitionKind::Boolean => {
                self.reject_checks(at)?;
                let mut s = BooleanSchema::new();
                if self.coerce {
                    s = s.coerce();
                }
                s.into()
            }
            DefinitionKind::Date => self.compile_date(at)?.into(),
            DefinitionKind::Object => {
                self.reject_checks(at)?;
                let mut obj = ObjectSchema::new().unknown_keys(self.unknown_keys);
                for (name, field) in &self.fields {
                    let field_at = format!("{at}/fields/{}", escape_pointer(name));
                    obj = obj.field(name.clone(), field.compile_at(&field_at)?);
                }
                obj.into()
            }
            DefinitionKind::Array | DefinitionKind::Set => self.compile_collection(at)?.into(),
            DefinitionKind::Map => {
                self.reject_checks(at)?;
                let (key, value) = match (&self.key, &self.value) {
                    (Some(key), Some(value)) => (key, value),
                    _ => return Err(compile_error(at, "map requires key and value")),
                };
                MapSchema::new(
                    key.compile_at(&format!("{at}/key"))?,
                    value.compile_at(&format!("{at}/value"))?,
                )
                .into()
            }
        };

        if self.optional {
            schema = schema.optional();
        }
        if self.nullable {
            schema = schema.nullable();
        }
        if let Some(default) = &self.default {
            schema = schema.with_default(self.default_value(default, at)?);
        }
        if let Some(description) = &self.description {
            schema = schema.describe(description.clone());
        }
        Ok(schema)
    }

    fn compile_string(&self, at: &str) -> Result<StringSchema, DefinitionError> {
        let mut s = StringSchema::new();
        if self.coerce {
            s = s.coerce();
        }
        for (i, check) in self.checks.iter().enumerate() {
            let check_at = format!("{at}/checks/{i}");
            s = match check.check {
                CheckName::Min => s.min(usize_value(check, &check_at)?),
                CheckName::Max => s.max(usize_value(check, &check_at)?),
                CheckName::Length => s.length(usize_value(check, &check_at)?),
                CheckName::Email => s.email(),
                CheckName::Url => s.url(),
                CheckName::Uuid => s.uuid(),
                CheckName::Regex => {
                    let pattern = str_value(check, &check_at)?;
                    let re = Regex::new(pattern)
                        .map_err(|e| compile_error(&check_at, &format!("invalid regex: {e}")))?;
                    s.regex(re)
                }
                CheckName::StartsWith => s.starts_with(str_value(check, &check_at)?),
                CheckName::EndsWith => s.ends_with(str_value(check, &check_at)?),
                CheckName::Includes => s.includes(str_value(check, &check_at)?),
                CheckName::Trim => s.trim(),
                CheckName::ToLowerCase => s.to_lower_case(),
                CheckName::ToUpperCase => s.to_upper_case(),
                other => return Err(not_applicable(&check_at, other, "string")),
            };
            if let Some(message) = &check.message {
                s = s.message(message.clone());
            }
        }
        Ok(s)
    }

    fn compile_number(&self, at: &str) -> Result<NumberSchema, DefinitionError> {
        let mut s = NumberSchema::new();
        if self.coerce {
            s = s.coerce();
        }
        for (i, check) in self.checks.iter().enumerate() {
            let check_at = format!("{at}/checks/{i}");
            s = match check.check {
                CheckName::Min => s.min(f64_value(check, &check_at)?),
                CheckName::Max => s.max(f64_value(check, &check_at)?),
                CheckName::Gt => s.gt(f64_value(check, &check_at)?),
                CheckName::Lt => s.lt(f64_value(check, &check_at)?),
                CheckName::MultipleOf => s.multiple_of(f64_value(check, &check_at)?),
                CheckName::Int => s.int(),
                CheckName::Finite => s.finite(),
                other => return Err(not_applicable(&check_at, other, "number")),
            };
            if let Some(message) = &check.message {
                s = s.message(message.clone());
            }
        }
        Ok(s)
    }

    fn compile_date(&self, at: &str) -> Result<DateSchema, DefinitionError> {
        let mut s = DateSchema::new();
        if self.coerce {
            s = s.coerce();
        }
        for (i, check) in self.checks.iter().enumerate() {
            let check_at = format!("{at}/checks/{i}");
            s = match check.check {
                CheckName::Min => s.min(date_value(check, &check_at)?),
                CheckName::Max => s.max(date_value(check, &check_at)?),
                other => return Err(not_applicable(&check_at, other, "date")),
            };
            if let Some(message) = &check.message {
                s = s.message(message.clone());
            }
        }
        Ok(s)
    }

    fn compile_collection(&self, at: &str) -> Result<CollectionSchema, DefinitionError> {
        let (kind, label) = match self.kind {
            DefinitionKind::Set => (CollectionKind::Set, "set"),
            _ => (CollectionKind::Array, "array"),
        };
        let element = self
            .element
            .as_ref()
            .ok_or_else(|| compile_error(at, &format!("{label} requires element")))?;
        let mut s = CollectionSchema::new(kind, element.compile_at(&format!("{at}/element"))?);
        for (i, check) in self.checks.iter().enumerate() {
            let check_at = format!("{at}/checks/{i}");
            s = match check.check {
                CheckName::Min => s.min(usize_value(check, &check_at)?),
                CheckName::Max => s.max(usize_value(check, &check_at)?),
                CheckName::Length => s.length(usize_value(check, &check_at)?),
                other => return Err(not_applicable(&check_at, other, label)),
            };
            if let Some(message) = &check.message {
                s = s.message(message.clone());
            }
        }
        Ok(s)
    }

    fn reject_checks(&self, at: &str) -> Result<(), DefinitionError> {
        match self.checks.first() {
            Some(check) => Err(not_applicable(
                &format!("{at}/checks/0"),
                check.check,
                kind_label(self.kind),
            )),
            None => Ok(()),
        }
    }

    /// Date defaults may be written as ISO strings; everything else is
    /// taken verbatim.
    fn default_value(&self, default: &serde_json::Value, at: &str) -> Result<Value, DefinitionError> {
        match (self.kind, default) {
            (DefinitionKind::Date, serde_json::Value::String(s)) => temporal::parse_date(s)
                .map(Value::Date)
                .map_err(|e| compile_error(&format!("{at}/default"), &e.to_string())),
            _ => Ok(Value::from(default.clone())),
        }
    }
}

/// Load and compile a definition file in one step.
pub fn load_schema(path: &Path) -> Result<Schema, DefinitionError> {
    SchemaDefinition::from_path(path)?.compile()
}

fn kind_label(kind: DefinitionKind) -> &'static str {
    match kind {
        DefinitionKind::String => "string",
        DefinitionKind::Number => "number",
        DefinitionKind::Boolean => "boolean",
        DefinitionKind::Date => "date",
        DefinitionKind::Object => "object",
        DefinitionKind::Array => "array",
        DefinitionKind::Set => "set",
        DefinitionKind::Map => "map",
    }
}

fn compile_error(at: &str, reason: &str) -> DefinitionError {
    DefinitionError::Compile {
        at: if at.is_empty() { "/".to_string() } else { at.to_string() },
        reason: reason.to_string(),
    }
}

fn not_applicable(at: &str, check: CheckName, kind: &str) -> DefinitionError {
    compile_error(at, &format!("check '{}' does not apply to {kind}", check.as_str()))
}

fn usize_value(check: &CheckDefinition, at: &str) -> Result<usize, DefinitionError> {
    check
        .value
        .as_ref()
        .and_then(serde_json::Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| compile_error(at, "value must be a non-negative integer"))
}

fn f64_value(check: &CheckDefinition, at: &str) -> Result<f64, DefinitionError> {
    check
        .value
        .as_ref()
        .and_then(serde_json::Value::as_f64)
        .ok_or_else(|| compile_error(at, "value must be a number"))
}

fn str_value<'a>(check: &'a CheckDefinition, at: &str) -> Result<&'a str, DefinitionError> {
    check
        .value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| compile_error(at, "value must be a string"))
}

fn date_value(check: &CheckDefinition, at: &str) -> Result<chrono::DateTime<chrono::Utc>, DefinitionError> {
    match &check.value {
        Some(serde_json::Value::String(s)) => {
            temporal::parse_date(s).map_err(|e| compile_error(at, &e.to_string()))
        }
        Some(serde_json::Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| compile_error(at, "value must be a date"))
            .and_then(|millis| {
                temporal::from_epoch_millis(millis).map_err(|e| compile_error(at, &e.to_string()))
            }),
        _ => Err(compile_error(at, "value must be an ISO 8601 date or epoch milliseconds")),
    }
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn meta_validator() -> Result<&'static Validator, DefinitionError> {
    META_VALIDATOR
        .get_or_init(|| {
            let schema: serde_json::Value =
                serde_json::from_str(META_SCHEMA).map_err(|e| format!("invalid JSON: {e}"))?;
            let mut opts = jsonschema::options();
            opts.with_draft(jsonschema::Draft::Draft202012);
            opts.build(&schema).map_err(|e| e.to_string())
        })
        .as_ref()
        .map_err(|reason| DefinitionError::MetaSchema(reason.clone()))
}

fn check_meta_schema(instance: &serde_json::Value, source_name: &str) -> Result<(), DefinitionError> {
    let validator = meta_validator()?;
    let violations: Vec<MetaViolation> = validator
        .iter_errors(instance)
        .map(|e| MetaViolation {
            instance_path: e.instance_path.to_string(),
            schema_path: e.schema_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        tracing::debug!(
            source = source_name,
            violations = violations.len(),
            "definition rejected by meta-schema"
        );
        Err(DefinitionError::Invalid {
            source_name: source_name.to_string(),
            violations: MetaViolations { violations },
        })
    }
}

fn parse_yaml(content: &str, source_name: &str) -> Result<serde_json::Value, DefinitionError> {
    let yaml_value: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| DefinitionError::Load {
            source_name: source_name.to_string(),
            reason: format!("invalid YAML: {e}"),
        })?;
    yaml_to_json_value(&yaml_value).map_err(|e| DefinitionError::Load {
        source_name: source_name.to_string(),
        reason: format!("YAML-to-JSON conversion failed: {e}"),
    })
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Definitions use only the JSON-compatible subset of YAML. Tags are
/// dropped; scalar map keys are rendered as strings.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<serde_json::Value, String> {
    use serde_json::Value as Json;
    match yaml {
        serde_yaml::Value::Null => Ok(Json::Null),
        serde_yaml::Value::Bool(b) => Ok(Json::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Json::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Json::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Json::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Json::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Json>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(Json::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Json::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conform_core::IssueCode;
    use serde_json::json;

    const LOGIN_YAML: &str = r#"
type: object
fields:
  username:
    type: string
    checks:
      - { check: email, message: "username harus email" }
  password:
    type: string
    checks:
      - { check: min, value: 6, message: "password min harus 6 karakter" }
      - { check: max, value: 20, message: "password max harus 20 karakter" }
"#;

    #[test]
    fn test_meta_schema_compiles() {
        assert!(meta_validator().is_ok());
    }

    #[test]
    fn test_yaml_definition_compiles_and_validates() {
        let def = SchemaDefinition::from_yaml_str(LOGIN_YAML, "login.yaml").unwrap();
        let schema = def.compile().unwrap();
        let err = schema
            .parse(json!({"username": "dani", "password": "12"}))
            .unwrap_err();
        let messages: Vec<&str> = err.issues().iter().map(|i| i.message.as_str()).collect();
        assert_eq!(messages, vec!["username harus email", "password min harus 6 karakter"]);
    }

    #[test]
    fn test_meta_schema_rejects_unknown_kind() {
        let err = SchemaDefinition::from_json_value(json!({"type": "tuple"}), "inline").unwrap_err();
        match err {
            DefinitionError::Invalid { violations, .. } => {
                assert!(!violations.is_empty());
                assert_eq!(violations.violations()[0].instance_path, "/type");
            }
            other => panic!("Expected Invalid, got: {other}"),
        }
    }

    #[test]
    fn test_meta_schema_requires_array_element() {
        let err = SchemaDefinition::from_json_value(json!({"type": "array"}), "inline").unwrap_err();
        assert!(matches!(err, DefinitionError::Invalid { .. }), "got: {err}");
    }

    #[test]
    fn test_meta_schema_rejects_unknown_member() {
        let err = SchemaDefinition::from_json_value(
            json!({"type": "string", "minLength": 3}),
            "inline",
        )
        .unwrap_err();
        assert!(matches!(err, DefinitionError::Invalid { .. }), "got: {err}");
    }

    #[test]
    fn test_compile_rejects_inapplicable_check() {
        let def = SchemaDefinition::from_json_value(
            json!({"type": "number", "checks": [{"check": "email"}]}),
            "inline",
        )
        .unwrap();
        match def.compile().unwrap_err() {
            DefinitionError::Compile { at, reason } => {
                assert_eq!(at, "/checks/0");
                assert!(reason.contains("'email' does not apply to number"));
            }
            other => panic!("Expected Compile, got: {other}"),
        }
    }

    #[test]
    fn test_compile_reports_nested_location() {
        let def = SchemaDefinition::from_json_value(
            json!({
                "type": "object",
                "fields": {
                    "address": {
                        "type": "object",
                        "fields": {"zip": {"type": "string", "checks": [{"check": "max", "value": "ten"}]}}
                    }
                }
            }),
            "inline",
        )
        .unwrap();
        match def.compile().unwrap_err() {
            DefinitionError::Compile { at, .. } => {
                assert_eq!(at, "/fields/address/fields/zip/checks/0");
            }
            other => panic!("Expected Compile, got: {other}"),
        }
    }

    #[test]
    fn test_compile_rejects_bad_regex() {
        let def = SchemaDefinition::from_json_value(
            json!({"type": "string", "checks": [{"check": "regex", "value": "("}]}),
            "inline",
        )
        .unwrap();
        assert!(matches!(def.compile(), Err(DefinitionError::Compile { .. })));
    }

    #[test]
    fn test_compile_rejects_coerce_on_composite() {
        let def = SchemaDefinition::from_json_value(
            json!({"type": "object", "coerce": true}),
            "inline",
        )
        .unwrap();
        assert!(matches!(def.compile(), Err(DefinitionError::Compile { .. })));
    }

    #[test]
    fn test_date_definition_with_bounds_and_coercion() {
        let def = SchemaDefinition::from_json_value(
            json!({
                "type": "date",
                "coerce": true,
                "checks": [
                    {"check": "min", "value": "1980-01-01"},
                    {"check": "max", "value": "2020-01-01"}
                ]
            }),
            "inline",
        )
        .unwrap();
        let schema = def.compile().unwrap();
        assert!(schema.parse("1990-06-15").is_ok());
        let err = schema.parse("1975-01-01").unwrap_err();
        assert_eq!(err.issues().issues()[0].code, IssueCode::TooSmall);
    }

    #[test]
    fn test_set_and_map_definitions() {
        let set_def = SchemaDefinition::from_json_value(
            json!({"type": "set", "element": {"type": "string", "checks": [{"check": "email"}]}, "checks": [{"check": "min", "value": 1}]}),
            "inline",
        )
        .unwrap();
        let out = set_def
            .compile()
            .unwrap()
            .parse(json!(["dian@example.com", "dian@example.com"]))
            .unwrap();
        assert_eq!(out.len(), Some(1));

        let map_def = SchemaDefinition::from_json_value(
            json!({"type": "map", "key": {"type": "string"}, "value": {"type": "number", "coerce": true}}),
            "inline",
        )
        .unwrap();
        let out = map_def.compile().unwrap().parse(json!({"a": "1"})).unwrap();
        assert_eq!(out.get("a"), Some(&Value::from(1)));
    }

    #[test]
    fn test_modifiers_carry_over() {
        let def = SchemaDefinition::from_json_value(
            json!({
                "type": "object",
                "unknown_keys": "strict",
                "fields": {
                    "role": {"type": "string", "default": "member"},
                    "nickname": {"type": "string", "optional": true},
                    "note": {"type": "string", "nullable": true, "description": "free text"}
                }
            }),
            "inline",
        )
        .unwrap();
        let schema = def.compile().unwrap();
        let out = schema.parse(json!({"note": null})).unwrap();
        assert_eq!(out.to_json(), json!({"role": "member", "note": null}));
        assert!(schema.parse(json!({"note": null, "extra": 1})).is_err());
    }

    #[test]
    fn test_definition_serializes_compactly() {
        let def = SchemaDefinition::from_yaml_str(LOGIN_YAML, "login.yaml").unwrap();
        let json = serde_json::to_value(&def).unwrap();
        assert!(json.get("coerce").is_none());
        assert!(json.get("unknown_keys").is_none());
        let back = SchemaDefinition::from_json_value(json, "roundtrip").unwrap();
        assert_eq!(back, def);
    }

    #[test]
    fn test_from_path_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();
        let yaml_path = dir.path().join("login.yaml");
        std::fs::write(&yaml_path, LOGIN_YAML).unwrap();
        assert!(load_schema(&yaml_path).is_ok());

        let json_path = dir.path().join("price.json");
        std::fs::write(&json_path, r#"{"type": "number", "checks": [{"check": "min", "value": 1000}]}"#).unwrap();
        let schema = load_schema(&json_path).unwrap();
        assert!(schema.parse(999).is_err());

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            SchemaDefinition::from_path(&missing),
            Err(DefinitionError::Load { .. })
        ));
    }

    #[test]
    fn test_yaml_to_json_conversion() {
        let yaml_value: serde_yaml::Value = serde_yaml::from_str("a: 1\nb: [x, true]\n3: three\n").unwrap();
        let json_value = yaml_to_json_value(&yaml_value).unwrap();
        assert_eq!(json_value["a"], 1);
        assert_eq!(json_value["b"][1], true);
        assert_eq!(json_value["3"], "three");
    }

    #[test]
    fn test_definition_error_into_conform_error() {
        let err: ConformError = DefinitionError::MetaSchema("boom".to_string()).into();
        assert!(matches!(err, ConformError::Definition(_)));
    }
}
