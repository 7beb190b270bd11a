//! # Schema Types and Builders
//!
//! A [`Schema`] is a tagged description of an expected value: its
//! [`SchemaKind`], the constraints attached to that kind, and the
//! modifiers shared by every kind (optional, nullable, default,
//! transforms).
//!
//! Each kind has its own builder ([`StringSchema`], [`NumberSchema`],
//! [`ObjectSchema`], ...) carrying only the constraints that make sense for
//! it. Builders convert into `Schema` with `From`, and the
//! [`SchemaBuilder`] trait lifts the shared modifiers onto every builder:
//!
//! ```
//! use conform_schema::prelude::*;
//!
//! let login = conform_schema::object()
//!     .field("username", conform_schema::string().email())
//!     .field("password", conform_schema::string().min(6).max(20));
//! assert!(login.into_schema().parse(serde_json::json!({
//!     "username": "dani@test.com",
//!     "password": "rahasia",
//! })).is_ok());
//! ```
//!
//! ## Immutability
//!
//! Builder methods consume `self` and return the extended builder; a
//! schema that has been embedded in another (as an object field, an
//! array element, ...) is cloned, never mutated. Transform callbacks are
//! shared through `Arc`, so cloning a schema is cheap and schemas are
//! `Send + Sync`.

use chrono::{DateTime, Utc};
use conform_core::Value;
use regex::Regex;

use crate::refine::{Effect, RefinementCtx};

/// A single constraint with an optional caller-supplied message.
#[derive(Debug, Clone)]
pub struct Check<R> {
    pub rule: R,
    pub message: Option<String>,
}

impl<R> Check<R> {
    fn new(rule: R) -> Self {
        Self { rule, message: None }
    }
}

fn push_rule<R>(checks: &mut Vec<Check<R>>, rule: R) {
    checks.push(Check::new(rule));
}

fn set_last_message<R>(checks: &mut [Check<R>], message: String) {
    if let Some(last) = checks.last_mut() {
        last.message = Some(message);
    }
}

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

/// String constraints and in-pipeline string transforms, applied in order.
#[derive(Debug, Clone)]
pub enum StringRule {
    /// Minimum length in characters.
    Min(usize),
    /// Maximum length in characters.
    Max(usize),
    /// Exact length in characters.
    Length(usize),
    Email,
    Url,
    Uuid,
    Pattern(Regex),
    StartsWith(String),
    EndsWith(String),
    Includes(String),
    Trim,
    ToLowerCase,
    ToUpperCase,
}

#[derive(Debug, Clone, Default)]
pub struct StringSchema {
    pub(crate) coerce: bool,
    pub(crate) checks: Vec<Check<StringRule>>,
}

impl StringSchema {
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Convert non-string primitives to their string form before checking.
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    pub fn min(mut self, len: usize) -> Self {
        push_rule(&mut self.checks, StringRule::Min(len));
        self
    }

    pub fn max(mut self, len: usize) -> Self {
        push_rule(&mut self.checks, StringRule::Max(len));
        self
    }

    pub fn length(mut self, len: usize) -> Self {
        push_rule(&mut self.checks, StringRule::Length(len));
        self
    }

    /// Shorthand for `min(1)`.
    pub fn nonempty(self) -> Self {
        self.min(1)
    }

    pub fn email(mut self) -> Self {
        push_rule(&mut self.checks, StringRule::Email);
        self
    }

    pub fn url(mut self) -> Self {
        push_rule(&mut self.checks, StringRule::Url);
        self
    }

    pub fn uuid(mut self) -> Self {
        push_rule(&mut self.checks, StringRule::Uuid);
        self
    }

    /// Require the whole string to match `pattern` somewhere (unanchored
    /// unless the pattern anchors itself).
    pub fn regex(mut self, pattern: Regex) -> Self {
        push_rule(&mut self.checks, StringRule::Pattern(pattern));
        self
    }

    pub fn starts_with(mut self, prefix: impl Into<String>) -> Self {
        push_rule(&mut self.checks, StringRule::StartsWith(prefix.into()));
        self
    }

    pub fn ends_with(mut self, suffix: impl Into<String>) -> Self {
        push_rule(&mut self.checks, StringRule::EndsWith(suffix.into()));
        self
    }

    pub fn includes(mut self, needle: impl Into<String>) -> Self {
        push_rule(&mut self.checks, StringRule::Includes(needle.into()));
        self
    }

    /// Trim surrounding whitespace. Later checks see the trimmed string.
    pub fn trim(mut self) -> Self {
        push_rule(&mut self.checks, StringRule::Trim);
        self
    }

    pub fn to_lower_case(mut self) -> Self {
        push_rule(&mut self.checks, StringRule::ToLowerCase);
        self
    }

    pub fn to_upper_case(mut self) -> Self {
        push_rule(&mut self.checks, StringRule::ToUpperCase);
        self
    }

    /// Replace the default message of the most recently added check.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        set_last_message(&mut self.checks, message.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum NumberRule {
    /// Inclusive lower bound.
    Min(f64),
    /// Inclusive upper bound.
    Max(f64),
    /// Exclusive lower bound.
    Gt(f64),
    /// Exclusive upper bound.
    Lt(f64),
    Int,
    MultipleOf(f64),
    Finite,
}

#[derive(Debug, Clone, Default)]
pub struct NumberSchema {
    pub(crate) coerce: bool,
    pub(crate) checks: Vec<Check<NumberRule>>,
}

impl NumberSchema {
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Convert numeric strings, booleans and dates to numbers before checking.
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    /// Inclusive lower bound (alias: [`gte`](Self::gte)).
    pub fn min(mut self, bound: f64) -> Self {
        push_rule(&mut self.checks, NumberRule::Min(bound));
        self
    }

    /// Inclusive upper bound (alias: [`lte`](Self::lte)).
    pub fn max(mut self, bound: f64) -> Self {
        push_rule(&mut self.checks, NumberRule::Max(bound));
        self
    }

    pub fn gte(self, bound: f64) -> Self {
        self.min(bound)
    }

    pub fn lte(self, bound: f64) -> Self {
        self.max(bound)
    }

    pub fn gt(mut self, bound: f64) -> Self {
        push_rule(&mut self.checks, NumberRule::Gt(bound));
        self
    }

    pub fn lt(mut self, bound: f64) -> Self {
        push_rule(&mut self.checks, NumberRule::Lt(bound));
        self
    }

    pub fn positive(self) -> Self {
        self.gt(0.0)
    }

    pub fn nonnegative(self) -> Self {
        self.min(0.0)
    }

    pub fn negative(self) -> Self {
        self.lt(0.0)
    }

    pub fn nonpositive(self) -> Self {
        self.max(0.0)
    }

    pub fn int(mut self) -> Self {
        push_rule(&mut self.checks, NumberRule::Int);
        self
    }

    pub fn multiple_of(mut self, step: f64) -> Self {
        push_rule(&mut self.checks, NumberRule::MultipleOf(step));
        self
    }

    pub fn finite(mut self) -> Self {
        push_rule(&mut self.checks, NumberRule::Finite);
        self
    }

    /// Replace the default message of the most recently added check.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        set_last_message(&mut self.checks, message.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Booleans and dates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct BooleanSchema {
    pub(crate) coerce: bool,
}

impl BooleanSchema {
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Accept `"true"`/`"false"`/`"1"`/`"0"` strings and numbers.
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DateRule {
    /// Inclusive earliest instant.
    Min(DateTime<Utc>),
    /// Inclusive latest instant.
    Max(DateTime<Utc>),
}

#[derive(Debug, Clone, Default)]
pub struct DateSchema {
    pub(crate) coerce: bool,
    pub(crate) checks: Vec<Check<DateRule>>,
}

impl DateSchema {
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Accept ISO 8601 strings and epoch-millisecond numbers.
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    pub fn min(mut self, earliest: DateTime<Utc>) -> Self {
        push_rule(&mut self.checks, DateRule::Min(earliest));
        self
    }

    pub fn max(mut self, latest: DateTime<Utc>) -> Self {
        push_rule(&mut self.checks, DateRule::Max(latest));
        self
    }

    /// Replace the default message of the most recently added check.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        set_last_message(&mut self.checks, message.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Arrays and sets
// ---------------------------------------------------------------------------

/// Element-count constraints for arrays and sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeRule {
    Min(usize),
    Max(usize),
    Length(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Array,
    /// Equal elements are collapsed before size checks.
    Set,
}

impl CollectionKind {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Array => "Array",
            Self::Set => "Set",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CollectionSchema {
    pub(crate) kind: CollectionKind,
    pub(crate) element: Box<Schema>,
    pub(crate) checks: Vec<Check<SizeRule>>,
}

impl CollectionSchema {
    pub fn new(kind: CollectionKind, element: impl Into<Schema>) -> Self {
        Self {
            kind,
            element: Box::new(element.into()),
            checks: Vec::new(),
        }
    }

    pub fn min(mut self, count: usize) -> Self {
        push_rule(&mut self.checks, SizeRule::Min(count));
        self
    }

    pub fn max(mut self, count: usize) -> Self {
        push_rule(&mut self.checks, SizeRule::Max(count));
        self
    }

    pub fn length(mut self, count: usize) -> Self {
        push_rule(&mut self.checks, SizeRule::Length(count));
        self
    }

    /// Shorthand for `min(1)`.
    pub fn nonempty(self) -> Self {
        self.min(1)
    }

    /// Replace the default message of the most recently added check.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        set_last_message(&mut self.checks, message.into());
        self
    }

    pub fn element(&self) -> &Schema {
        &self.element
    }
}

// ---------------------------------------------------------------------------
// Maps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MapSchema {
    pub(crate) key: Box<Schema>,
    pub(crate) value: Box<Schema>,
}

impl MapSchema {
    pub fn new(key: impl Into<Schema>, value: impl Into<Schema>) -> Self {
        Self {
            key: Box::new(key.into()),
            value: Box::new(value.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Objects
// ---------------------------------------------------------------------------

/// What an object schema does with input keys it does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownKeys {
    /// Drop them from the output.
    #[default]
    Strip,
    /// Report a single `unrecognized_keys` issue listing them.
    Strict,
    /// Copy them to the output unvalidated.
    Passthrough,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    pub(crate) fields: Vec<(String, Schema)>,
    pub(crate) unknown_keys: UnknownKeys,
}

impl ObjectSchema {
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Declare a field. Redeclaring a name replaces the earlier schema in place.
    pub fn field(mut self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        let name = name.into();
        let schema = schema.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = schema,
            None => self.fields.push((name, schema)),
        }
        self
    }

    pub fn strict(mut self) -> Self {
        self.unknown_keys = UnknownKeys::Strict;
        self
    }

    pub fn strip(mut self) -> Self {
        self.unknown_keys = UnknownKeys::Strip;
        self
    }

    pub fn passthrough(mut self) -> Self {
        self.unknown_keys = UnknownKeys::Passthrough;
        self
    }

    pub fn unknown_keys(mut self, policy: UnknownKeys) -> Self {
        self.unknown_keys = policy;
        self
    }

    /// Add (or override) every field of `other`. The unknown-key policy of
    /// `self` is kept.
    pub fn extend(self, other: ObjectSchema) -> Self {
        other
            .fields
            .into_iter()
            .fold(self, |acc, (name, schema)| acc.field(name, schema))
    }

    /// Keep only the named fields.
    pub fn pick(mut self, names: &[&str]) -> Self {
        self.fields.retain(|(name, _)| names.contains(&name.as_str()));
        self
    }

    /// Drop the named fields.
    pub fn omit(mut self, names: &[&str]) -> Self {
        self.fields.retain(|(name, _)| !names.contains(&name.as_str()));
        self
    }

    /// Mark every field optional.
    pub fn partial(mut self) -> Self {
        for (_, schema) in &mut self.fields {
            schema.optional = true;
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, schema)| schema)
    }

    /// Declared field names in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// The kind of value a schema accepts, with its kind-specific constraints.
#[derive(Debug, Clone)]
pub enum SchemaKind {
    String(StringSchema),
    Number(NumberSchema),
    Boolean(BooleanSchema),
    Date(DateSchema),
    Object(ObjectSchema),
    Array(CollectionSchema),
    Set(CollectionSchema),
    Map(MapSchema),
}

impl SchemaKind {
    /// Lower-case kind name used in messages and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
            Self::Date(_) => "date",
            Self::Object(_) => "object",
            Self::Array(_) => "array",
            Self::Set(_) => "set",
            Self::Map(_) => "map",
        }
    }
}

/// A complete, immutable schema.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) kind: SchemaKind,
    pub(crate) optional: bool,
    pub(crate) nullable: bool,
    pub(crate) default: Option<Value>,
    pub(crate) description: Option<String>,
    pub(crate) effects: Vec<Effect>,
}

impl Schema {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            optional: false,
            nullable: false,
            default: None,
            description: None,
            effects: Vec::new(),
        }
    }

    pub fn kind(&self) -> &SchemaKind {
        &self.kind
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Number of transforms and refinements attached.
    pub fn effect_count(&self) -> usize {
        self.effects.len()
    }
}

impl From<SchemaKind> for Schema {
    fn from(kind: SchemaKind) -> Self {
        Self::new(kind)
    }
}

impl From<StringSchema> for Schema {
    fn from(s: StringSchema) -> Self {
        Self::new(SchemaKind::String(s))
    }
}

impl From<NumberSchema> for Schema {
    fn from(s: NumberSchema) -> Self {
        Self::new(SchemaKind::Number(s))
    }
}

impl From<BooleanSchema> for Schema {
    fn from(s: BooleanSchema) -> Self {
        Self::new(SchemaKind::Boolean(s))
    }
}

impl From<DateSchema> for Schema {
    fn from(s: DateSchema) -> Self {
        Self::new(SchemaKind::Date(s))
    }
}

impl From<ObjectSchema> for Schema {
    fn from(s: ObjectSchema) -> Self {
        Self::new(SchemaKind::Object(s))
    }
}

impl From<CollectionSchema> for Schema {
    fn from(s: CollectionSchema) -> Self {
        match s.kind {
            CollectionKind::Array => Self::new(SchemaKind::Array(s)),
            CollectionKind::Set => Self::new(SchemaKind::Set(s)),
        }
    }
}

impl From<MapSchema> for Schema {
    fn from(s: MapSchema) -> Self {
        Self::new(SchemaKind::Map(s))
    }
}

/// Modifiers shared by every schema kind.
///
/// Implemented for [`Schema`] and every builder that converts into it, so
/// `string().min(3).optional()` and `object().field(..).transform(..)`
/// both read naturally. Each modifier returns a finished [`Schema`].
pub trait SchemaBuilder: Into<Schema> + Sized {
    fn into_schema(self) -> Schema {
        self.into()
    }

    /// A missing object field is accepted and omitted from the output.
    fn optional(self) -> Schema {
        let mut schema = self.into();
        schema.optional = true;
        schema
    }

    /// `null` is accepted and returned as-is.
    fn nullable(self) -> Schema {
        let mut schema = self.into();
        schema.nullable = true;
        schema
    }

    /// A missing object field takes this value, which is then validated.
    fn with_default(self, value: impl Into<Value>) -> Schema {
        let mut schema = self.into();
        schema.default = Some(value.into());
        schema
    }

    fn describe(self, description: impl Into<String>) -> Schema {
        let mut schema = self.into();
        schema.description = Some(description.into());
        schema
    }

    /// Attach a transform. It runs only after every built-in check passed,
    /// receives the validated value and an issue sink, and returns the new
    /// value or `None` when there is no valid value.
    fn transform<F>(self, f: F) -> Schema
    where
        F: Fn(Value, &mut RefinementCtx) -> Option<Value> + Send + Sync + 'static,
    {
        let mut schema = self.into();
        schema.effects.push(Effect::transform(f));
        schema
    }

    /// Attach an infallible transform.
    fn map<F>(self, f: F) -> Schema
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        let mut schema = self.into();
        schema.effects.push(Effect::map(f));
        schema
    }

    /// Attach a predicate; a `false` result records a custom issue with `message`.
    fn refine<F>(self, predicate: F, message: impl Into<String>) -> Schema
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let mut schema = self.into();
        schema.effects.push(Effect::refine(predicate, message));
        schema
    }
}

impl<T: Into<Schema>> SchemaBuilder for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_applies_to_last_check() {
        let s = StringSchema::new().min(6).message("too short").max(20);
        assert_eq!(s.checks[0].message.as_deref(), Some("too short"));
        assert!(s.checks[1].message.is_none());
    }

    #[test]
    fn test_message_without_checks_is_ignored() {
        let s = NumberSchema::new().message("unused");
        assert!(s.checks.is_empty());
    }

    #[test]
    fn test_object_field_redeclaration_replaces_in_place() {
        let obj = ObjectSchema::new()
            .field("a", StringSchema::new())
            .field("b", NumberSchema::new())
            .field("a", BooleanSchema::new());
        let keys: Vec<&str> = obj.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(matches!(obj.get("a").unwrap().kind(), SchemaKind::Boolean(_)));
    }

    #[test]
    fn test_extend_pick_omit_partial() {
        let base = ObjectSchema::new()
            .field("username", StringSchema::new())
            .field("password", StringSchema::new());
        let extended = base.clone().extend(ObjectSchema::new().field("age", NumberSchema::new()));
        assert_eq!(extended.keys().count(), 3);

        let picked = extended.clone().pick(&["age"]);
        assert_eq!(picked.keys().collect::<Vec<_>>(), vec!["age"]);

        let omitted = extended.clone().omit(&["password"]);
        assert_eq!(omitted.keys().collect::<Vec<_>>(), vec!["username", "age"]);

        let partial = extended.partial();
        assert!(partial.fields.iter().all(|(_, s)| s.is_optional()));

        // The original is untouched by the derived schemas.
        assert!(base.fields.iter().all(|(_, s)| !s.is_optional()));
    }

    #[test]
    fn test_embedding_does_not_mutate_child() {
        let child: Schema = StringSchema::new().max(100).into();
        let parent = ObjectSchema::new().field("name", child.clone()).partial();
        assert!(!child.is_optional());
        assert!(parent.get("name").unwrap().is_optional());
    }

    #[test]
    fn test_modifiers_produce_schema() {
        let s = StringSchema::new().min(3).optional();
        assert!(s.is_optional());
        assert_eq!(s.kind().name(), "string");

        let s = NumberSchema::new().nullable().describe("price");
        assert!(s.is_nullable());
        assert_eq!(s.description(), Some("price"));

        let s = BooleanSchema::new().with_default(true);
        assert_eq!(s.default_value(), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_collection_kind_selects_schema_kind() {
        let arr: Schema = CollectionSchema::new(CollectionKind::Array, StringSchema::new()).into();
        let set: Schema = CollectionSchema::new(CollectionKind::Set, StringSchema::new()).into();
        assert_eq!(arr.kind().name(), "array");
        assert_eq!(set.kind().name(), "set");
    }

    #[test]
    fn test_schema_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Schema>();
    }
}
