//! # conform-schema — Composable Schema Validation
//!
//! Declares the expected shape of a value with chained builders and checks
//! untrusted input against it, returning either the validated (and
//! transformed) value or every issue found, each tagged with the path to
//! the offending node.
//!
//! ```
//! use conform_schema::prelude::*;
//!
//! let schema = conform_schema::object()
//!     .field("username", conform_schema::string().email().message("username harus email"))
//!     .field("password", conform_schema::string().min(6).max(20))
//!     .field("lastName", conform_schema::string().optional())
//!     .into_schema();
//!
//! let result = schema.safe_parse(serde_json::json!({
//!     "username": "dani",
//!     "password": "rahasia",
//! }));
//! assert!(!result.is_success());
//! assert_eq!(result.error().unwrap().issues().len(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`schema`]: builders for every kind and the shared [`SchemaBuilder`]
//!   modifiers.
//! - [`coerce`]: opt-in conversion of primitives toward the target kind.
//! - [`refine`]: transforms and refinements with their issue sink.
//! - [`validate`]: the recursive validator, `parse` and `safe_parse`.
//! - [`definition`]: schemas described in JSON or YAML, checked against an
//!   embedded JSON Schema before compilation.
//!
//! ## Crate Policy
//!
//! - Depends only on `conform-core` internally.
//! - A schema is immutable once built; validation never mutates it, so one
//!   schema may serve any number of concurrent `parse` calls.
//! - Validation never panics on input. Every failure is an issue.

pub mod coerce;
pub mod definition;
pub mod format;
pub mod refine;
pub mod schema;
pub mod validate;

pub use conform_core::{
    ConformError, FlattenedIssues, Issue, IssueCode, Issues, Path, PathSegment, ValidationError,
    Value, ValueKind,
};
pub use definition::{load_schema, DefinitionError, SchemaDefinition};
pub use refine::RefinementCtx;
pub use schema::{
    BooleanSchema, CollectionKind, CollectionSchema, DateSchema, MapSchema, NumberSchema,
    ObjectSchema, Schema, SchemaBuilder, SchemaKind, StringSchema, UnknownKeys,
};
pub use validate::ValidationResult;

pub fn string() -> StringSchema {
    StringSchema::new()
}

pub fn number() -> NumberSchema {
    NumberSchema::new()
}

pub fn boolean() -> BooleanSchema {
    BooleanSchema::new()
}

pub fn date() -> DateSchema {
    DateSchema::new()
}

pub fn object() -> ObjectSchema {
    ObjectSchema::new()
}

pub fn array(element: impl Into<Schema>) -> CollectionSchema {
    CollectionSchema::new(CollectionKind::Array, element)
}

/// Like [`array`], but equal elements are collapsed and the output is a set.
pub fn set(element: impl Into<Schema>) -> CollectionSchema {
    CollectionSchema::new(CollectionKind::Set, element)
}

pub fn map(key: impl Into<Schema>, value: impl Into<Schema>) -> MapSchema {
    MapSchema::new(key, value)
}

/// Everything needed to declare and run schemas.
pub mod prelude {
    pub use crate::refine::RefinementCtx;
    pub use crate::schema::{Schema, SchemaBuilder, UnknownKeys};
    pub use crate::validate::ValidationResult;
    pub use conform_core::{Issue, IssueCode, Issues, Path, ValidationError, Value, ValueKind};
}
