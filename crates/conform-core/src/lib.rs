//! # conform-core — Foundational Types for conform
//!
//! This crate defines the vocabulary shared by the validator and its
//! callers. Every other crate in the workspace depends on `conform-core`;
//! it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **One untyped boundary value.** [`Value`] is the only input type the
//!    validator accepts. It extends the JSON data model with dates, sets and
//!    maps so every schema kind has a native representation.
//!
//! 2. **Issues, not first-failure errors.** A failed validation produces an
//!    ordered [`Issues`] collection; each [`Issue`] has a [`Path`], an
//!    [`IssueCode`] and a message.
//!
//! 3. **UTC-only dates.** Every date is a `DateTime<Utc>`; the
//!    [`temporal`] helpers normalize offsets and date-only strings.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `conform-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod issue;
pub mod temporal;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use error::{ConformError, ValidationError};
pub use issue::{FlattenedIssues, Issue, IssueCode, Issues, Path, PathSegment};
pub use value::{format_number, Value, ValueKind};
