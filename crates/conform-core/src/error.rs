//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types shared by every crate in the workspace. All
//! errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - A failed validation is never a single message: [`ValidationError`]
//!   carries the full ordered [`Issues`] collection so callers can render
//!   every violation with its path.
//! - Typed extraction failures (validated data that does not fit the
//!   caller's Rust type) are kept distinct from validation failures.

use serde::Serialize;
use thiserror::Error;

use crate::issue::{Issue, Issues};

/// Top-level error type for conform.
#[derive(Error, Debug)]
pub enum ConformError {
    /// The input did not satisfy the schema.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Validated data could not be deserialized into the requested type.
    #[error("deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// A date value could not be parsed or represented.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// A schema definition was rejected.
    #[error("schema definition error: {0}")]
    Definition(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// The error returned by `parse` when one or more issues were recorded.
///
/// The issue list is never empty and preserves the order in which the
/// issues were encountered.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("validation failed:\n{issues}")]
pub struct ValidationError {
    issues: Issues,
}

impl ValidationError {
    /// Wrap a collection of issues.
    pub fn new(issues: Issues) -> Self {
        Self { issues }
    }

    /// Build an error holding a single issue.
    pub fn single(issue: Issue) -> Self {
        Self {
            issues: Issues::from(vec![issue]),
        }
    }

    /// Returns the recorded issues.
    pub fn issues(&self) -> &Issues {
        &self.issues
    }

    /// Consumes self and returns the recorded issues.
    pub fn into_issues(self) -> Issues {
        self.issues
    }
}
