//! # conform-cli — Schema Validation Command-Line Interface
//!
//! Thin clap-based front end over `conform-schema` for schemas kept in
//! definition files.
//!
//! ## Subcommands
//!
//! - `validate`: check one or more JSON/YAML documents against a schema
//!   definition, printing the validated value or every issue.
//! - `check`: load and compile a definition and print its outline.
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handlers return rendered output; only `main` writes to stdout and
//!   picks the exit code.

pub mod check;
pub mod input;
pub mod validate;
