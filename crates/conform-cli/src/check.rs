//! # Check Subcommand
//!
//! Loads a schema definition, compiles it, and prints an indented outline
//! of the schema so definition files can be reviewed without running data
//! through them.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::Args;
use conform_schema::definition::{CheckDefinition, SchemaDefinition};
use conform_schema::UnknownKeys;

/// Arguments for the check subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Schema definition file (JSON or YAML).
    #[arg(long, short)]
    pub schema: PathBuf,
}

/// Load and compile the definition; return its outline.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<String> {
    let definition = SchemaDefinition::from_path(&args.schema)?;
    definition.compile()?;
    tracing::info!(schema = %args.schema.display(), "definition compiled");
    outline(&definition)
}

/// Render a definition as an indented tree, one node per line.
pub fn outline(definition: &SchemaDefinition) -> anyhow::Result<String> {
    let mut out = String::new();
    write_node(&mut out, definition, None, 0)?;
    Ok(out.trim_end().to_string())
}

fn write_node(
    out: &mut String,
    def: &SchemaDefinition,
    label: Option<&str>,
    depth: usize,
) -> std::fmt::Result {
    let indent = "  ".repeat(depth);
    let kind = serde_json::to_value(def.kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    match label {
        Some(label) => write!(out, "{indent}{label}: {kind}")?,
        None => write!(out, "{indent}{kind}")?,
    }

    let mut notes: Vec<String> = def.checks.iter().map(describe_check).collect();
    if def.coerce {
        notes.insert(0, "coerce".to_string());
    }
    if def.optional {
        notes.push("optional".to_string());
    }
    if def.nullable {
        notes.push("nullable".to_string());
    }
    if let Some(default) = &def.default {
        notes.push(format!("default {default}"));
    }
    match def.unknown_keys {
        UnknownKeys::Strip => {}
        UnknownKeys::Strict => notes.push("strict".to_string()),
        UnknownKeys::Passthrough => notes.push("passthrough".to_string()),
    }
    if !notes.is_empty() {
        write!(out, " [{}]", notes.join(", "))?;
    }
    if let Some(description) = &def.description {
        write!(out, " # {description}")?;
    }
    writeln!(out)?;

    for (name, field) in &def.fields {
        write_node(out, field, Some(name.as_str()), depth + 1)?;
    }
    if let Some(element) = &def.element {
        write_node(out, element, Some("element"), depth + 1)?;
    }
    if let Some(key) = &def.key {
        write_node(out, key, Some("key"), depth + 1)?;
    }
    if let Some(value) = &def.value {
        write_node(out, value, Some("value"), depth + 1)?;
    }
    Ok(())
}

fn describe_check(check: &CheckDefinition) -> String {
    let name = serde_json::to_value(check.check)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    match &check.value {
        Some(serde_json::Value::String(s)) => format!("{name} {s:?}"),
        Some(value) => format!("{name} {value}"),
        None => name,
    }
}
