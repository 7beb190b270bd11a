//! # Validate Subcommand
//!
//! `conform validate --schema login.yaml request.json other.yaml`
//!
//! Every input is validated independently; a failing input does not stop
//! the others. The command fails if any input fails.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use conform_schema::{load_schema, Schema, ValidationResult};
use serde::Serialize;

use crate::input::read_document;

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema definition file (JSON or YAML).
    #[arg(long, short)]
    pub schema: PathBuf,

    /// Documents to validate.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// One PASS/FAIL line per input, issues indented below failures.
    Text,
    /// A JSON array of `{input, success, data | error}` objects.
    Json,
}

/// Outcome of validating one input document.
#[derive(Debug, Serialize)]
pub struct InputReport {
    pub input: String,
    #[serde(flatten)]
    pub result: ValidationResult,
}

impl InputReport {
    pub fn passed(&self) -> bool {
        self.result.is_success()
    }
}

/// Outcome of a whole `validate` run.
#[derive(Debug)]
pub struct ValidateOutcome {
    pub reports: Vec<InputReport>,
    pub rendered: String,
}

impl ValidateOutcome {
    pub fn all_passed(&self) -> bool {
        self.reports.iter().all(InputReport::passed)
    }
}

/// Load the schema, validate every input and render the reports.
///
/// # Errors
///
/// Fails if the schema definition cannot be loaded or an input cannot be
/// read. Validation failures are reported in the outcome, not as errors.
pub fn run_validate(args: &ValidateArgs) -> anyhow::Result<ValidateOutcome> {
    let schema = load_schema(&args.schema)?;
    tracing::info!(
        schema = %args.schema.display(),
        inputs = args.inputs.len(),
        "validating inputs"
    );
    let reports = validate_inputs(&schema, &args.inputs)?;
    let rendered = render(&reports, args.format)?;
    Ok(ValidateOutcome { reports, rendered })
}

pub fn validate_inputs(schema: &Schema, inputs: &[PathBuf]) -> anyhow::Result<Vec<InputReport>> {
    inputs
        .iter()
        .map(|path| validate_one(schema, path))
        .collect()
}

fn validate_one(schema: &Schema, path: &Path) -> anyhow::Result<InputReport> {
    let document = read_document(path)?;
    let result = schema.safe_parse(document);
    if let Some(err) = result.error() {
        tracing::warn!(input = %path.display(), issues = err.issues().len(), "input failed validation");
    }
    Ok(InputReport {
        input: path.display().to_string(),
        result,
    })
}

pub fn render(reports: &[InputReport], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(reports)?),
        OutputFormat::Text => {
            let mut out = String::new();
            for report in reports {
                match &report.result {
                    ValidationResult::Success(data) => {
                        writeln!(out, "PASS {}", report.input)?;
                        writeln!(out, "  {}", serde_json::to_string(&data.to_json())?)?;
                    }
                    ValidationResult::Failure(err) => {
                        writeln!(out, "FAIL {} ({} issue(s))", report.input, err.issues().len())?;
                        writeln!(out, "{}", err.issues())?;
                    }
                }
            }
            let passed = reports.iter().filter(|r| r.passed()).count();
            write!(out, "{passed}/{} input(s) passed", reports.len())?;
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conform_schema::prelude::*;
    use serde_json::json;

    fn login_schema() -> Schema {
        conform_schema::object()
            .field("username", conform_schema::string().email())
            .field("password", conform_schema::string().min(6).max(20))
            .into_schema()
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_each_input_reported() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(dir.path(), "good.json", r#"{"username": "dani@test.com", "password": "rahasia"}"#);
        let bad = write(dir.path(), "bad.yaml", "username: dani\npassword: '12'\n");

        let reports = validate_inputs(&login_schema(), &[good, bad]).unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports[0].passed());
        assert!(!reports[1].passed());
        assert_eq!(reports[1].result.error().unwrap().issues().len(), 2);
    }

    #[test]
    fn test_text_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write(dir.path(), "bad.json", r#"{"username": "dani", "password": "rahasia"}"#);
        let reports = validate_inputs(&login_schema(), &[bad]).unwrap();
        let text = render(&reports, OutputFormat::Text).unwrap();
        assert!(text.contains("FAIL"), "got: {text}");
        assert!(text.contains("username: Invalid email"), "got: {text}");
        assert!(text.ends_with("0/1 input(s) passed"), "got: {text}");
    }

    #[test]
    fn test_json_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(dir.path(), "good.json", r#"{"username": "dani@test.com", "password": "rahasia", "x": 1}"#);
        let reports = validate_inputs(&login_schema(), &[good.clone()]).unwrap();
        let rendered = render(&reports, OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(
            parsed,
            json!([{
                "input": good.display().to_string(),
                "success": true,
                "data": {"username": "dani@test.com", "password": "rahasia"}
            }])
        );
    }

    #[test]
    fn test_unreadable_input_is_an_error() {
        let missing = PathBuf::from("/nonexistent/request.json");
        assert!(validate_inputs(&login_schema(), &[missing]).is_err());
    }
}
