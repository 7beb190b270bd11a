//! Reading input documents.

use std::path::Path;

use anyhow::Context;
use conform_core::Value;

/// Read a document to validate. `.yaml`/`.yml` files are parsed as YAML,
/// everything else as JSON.
pub fn read_document(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read input {}", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let json: serde_json::Value = match ext {
        "yaml" | "yml" => serde_yaml::from_str(&content)
            .with_context(|| format!("invalid YAML in {}", path.display()))?,
        _ => serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON in {}", path.display()))?,
    };
    Ok(Value::from(json))
}
