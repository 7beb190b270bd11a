//! # Validation Issues
//!
//! An [`Issue`] is a single recorded violation: where it happened
//! ([`Path`]), what kind of violation it is ([`IssueCode`]) and a
//! human-readable message. [`Issues`] is the ordered collection returned
//! to callers.
//!
//! Issues serialize to a stable JSON shape suitable for client-facing
//! error responses:
//!
//! ```json
//! { "code": "too_small", "path": ["address", "zip"], "message": "..." }
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The kind of violation an issue records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// A declared, non-optional object field was missing.
    Required,
    /// The value had the wrong type, or could not be coerced.
    InvalidType,
    /// A length, count, magnitude or date lower bound was violated.
    TooSmall,
    /// A length, count, magnitude or date upper bound was violated.
    TooBig,
    /// A string did not match the declared format (email, url, regex...).
    InvalidFormat,
    /// A strict object received keys it does not declare.
    UnrecognizedKeys,
    /// Raised explicitly by a refinement or transform.
    Custom,
}

impl IssueCode {
    /// The snake_case tag used in serialized output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::InvalidType => "invalid_type",
            Self::TooSmall => "too_small",
            Self::TooBig => "too_big",
            Self::InvalidFormat => "invalid_format",
            Self::UnrecognizedKeys => "unrecognized_keys",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step into a composite value: an object/map key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Location of a value inside the input, from the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<PathSegment>);

impl Path {
    /// The empty path, denoting the input itself.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns a new path extended by one segment. `self` is unchanged.
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// Returns `prefix` followed by the segments of `self`.
    pub fn prefixed(&self, prefix: &Path) -> Self {
        let mut segments = prefix.0.clone();
        segments.extend(self.0.iter().cloned());
        Self(segments)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Render as an RFC 6901 JSON Pointer (`/address/zip`, `""` for root).
    pub fn to_pointer(&self) -> String {
        self.0
            .iter()
            .map(|seg| {
                let raw = seg.to_string();
                format!("/{}", raw.replace('~', "~0").replace('/', "~1"))
            })
            .collect()
    }
}

impl From<Vec<PathSegment>> for Path {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for Path {
    /// Dotted form: `address.zip`, `emails[1]`, `(root)` when empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        for (i, seg) in self.0.iter().enumerate() {
            match seg {
                PathSegment::Index(index) => write!(f, "[{index}]")?,
                PathSegment::Key(key) if i == 0 => f.write_str(key)?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
            }
        }
        Ok(())
    }
}

/// A single validation violation with its location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub code: IssueCode,
    pub path: Path,
    pub message: String,
}

impl Issue {
    /// Create an issue located at the root of the input.
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            path: Path::root(),
            message: message.into(),
        }
    }

    /// Set the issue's location.
    pub fn at(mut self, path: Path) -> Self {
        self.path = path;
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {}: {}", self.path, self.message)
    }
}

/// Ordered collection of issues.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Issues {
    issues: Vec<Issue>,
}

impl Issues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// Append every issue of `other`, preserving order.
    pub fn extend(&mut self, other: Issues) {
        self.issues.extend(other.issues);
    }

    /// Returns the number of issues.
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Returns true if there are no issues.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns a slice of all issues.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Issue> {
        self.issues.iter()
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Issue> {
        self.issues
    }

    /// Issues recorded exactly at `path`.
    pub fn at<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = &'a Issue> + 'a {
        self.issues.iter().filter(move |issue| &issue.path == path)
    }

    /// Group messages by top-level field.
    ///
    /// Issues at the root land in `form_errors`; everything else is keyed
    /// by the first path segment, in first-seen order.
    pub fn flatten(&self) -> FlattenedIssues {
        let mut flat = FlattenedIssues::default();
        for issue in &self.issues {
            match issue.path.segments().first() {
                None => flat.form_errors.push(issue.message.clone()),
                Some(first) => flat
                    .field_errors
                    .entry(first.to_string())
                    .or_default()
                    .push(issue.message.clone()),
            }
        }
        flat
    }
}

impl From<Vec<Issue>> for Issues {
    fn from(issues: Vec<Issue>) -> Self {
        Self { issues }
    }
}

impl IntoIterator for Issues {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}

impl<'a> IntoIterator for &'a Issues {
    type Item = &'a Issue;
    type IntoIter = std::slice::Iter<'a, Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.iter()
    }
}

impl fmt::Display for Issues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

/// Issue messages grouped for form-style rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlattenedIssues {
    pub form_errors: Vec<String>,
    pub field_errors: IndexMap<String, Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segments: &[PathSegment]) -> Path {
        Path::from(segments.to_vec())
    }

    #[test]
    fn test_path_display_dotted() {
        let p = Path::root().child("address").child("zip");
        assert_eq!(p.to_string(), "address.zip");

        let p = Path::root().child("emails").child(1usize);
        assert_eq!(p.to_string(), "emails[1]");

        assert_eq!(Path::root().to_string(), "(root)");
    }

    #[test]
    fn test_path_child_leaves_parent_untouched() {
        let parent = Path::root().child("address");
        let _child = parent.child("city");
        assert_eq!(parent.segments().len(), 1);
    }

    #[test]
    fn test_path_prefixed() {
        let inner = Path::root().child("zip");
        let outer = Path::root().child("address");
        assert_eq!(inner.prefixed(&outer).to_string(), "address.zip");
    }

    #[test]
    fn test_path_to_pointer_escapes() {
        let p = Path::root().child("a/b").child("c~d").child(0usize);
        assert_eq!(p.to_pointer(), "/a~1b/c~0d/0");
        assert_eq!(Path::root().to_pointer(), "");
    }

    #[test]
    fn test_issue_serialization_shape() {
        let issue = Issue::new(IssueCode::TooBig, "too long")
            .at(path(&[PathSegment::from("tags"), PathSegment::from(2usize)]));
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"code": "too_big", "path": ["tags", 2], "message": "too long"})
        );
        let back: Issue = serde_json::from_value(json).unwrap();
        assert_eq!(back, issue);
    }

    #[test]
    fn test_issue_display_root() {
        let issue = Issue::new(IssueCode::Custom, "bad");
        assert!(issue.to_string().contains("(root)"));
    }

    #[test]
    fn test_issues_flatten() {
        let mut issues = Issues::new();
        issues.push(Issue::new(IssueCode::Custom, "form level"));
        issues.push(Issue::new(IssueCode::TooSmall, "short").at(Path::root().child("password")));
        issues.push(Issue::new(IssueCode::TooBig, "zip").at(Path::root().child("address").child("zip")));
        issues.push(Issue::new(IssueCode::InvalidFormat, "fmt").at(Path::root().child("password")));

        let flat = issues.flatten();
        assert_eq!(flat.form_errors, vec!["form level".to_string()]);
        assert_eq!(flat.field_errors["password"], vec!["short", "fmt"]);
        assert_eq!(flat.field_errors["address"], vec!["zip"]);
        let keys: Vec<&String> = flat.field_errors.keys().collect();
        assert_eq!(keys, vec!["password", "address"]);
    }

    #[test]
    fn test_issues_at_filters_by_path() {
        let mut issues = Issues::new();
        let target = Path::root().child("username");
        issues.push(Issue::new(IssueCode::InvalidFormat, "a").at(target.clone()));
        issues.push(Issue::new(IssueCode::TooSmall, "b").at(Path::root().child("password")));
        assert_eq!(issues.at(&target).count(), 1);
    }

    #[test]
    fn test_issue_code_tags() {
        assert_eq!(IssueCode::UnrecognizedKeys.to_string(), "unrecognized_keys");
        assert_eq!(
            serde_json::to_value(IssueCode::InvalidType).unwrap(),
            serde_json::json!("invalid_type")
        );
    }
}
