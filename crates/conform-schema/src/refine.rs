//! # Transforms and Refinements
//!
//! User callbacks attached to a schema run after the built-in checks
//! pass. Each callback receives the validated value and a
//! [`RefinementCtx`] it can report issues into, and returns either the
//! (possibly new) value or `None` when it has no valid value to offer.
//!
//! Any issue reported through the context fails the whole validation,
//! even if the callback still returned a value.

use std::fmt;
use std::sync::Arc;

use conform_core::{Issue, IssueCode, Issues, Path, PathSegment, Value};

/// Signature shared by every effect.
pub type TransformFn = dyn Fn(Value, &mut RefinementCtx) -> Option<Value> + Send + Sync;

/// Issue sink handed to transforms and refinements.
#[derive(Debug)]
pub struct RefinementCtx {
    path: Path,
    issues: Issues,
}

impl RefinementCtx {
    pub(crate) fn new(path: Path) -> Self {
        Self {
            path,
            issues: Issues::new(),
        }
    }

    /// Location of the value being refined.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record an issue at the value's location.
    pub fn add_issue(&mut self, code: IssueCode, message: impl Into<String>) {
        self.issues
            .push(Issue::new(code, message).at(self.path.clone()));
    }

    /// Record a custom issue at the value's location.
    pub fn add_custom(&mut self, message: impl Into<String>) {
        self.add_issue(IssueCode::Custom, message);
    }

    /// Record an issue below the value, e.g. on one field of an object.
    pub fn add_issue_at(
        &mut self,
        segments: impl IntoIterator<Item = PathSegment>,
        code: IssueCode,
        message: impl Into<String>,
    ) {
        let path = segments
            .into_iter()
            .fold(self.path.clone(), |path, seg| path.child(seg));
        self.issues.push(Issue::new(code, message).at(path));
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub(crate) fn into_issues(self) -> Issues {
        self.issues
    }
}

/// A transform or refinement attached to a schema.
#[derive(Clone)]
pub struct Effect {
    label: &'static str,
    f: Arc<TransformFn>,
}

impl Effect {
    pub fn transform<F>(f: F) -> Self
    where
        F: Fn(Value, &mut RefinementCtx) -> Option<Value> + Send + Sync + 'static,
    {
        Self {
            label: "transform",
            f: Arc::new(f),
        }
    }

    pub fn map<F>(f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Self {
            label: "map",
            f: Arc::new(move |value, _ctx| Some(f(value))),
        }
    }

    pub fn refine<F>(predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let message = message.into();
        Self {
            label: "refine",
            f: Arc::new(move |value, ctx| {
                if !predicate(&value) {
                    ctx.add_custom(message.clone());
                }
                Some(value)
            }),
        }
    }

    /// Refinements only inspect the value; transforms and maps replace it.
    pub(crate) fn is_refinement(&self) -> bool {
        self.label == "refine"
    }

    pub(crate) fn apply(&self, value: Value, ctx: &mut RefinementCtx) -> Option<Value> {
        (self.f)(value, ctx)
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("kind", &self.label)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ctx_issues_land_at_value_path() {
        let mut ctx = RefinementCtx::new(Path::root().child("username"));
        ctx.add_custom("username harus uppercase");
        let issues = ctx.into_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues.issues()[0].path.to_string(), "username");
        assert_eq!(issues.issues()[0].code, IssueCode::Custom);
    }

    #[test]
    fn test_ctx_add_issue_at_nested_path() {
        let mut ctx = RefinementCtx::new(Path::root().child("user"));
        ctx.add_issue_at(
            [PathSegment::from("confirm")],
            IssueCode::Custom,
            "passwords do not match",
        );
        let issues = ctx.into_issues();
        assert_eq!(issues.issues()[0].path.to_string(), "user.confirm");
    }

    #[test]
    fn test_map_effect_never_reports() {
        let effect = Effect::map(|v| match v {
            Value::String(s) => Value::String(s.to_uppercase()),
            other => other,
        });
        let mut ctx = RefinementCtx::new(Path::root());
        let out = effect.apply(Value::from("dani@example.com"), &mut ctx);
        assert_eq!(out, Some(Value::from("DANI@EXAMPLE.COM")));
        assert!(!ctx.has_issues());
    }

    #[test]
    fn test_refine_effect_keeps_value_and_reports() {
        let effect = Effect::refine(|v| v.as_str().is_some_and(|s| s.len() > 3), "too short");
        let mut ctx = RefinementCtx::new(Path::root());
        let out = effect.apply(Value::from("ab"), &mut ctx);
        assert_eq!(out, Some(Value::from("ab")));
        assert!(ctx.has_issues());
    }

    #[test]
    fn test_only_refine_is_a_refinement() {
        assert!(Effect::refine(|_| true, "x").is_refinement());
        assert!(!Effect::map(|v| v).is_refinement());
        assert!(!Effect::transform(|v, _| Some(v)).is_refinement());
    }

    #[test]
    fn test_effect_debug_hides_closure() {
        let effect = Effect::transform(|v, _| Some(v));
        assert!(format!("{effect:?}").contains("transform"));
    }
}
