//! Core types for remote resource reconciliation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical field value.
///
/// Both desired and normalized remote values are held in this form, so a
/// comparison never depends on how the provider happened to encode a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Int(i64),
    Text(String),
}

impl FieldValue {
    /// Whether the value may drive a diff.
    ///
    /// Null, zero and the empty string are unset. A desired value that is
    /// unset never contributes to a diff, so "clear this field" cannot be
    /// expressed.
    pub fn is_set(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Int(n) => *n != 0,
            Self::Text(s) => !s.is_empty(),
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// What the caller wants for the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    #[default]
    Present,
    Absent,
    List,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::Present => write!(f, "present"),
            Intent::Absent => write!(f, "absent"),
            Intent::List => write!(f, "list"),
        }
    }
}

/// Terminal action of a reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Created,
    Updated,
    Deleted,
    NoOp,
}

impl Action {
    /// Check if the action represents a change
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::NoOp)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Created => write!(f, "created"),
            Action::Updated => write!(f, "updated"),
            Action::Deleted => write!(f, "deleted"),
            Action::NoOp => write!(f, "unchanged"),
        }
    }
}

/// One drifted field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub field: &'static str,
    pub before: FieldValue,
    pub after: FieldValue,
}

/// Ordered set of drifted fields. Empty means nothing to do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diff {
    changes: Vec<FieldChange>,
}

impl Diff {
    pub fn new(changes: Vec<FieldChange>) -> Self {
        Self { changes }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldChange> {
        self.changes.iter()
    }

    /// Names of the drifted fields, in schema order.
    pub fn fields(&self) -> Vec<&'static str> {
        self.changes.iter().map(|c| c.field).collect()
    }

    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.changes.iter().find(|c| c.field == field)
    }
}

/// Options for a reconciliation
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    /// Don't mutate the remote, report what would happen
    pub dry_run: bool,
}

impl ReconcileOptions {
    pub fn dry_run(dry_run: bool) -> Self {
        Self { dry_run }
    }
}

/// Outcome of reconciling one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileResult {
    pub action: Action,
    pub changed: bool,
    pub message: String,
    pub diff: Diff,
    /// The action was computed but not carried out (dry run).
    pub preview: bool,
    /// Identity value of the resource (name, or domain).
    pub identity: String,
    /// Provider identifier, when the resource was found remotely.
    pub remote_id: Option<String>,
}

/// Full listing returned by the `list` intent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Listing {
    pub output: Vec<serde_json::Map<String, serde_json::Value>>,
    pub count: usize,
}

/// What the reconciler hands back for any intent.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Reconciled(ReconcileResult),
    Listed(Listing),
}

impl Outcome {
    pub fn changed(&self) -> bool {
        match self {
            Self::Reconciled(result) => result.changed,
            Self::Listed(_) => false,
        }
    }
}

/// Summary of a batch of reconciliations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileSummary {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub no_change: usize,
    pub failed: usize,
}

impl ReconcileSummary {
    /// Total number of changes (made, or previewed in a dry run)
    pub fn total_changes(&self) -> usize {
        self.created + self.updated + self.deleted
    }

    /// Check if every reconciliation succeeded
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of resources processed
    pub fn total(&self) -> usize {
        self.total_changes() + self.no_change + self.failed
    }

    /// Add a result to the summary
    pub fn add_result(&mut self, result: &ReconcileResult) {
        match result.action {
            Action::Created => self.created += 1,
            Action::Updated => self.updated += 1,
            Action::Deleted => self.deleted += 1,
            Action::NoOp => self.no_change += 1,
        }
    }

    /// Record a failed reconciliation
    pub fn add_failure(&mut self) {
        self.failed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_is_set() {
        assert!(!FieldValue::Null.is_set());
        assert!(!FieldValue::Int(0).is_set());
        assert!(!FieldValue::text("").is_set());
        assert!(FieldValue::Int(300).is_set());
        assert!(FieldValue::text("HTTP").is_set());
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::Null.to_string(), "");
        assert_eq!(FieldValue::Int(42).to_string(), "42");
        assert_eq!(FieldValue::text("a,b").to_string(), "a,b");
    }

    #[test]
    fn test_field_value_serializes_untagged() {
        let json = serde_json::to_string(&vec![
            FieldValue::Null,
            FieldValue::Int(1),
            FieldValue::text("x"),
        ])
        .unwrap();
        assert_eq!(json, r#"[null,1,"x"]"#);
    }

    #[test]
    fn test_intent_roundtrip_names() {
        let intent: Intent = serde_json::from_str("\"absent\"").unwrap();
        assert_eq!(intent, Intent::Absent);
        assert_eq!(Intent::default(), Intent::Present);
        assert_eq!(Intent::List.to_string(), "list");
    }

    #[test]
    fn test_diff_accessors() {
        let diff = Diff::new(vec![FieldChange {
            field: "confirmation",
            before: FieldValue::Int(200),
            after: FieldValue::Int(300),
        }]);
        assert_eq!(diff.len(), 1);
        assert_eq!(diff.fields(), vec!["confirmation"]);
        assert_eq!(diff.get("confirmation").unwrap().after, FieldValue::Int(300));
        assert!(diff.get("timeout").is_none());
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = ReconcileSummary::default();
        let result = ReconcileResult {
            action: Action::Created,
            changed: true,
            message: "Test inserted".into(),
            diff: Diff::default(),
            preview: false,
            identity: "site1".into(),
            remote_id: None,
        };
        summary.add_result(&result);
        summary.add_result(&ReconcileResult {
            action: Action::NoOp,
            changed: false,
            ..result
        });
        summary.add_failure();

        assert_eq!(summary.total_changes(), 1);
        assert_eq!(summary.total(), 3);
        assert!(!summary.is_success());
    }
}
