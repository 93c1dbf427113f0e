//! Caller-facing result documents

use crate::schema::Schema;
use crate::types::{Action, Diff, FieldValue, Intent, Listing, Outcome, ReconcileResult};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Serializable summary of one invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Reconciled(ReconcileReport),
    Listed(ListReport),
}

/// Result of a present/absent reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileReport {
    pub changed: bool,
    pub action: Action,
    pub preview: bool,
    pub state: Intent,
    /// Identity under its canonical field name, e.g. `"name": "site1"`.
    #[serde(flatten)]
    pub identity: BTreeMap<&'static str, String>,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    pub diff: DiffView,
}

/// Drifted fields split into their remote and desired values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiffView {
    pub before: FieldValues,
    pub after: FieldValues,
}

impl From<&Diff> for DiffView {
    fn from(diff: &Diff) -> Self {
        let mut view = Self::default();
        for change in diff.iter() {
            view.before.0.push((change.field, change.before.clone()));
            view.after.0.push((change.field, change.after.clone()));
        }
        view
    }
}

/// Field values in schema order, serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValues(Vec<(&'static str, FieldValue)>);

impl FieldValues {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.iter().find(|(f, _)| *f == field).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.0.iter().map(|(f, v)| (*f, v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for FieldValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Result of the list intent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListReport {
    pub changed: bool,
    pub tests: Listing,
}

impl Report {
    pub fn new(schema: &Schema, intent: Intent, outcome: Outcome) -> Self {
        match outcome {
            Outcome::Reconciled(result) => Self::reconciled(schema, intent, result),
            Outcome::Listed(tests) => Self::Listed(ListReport {
                changed: false,
                tests,
            }),
        }
    }

    pub fn reconciled(schema: &Schema, intent: Intent, result: ReconcileResult) -> Self {
        Self::Reconciled(ReconcileReport {
            changed: result.changed,
            action: result.action,
            preview: result.preview,
            state: intent,
            identity: BTreeMap::from([(schema.identity, result.identity)]),
            response: result.message,
            remote_id: result.remote_id,
            diff: DiffView::from(&result.diff),
        })
    }

    pub fn changed(&self) -> bool {
        match self {
            Self::Reconciled(report) => report.changed,
            Self::Listed(report) => report.changed,
        }
    }
}
