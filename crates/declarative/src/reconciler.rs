//! Reconciliation state machine
//!
//! For each intent the reconciler sequences lookup, detail fetch,
//! normalization and diffing, then either mutates the remote or, in a dry
//! run, stops right before the mutating call. The read-only calls run in
//! both modes, so a preview reaches the same `changed` decision and the same
//! diff as a real run.
//!
//! Lookup followed by create is not atomic. Two concurrent runs for the same
//! identity can both see "not found" and both create.

use crate::diff::diff;
use crate::error::Result;
use crate::fetch::{Fetcher, Found};
use crate::normalize::normalize;
use crate::provider::{Provider, ProviderResponse};
use crate::resource::{DesiredResource, Params};
use crate::schema::Schema;
use crate::types::{Action, Diff, Intent, Listing, Outcome, ReconcileOptions, ReconcileResult};

/// Drives one resource type's remote state toward declared desired state.
pub struct Reconciler<'a> {
    provider: &'a dyn Provider,
    opts: ReconcileOptions,
}

impl<'a> Reconciler<'a> {
    pub fn new(provider: &'a dyn Provider, opts: ReconcileOptions) -> Self {
        Self { provider, opts }
    }

    /// Run the reconciliation for `intent`.
    pub fn run(&self, intent: Intent, desired: &DesiredResource) -> Result<Outcome> {
        match intent {
            Intent::Present => self.ensure_present(desired).map(Outcome::Reconciled),
            Intent::Absent => self.ensure_absent(desired).map(Outcome::Reconciled),
            Intent::List => self.list().map(Outcome::Listed),
        }
    }

    /// Full listing with its count. No diff, no mutation.
    pub fn list(&self) -> Result<Listing> {
        let output = self.provider.list()?;
        let count = output.len();
        Ok(Listing { output, count })
    }

    /// Make sure the resource exists and matches `desired`.
    pub fn ensure_present(&self, desired: &DesiredResource) -> Result<ReconcileResult> {
        let schema = desired.schema();
        let fetcher = Fetcher::new(schema, self.provider);
        let outcome = Draft::new(schema, desired.identity(), self.opts.dry_run);

        let Some(Found { id, .. }) = fetcher.find_by_name(&outcome.identity)? else {
            if self.opts.dry_run {
                return Ok(outcome.preview(Action::Created, "would be inserted", Diff::default()));
            }
            log::info!("Creating {} '{}'", schema.resource, outcome.identity);
            let response = self.provider.create(&desired.payload())?;
            return outcome.interpret(Action::Created, response, Diff::default());
        };

        let outcome = outcome.with_remote_id(id.clone());
        let detail = fetcher.detail(&id)?;
        let drift = diff(desired, &normalize(schema, &detail));
        log::debug!(
            "{} '{}' drift: {:?}",
            schema.resource,
            outcome.identity,
            drift.fields()
        );

        if drift.is_empty() {
            let message = format!(
                "No data has been updated for {} '{}' (remote id {id})",
                schema.resource, outcome.identity
            );
            return Ok(outcome.finish(Action::NoOp, false, message, drift));
        }
        if self.opts.dry_run {
            return Ok(outcome.preview(Action::Updated, "would be updated", drift));
        }

        log::info!(
            "Updating {} '{}' ({} field(s))",
            schema.resource,
            outcome.identity,
            drift.len()
        );
        let response = self.provider.update(&id, &desired.payload())?;
        outcome.interpret(Action::Updated, response, drift)
    }

    /// Make sure the resource does not exist.
    pub fn ensure_absent(&self, desired: &DesiredResource) -> Result<ReconcileResult> {
        let schema = desired.schema();
        let fetcher = Fetcher::new(schema, self.provider);
        let outcome = Draft::new(schema, desired.identity(), self.opts.dry_run);

        let Some(Found { id, .. }) = fetcher.find_by_name(&outcome.identity)? else {
            let message = format!("{} '{}' does not exist", schema.resource, outcome.identity);
            return Ok(outcome.finish(Action::NoOp, false, message, Diff::default()));
        };

        let outcome = outcome.with_remote_id(id.clone());
        if self.opts.dry_run {
            return Ok(outcome.preview(Action::Deleted, "would be deleted", Diff::default()));
        }

        log::info!("Deleting {} '{}' (remote id {id})", schema.resource, outcome.identity);
        let response = self.provider.delete(&id)?;
        outcome.interpret(Action::Deleted, response, Diff::default())
    }
}

/// Build the desired state from caller parameters and reconcile it.
///
/// Validation happens before any provider call.
pub fn reconcile(
    schema: &'static Schema,
    provider: &dyn Provider,
    intent: Intent,
    params: &Params,
    opts: ReconcileOptions,
) -> Result<Outcome> {
    let desired = DesiredResource::build(schema, intent, params)?;
    Reconciler::new(provider, opts).run(intent, &desired)
}

/// Result under construction.
struct Draft {
    resource: &'static str,
    identity: String,
    remote_id: Option<String>,
    dry_run: bool,
}

impl Draft {
    fn new(schema: &Schema, identity: String, dry_run: bool) -> Self {
        Self {
            resource: schema.resource,
            identity,
            remote_id: None,
            dry_run,
        }
    }

    fn with_remote_id(mut self, id: String) -> Self {
        self.remote_id = Some(id);
        self
    }

    fn finish(self, action: Action, changed: bool, message: String, diff: Diff) -> ReconcileResult {
        ReconcileResult {
            action,
            changed,
            message,
            diff,
            preview: self.dry_run,
            identity: self.identity,
            remote_id: self.remote_id,
        }
    }

    fn preview(self, action: Action, what: &str, diff: Diff) -> ReconcileResult {
        let message = format!("{} '{}' {what}", self.resource, self.identity);
        log::info!("Dry run: {message}");
        self.finish(action, true, message, diff)
    }

    /// Apply the shared response rule to a mutating call's answer.
    fn interpret(
        self,
        action: Action,
        response: ProviderResponse,
        diff: Diff,
    ) -> Result<ReconcileResult> {
        if response.success {
            return Ok(self.finish(action, true, response.message, diff));
        }
        if response.is_benign() {
            log::debug!("Provider reported nothing to change: {}", response.message);
            return Ok(self.finish(Action::NoOp, false, response.message, diff));
        }
        Err(response.into_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::normalize::RawResource;
    use crate::provider::{Call, MockProvider};
    use crate::schema::fixtures::SITE;
    use crate::types::FieldValue;
    use serde_json::{Value, json};

    fn raw(value: Value) -> RawResource {
        value.as_object().cloned().unwrap()
    }

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    fn desired(intent: Intent, value: Value) -> DesiredResource {
        DesiredResource::build(&SITE, intent, &params(value)).unwrap()
    }

    fn existing(confirmation: i64) -> MockProvider {
        MockProvider::new("TestID")
            .with_resource(raw(json!({"TestID": 99, "WebsiteName": "site1"})))
            .with_detail(
                "99",
                raw(json!({
                    "TestID": 99,
                    "WebsiteName": "site1",
                    "URI": "https://a.test",
                    "CheckRate": 300,
                    "Confirmation": confirmation
                })),
            )
    }

    fn run(mock: &MockProvider, intent: Intent, value: Value, dry_run: bool) -> ReconcileResult {
        let desired = desired(intent, value);
        match Reconciler::new(mock, ReconcileOptions::dry_run(dry_run))
            .run(intent, &desired)
            .unwrap()
        {
            Outcome::Reconciled(result) => result,
            Outcome::Listed(_) => panic!("expected a reconcile result"),
        }
    }

    #[test]
    fn test_scenario_a_create_when_missing() {
        let mock = MockProvider::new("TestID").respond_with(ProviderResponse::ok("Test inserted"));
        let result = run(
            &mock,
            Intent::Present,
            json!({"name": "site1", "url": "https://a.test"}),
            false,
        );

        assert_eq!(result.action, Action::Created);
        assert!(result.changed);
        assert!(result.diff.is_empty());
        assert_eq!(result.message, "Test inserted");
        assert!(matches!(mock.calls().last(), Some(Call::Create(_))));
    }

    #[test]
    fn test_scenario_b_no_op_when_identical() {
        let mock = existing(300);
        let result = run(
            &mock,
            Intent::Present,
            json!({"name": "site1", "url": "https://a.test", "confirmation": 300, "check_rate": 300}),
            false,
        );

        assert_eq!(result.action, Action::NoOp);
        assert!(!result.changed);
        assert!(result.diff.is_empty());
        assert!(result.message.contains("site1"));
        assert_eq!(mock.mutations(), 0);
    }

    #[test]
    fn test_scenario_c_update_on_drift() {
        let mock = existing(200).respond_with(ProviderResponse::ok("Test updated"));
        let result = run(
            &mock,
            Intent::Present,
            json!({"name": "site1", "url": "https://a.test", "confirmation": 300}),
            false,
        );

        assert_eq!(result.action, Action::Updated);
        assert!(result.changed);
        assert_eq!(result.diff.fields(), vec!["confirmation"]);
        let change = result.diff.get("confirmation").unwrap();
        assert_eq!(change.before, FieldValue::Int(200));
        assert_eq!(change.after, FieldValue::Int(300));
        assert_eq!(result.remote_id.as_deref(), Some("99"));

        assert_eq!(
            mock.calls(),
            vec![
                Call::List,
                Call::Detail("99".into()),
                Call::Update(
                    "99".into(),
                    vec![
                        ("WebsiteName", "site1".into()),
                        ("WebsiteURL", "https://a.test".into()),
                        ("CheckRate", "300".into()),
                        ("TestType", "HTTP".into()),
                        ("Confirmation", "300".into()),
                    ]
                ),
            ]
        );
    }

    #[test]
    fn test_scenario_d_absent_dry_run_skips_delete() {
        let mock = existing(300);
        let result = run(&mock, Intent::Absent, json!({"name": "site1"}), true);

        assert_eq!(result.action, Action::Deleted);
        assert!(result.changed);
        assert!(result.preview);
        assert_eq!(mock.mutations(), 0);
        assert_eq!(mock.calls(), vec![Call::List]);
    }

    #[test]
    fn test_scenario_e_absent_when_missing() {
        let mock = MockProvider::new("TestID");
        let result = run(&mock, Intent::Absent, json!({"name": "site1"}), false);

        assert_eq!(result.action, Action::NoOp);
        assert!(!result.changed);
        assert!(result.message.contains("does not exist"));
        assert_eq!(mock.mutations(), 0);
    }

    #[test]
    fn test_absent_deletes_found_resource() {
        let mock = existing(300).respond_with(ProviderResponse::ok("Test deleted"));
        let result = run(&mock, Intent::Absent, json!({"name": "site1"}), false);

        assert_eq!(result.action, Action::Deleted);
        assert!(result.changed);
        assert!(!result.preview);
        assert_eq!(mock.calls().last(), Some(&Call::Delete("99".into())));
    }

    #[test]
    fn test_absent_delete_refusal_is_error() {
        let mock = existing(300).respond_with(ProviderResponse::failed(
            "Delete failed",
            Some(json!({"TestID": "locked"})),
        ));
        let desired = desired(Intent::Absent, json!({"name": "site1"}));
        let err = Reconciler::new(&mock, ReconcileOptions::default())
            .ensure_absent(&desired)
            .unwrap_err();

        match err {
            Error::Remote { message, issues } => {
                assert_eq!(message, "Delete failed");
                assert_eq!(issues, vec![("TestID".to_string(), "locked".to_string())]);
            }
            other => panic!("expected remote error, got {other:?}"),
        }
        assert_eq!(mock.calls().last(), Some(&Call::Delete("99".into())));
    }

    #[test]
    fn test_benign_delete_response_is_no_op() {
        let mock = existing(300).respond_with(ProviderResponse::failed(
            "No data has been updated",
            None,
        ));
        let result = run(&mock, Intent::Absent, json!({"name": "site1"}), false);

        assert_eq!(result.action, Action::NoOp);
        assert!(!result.changed);
        assert_eq!(result.message, "No data has been updated");
        assert_eq!(mock.mutations(), 1);
    }

    #[test]
    fn test_create_dry_run_skips_create() {
        let mock = MockProvider::new("TestID");
        let result = run(
            &mock,
            Intent::Present,
            json!({"name": "site1", "url": "https://a.test"}),
            true,
        );

        assert_eq!(result.action, Action::Created);
        assert!(result.changed);
        assert!(result.message.contains("would be inserted"));
        assert_eq!(mock.calls(), vec![Call::List]);
    }

    #[test]
    fn test_dry_run_and_real_run_agree() {
        let cases = [
            (200, json!({"name": "site1", "url": "https://a.test", "confirmation": 300})),
            (300, json!({"name": "site1", "url": "https://a.test", "confirmation": 300})),
            (300, json!({"name": "site1", "url": "https://b.test"})),
        ];
        for (remote_confirmation, value) in cases {
            let preview = run(&existing(remote_confirmation), Intent::Present, value.clone(), true);
            let real_mock = existing(remote_confirmation).respond_with(ProviderResponse::ok("done"));
            let real = run(&real_mock, Intent::Present, value, false);

            assert_eq!(preview.changed, real.changed);
            assert_eq!(preview.diff, real.diff);
            assert_eq!(preview.action, real.action);
        }
    }

    #[test]
    fn test_dry_run_still_reads_detail() {
        let mock = existing(200);
        run(
            &mock,
            Intent::Present,
            json!({"name": "site1", "url": "https://a.test", "confirmation": 300}),
            true,
        );
        assert_eq!(mock.calls(), vec![Call::List, Call::Detail("99".into())]);
    }

    #[test]
    fn test_empty_diff_issues_no_update() {
        let mock = existing(200);
        let result = run(
            &mock,
            Intent::Present,
            json!({"name": "site1", "url": "https://a.test", "check_rate": 60}),
            false,
        );
        assert!(result.diff.is_empty());
        assert!(!mock.calls().iter().any(|c| matches!(c, Call::Update(..))));
    }

    #[test]
    fn test_benign_update_response_is_no_op() {
        let mock = existing(200).respond_with(ProviderResponse::failed(
            "No data has been updated (is any data different?) Given: 99",
            None,
        ));
        let result = run(
            &mock,
            Intent::Present,
            json!({"name": "site1", "url": "https://a.test", "confirmation": 300}),
            false,
        );
        assert_eq!(result.action, Action::NoOp);
        assert!(!result.changed);
    }

    #[test]
    fn test_remote_refusal_is_error() {
        let mock = MockProvider::new("TestID").respond_with(ProviderResponse::failed(
            "Test could not be created",
            Some(json!({"WebsiteURL": "invalid"})),
        ));
        let desired = desired(Intent::Present, json!({"name": "site1", "url": "nope"}));
        let err = Reconciler::new(&mock, ReconcileOptions::default())
            .ensure_present(&desired)
            .unwrap_err();

        match err {
            Error::Remote { message, issues } => {
                assert_eq!(message, "Test could not be created");
                assert_eq!(issues, vec![("WebsiteURL".to_string(), "invalid".to_string())]);
            }
            other => panic!("expected remote error, got {other:?}"),
        }
    }

    #[test]
    fn test_transport_failure_propagates() {
        let mock = MockProvider::new("TestID").fail_transport("connection refused");
        let desired = desired(Intent::Absent, json!({"name": "site1"}));
        let err = Reconciler::new(&mock, ReconcileOptions::default())
            .ensure_absent(&desired)
            .unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }

    #[test]
    fn test_list_counts_entries() {
        let mock = MockProvider::new("TestID")
            .with_resource(raw(json!({"TestID": 1, "WebsiteName": "a"})))
            .with_resource(raw(json!({"TestID": 2, "WebsiteName": "b"})));
        let listing = Reconciler::new(&mock, ReconcileOptions::default()).list().unwrap();
        assert_eq!(listing.count, 2);
        assert_eq!(mock.mutations(), 0);
    }

    #[test]
    fn test_reconcile_validates_before_network() {
        let mock = MockProvider::new("TestID");
        let err = reconcile(
            &SITE,
            &mock,
            Intent::Present,
            &params(json!({"name": "site1"})),
            ReconcileOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_reconcile_list_outcome() {
        let mock = MockProvider::new("TestID");
        let outcome = reconcile(
            &SITE,
            &mock,
            Intent::List,
            &Params::new(),
            ReconcileOptions::default(),
        )
        .unwrap();
        assert!(!outcome.changed());
        assert!(matches!(outcome, Outcome::Listed(Listing { count: 0, .. })));
    }
}
