//! `apply`: converge every check declared in a file

use crate::Context;
use crate::cli::{ApplyArgs, OutputFormat};
use crate::config::{self, Declaration};
use crate::ui;
use anyhow::{Result, bail};
use declarative::{
    DesiredResource, Outcome, Provider, ReconcileOptions, ReconcileResult,
    ReconcileSummary, Reconciler, Report,
};
use serde::Serialize;
use statuscake::{CheckType, HttpProvider};

/// One line of the JSON output.
#[derive(Serialize)]
#[serde(untagged)]
enum Entry {
    Done(Report),
    Failed {
        failed: bool,
        check: &'static str,
        identity: String,
        error: String,
    },
}

#[derive(Serialize)]
struct ApplyOutput {
    results: Vec<Entry>,
    summary: ReconcileSummary,
}

pub fn run(ctx: &Context, args: &ApplyArgs) -> Result<()> {
    let declarations = config::load_declarations(&args.file)?;
    if declarations.is_empty() {
        ui::warn(&format!("No checks declared in {}", args.file.display()));
        return Ok(());
    }

    let provider_config = ctx.provider_config()?;
    let uptime = HttpProvider::new(provider_config.clone(), CheckType::Uptime);
    let ssl = HttpProvider::new(provider_config, CheckType::Ssl);
    let opts = ReconcileOptions::dry_run(args.dry_run);

    let mut summary = ReconcileSummary::default();
    let mut results = Vec::with_capacity(declarations.len());

    // Sequential: one check's failure never stops the next one.
    for decl in &declarations {
        let provider: &dyn Provider = match decl.check {
            CheckType::Uptime => &uptime,
            CheckType::Ssl => &ssl,
        };
        let schema = decl.check.schema();

        match reconcile(provider, decl, opts) {
            Ok(result) => {
                summary.add_result(&result);
                let report = Report::reconciled(schema, decl.intent, result);
                if ctx.output == OutputFormat::Text {
                    ui::report(decl.check, &report, ctx.output, ctx.quiet)?;
                }
                results.push(Entry::Done(report));
            }
            Err(err) => {
                summary.add_failure();
                let identity = identity(decl);
                log::debug!("{} '{identity}' failed: {err:?}", decl.check);
                ui::error(&format!("{} '{identity}': {err}", decl.check));
                ui::dim(err.category().advice());
                results.push(Entry::Failed {
                    failed: true,
                    check: decl.check.key(),
                    identity,
                    error: err.to_string(),
                });
            }
        }
    }

    match ctx.output {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&ApplyOutput {
                results,
                summary: summary.clone(),
            })?
        ),
        OutputFormat::Text if !ctx.quiet => ui::summary(&summary, args.dry_run),
        OutputFormat::Text => {}
    }

    if !summary.is_success() {
        bail!("{} of {} check(s) failed", summary.failed, summary.total());
    }
    Ok(())
}

fn reconcile(
    provider: &dyn Provider,
    decl: &Declaration,
    opts: ReconcileOptions,
) -> declarative::Result<ReconcileResult> {
    let desired = DesiredResource::build(decl.check.schema(), decl.intent, &decl.params)?;
    match Reconciler::new(provider, opts).run(decl.intent, &desired)? {
        Outcome::Reconciled(result) => Ok(result),
        Outcome::Listed(_) => Err(declarative::Error::validation(config::LIST_NOT_ALLOWED)),
    }
}

fn identity(decl: &Declaration) -> String {
    match decl.params.get(decl.check.schema().identity) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "?".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::{Action, Call, Intent, MockProvider, ProviderResponse};
    use serde_json::json;

    fn decl(check: CheckType, intent: Intent, params: serde_json::Value) -> Declaration {
        Declaration {
            check,
            intent,
            params: params.as_object().cloned().unwrap(),
        }
    }

    #[test]
    fn test_reconcile_declaration_present() {
        let mock = MockProvider::new("TestID").respond_with(ProviderResponse::ok("Test inserted"));
        let d = decl(
            CheckType::Uptime,
            Intent::Present,
            json!({"name": "site1", "url": "https://a.test"}),
        );
        let result = reconcile(&mock, &d, ReconcileOptions::default()).unwrap();
        assert_eq!(result.action, Action::Created);
        assert_eq!(mock.mutations(), 1);
    }

    #[test]
    fn test_reconcile_declaration_absent_dry_run() {
        let entry = json!({"id": 5, "domain": "https://a.test"});
        let mock = MockProvider::new("id").with_resource(entry.as_object().cloned().unwrap());
        let d = decl(CheckType::Ssl, Intent::Absent, json!({"domain": "https://a.test"}));

        let result = reconcile(&mock, &d, ReconcileOptions::dry_run(true)).unwrap();
        assert_eq!(result.action, Action::Deleted);
        assert!(result.preview);
        assert_eq!(mock.calls(), vec![Call::List]);
    }

    #[test]
    fn test_invalid_declaration_fails_before_network() {
        let mock = MockProvider::new("id");
        let d = decl(CheckType::Ssl, Intent::Present, json!({"domain": "https://a.test"}));
        let err = reconcile(&mock, &d, ReconcileOptions::default()).unwrap_err();
        assert!(matches!(err, declarative::Error::Validation(_)));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_list_declaration_rejected() {
        let mock = MockProvider::new("TestID");
        let d = decl(CheckType::Uptime, Intent::List, json!({}));
        let err = reconcile(&mock, &d, ReconcileOptions::default()).unwrap_err();
        assert!(matches!(err, declarative::Error::Validation(_)));
        assert!(err.to_string().contains("not allowed"));
        assert_eq!(mock.mutations(), 0);
    }

    #[test]
    fn test_identity_of_declaration() {
        let d = decl(CheckType::Ssl, Intent::Absent, json!({"domain": "https://a.test"}));
        assert_eq!(identity(&d), "https://a.test");
        let d = decl(CheckType::Uptime, Intent::Absent, json!({}));
        assert_eq!(identity(&d), "?");
    }
}
