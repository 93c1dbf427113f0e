use crate::cli::OutputFormat;
use anyhow::Result;
use colored::Colorize;
use declarative::{Action, FieldValue, ListReport, ReconcileReport, ReconcileSummary, Report, remote_identity};
use statuscake::CheckType;

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

// ============================================================================
// Reports
// ============================================================================

/// Print a report in the requested format.
///
/// In quiet text mode, results that changed nothing are not printed.
pub fn report(check: CheckType, report: &Report, format: OutputFormat, quiet: bool) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text if quiet && !report.changed() => {}
        OutputFormat::Text => print!("{}", render(check, report)),
    }
    Ok(())
}

/// Text form of a report.
pub fn render(check: CheckType, report: &Report) -> String {
    match report {
        Report::Reconciled(r) => render_reconciled(check, r),
        Report::Listed(r) => render_listing(check, r),
    }
}

fn render_reconciled(check: CheckType, report: &ReconcileReport) -> String {
    let identity = report.identity.values().next().map_or("", String::as_str);
    let symbol = match report.action {
        Action::Created => "+".green(),
        Action::Updated => "~".yellow(),
        Action::Deleted => "-".red(),
        Action::NoOp => "=".dimmed(),
    };
    let verb = match (report.action, report.preview) {
        (Action::NoOp, _) => "unchanged".to_string(),
        (action, true) => format!("would be {action}"),
        (action, false) => action.to_string(),
    };

    let mut out = format!("{symbol} {check} '{}' {verb}\n", identity.bold());
    if !report.response.is_empty() {
        out.push_str(&format!("    {}\n", report.response.dimmed()));
    }
    for (field, after) in report.diff.after.iter() {
        let before = report.diff.before.get(field).unwrap_or(&FieldValue::Null);
        out.push_str(&format!(
            "    {}: {} → {}\n",
            field.cyan(),
            shown(before).red(),
            shown(after).green()
        ));
    }
    out
}

fn render_listing(check: CheckType, report: &ListReport) -> String {
    let schema = check.schema();
    let mut out = format!("{} {check}(s)\n", report.tests.count.to_string().bold());
    for entry in &report.tests.output {
        let identity = remote_identity(schema, entry).unwrap_or_default();
        let id = match entry.get(schema.id_key) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        out.push_str(&format!("  {identity}  {}\n", format!("{} {id}", schema.id_key).dimmed()));
    }
    out
}

fn shown(value: &FieldValue) -> String {
    match value {
        FieldValue::Null => "(none)".to_string(),
        other => other.to_string(),
    }
}

/// Print the closing summary of a batch.
pub fn summary(summary: &ReconcileSummary, dry_run: bool) {
    header(if dry_run { "Summary (dry run)" } else { "Summary" });
    println!(
        "  {} created, {} updated, {} deleted, {} unchanged",
        summary.created.to_string().green(),
        summary.updated.to_string().yellow(),
        summary.deleted.to_string().red(),
        summary.no_change
    );
    if summary.is_success() {
        success(&format!("{} check(s) processed", summary.total()));
    } else {
        error(&format!("{} of {} check(s) failed", summary.failed, summary.total()));
    }
}

// ============================================================================
// Tests
// ============================================================================
