//! Single-check commands (`uptime`, `ssl`)

use crate::Context;
use crate::cli::RunArgs;
use crate::ui;
use anyhow::Result;
use declarative::{DesiredResource, Intent, Params, ReconcileOptions, Reconciler, Report};
use statuscake::{CheckType, HttpProvider};

/// Reconcile (or list) one check from command-line parameters.
pub fn run(ctx: &Context, check: CheckType, args: &RunArgs, params: &Params) -> Result<()> {
    let intent = Intent::from(args.state);
    let schema = check.schema();

    // Rejects bad input before credentials are even looked up.
    let desired = DesiredResource::build(schema, intent, params)?;

    let provider = HttpProvider::new(ctx.provider_config()?, check);
    let opts = ReconcileOptions::dry_run(args.dry_run);
    log::info!("Reconciling {check} (state {intent}, dry run: {})", args.dry_run);

    let outcome = Reconciler::new(&provider, opts).run(intent, &desired)?;
    ui::report(check, &Report::new(schema, intent, outcome), ctx.output, ctx.quiet)
}
