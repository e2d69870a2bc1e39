//! Up command implementation

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, UpArgs};
use crate::commands::common::{
    build_executor, load_project, open_ledger, parse_exclude, print_report, ExitCode,
};

/// Execute the up command
pub(crate) fn execute(args: &UpArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let ledger = open_ledger(&project, global)?;
    let mut executor = build_executor(&ledger, &project, &args.run);

    let set = executor
        .load(project.discover()?)
        .context("Failed to read the ledger")?;
    if set.pending().is_empty() {
        println!("Nothing to apply: every migration is up to date");
        return Ok(());
    }

    if args.target.is_some() && args.steps.is_some() {
        log::warn!("Both --target and --steps were given; ignoring --steps");
    }

    println!("Applying migrations for {}\n", project.config.name);
    let exclude = parse_exclude(args.run.exclude.as_deref());
    let report = executor
        .up(set, args.target.as_deref(), args.steps.unwrap_or(0), &exclude)
        .context("Migration failed")?;

    print_report(&report, "Applied");
    if !report.overridden.is_empty() {
        return Err(ExitCode(2).into());
    }
    Ok(())
}

#[cfg(test)]
#[path = "up_test.rs"]
mod tests;
