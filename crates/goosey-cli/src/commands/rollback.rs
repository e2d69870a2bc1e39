//! Rollback command implementation

use anyhow::{Context, Result};
use goosey_core::{MigrationId, RollbackRequest};

use crate::cli::{GlobalArgs, RollbackArgs};
use crate::commands::common::{
    build_executor, load_project, open_ledger, parse_exclude, print_report, ExitCode,
};

/// Execute the rollback command
pub(crate) fn execute(args: &RollbackArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let ledger = open_ledger(&project, global)?;
    let mut executor = build_executor(&ledger, &project, &args.run);

    let set = executor
        .load(project.discover()?)
        .context("Failed to read the ledger")?;

    let target = match &args.target {
        Some(target) => Some(
            MigrationId::try_new(target.as_str())
                .with_context(|| format!("Invalid rollback target '{target}'"))?,
        ),
        None => None,
    };
    let request = RollbackRequest {
        target,
        steps: args.steps,
    };

    let exclude = parse_exclude(args.run.exclude.as_deref());
    let report = executor
        .rollback(set, &request, &exclude)
        .context("Rollback failed")?;

    if report.is_noop() && report.excluded.is_empty() {
        println!("Nothing to roll back");
        return Ok(());
    }

    println!("Rolling back migrations for {}\n", project.config.name);
    print_report(&report, "Reverted");
    if !report.overridden.is_empty() {
        return Err(ExitCode(2).into());
    }
    Ok(())
}

#[cfg(test)]
#[path = "rollback_test.rs"]
mod tests;
