//! Status command implementation

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use goosey_core::{Direction, MigrationSet, MigrationState};
use serde::Serialize;

use crate::cli::{GlobalArgs, StatusArgs, StatusOutput};
use crate::commands::common::{load_project, open_ledger, print_table};
use goosey_engine::Executor;

/// One line of status output
#[derive(Debug, Serialize)]
pub(crate) struct StatusRow {
    pub(crate) id: String,
    pub(crate) author: Option<String>,
    pub(crate) batch: Option<i64>,
    pub(crate) marker: bool,
    pub(crate) state: MigrationState,
    pub(crate) merged_at: DateTime<Utc>,
}

/// Execute the status command
pub(crate) fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let ledger = open_ledger(&project, global)?;
    let set = Executor::new(&ledger)
        .inspect(project.discover()?)
        .context("Failed to read the ledger")?;
    let rows = status_rows(set);

    match args.output {
        StatusOutput::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        StatusOutput::Table => {
            if rows.is_empty() {
                println!("No migrations found in {}", project.migrations_dir().display());
                return Ok(());
            }
            print_status_table(&rows);
        }
    }
    Ok(())
}

/// Every migration, oldest first, with its ledger state
pub(crate) fn status_rows(set: MigrationSet) -> Vec<StatusRow> {
    set.sort(Direction::Up)
        .into_iter()
        .map(|m| StatusRow {
            state: m.state(),
            id: m.id.into_inner(),
            author: m.author,
            batch: m.batch,
            marker: m.marker,
            merged_at: m.merged_at,
        })
        .collect()
}

fn print_status_table(rows: &[StatusRow]) {
    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.id.clone(),
                r.author.clone().unwrap_or_else(|| "-".to_string()),
                r.batch.map_or_else(|| "-".to_string(), |b| b.to_string()),
                if r.marker { "*" } else { "" }.to_string(),
                r.state.to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "AUTHOR", "BATCH", "MARKER", "STATE"], &table);

    let pending = rows
        .iter()
        .filter(|r| r.state == MigrationState::Pending)
        .count();
    println!("\n{} migrations, {} pending", rows.len(), pending);
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
