//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use goosey_core::{discover_migrations, Config, Migration, OnFailure};
use goosey_db::{DuckDbLedger, LedgerStore};
use goosey_engine::{Executor, PromptOnFailure, RunReport};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::{GlobalArgs, RunArgs};

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and the database is closed cleanly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; nothing should be printed for it.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// A loaded project: its root directory and parsed goosey.yml.
#[derive(Debug)]
pub(crate) struct Project {
    pub(crate) root: PathBuf,
    pub(crate) config: Config,
}

impl Project {
    /// Absolute path of the migrations directory
    pub(crate) fn migrations_dir(&self) -> PathBuf {
        self.config.migrations_path_absolute(&self.root)
    }

    /// Every migration directory on disk, oldest first
    pub(crate) fn discover(&self) -> Result<Vec<Migration>> {
        let dir = self.migrations_dir();
        discover_migrations(&dir)
            .with_context(|| format!("Failed to read migrations from {}", dir.display()))
    }
}

/// Load goosey.yml from the project directory
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let config = Config::load_from_dir(&global.project_dir).context("Failed to load project")?;
    Ok(Project {
        root: global.project_dir.clone(),
        config,
    })
}

/// Resolve the database path, preferring `--database` over goosey.yml.
///
/// Relative paths are taken relative to the project root.
pub(crate) fn database_path(project: &Project, global: &GlobalArgs) -> String {
    let path = global
        .database
        .as_deref()
        .unwrap_or(&project.config.database.path);
    if path == ":memory:" || Path::new(path).is_absolute() {
        path.to_string()
    } else {
        project.root.join(path).display().to_string()
    }
}

/// Open the ledger database, creating the ledger table if needed
pub(crate) fn open_ledger(project: &Project, global: &GlobalArgs) -> Result<DuckDbLedger> {
    let path = database_path(project, global);
    let ledger = DuckDbLedger::new(&path, &project.config.ledger)
        .with_context(|| format!("Failed to open database: {path}"))?;
    log::debug!("Using {} ledger {} in {path}", ledger.db_type(), ledger.table());
    Ok(ledger)
}

/// Build an executor with the failure policy from config or `--interactive`
pub(crate) fn build_executor<'a>(
    ledger: &'a DuckDbLedger,
    project: &Project,
    run: &RunArgs,
) -> Executor<'a> {
    let executor = Executor::new(ledger);
    if run.interactive || project.config.on_failure == OnFailure::Prompt {
        executor.with_policy(PromptOnFailure::stdio())
    } else {
        executor
    }
}

/// Split a comma-separated list of migration ids
pub(crate) fn parse_exclude(exclude: Option<&str>) -> HashSet<String> {
    exclude
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Print what a run did.
pub(crate) fn print_report(report: &RunReport, verb: &str) {
    for id in &report.completed {
        if report.without_script.contains(id) {
            println!("  {verb} {id} (no {} script)", report.direction);
        } else {
            println!("  {verb} {id}");
        }
    }
    for id in &report.overridden {
        println!("  Failed {id} (continued, ledger unchanged)");
    }
    for id in &report.excluded {
        println!("  Excluded {id}");
    }

    println!();
    let count = report.completed.len();
    let plural = if count == 1 { "" } else { "s" };
    match report.batch {
        Some(batch) if count > 0 => println!(
            "{verb} {count} migration{plural} as batch {batch} in {:.2}s",
            report.duration.as_secs_f64()
        ),
        _ => println!(
            "{verb} {count} migration{plural} in {:.2}s",
            report.duration.as_secs_f64()
        ),
    }
}

/// Calculate column widths for table output.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }
    widths
}

/// Print a formatted table to stdout.
///
/// Prints a left-aligned header row, a separator line of dashes, and each
/// data row. Columns are separated by two spaces.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);

    let header_parts: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{:<width$}", h, width = w))
        .collect();
    println!("{}", header_parts.join("  ").trim_end());

    let sep_parts: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep_parts.join("  "));

    for row in rows {
        let row_parts: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect();
        println!("{}", row_parts.join("  ").trim_end());
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
