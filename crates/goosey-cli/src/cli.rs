//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Goosey - batch-based SQL migrations for DuckDB
#[derive(Parser, Debug)]
#[command(name = "goosey")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Override the database path from goosey.yml
    #[arg(long, global = true, env = "GOOSEY_DATABASE")]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create goosey.yml and the migrations directory
    Init(InitArgs),

    /// Scaffold a new timestamped migration
    Make(MakeArgs),

    /// Apply pending migrations as a new batch
    Up(UpArgs),

    /// Roll back the most recent batch(es)
    Rollback(RollbackArgs),

    /// Show every migration and its ledger state
    Status(StatusArgs),
}

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Project name (default: the project directory's name)
    #[arg(short, long)]
    pub name: Option<String>,
}

/// Arguments for the make command
#[derive(Args, Debug)]
pub struct MakeArgs {
    /// Short name for the migration, e.g. add_users_table
    pub slug: String,

    /// Author recorded in migration.yml
    #[arg(short, long, env = "GOOSEY_AUTHOR")]
    pub author: Option<String>,
}

/// Options shared by commands that execute scripts
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Migration ids to skip (comma-separated)
    #[arg(short = 'x', long)]
    pub exclude: Option<String>,

    /// Ask whether to continue when a script fails
    #[arg(short, long)]
    pub interactive: bool,
}

/// Arguments for the up command
#[derive(Args, Debug)]
pub struct UpArgs {
    /// Apply pending migrations up to and including this one
    #[arg(short, long)]
    pub target: Option<String>,

    /// Apply only the first N pending migrations (ignored with --target)
    #[arg(short, long)]
    pub steps: Option<usize>,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Arguments for the rollback command
#[derive(Args, Debug)]
pub struct RollbackArgs {
    /// Roll back every batch down to and including this migration's batch
    #[arg(short, long)]
    pub target: Option<String>,

    /// Number of batches to roll back (ignored with --target)
    #[arg(short, long)]
    pub steps: Option<usize>,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: StatusOutput,
}

/// Status output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutput {
    /// Table format
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
