//! Make command implementation - scaffolds a new migration directory

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use goosey_core::discovery::{MigrationMetadata, METADATA_FILE, TIMESTAMP_FORMAT};
use goosey_core::{content_id, Direction, MigrationId};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::{GlobalArgs, MakeArgs};
use crate::commands::common::load_project;

/// Execute the make command
pub(crate) fn execute(args: &MakeArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let dir = create_migration(
        &project.migrations_dir(),
        &args.slug,
        args.author.as_deref(),
        Utc::now(),
    )?;

    println!("Created migration: {}", dir.display());
    for file in [
        Direction::Up.script_file_name(),
        Direction::Down.script_file_name(),
        METADATA_FILE,
    ] {
        println!("  {}", dir.join(file).display());
    }
    Ok(())
}

/// Create `<timestamp>_<slug>/` under `migrations_dir` with empty scripts
/// and a migration.yml carrying a generated id.
pub(crate) fn create_migration(
    migrations_dir: &Path,
    slug: &str,
    author: Option<&str>,
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    validate_slug(slug)?;

    let stamp = now.format(TIMESTAMP_FORMAT).to_string();
    let dir = migrations_dir.join(format!("{stamp}_{slug}"));
    if dir.exists() {
        anyhow::bail!("Migration directory '{}' already exists", dir.display());
    }
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let id = content_id(&[&stamp, slug, author.unwrap_or_default()]);
    let metadata = MigrationMetadata {
        id: Some(MigrationId::new(id)),
        author: author.map(String::from),
        merged_at: None,
    };
    let files = [
        (
            Direction::Up.script_file_name(),
            format!("-- {slug}: apply\n"),
        ),
        (
            Direction::Down.script_file_name(),
            format!("-- {slug}: revert\n"),
        ),
        (METADATA_FILE, serde_yaml::to_string(&metadata)?),
    ];
    for (name, content) in files {
        let path = dir.join(name);
        fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(dir)
}

fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty()
        || !slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        anyhow::bail!(
            "Invalid migration name '{slug}': use letters, digits, '_' or '-' only"
        );
    }
    Ok(())
}

#[cfg(test)]
#[path = "make_test.rs"]
mod tests;
