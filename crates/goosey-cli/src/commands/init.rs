//! Init command implementation - writes goosey.yml and the migrations directory

use anyhow::{Context, Result};
use goosey_core::config::CONFIG_FILE;
use goosey_core::Config;
use std::fs;

use crate::cli::{GlobalArgs, InitArgs};

/// Execute the init command
pub(crate) fn execute(args: &InitArgs, global: &GlobalArgs) -> Result<()> {
    let root = &global.project_dir;
    let config_path = root.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }

    let name = match &args.name {
        Some(name) => name.clone(),
        None => root
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "goosey".to_string()),
    };

    let mut config = Config::new(name);
    if let Some(database) = &global.database {
        config.database.path = database.clone();
    }
    config.validate().context("Invalid project settings")?;

    fs::create_dir_all(root)
        .with_context(|| format!("Failed to create directory: {}", root.display()))?;
    fs::write(&config_path, config.to_yaml()?)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    let migrations_dir = config.migrations_path_absolute(root);
    fs::create_dir_all(&migrations_dir)
        .with_context(|| format!("Failed to create directory: {}", migrations_dir.display()))?;

    println!("Initialized project: {}", config.name);
    println!("  Config:     {}", config_path.display());
    println!("  Migrations: {}", migrations_dir.display());
    println!("  Database:   {}", config.database.path);
    println!("\nNext: goosey make <slug>");

    Ok(())
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;
