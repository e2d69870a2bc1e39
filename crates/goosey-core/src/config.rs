//! Configuration types and parsing for goosey.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// File name of the project configuration.
pub const CONFIG_FILE: &str = "goosey.yml";

/// Main project configuration from goosey.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Directory containing migration directories, relative to the project root
    #[serde(default = "default_migrations_path")]
    pub migrations_path: String,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Where the ledger table lives
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// What to do when a script fails
    #[serde(default)]
    pub on_failure: OnFailure,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// DuckDB file path, or `:memory:`
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Location of the ledger table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Schema holding the ledger table
    #[serde(default = "default_ledger_schema")]
    pub schema: String,

    /// Ledger table name
    #[serde(default = "default_ledger_table")]
    pub table: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            schema: default_ledger_schema(),
            table: default_ledger_table(),
        }
    }
}

impl LedgerConfig {
    /// `schema.table`, safe to interpolate once [`validate`](Self::validate) passed.
    pub fn qualified_table(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }

    /// Reject schema or table names that are not plain SQL identifiers.
    pub fn validate(&self) -> CoreResult<()> {
        for (field, value) in [("ledger.schema", &self.schema), ("ledger.table", &self.table)] {
            if !is_identifier(value) {
                return Err(CoreError::ConfigInvalid {
                    message: format!(
                        "{field} '{value}' must start with a letter or '_' and contain only letters, digits and '_'"
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Failure policy selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnFailure {
    /// Stop the run at the first failing script
    #[default]
    Abort,
    /// Ask the operator whether to continue past a failing script
    Prompt,
}

impl fmt::Display for OnFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnFailure::Abort => write!(f, "abort"),
            OnFailure::Prompt => write!(f, "prompt"),
        }
    }
}

fn default_migrations_path() -> String {
    "migrations".to_string()
}

fn default_db_path() -> String {
    "goosey.duckdb".to_string()
}

fn default_ledger_schema() -> String {
    "goosey".to_string()
}

fn default_ledger_table() -> String {
    "migrations".to_string()
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Config {
    /// Default configuration for a new project.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            migrations_path: default_migrations_path(),
            database: DatabaseConfig::default(),
            ledger: LedgerConfig::default(),
            on_failure: OnFailure::default(),
        }
    }

    /// Load and validate configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|source| CoreError::IoWithPath {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                message: format!("{}: {e}", path.display()),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `goosey.yml` from a project directory
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        Self::load(&dir.join(CONFIG_FILE))
    }

    /// Validate values serde cannot check on its own
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "name must not be empty".to_string(),
            });
        }
        if self.migrations_path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migrations_path must not be empty".to_string(),
            });
        }
        self.ledger.validate()
    }

    /// Absolute migrations directory for a project rooted at `root`
    pub fn migrations_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.migrations_path)
    }

    /// Render this configuration as YAML
    pub fn to_yaml(&self) -> CoreResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
