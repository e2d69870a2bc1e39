//! Error types for goosey-core

use thiserror::Error;

/// Core error type for Goosey
#[derive(Error, Debug)]
pub enum CoreError {
    /// G001: Configuration file not found
    #[error("[G001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// G002: Failed to parse configuration file
    #[error("[G002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// G003: Invalid configuration value
    #[error("[G003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// G004: Migration directory is malformed
    #[error("[G004] Invalid migration directory at '{path}': {reason}")]
    InvalidMigrationDirectory { path: String, reason: String },

    /// G005: Two migrations share an identifier
    #[error("[G005] Duplicate migration id '{id}' in {path1} and {path2}")]
    DuplicateMigration {
        id: String,
        path1: String,
        path2: String,
    },

    /// G006: Failed to parse a migration.yml file
    #[error("[G006] Failed to parse migration metadata {path}: {details}")]
    MetadataParseError { path: String, details: String },

    /// G007: Rollback target is not recorded in the ledger
    #[error("[G007] Rollback target '{target}' is not an applied migration")]
    TargetNotFound { target: String },

    /// G008: Up target is not a pending migration
    #[error("[G008] Target '{target}' is not a pending migration")]
    PendingTargetNotFound { target: String },

    /// G009: IO error
    #[error("[G009] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// G010: IO error with file path context
    #[error("[G010] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// G011: YAML parse error
    #[error("[G011] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
