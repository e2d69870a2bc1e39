//! Error types for goosey-engine

use goosey_core::{CoreError, Direction};
use goosey_db::DbError;
use std::path::PathBuf;
use thiserror::Error;

/// Terminal errors of a migration run.
///
/// None of these are retried; the operator fixes the cause and re-invokes.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A script failed against the datastore; its transaction was rolled back (X001)
    #[error("[X001] {direction} script for {id} failed ({path}): {source}")]
    ScriptExecutionFailure {
        id: String,
        direction: Direction,
        path: PathBuf,
        #[source]
        source: DbError,
    },

    /// Writing the ledger failed after the script ran (X002)
    #[error("[X002] Ledger write for {id} failed: {source}")]
    LedgerWriteFailure {
        id: String,
        #[source]
        source: DbError,
    },

    /// The ledger already records this migration (X003)
    #[error("[X003] Migration {id} is already recorded in the ledger; ledger and migrations directory have drifted")]
    DuplicateIdentifier { id: String },

    /// The ledger has no row for a migration being rolled back (X004)
    #[error("[X004] Migration {id} is not recorded in the ledger; ledger and migrations directory have drifted")]
    NotFound { id: String },

    /// A script file could not be read (X005)
    #[error("[X005] Failed to read script for {id} at {path}: {source}")]
    ScriptRead {
        id: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading the ledger failed (X006)
    #[error("[X006] Ledger read failed: {0}")]
    Ledger(#[from] DbError),

    /// Selection or configuration error from goosey-core (X007)
    #[error("[X007] {0}")]
    Core(#[from] CoreError),

    /// An excluded migration would be left above batches being rolled back (X008)
    #[error("[X008] Excluded migration {id} belongs to batch {batch}, newer than batch {oldest} being rolled back; exclude only migrations of the oldest batch in the rollback")]
    ExcludedAboveRollback { id: String, batch: i64, oldest: i64 },
}

impl EngineError {
    /// Classify a failed ledger mutation for `id`.
    pub(crate) fn ledger_write(id: &str, err: DbError) -> Self {
        match err {
            DbError::DuplicateIdentifier(_) => EngineError::DuplicateIdentifier { id: id.to_string() },
            DbError::NotFound(_) => EngineError::NotFound { id: id.to_string() },
            source => EngineError::LedgerWriteFailure {
                id: id.to_string(),
                source,
            },
        }
    }
}

/// Result type alias for EngineError
pub type EngineResult<T> = Result<T, EngineError>;
