//! Migration descriptor

use crate::direction::Direction;
use crate::ledger::LedgerRow;
use crate::migration_id::MigrationId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// One discoverable unit of schema or data change.
///
/// Discovery fills in the script paths and metadata; matching against the
/// ledger fills in `batch`, `marker` and `recorded_checksum`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// Stable identifier, unique across all migrations
    pub id: MigrationId,

    /// Batch this migration was applied in; `None` while pending
    pub batch: Option<i64>,

    /// Whether this is the last-applied migration of its batch
    pub marker: bool,

    /// Directory the migration was discovered in
    pub dir: Option<PathBuf>,

    /// Path to the up script
    pub up_path: Option<PathBuf>,

    /// Path to the down script (absent for irreversible migrations)
    pub down_path: Option<PathBuf>,

    /// When the migration was merged; the ordering key
    pub merged_at: DateTime<Utc>,

    /// When the migration was created (informational)
    pub created_at: DateTime<Utc>,

    /// Free-text attribution
    pub author: Option<String>,

    /// Checksum of the up script currently on disk
    pub checksum: Option<String>,

    /// Checksum of the up script that was applied, from the ledger
    pub recorded_checksum: Option<String>,
}

/// Where a migration stands relative to the ledger and the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationState {
    /// Not in the ledger
    Pending,
    /// In the ledger, script unchanged
    Applied,
    /// In the ledger, but the up script changed since it was applied
    Modified,
    /// In the ledger, but no longer on disk
    Missing,
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationState::Pending => write!(f, "pending"),
            MigrationState::Applied => write!(f, "applied"),
            MigrationState::Modified => write!(f, "modified"),
            MigrationState::Missing => write!(f, "missing"),
        }
    }
}

impl Migration {
    /// Build a script-less descriptor for a ledger row whose files are gone.
    pub fn from_ledger_row(row: &LedgerRow) -> Self {
        Self {
            id: row.id.clone(),
            batch: Some(row.batch),
            marker: row.marker,
            dir: None,
            up_path: None,
            down_path: None,
            merged_at: row.merged_at,
            created_at: row.merged_at,
            author: row.author.clone(),
            checksum: None,
            recorded_checksum: row.checksum.clone(),
        }
    }

    /// Ordering key: merge time, ties broken by identifier.
    pub fn ordering_key(&self) -> (DateTime<Utc>, &str) {
        (self.merged_at, self.id.as_str())
    }

    /// Whether a ledger row exists for this migration.
    pub fn is_applied(&self) -> bool {
        self.batch.is_some()
    }

    /// Script to run for `direction`, if this migration has one.
    pub fn script_path(&self, direction: Direction) -> Option<&Path> {
        match direction {
            Direction::Up => self.up_path.as_deref(),
            Direction::Down => self.down_path.as_deref(),
        }
    }

    /// Current state relative to the ledger and the filesystem.
    pub fn state(&self) -> MigrationState {
        if !self.is_applied() {
            return MigrationState::Pending;
        }
        if self.dir.is_none() {
            return MigrationState::Missing;
        }
        match (&self.checksum, &self.recorded_checksum) {
            (Some(current), Some(recorded)) if current != recorded => MigrationState::Modified,
            _ => MigrationState::Applied,
        }
    }

    /// Ledger row recording this migration as applied in `batch`.
    pub fn to_ledger_row(&self, batch: i64, marker: bool) -> LedgerRow {
        LedgerRow {
            id: self.id.clone(),
            batch,
            marker,
            merged_at: self.merged_at,
            author: self.author.clone(),
            checksum: self.checksum.clone(),
        }
    }
}
