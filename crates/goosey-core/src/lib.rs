//! goosey-core - Core library for Goosey
//!
//! This crate provides the migration descriptor, the batch/marker model of the
//! ledger, ordering and slicing of migration sets, rollback selection,
//! configuration parsing and on-disk migration discovery. It has no database
//! dependency; the ledger adapter lives in `goosey-db`.

pub mod checksum;
pub mod config;
pub mod direction;
pub mod discovery;
pub mod error;
pub mod ledger;
pub mod migration;
pub mod migration_id;
mod newtype_string;
pub mod rollback;
pub mod set;

pub use checksum::{content_id, script_checksum};
pub use config::{Config, DatabaseConfig, LedgerConfig, OnFailure};
pub use direction::Direction;
pub use discovery::discover_migrations;
pub use error::{CoreError, CoreResult};
pub use ledger::{misplaced_markers, LedgerRow};
pub use migration::{Migration, MigrationState};
pub use migration_id::MigrationId;
pub use rollback::RollbackRequest;
pub use set::MigrationSet;
