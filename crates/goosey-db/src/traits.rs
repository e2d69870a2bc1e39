//! Ledger store trait definition

use crate::error::DbResult;
use goosey_core::LedgerRow;

/// Persistent record of applied migrations, plus the datastore the
/// migration scripts run against.
///
/// Calls are blocking and must be issued from a single thread, one at a time.
pub trait LedgerStore {
    /// Create the ledger schema and table if they do not exist
    fn ensure_ledger(&self) -> DbResult<()>;

    /// Run script text inside its own transaction.
    ///
    /// On error nothing is committed, but the transaction may still be open;
    /// the caller must follow up with [`rollback_script`](Self::rollback_script).
    fn run_script(&self, sql: &str) -> DbResult<()>;

    /// Roll back the transaction left open by a failed `run_script`
    fn rollback_script(&self) -> DbResult<()>;

    /// Append a row; fails with `DuplicateIdentifier` if the id is recorded
    fn insert_migration(&self, row: &LedgerRow) -> DbResult<()>;

    /// Delete the row for `id`; fails with `NotFound` if it is not recorded
    fn delete_migration(&self, id: &str) -> DbResult<()>;

    /// Make `id` the only marker row of `batch`
    fn set_marker(&self, batch: i64, id: &str) -> DbResult<()>;

    /// All rows, ordered by merge time then id
    fn rows(&self) -> DbResult<Vec<LedgerRow>>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
