//! Ledger rows and the batch marker invariant
//!
//! Every applied migration has one ledger row. Within a batch exactly one row
//! carries `marker = true`, and it is the row with the greatest ordering key
//! (`merged_at`, then `id`) of that batch.

use crate::migration_id::MigrationId;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Persisted projection of an applied migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRow {
    /// Migration identifier (primary key)
    pub id: MigrationId,

    /// Batch the migration was applied in
    pub batch: i64,

    /// Whether this row is the last-applied migration of its batch
    pub marker: bool,

    /// Ordering key recorded at apply time
    pub merged_at: DateTime<Utc>,

    /// Author recorded at apply time
    pub author: Option<String>,

    /// Checksum of the up script that was applied
    pub checksum: Option<String>,
}

impl LedgerRow {
    /// Ordering key of this row within the ledger.
    pub fn ordering_key(&self) -> (DateTime<Utc>, &str) {
        (self.merged_at, self.id.as_str())
    }
}

/// Batches whose marker is missing, duplicated, or on the wrong row.
///
/// Returns `(batch, id)` pairs naming the row that should carry the marker,
/// ordered by batch.
pub fn misplaced_markers(rows: &[LedgerRow]) -> Vec<(i64, MigrationId)> {
    let mut batches: BTreeMap<i64, Vec<&LedgerRow>> = BTreeMap::new();
    for row in rows {
        batches.entry(row.batch).or_default().push(row);
    }

    batches
        .into_iter()
        .filter_map(|(batch, members)| {
            let newest = members.iter().max_by(|a, b| a.ordering_key().cmp(&b.ordering_key()))?;
            let marked: Vec<&&LedgerRow> = members.iter().filter(|r| r.marker).collect();
            let correct = marked.len() == 1 && marked[0].id == newest.id;
            (!correct).then(|| (batch, newest.id.clone()))
        })
        .collect()
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
