//! Ordered migration collections
//!
//! A [`MigrationSet`] is passed by value through each stage of a run:
//! discover → enrich from the ledger → sort → slice → execute. Every stage
//! returns a new set; nothing here touches the database.

use crate::direction::Direction;
use crate::error::{CoreError, CoreResult};
use crate::ledger::LedgerRow;
use crate::migration::Migration;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Ordered collection of migration descriptors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationSet {
    migrations: Vec<Migration>,
}

impl MigrationSet {
    /// Wrap descriptors in their current order.
    pub fn new(migrations: Vec<Migration>) -> Self {
        Self { migrations }
    }

    /// Match discovered migrations against the ledger.
    ///
    /// Discovered migrations with a ledger row receive its `batch`, `marker`
    /// and recorded checksum. Ledger rows without a discovered migration are
    /// kept as script-less descriptors so rollbacks can still remove them.
    pub fn from_parts(discovered: Vec<Migration>, rows: &[LedgerRow]) -> Self {
        let mut by_id: HashMap<&str, &LedgerRow> =
            rows.iter().map(|r| (r.id.as_str(), r)).collect();

        let mut migrations: Vec<Migration> = discovered
            .into_iter()
            .map(|mut m| {
                if let Some(row) = by_id.remove(m.id.as_str()) {
                    m.batch = Some(row.batch);
                    m.marker = row.marker;
                    m.recorded_checksum = row.checksum.clone();
                }
                m
            })
            .collect();

        for row in rows {
            if by_id.contains_key(row.id.as_str()) {
                log::warn!(
                    "Migration {} (batch {}) is recorded in the ledger but missing on disk",
                    row.id,
                    row.batch
                );
                migrations.push(Migration::from_ledger_row(row));
            }
        }

        Self { migrations }
    }

    /// Order ascending (`Up`, oldest first) or descending (`Down`, newest
    /// first) by merge time, ties broken by identifier.
    pub fn sort(mut self, direction: Direction) -> Self {
        self.migrations.sort_by(|a, b| compare(a, b, direction));
        self
    }

    /// Truncate the set to what a run in `direction` must execute.
    ///
    /// `Down` considers applied migrations only, newest batch first:
    /// - `target`: every batch newer than the target's batch, plus the
    ///   target's whole batch. Fails with `TargetNotFound` if the target is
    ///   not applied.
    /// - `steps > 0`: the `steps` most recent batches (clamped).
    /// - neither: the most recent batch.
    ///
    /// `Up` considers pending migrations only, oldest first:
    /// - `target`: pending migrations up to and including the target.
    /// - `steps > 0`: the first `steps` pending migrations.
    /// - neither: every pending migration.
    ///
    /// `target` takes precedence over `steps`.
    ///
    /// Batch recency is decided by the batch number, not by the marker row's
    /// `merged_at`: batch numbers only ever grow, while merge times can
    /// interleave across batches.
    pub fn slice(self, target: Option<&str>, steps: usize, direction: Direction) -> CoreResult<Self> {
        match direction {
            Direction::Down => self.slice_down(target, steps),
            Direction::Up => self.slice_up(target, steps),
        }
    }

    fn slice_down(self, target: Option<&str>, steps: usize) -> CoreResult<Self> {
        // Batch-major so a batch is always fully undone before an older one,
        // even when merge times interleave across batches.
        let mut applied: Vec<Migration> =
            self.migrations.into_iter().filter(Migration::is_applied).collect();
        applied.sort_by(|a, b| b.batch.cmp(&a.batch).then_with(|| compare(a, b, Direction::Down)));

        let oldest_batch = match target {
            Some(target) => applied
                .iter()
                .find(|m| m.id == target)
                .and_then(|m| m.batch)
                .ok_or_else(|| CoreError::TargetNotFound {
                    target: target.to_string(),
                })?,
            None => {
                let batches: BTreeSet<i64> = applied.iter().filter_map(|m| m.batch).collect();
                match batches.iter().rev().take(steps.max(1)).last() {
                    Some(batch) => *batch,
                    None => return Ok(Self::default()),
                }
            }
        };

        applied.retain(|m| m.batch.is_some_and(|b| b >= oldest_batch));
        Ok(Self {
            migrations: applied,
        })
    }

    fn slice_up(self, target: Option<&str>, steps: usize) -> CoreResult<Self> {
        let mut pending = self.pending().migrations;

        if let Some(target) = target {
            let position = pending.iter().position(|m| m.id == target).ok_or_else(|| {
                CoreError::PendingTargetNotFound {
                    target: target.to_string(),
                }
            })?;
            pending.truncate(position + 1);
        } else if steps > 0 {
            pending.truncate(steps);
        }

        Ok(Self {
            migrations: pending,
        })
    }

    /// Pending (unapplied) migrations, oldest first.
    pub fn pending(&self) -> Self {
        let migrations = self
            .migrations
            .iter()
            .filter(|m| !m.is_applied())
            .cloned()
            .collect();
        Self { migrations }.sort(Direction::Up)
    }

    /// Applied migrations in their current order.
    pub fn applied(&self) -> impl Iterator<Item = &Migration> {
        self.migrations.iter().filter(|m| m.is_applied())
    }

    /// Distinct batch numbers, newest first.
    pub fn batches(&self) -> Vec<i64> {
        let batches: BTreeSet<i64> = self.migrations.iter().filter_map(|m| m.batch).collect();
        batches.into_iter().rev().collect()
    }

    /// Batch number the next `up` run records its migrations under.
    pub fn next_batch(&self) -> i64 {
        self.batches().first().map_or(1, |newest| newest + 1)
    }

    /// Look up a migration by identifier.
    pub fn get(&self, id: &str) -> Option<&Migration> {
        self.migrations.iter().find(|m| m.id == id)
    }

    /// Identifiers in the current order.
    pub fn ids(&self) -> Vec<&str> {
        self.migrations.iter().map(|m| m.id.as_str()).collect()
    }

    /// Iterate over migrations in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Migration> {
        self.migrations.iter()
    }

    /// Number of migrations in the set.
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}

fn compare(a: &Migration, b: &Migration, direction: Direction) -> Ordering {
    let ascending = a.ordering_key().cmp(&b.ordering_key());
    match direction {
        Direction::Up => ascending,
        Direction::Down => ascending.reverse(),
    }
}

impl IntoIterator for MigrationSet {
    type Item = Migration;
    type IntoIter = std::vec::IntoIter<Migration>;

    fn into_iter(self) -> Self::IntoIter {
        self.migrations.into_iter()
    }
}

impl<'a> IntoIterator for &'a MigrationSet {
    type Item = &'a Migration;
    type IntoIter = std::slice::Iter<'a, Migration>;

    fn into_iter(self) -> Self::IntoIter {
        self.migrations.iter()
    }
}

impl FromIterator<Migration> for MigrationSet {
    fn from_iter<I: IntoIterator<Item = Migration>>(iter: I) -> Self {
        Self {
            migrations: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
#[path = "set_test.rs"]
mod tests;
