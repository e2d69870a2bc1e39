//! Migration execution
//!
//! Scripts run strictly in the order of the set they are given, one at a time.
//! Each successful script is followed by its ledger mutation; a failed script
//! is rolled back on its own and leaves the ledger untouched for that
//! migration. Everything applied before a failure stays applied.

use crate::error::{EngineError, EngineResult};
use crate::policy::{AbortOnFailure, FailureAction, FailurePolicy};
use goosey_core::{
    misplaced_markers, Direction, Migration, MigrationId, MigrationSet, RollbackRequest,
};
use goosey_db::{DbError, LedgerStore};
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Direction of the run
    pub direction: Direction,

    /// Batch the run recorded its migrations under (up runs only)
    pub batch: Option<i64>,

    /// Migrations whose ledger row was written (up) or removed (down)
    pub completed: Vec<MigrationId>,

    /// Completed migrations that had no script for this direction
    pub without_script: Vec<MigrationId>,

    /// Migrations skipped because they were excluded
    pub excluded: Vec<MigrationId>,

    /// Migrations whose script failed but the failure policy continued past
    pub overridden: Vec<MigrationId>,

    /// Total execution time
    pub duration: Duration,
}

impl RunReport {
    fn new(direction: Direction) -> Self {
        Self {
            direction,
            batch: None,
            completed: Vec::new(),
            without_script: Vec::new(),
            excluded: Vec::new(),
            overridden: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    /// Whether the run touched nothing
    pub fn is_noop(&self) -> bool {
        self.completed.is_empty() && self.overridden.is_empty()
    }
}

/// Runs migration sets against a ledger store.
pub struct Executor<'a> {
    store: &'a dyn LedgerStore,
    policy: Box<dyn FailurePolicy + 'a>,
}

impl<'a> Executor<'a> {
    /// Create an executor that aborts on the first failing script
    pub fn new(store: &'a dyn LedgerStore) -> Self {
        Self {
            store,
            policy: Box::new(AbortOnFailure),
        }
    }

    /// Replace the failure policy
    pub fn with_policy(mut self, policy: impl FailurePolicy + 'a) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Match discovered migrations against the ledger.
    ///
    /// Repairs batch markers first so a run interrupted earlier is seen with
    /// a consistent batch structure.
    pub fn load(&self, discovered: Vec<Migration>) -> EngineResult<MigrationSet> {
        let repaired = self.repair_markers()?;
        if repaired > 0 {
            log::warn!("Repaired {repaired} batch marker(s) left by an interrupted run");
        }
        self.inspect(discovered)
    }

    /// Match discovered migrations against the ledger without writing to it.
    pub fn inspect(&self, discovered: Vec<Migration>) -> EngineResult<MigrationSet> {
        let rows = self.store.rows()?;
        for (batch, id) in misplaced_markers(&rows) {
            log::warn!("Batch {batch} marker is not on its newest migration {id}");
        }
        Ok(MigrationSet::from_parts(discovered, &rows))
    }

    /// Apply pending migrations of `set` as one new batch.
    ///
    /// `target` and `steps` limit how far to go; see [`MigrationSet::slice`].
    pub fn up(
        &mut self,
        set: MigrationSet,
        target: Option<&str>,
        steps: usize,
        exclude: &HashSet<String>,
    ) -> EngineResult<RunReport> {
        let selected = set.sort(Direction::Up).slice(target, steps, Direction::Up)?;
        self.execute(&selected, Direction::Up, exclude)
    }

    /// Roll back the batches selected by `request`, newest first.
    pub fn rollback(
        &mut self,
        set: MigrationSet,
        request: &RollbackRequest,
        exclude: &HashSet<String>,
    ) -> EngineResult<RunReport> {
        let selected = request.select(set)?;
        self.execute(&selected, Direction::Down, exclude)
    }

    /// Execute an already ordered and sliced set in `direction`.
    ///
    /// Migrations in `exclude` are skipped without touching their ledger row.
    /// A down run fails before running anything if an excluded migration
    /// belongs to a newer batch than the oldest one it would roll back.
    /// Up runs record every migration under the next free batch number, with
    /// the marker on the last one. Batch markers are repaired afterwards,
    /// whether or not the run succeeded.
    pub fn execute(
        &mut self,
        set: &MigrationSet,
        direction: Direction,
        exclude: &HashSet<String>,
    ) -> EngineResult<RunReport> {
        let started = Instant::now();
        let mut report = RunReport::new(direction);

        let (runnable, excluded): (Vec<&Migration>, Vec<&Migration>) =
            set.iter().partition(|m| !exclude.contains(m.id.as_str()));
        if direction == Direction::Down {
            check_exclusions(&runnable, &excluded)?;
        }
        report.excluded = excluded.into_iter().map(|m| m.id.clone()).collect();
        for id in &report.excluded {
            log::info!("Skipping excluded migration {id}");
        }

        let batch = match direction {
            Direction::Up => {
                let next = self.next_batch()?;
                report.batch = Some(next);
                next
            }
            Direction::Down => 0,
        };

        let outcome = self.run_all(&runnable, direction, batch, &mut report);

        match self.repair_markers() {
            Ok(0) => {}
            Ok(n) => log::debug!("Moved {n} batch marker(s) after {direction} run"),
            Err(e) if outcome.is_err() => {
                log::warn!("Could not repair batch markers after failed run: {e}");
            }
            Err(e) => return Err(e),
        }

        outcome?;
        report.duration = started.elapsed();
        Ok(report)
    }

    fn run_all(
        &mut self,
        runnable: &[&Migration],
        direction: Direction,
        batch: i64,
        report: &mut RunReport,
    ) -> EngineResult<()> {
        let last = runnable.len().saturating_sub(1);
        for (i, migration) in runnable.iter().enumerate() {
            self.run_one(migration, direction, batch, i == last, report)?;
        }
        Ok(())
    }

    fn run_one(
        &mut self,
        migration: &Migration,
        direction: Direction,
        batch: i64,
        marker: bool,
        report: &mut RunReport,
    ) -> EngineResult<()> {
        match migration.script_path(direction) {
            Some(path) => {
                let sql = std::fs::read_to_string(path).map_err(|source| EngineError::ScriptRead {
                    id: migration.id.to_string(),
                    path: path.to_path_buf(),
                    source,
                })?;

                log::debug!("Running {direction} script for {}: {}", migration.id, path.display());
                if let Err(err) = self.store.run_script(&sql) {
                    // Rejected scripts never opened a transaction.
                    if !matches!(err, DbError::TransactionControl(_)) {
                        if let Err(rollback_err) = self.store.rollback_script() {
                            log::warn!("Rollback after failed script {} failed: {rollback_err}", migration.id);
                        }
                    }
                    return match self.policy.on_failure(migration, direction, &err) {
                        FailureAction::Abort => Err(EngineError::ScriptExecutionFailure {
                            id: migration.id.to_string(),
                            direction,
                            path: path.to_path_buf(),
                            source: err,
                        }),
                        FailureAction::Continue => {
                            log::warn!(
                                "Continuing past failed {direction} script for {}; ledger left unchanged",
                                migration.id
                            );
                            report.overridden.push(migration.id.clone());
                            Ok(())
                        }
                    };
                }
            }
            None => {
                log::warn!("{} has no {direction} script; updating the ledger only", migration.id);
                report.without_script.push(migration.id.clone());
            }
        }

        self.record(migration, direction, batch, marker)?;
        log::info!("{direction}: {}", migration.id);
        report.completed.push(migration.id.clone());
        Ok(())
    }

    fn record(&self, migration: &Migration, direction: Direction, batch: i64, marker: bool) -> EngineResult<()> {
        let result = match direction {
            Direction::Up => self.store.insert_migration(&migration.to_ledger_row(batch, marker)),
            Direction::Down => self.store.delete_migration(&migration.id),
        };
        result.map_err(|e| EngineError::ledger_write(&migration.id, e))
    }

    fn next_batch(&self) -> EngineResult<i64> {
        let rows = self.store.rows()?;
        Ok(rows.iter().map(|r| r.batch).max().map_or(1, |b| b + 1))
    }

    /// Re-establish one marker per batch, on the batch's newest row.
    ///
    /// Returns the number of batches whose marker was moved.
    pub fn repair_markers(&self) -> EngineResult<usize> {
        let rows = self.store.rows()?;
        let misplaced = misplaced_markers(&rows);
        for (batch, id) in &misplaced {
            self.store
                .set_marker(*batch, id)
                .map_err(|e| EngineError::ledger_write(id, e))?;
        }
        Ok(misplaced.len())
    }
}

/// Reject a down run that would undo a batch while an excluded row of a newer
/// batch stays applied.
fn check_exclusions(runnable: &[&Migration], excluded: &[&Migration]) -> EngineResult<()> {
    let Some(oldest) = runnable.iter().filter_map(|m| m.batch).min() else {
        return Ok(());
    };
    match excluded
        .iter()
        .find_map(|m| m.batch.filter(|&b| b > oldest).map(|b| (m, b)))
    {
        Some((m, batch)) => Err(EngineError::ExcludedAboveRollback {
            id: m.id.to_string(),
            batch,
            oldest,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
