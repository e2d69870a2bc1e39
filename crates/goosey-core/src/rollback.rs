//! Rollback selection

use crate::direction::Direction;
use crate::error::CoreResult;
use crate::migration_id::MigrationId;
use crate::set::MigrationSet;

/// What a rollback should undo.
///
/// When both a target and a step count are given the target wins and the
/// step count is ignored. With neither, the most recent batch is rolled back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollbackRequest {
    /// Roll back every batch down to and including this migration's batch
    pub target: Option<MigrationId>,

    /// Roll back this many of the most recent batches
    pub steps: Option<usize>,
}

impl RollbackRequest {
    /// Roll back the most recent batch.
    pub fn last_batch() -> Self {
        Self::default()
    }

    /// Roll back through the batch containing `target`.
    pub fn to_target(target: MigrationId) -> Self {
        Self {
            target: Some(target),
            steps: None,
        }
    }

    /// Roll back the `steps` most recent batches.
    pub fn steps(steps: usize) -> Self {
        Self {
            target: None,
            steps: Some(steps),
        }
    }

    /// Whether the request carries both a target and a step count.
    pub fn is_ambiguous(&self) -> bool {
        self.target.is_some() && self.steps.is_some()
    }

    /// The `(target, steps)` pair consumed by [`MigrationSet::slice`].
    pub fn selection(&self) -> (Option<&str>, usize) {
        match (&self.target, self.steps) {
            (Some(target), _) => (Some(target.as_str()), 0),
            (None, Some(steps)) if steps > 0 => (None, steps),
            (None, _) => (None, 1),
        }
    }

    /// Slice `set` to the migrations this request rolls back, newest first.
    pub fn select(&self, set: MigrationSet) -> CoreResult<MigrationSet> {
        if self.is_ambiguous() {
            log::warn!("Both a rollback target and a step count were given; ignoring the step count");
        }
        let (target, steps) = self.selection();
        set.sort(Direction::Down).slice(target, steps, Direction::Down)
    }
}
