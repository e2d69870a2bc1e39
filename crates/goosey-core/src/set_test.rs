use super::*;
use crate::migration_id::MigrationId;
use chrono::{TimeZone, Utc};
use std::path::PathBuf;

// ── Helpers ────────────────────────────────────────────────────────────

fn migration(id: &str, minute: u32) -> Migration {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, minute, 0).unwrap();
    Migration {
        id: MigrationId::new(id),
        batch: None,
        marker: false,
        dir: Some(PathBuf::from(format!("migrations/{id}"))),
        up_path: Some(PathBuf::from(format!("migrations/{id}/up.sql"))),
        down_path: Some(PathBuf::from(format!("migrations/{id}/down.sql"))),
        merged_at: at,
        created_at: at,
        author: Some(format!("{id} o")),
        checksum: None,
        recorded_checksum: None,
    }
}

fn applied(id: &str, minute: u32, batch: i64, marker: bool) -> Migration {
    let mut m = migration(id, minute);
    m.batch = Some(batch);
    m.marker = marker;
    m
}

/// Batch 1 = {a, b, c} (c marked), batch 2 = {d, e, f} (f marked).
fn two_batches() -> MigrationSet {
    MigrationSet::new(vec![
        applied("a", 1, 1, false),
        applied("b", 2, 1, false),
        applied("c", 3, 1, true),
        applied("d", 4, 2, false),
        applied("e", 5, 2, false),
        applied("f", 6, 2, true),
    ])
}

// ── Sorting ────────────────────────────────────────────────────────────

#[test]
fn test_sort_up_is_oldest_first() {
    let set = MigrationSet::new(vec![migration("b", 2), migration("a", 1), migration("c", 3)]);
    assert_eq!(set.sort(Direction::Up).ids(), vec!["a", "b", "c"]);
}

#[test]
fn test_sort_down_is_newest_first() {
    let set = MigrationSet::new(vec![migration("b", 2), migration("a", 1), migration("c", 3)]);
    assert_eq!(set.sort(Direction::Down).ids(), vec!["c", "b", "a"]);
}

#[test]
fn test_sort_breaks_ties_by_id() {
    let set = MigrationSet::new(vec![migration("y", 1), migration("x", 1), migration("z", 1)]);
    assert_eq!(set.clone().sort(Direction::Up).ids(), vec!["x", "y", "z"]);
    assert_eq!(set.sort(Direction::Down).ids(), vec!["z", "y", "x"]);
}

// ── Down slicing ───────────────────────────────────────────────────────

#[test]
fn test_slice_default_is_most_recent_batch_descending() {
    let sliced = two_batches()
        .sort(Direction::Down)
        .slice(None, 0, Direction::Down)
        .unwrap();
    assert_eq!(sliced.ids(), vec!["f", "e", "d"]);
}

#[test]
fn test_slice_one_step_equals_default() {
    let by_steps = two_batches().slice(None, 1, Direction::Down).unwrap();
    let by_default = two_batches().slice(None, 0, Direction::Down).unwrap();
    assert_eq!(by_steps, by_default);
}

#[test]
fn test_slice_two_steps_covers_both_batches() {
    let sliced = two_batches().slice(None, 2, Direction::Down).unwrap();
    assert_eq!(sliced.ids(), vec!["f", "e", "d", "c", "b", "a"]);
}

#[test]
fn test_slice_steps_clamps_to_recorded_batches() {
    let sliced = two_batches().slice(None, 10, Direction::Down).unwrap();
    assert_eq!(sliced.len(), 6);
}

#[test]
fn test_slice_target_includes_whole_target_batch() {
    let sliced = two_batches().slice(Some("b"), 0, Direction::Down).unwrap();
    assert_eq!(sliced.ids(), vec!["f", "e", "d", "c", "b", "a"]);

    let sliced = two_batches().slice(Some("e"), 0, Direction::Down).unwrap();
    assert_eq!(sliced.ids(), vec!["f", "e", "d"]);
}

#[test]
fn test_slice_target_takes_precedence_over_steps() {
    let sliced = two_batches().slice(Some("f"), 2, Direction::Down).unwrap();
    assert_eq!(sliced.ids(), vec!["f", "e", "d"]);
}

#[test]
fn test_slice_unknown_target_fails() {
    let err = two_batches()
        .slice(Some("zzz"), 0, Direction::Down)
        .unwrap_err();
    assert!(matches!(err, CoreError::TargetNotFound { ref target } if target == "zzz"));
}

#[test]
fn test_slice_pending_target_is_not_found_for_down() {
    let mut set: Vec<Migration> = two_batches().into_iter().collect();
    set.push(migration("g", 7));
    let err = MigrationSet::new(set)
        .slice(Some("g"), 0, Direction::Down)
        .unwrap_err();
    assert!(matches!(err, CoreError::TargetNotFound { .. }));
}

#[test]
fn test_slice_empty_ledger_is_empty() {
    let set = MigrationSet::new(vec![migration("a", 1), migration("b", 2)]);
    assert!(set.slice(None, 0, Direction::Down).unwrap().is_empty());
    assert!(MigrationSet::default()
        .slice(None, 3, Direction::Down)
        .unwrap()
        .is_empty());
}

#[test]
fn test_slice_down_skips_pending_migrations() {
    let mut set: Vec<Migration> = two_batches().into_iter().collect();
    set.push(migration("g", 7));
    let sliced = MigrationSet::new(set).slice(None, 0, Direction::Down).unwrap();
    assert_eq!(sliced.ids(), vec!["f", "e", "d"]);
}

#[test]
fn test_slice_down_keeps_batches_contiguous_when_merge_times_interleave() {
    // `late` was merged before `c` but applied in a later batch.
    let set = MigrationSet::new(vec![
        applied("a", 1, 1, false),
        applied("late", 2, 2, true),
        applied("c", 3, 1, true),
    ]);
    let sliced = set.slice(None, 2, Direction::Down).unwrap();
    assert_eq!(sliced.ids(), vec!["late", "c", "a"]);
}

// ── Up slicing ─────────────────────────────────────────────────────────

fn mixed() -> MigrationSet {
    MigrationSet::new(vec![
        applied("a", 1, 1, true),
        migration("d", 4),
        migration("b", 2),
        migration("c", 3),
    ])
}

#[test]
fn test_slice_up_default_is_all_pending() {
    let sliced = mixed().slice(None, 0, Direction::Up).unwrap();
    assert_eq!(sliced.ids(), vec!["b", "c", "d"]);
}

#[test]
fn test_slice_up_by_steps_and_target() {
    assert_eq!(mixed().slice(None, 2, Direction::Up).unwrap().ids(), vec!["b", "c"]);
    assert_eq!(
        mixed().slice(Some("c"), 0, Direction::Up).unwrap().ids(),
        vec!["b", "c"]
    );
}

#[test]
fn test_slice_up_applied_target_fails() {
    let err = mixed().slice(Some("a"), 0, Direction::Up).unwrap_err();
    assert!(matches!(err, CoreError::PendingTargetNotFound { .. }));
}

// ── Ledger matching ────────────────────────────────────────────────────

#[test]
fn test_from_parts_enriches_and_keeps_orphans() {
    let rows: Vec<LedgerRow> = vec![
        migration("a", 1).to_ledger_row(1, false),
        migration("gone", 2).to_ledger_row(1, true),
    ];
    let set = MigrationSet::from_parts(vec![migration("a", 1), migration("b", 3)], &rows);

    assert_eq!(set.len(), 3);
    assert_eq!(set.get("a").unwrap().batch, Some(1));
    assert!(!set.get("b").unwrap().is_applied());

    let orphan = set.get("gone").unwrap();
    assert!(orphan.marker);
    assert!(orphan.up_path.is_none());
}

#[test]
fn test_next_batch() {
    assert_eq!(MigrationSet::default().next_batch(), 1);
    assert_eq!(two_batches().next_batch(), 3);
    assert_eq!(two_batches().batches(), vec![2, 1]);
}
