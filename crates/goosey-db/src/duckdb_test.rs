use super::*;
use chrono::{TimeZone, Utc};

// ── Helpers ────────────────────────────────────────────────────────────

fn ledger() -> DuckDbLedger {
    DuckDbLedger::in_memory(&LedgerConfig::default()).unwrap()
}

fn row(id: &str, batch: i64, marker: bool, minute: u32) -> LedgerRow {
    LedgerRow {
        id: MigrationId::new(id),
        batch,
        marker,
        merged_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, minute, 0).unwrap(),
        author: Some(format!("{id} o")),
        checksum: Some(format!("sum-{id}")),
    }
}

fn table_exists(db: &DuckDbLedger, name: &str) -> bool {
    let count: i64 = db
        .conn()
        .query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = ?",
            duckdb::params![name],
            |r| r.get(0),
        )
        .unwrap();
    count > 0
}

// ── Ledger table ───────────────────────────────────────────────────────

#[test]
fn test_in_memory_creates_ledger() {
    let db = ledger();
    assert_eq!(db.db_type(), "duckdb");
    assert_eq!(db.table(), "goosey.migrations");
    assert!(db.rows().unwrap().is_empty());
}

#[test]
fn test_ensure_ledger_is_idempotent() {
    let db = ledger();
    db.insert_migration(&row("a", 1, true, 1)).unwrap();
    db.ensure_ledger().unwrap();
    assert_eq!(db.rows().unwrap().len(), 1);
}

#[test]
fn test_custom_ledger_location() {
    let config = LedgerConfig {
        schema: "ops".to_string(),
        table: "applied".to_string(),
    };
    let db = DuckDbLedger::new(":memory:", &config).unwrap();
    assert_eq!(db.table(), "ops.applied");
    db.insert_migration(&row("a", 1, true, 1)).unwrap();
    assert!(table_exists(&db, "applied"));
}

#[test]
fn test_invalid_ledger_location_rejected() {
    let config = LedgerConfig {
        schema: "ops".to_string(),
        table: "x; DROP TABLE y".to_string(),
    };
    assert!(matches!(
        DuckDbLedger::in_memory(&config),
        Err(DbError::ConnectionError(_))
    ));
}

#[test]
fn test_file_ledger_persists_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.duckdb");
    {
        let db = DuckDbLedger::from_path(&path, &LedgerConfig::default()).unwrap();
        db.insert_migration(&row("a", 1, true, 1)).unwrap();
    }
    let db = DuckDbLedger::from_path(&path, &LedgerConfig::default()).unwrap();
    assert_eq!(db.rows().unwrap(), vec![row("a", 1, true, 1)]);
}

// ── Row lifecycle ──────────────────────────────────────────────────────

#[test]
fn test_rows_round_trip_in_ordering_key_order() {
    let db = ledger();
    db.insert_migration(&row("c", 1, true, 3)).unwrap();
    db.insert_migration(&row("a", 1, false, 1)).unwrap();
    db.insert_migration(&row("b", 1, false, 2)).unwrap();

    let rows = db.rows().unwrap();
    let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(rows[2], row("c", 1, true, 3));
}

#[test]
fn test_insert_duplicate_fails() {
    let db = ledger();
    db.insert_migration(&row("a", 1, true, 1)).unwrap();
    let err = db.insert_migration(&row("a", 2, true, 1)).unwrap_err();
    assert!(matches!(err, DbError::DuplicateIdentifier(ref id) if id == "a"));
    assert_eq!(db.rows().unwrap()[0].batch, 1);
}

#[test]
fn test_delete_removes_row() {
    let db = ledger();
    db.insert_migration(&row("a", 1, false, 1)).unwrap();
    db.insert_migration(&row("b", 1, true, 2)).unwrap();
    db.delete_migration("b").unwrap();
    let rows = db.rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "a");
}

#[test]
fn test_delete_missing_fails() {
    let db = ledger();
    let err = db.delete_migration("ghost").unwrap_err();
    assert!(matches!(err, DbError::NotFound(ref id) if id == "ghost"));
}

#[test]
fn test_set_marker_moves_marker_within_batch() {
    let db = ledger();
    db.insert_migration(&row("a", 1, false, 1)).unwrap();
    db.insert_migration(&row("b", 1, true, 2)).unwrap();
    db.insert_migration(&row("c", 2, true, 3)).unwrap();

    db.set_marker(1, "a").unwrap();

    let markers: Vec<(String, bool)> = db
        .rows()
        .unwrap()
        .into_iter()
        .map(|r| (r.id.into_inner(), r.marker))
        .collect();
    assert_eq!(
        markers,
        vec![
            ("a".to_string(), true),
            ("b".to_string(), false),
            ("c".to_string(), true),
        ]
    );
}

#[test]
fn test_set_marker_rejects_row_from_other_batch() {
    let db = ledger();
    db.insert_migration(&row("a", 1, true, 1)).unwrap();
    assert!(matches!(db.set_marker(2, "a"), Err(DbError::NotFound(_))));
}

// ── Scripts ────────────────────────────────────────────────────────────

#[test]
fn test_run_script_commits() {
    let db = ledger();
    db.run_script("CREATE TABLE users (id INT); INSERT INTO users VALUES (1), (2);")
        .unwrap();
    let count: i64 = db
        .conn()
        .query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn test_failed_script_rolls_back_cleanly() {
    let db = ledger();
    let err = db
        .run_script("CREATE TABLE partial (id INT); INSERT INTO missing_table VALUES (1);")
        .unwrap_err();
    assert!(matches!(err, DbError::ExecutionError(_)));

    db.rollback_script().unwrap();
    assert!(!table_exists(&db, "partial"));

    // The connection is usable again afterwards.
    db.run_script("CREATE TABLE after_failure (id INT);").unwrap();
    assert!(table_exists(&db, "after_failure"));
}

#[test]
fn test_rollback_without_transaction_errors() {
    let db = ledger();
    assert!(matches!(
        db.rollback_script(),
        Err(DbError::TransactionError(_))
    ));
}

#[test]
fn test_blank_script_is_noop() {
    let db = ledger();
    db.run_script("  \n ").unwrap();
    db.run_script("-- add_users: revert\n\n  -- nothing to undo\n").unwrap();
    db.run_script("SELECT 1;").unwrap();
    // No transaction was left open by the skipped scripts.
    assert!(matches!(
        db.rollback_script(),
        Err(DbError::TransactionError(_))
    ));
}

#[test]
fn test_script_with_own_commit_is_rejected_before_running() {
    let db = ledger();
    let err = db
        .run_script("CREATE TABLE t_x (id INT); COMMIT; CREATE TABLE t_y (id INT); SELECT * FROM nope;")
        .unwrap_err();

    assert!(matches!(err, DbError::TransactionControl(ref s) if s == "COMMIT"));
    assert!(!table_exists(&db, "t_x"));
    assert!(!table_exists(&db, "t_y"));
    // Nothing was opened, so there is nothing to roll back.
    assert!(matches!(
        db.rollback_script(),
        Err(DbError::TransactionError(_))
    ));
}

#[test]
fn test_transaction_control_detection() {
    assert_eq!(transaction_control("begin;\nCREATE TABLE a (id INT);"), Some("BEGIN"));
    assert_eq!(transaction_control("SELECT 1;\n  Rollback ;"), Some("ROLLBACK"));
    assert_eq!(transaction_control("START TRANSACTION; SELECT 1;"), Some("START"));
    assert_eq!(transaction_control("SELECT 1; END"), Some("END"));

    assert_eq!(transaction_control("-- COMMIT\nSELECT 1; -- ROLLBACK later"), None);
    assert_eq!(transaction_control("ALTER TABLE t ADD COLUMN committed_at TIMESTAMP;"), None);
    assert_eq!(transaction_control("UPDATE t SET state = 'commit';"), None);

    assert_eq!(transaction_control("CREATE TABLE a (id INT); /* done */ COMMIT;"), Some("COMMIT"));
    assert_eq!(transaction_control("SELECT 1;/* a /* nested */ note */Rollback"), Some("ROLLBACK"));
    assert_eq!(
        transaction_control("INSERT INTO a VALUES ('a--b'); COMMIT; SELECT 1;"),
        Some("COMMIT")
    );
    assert_eq!(transaction_control("INSERT INTO a VALUES ('x; COMMIT');"), None);
    assert_eq!(transaction_control("/* COMMIT; */ SELECT 1;"), None);
    assert_eq!(transaction_control("SELECT \"end\"; SELECT 'it''s; begin';"), None);
}

#[test]
fn test_comment_only_scripts_are_blank() {
    assert!(is_blank_script("/* nothing\n to undo */\n-- really\n;"));
    assert!(!is_blank_script("/* drop it */ DROP TABLE t;"));
}

#[test]
fn test_hidden_commit_is_rejected_before_running() {
    let db = ledger();

    let err = db
        .run_script("CREATE TABLE p_x (id INT); /* done */ COMMIT; CREATE TABLE p_y (id INT); SELECT * FROM nope;")
        .unwrap_err();
    assert!(matches!(err, DbError::TransactionControl(ref s) if s == "COMMIT"));

    let err = db
        .run_script("CREATE TABLE q_x (s VARCHAR); INSERT INTO q_x VALUES ('a--b'); COMMIT; SELECT * FROM nope;")
        .unwrap_err();
    assert!(matches!(err, DbError::TransactionControl(ref s) if s == "COMMIT"));

    assert!(!table_exists(&db, "p_x"));
    assert!(!table_exists(&db, "p_y"));
    assert!(!table_exists(&db, "q_x"));
}

#[test]
fn test_literal_with_dashes_runs() {
    let db = ledger();
    db.run_script("CREATE TABLE notes (s VARCHAR); INSERT INTO notes VALUES ('a--b; c');")
        .unwrap();
    let s: String = db
        .conn()
        .query_row("SELECT s FROM notes", [], |row| row.get(0))
        .unwrap();
    assert_eq!(s, "a--b; c");
}
