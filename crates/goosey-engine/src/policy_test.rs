use super::*;
use chrono::{TimeZone, Utc};
use goosey_core::MigrationId;
use std::io::Cursor;
use std::path::PathBuf;

fn migration() -> Migration {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    Migration {
        id: MigrationId::new("e"),
        batch: Some(2),
        marker: false,
        dir: Some(PathBuf::from("migrations/e")),
        up_path: Some(PathBuf::from("migrations/e/up.sql")),
        down_path: Some(PathBuf::from("migrations/e/down.sql")),
        merged_at: at,
        created_at: at,
        author: None,
        checksum: None,
        recorded_checksum: None,
    }
}

fn answer(input: &str) -> (FailureAction, String) {
    let mut output = Vec::new();
    let action = {
        let mut policy = PromptOnFailure::new(Cursor::new(input.as_bytes()), &mut output);
        policy.on_failure(
            &migration(),
            Direction::Down,
            &DbError::ExecutionError("boom".to_string()),
        )
    };
    (action, String::from_utf8(output).unwrap())
}

#[test]
fn test_abort_policy_always_aborts() {
    let mut policy = AbortOnFailure;
    let action = policy.on_failure(
        &migration(),
        Direction::Up,
        &DbError::ExecutionError("boom".to_string()),
    );
    assert_eq!(action, FailureAction::Abort);
}

#[test]
fn test_prompt_yes_continues() {
    assert_eq!(answer("y\n").0, FailureAction::Continue);
    assert_eq!(answer("  Y \n").0, FailureAction::Continue);
}

#[test]
fn test_prompt_anything_else_aborts() {
    assert_eq!(answer("n\n").0, FailureAction::Abort);
    assert_eq!(answer("yes\n").0, FailureAction::Abort);
    assert_eq!(answer("\n").0, FailureAction::Abort);
    assert_eq!(answer("").0, FailureAction::Abort);
}

#[test]
fn test_prompt_shows_script_and_error() {
    let (_, shown) = answer("n\n");
    assert!(shown.contains("migrations/e/down.sql"));
    assert!(shown.contains("boom"));
    assert!(shown.contains("y/n"));
}
