//! Execution direction

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction a migration is executed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Apply: run the up script and append a ledger row.
    Up,
    /// Revert: run the down script and delete the ledger row.
    Down,
}

impl Direction {
    /// File name of the script for this direction inside a migration directory.
    pub fn script_file_name(self) -> &'static str {
        match self {
            Direction::Up => "up.sql",
            Direction::Down => "down.sql",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}
