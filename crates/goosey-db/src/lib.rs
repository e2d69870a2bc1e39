//! goosey-db - Ledger store for Goosey
//!
//! This crate provides the `LedgerStore` trait the execution engine runs
//! against, and its DuckDB implementation.

pub mod duckdb;
pub mod error;
pub mod traits;

pub use crate::duckdb::DuckDbLedger;
pub use error::{DbError, DbResult};
pub use traits::LedgerStore;
