//! goosey-engine - Migration execution for Goosey
//!
//! This crate runs an ordered [`goosey_core::MigrationSet`] up or down against
//! a [`goosey_db::LedgerStore`], keeping the ledger's batch markers intact and
//! deciding what happens when a script fails.

pub mod error;
pub mod executor;
pub mod policy;

pub use error::{EngineError, EngineResult};
pub use executor::{Executor, RunReport};
pub use policy::{AbortOnFailure, FailureAction, FailurePolicy, PromptOnFailure};
