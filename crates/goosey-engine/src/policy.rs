//! Failure policies
//!
//! When a script fails the engine rolls back its transaction and then asks a
//! [`FailurePolicy`] whether to stop or carry on. [`AbortOnFailure`] is the
//! default; [`PromptOnFailure`] must be selected explicitly.

use goosey_core::{Direction, Migration};
use goosey_db::DbError;
use std::io::{BufRead, Write};

/// What to do after a script failed and was rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    /// Stop the run and surface the error
    Abort,
    /// Leave the ledger untouched for this migration and move on
    Continue,
}

/// Decides how a run reacts to a failed script.
pub trait FailurePolicy {
    /// Called once per failed script, after its transaction was rolled back.
    fn on_failure(&mut self, migration: &Migration, direction: Direction, error: &DbError) -> FailureAction;
}

/// Stop at the first failing script.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbortOnFailure;

impl FailurePolicy for AbortOnFailure {
    fn on_failure(&mut self, _: &Migration, _: Direction, _: &DbError) -> FailureAction {
        FailureAction::Abort
    }
}

/// Ask the operator whether to continue past a failing script.
///
/// Reads one line; only a case-insensitive `y` continues. EOF and read
/// errors count as "no".
pub struct PromptOnFailure<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptOnFailure<R, W> {
    /// Prompt on `output`, read answers from `input`.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl PromptOnFailure<std::io::StdinLock<'static>, std::io::Stderr> {
    /// Prompt on stderr, read answers from stdin.
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stderr())
    }
}

impl<R: BufRead, W: Write> FailurePolicy for PromptOnFailure<R, W> {
    fn on_failure(&mut self, migration: &Migration, direction: Direction, error: &DbError) -> FailureAction {
        let location = migration
            .script_path(direction)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| migration.id.to_string());

        let prompt = write!(
            self.output,
            "\n{location}\n\n{error}\n\nwould you like to continue without applying this file? y/n "
        )
        .and_then(|()| self.output.flush());
        if let Err(e) = prompt {
            log::warn!("Could not write failure prompt: {e}");
            return FailureAction::Abort;
        }

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(n) if n > 0 && answer.trim().eq_ignore_ascii_case("y") => FailureAction::Continue,
            _ => FailureAction::Abort,
        }
    }
}

#[cfg(test)]
#[path = "policy_test.rs"]
mod tests;
