//! Win/lose resolution for a completed session.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::IncompleteSessionError;
use crate::result_log::ResultLog;
use crate::rules::GameRules;

/// Verdict of a completed session. Derived from the result log, never stored
/// on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Outcome {
    /// True if enough rounds were correct.
    pub win: bool,
    /// Rounds judged correct.
    pub correct: usize,
    /// Rounds played.
    pub total: usize,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verdict = if self.win { "You win" } else { "You lose" };
        write!(f, "{}: {} of {} correct", verdict, self.correct, self.total)
    }
}

/// Resolves the outcome of a finished session.
///
/// Fails fast with [`IncompleteSessionError`] unless exactly
/// `max_rounds` rounds were recorded.
#[instrument(skip(log), fields(rounds = log.count(), correct = log.correct_count()))]
pub fn resolve(log: &ResultLog, rules: &GameRules) -> Result<Outcome, IncompleteSessionError> {
    let required = *rules.max_rounds();
    if log.count() != required {
        warn!(required, "Outcome requested before session completed");
        return Err(IncompleteSessionError {
            completed: log.count(),
            required,
        });
    }

    let correct = log.correct_count();
    let outcome = Outcome {
        win: correct >= *rules.win_threshold(),
        correct,
        total: log.count(),
    };
    info!(win = outcome.win, "Outcome resolved");
    Ok(outcome)
}
