//! Session rules: round count, tolerance and win threshold.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::RulesError;

/// Default number of rounds per session.
pub const DEFAULT_MAX_ROUNDS: usize = 5;

/// Default tolerance in degrees Celsius (inclusive).
pub const DEFAULT_TOLERANCE: f64 = 4.0;

/// Default number of correct rounds needed to win.
pub const DEFAULT_WIN_THRESHOLD: usize = 4;

/// Rules for one session.
///
/// The defaults are ±4.0 °C inclusive and at least 4 of 5 correct. Stricter
/// variants are expressed here too: exact matching is `tolerance = 0.0` and
/// "more than four" is `win_threshold = 5`.
#[derive(Debug, Clone, Copy, PartialEq, Getters, Serialize, Deserialize)]
pub struct GameRules {
    /// Rounds per session.
    #[serde(default = "default_max_rounds")]
    max_rounds: usize,

    /// Maximum absolute difference for a correct guess.
    #[serde(default = "default_tolerance")]
    tolerance: f64,

    /// Minimum number of correct rounds for a win.
    #[serde(default = "default_win_threshold")]
    win_threshold: usize,
}

fn default_max_rounds() -> usize {
    DEFAULT_MAX_ROUNDS
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_win_threshold() -> usize {
    DEFAULT_WIN_THRESHOLD
}

impl GameRules {
    /// Creates validated rules.
    #[instrument]
    pub fn new(max_rounds: usize, tolerance: f64, win_threshold: usize) -> Result<Self, RulesError> {
        let rules = Self {
            max_rounds,
            tolerance,
            win_threshold,
        };
        rules.validate()?;
        Ok(rules)
    }

    /// Checks the rules describe a playable session.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.max_rounds == 0 {
            return Err(RulesError::NoRounds);
        }
        if self.win_threshold > self.max_rounds {
            return Err(RulesError::UnreachableThreshold {
                threshold: self.win_threshold,
                max_rounds: self.max_rounds,
            });
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(RulesError::BadTolerance(self.tolerance));
        }
        Ok(())
    }

    /// Returns a copy with a different round count.
    pub fn with_max_rounds(self, max_rounds: usize) -> Self {
        Self { max_rounds, ..self }
    }

    /// Returns a copy with a different tolerance.
    pub fn with_tolerance(self, tolerance: f64) -> Self {
        Self { tolerance, ..self }
    }

    /// Returns a copy with a different win threshold.
    pub fn with_win_threshold(self, win_threshold: usize) -> Self {
        Self {
            win_threshold,
            ..self
        }
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            tolerance: DEFAULT_TOLERANCE,
            win_threshold: DEFAULT_WIN_THRESHOLD,
        }
    }
}
