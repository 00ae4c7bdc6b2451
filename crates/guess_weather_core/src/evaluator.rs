//! Tolerance-based guess evaluation.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::rules::DEFAULT_TOLERANCE;

/// Returns true iff `guessed` is within ±4.0 degrees of `actual`, inclusive.
///
/// Both values must be in the same unit; no conversion or rounding happens.
#[instrument]
pub fn evaluate(guessed: f64, actual: f64) -> bool {
    GuessEvaluator::default().evaluate(guessed, actual)
}

/// Judges guesses against a fixed tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuessEvaluator {
    tolerance: f64,
}

impl GuessEvaluator {
    /// Creates an evaluator with the given inclusive tolerance.
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// The inclusive tolerance in degrees.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// True iff `|guessed - actual| <= tolerance`.
    #[instrument(skip(self), fields(tolerance = self.tolerance))]
    pub fn evaluate(&self, guessed: f64, actual: f64) -> bool {
        (guessed - actual).abs() <= self.tolerance
    }
}

impl Default for GuessEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}
