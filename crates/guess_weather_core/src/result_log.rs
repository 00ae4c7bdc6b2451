//! Append-only record of completed rounds.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

use crate::city::City;

/// One evaluated guess. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct Round {
    /// Zero-based position in the session.
    index: usize,
    /// City the player was asked about.
    city: City,
    /// Name the weather provider reported for the city.
    display_name: String,
    /// Player's guess in degrees.
    guessed: f64,
    /// Temperature reported by the provider.
    actual: f64,
    /// Whether the guess was within tolerance.
    correct: bool,
}

impl Round {
    /// Creates a round record.
    pub fn new(
        index: usize,
        city: City,
        display_name: String,
        guessed: f64,
        actual: f64,
        correct: bool,
    ) -> Self {
        Self {
            index,
            city,
            display_name,
            guessed,
            actual,
            correct,
        }
    }
}

/// Ordered rounds of one session; insertion order is chronological.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultLog {
    rounds: Vec<Round>,
}

impl ResultLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a round. Only the session controller records rounds.
    pub(crate) fn append(&mut self, round: Round) {
        self.rounds.push(round);
    }

    /// Number of recorded rounds.
    pub fn count(&self) -> usize {
        self.rounds.len()
    }

    /// Number of rounds judged correct.
    pub fn correct_count(&self) -> usize {
        self.rounds.iter().filter(|round| round.correct).count()
    }

    /// Iterates rounds in the order they were played.
    pub fn iter(&self) -> std::slice::Iter<'_, Round> {
        self.rounds.iter()
    }

    /// All rounds as a slice.
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }
}

impl<'a> IntoIterator for &'a ResultLog {
    type Item = &'a Round;
    type IntoIter = std::slice::Iter<'a, Round>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
