//! Candidate cities and non-repeating draws.

use std::collections::HashSet;

use derive_more::{Display, From};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::ExhaustedPoolError;

/// A city name as sent to the weather provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize)]
#[serde(transparent)]
pub struct City(String);

impl City {
    /// Creates a city from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the city name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for City {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Fixed collection of candidate cities.
///
/// Candidates are trimmed and de-duplicated on construction; blank names are
/// dropped. Order is preserved so seeded draws are reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityPool {
    candidates: Vec<City>,
}

impl CityPool {
    /// Builds a pool from candidate names.
    #[instrument(skip(names))]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let candidates: Vec<City> = names
            .into_iter()
            .filter_map(|name| {
                let name: String = name.into();
                let trimmed = name.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(City::new(trimmed))
                }
            })
            .filter(|city| seen.insert(city.clone()))
            .collect();

        debug!(count = candidates.len(), "City pool built");
        Self { candidates }
    }

    /// Returns the candidates in their configured order.
    pub fn candidates(&self) -> &[City] {
        &self.candidates
    }

    /// Number of distinct candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// True if the pool has no candidates.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Checks that a session of `rounds` rounds can be played without repeats.
    #[instrument(skip(self), fields(candidates = self.candidates.len()))]
    pub fn ensure_capacity(&self, rounds: usize) -> Result<(), ExhaustedPoolError> {
        if self.candidates.len() < rounds {
            warn!(rounds, "City pool too small for a full session");
            return Err(ExhaustedPoolError {
                candidates: self.candidates.len(),
                used: rounds,
            });
        }
        Ok(())
    }

    /// Draws a city uniformly from the candidates not yet in `used`.
    ///
    /// Does not record the draw; the caller inserts the result into `used`.
    #[instrument(skip(self, used, rng), fields(used = used.len()))]
    pub fn draw<R: Rng + ?Sized>(
        &self,
        used: &HashSet<City>,
        rng: &mut R,
    ) -> Result<City, ExhaustedPoolError> {
        let remaining: Vec<&City> = self
            .candidates
            .iter()
            .filter(|city| !used.contains(*city))
            .collect();

        match remaining.choose(rng) {
            Some(city) => {
                debug!(city = %city, remaining = remaining.len(), "Drew city");
                Ok((*city).clone())
            }
            None => {
                warn!("No unused city left to draw");
                Err(ExhaustedPoolError {
                    candidates: self.candidates.len(),
                    used: used.len(),
                })
            }
        }
    }
}
