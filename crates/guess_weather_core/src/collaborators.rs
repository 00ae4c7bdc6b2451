//! External collaborators: the weather provider and the cue player.

use async_trait::async_trait;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use tracing::{debug, instrument};

use crate::city::City;
use crate::error::FetchError;

/// Current temperature for a city as reported by a provider.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct WeatherReading {
    /// Name the provider uses for the city.
    display_name: String,
    /// Temperature in degrees Celsius.
    temperature: f64,
}

impl WeatherReading {
    /// Creates a reading.
    pub fn new(display_name: impl Into<String>, temperature: f64) -> Self {
        Self {
            display_name: display_name.into(),
            temperature,
        }
    }
}

/// Source of live temperatures.
///
/// Implementations perform no retries; the player retries by resubmitting.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Looks up the current temperature for `city`.
    async fn fetch_temperature(&self, city: &City) -> Result<WeatherReading, FetchError>;
}

/// Audio cue kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum Cue {
    /// A round was guessed within tolerance.
    Correct,
    /// A round was guessed outside tolerance.
    Wrong,
    /// The session ended in a win.
    Win,
    /// The session ended in a loss.
    Lose,
}

/// Fire-and-forget cue playback. Results are never observed by the game.
pub trait CuePlayer: Send + Sync {
    /// Plays a cue.
    fn play_cue(&self, cue: Cue);
}

/// Cue player that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentCues;

impl CuePlayer for SilentCues {
    #[instrument(skip(self))]
    fn play_cue(&self, cue: Cue) {
        debug!(%cue, "Cue (silent)");
    }
}
