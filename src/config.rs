//! Game configuration loaded from TOML with CLI overrides.

use std::path::Path;

use derive_getters::Getters;
use derive_more::{Display, Error};
use guess_weather_core::{CityPool, GameRules, SessionController};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Environment variable holding the OpenWeatherMap API key.
pub const API_KEY_VAR: &str = "OPENWEATHER_API_KEY";

/// Candidate cities used when the config file names none.
pub const DEFAULT_CITIES: [&str; 12] = [
    "London",
    "Paris",
    "Tokyo",
    "New York",
    "Sydney",
    "Cairo",
    "Moscow",
    "Rio de Janeiro",
    "Toronto",
    "Mumbai",
    "Reykjavik",
    "Nairobi",
];

/// Weather provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Current-weather endpoint.
    #[serde(default = "default_base_url")]
    base_url: String,

    /// Unit system requested from the provider.
    #[serde(default = "default_units")]
    units: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openweathermap.org/data/2.5/weather".to_string()
}

fn default_units() -> String {
    "metric".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            units: default_units(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Complete game configuration.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// Candidate cities.
    #[serde(default = "default_cities")]
    cities: Vec<String>,

    /// Session rules.
    #[serde(default)]
    rules: GameRules,

    /// Weather provider settings.
    #[serde(default)]
    provider: ProviderConfig,

    /// Seed for a reproducible city order.
    #[serde(default)]
    seed: Option<u64>,
}

fn default_cities() -> Vec<String> {
    DEFAULT_CITIES.iter().map(|c| c.to_string()).collect()
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cities: default_cities(),
            rules: GameRules::default(),
            provider: ProviderConfig::default(),
            seed: None,
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Overrides {
    /// Rounds per session.
    pub rounds: Option<usize>,
    /// Tolerance in degrees.
    pub tolerance: Option<f64>,
    /// Correct rounds needed to win.
    pub win_threshold: Option<usize>,
    /// RNG seed.
    pub seed: Option<u64>,
}

impl GameConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        info!(cities = config.cities.len(), "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise falls back to defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Applies command-line overrides.
    #[instrument(skip(self))]
    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(rounds) = overrides.rounds {
            self.rules = self.rules.with_max_rounds(rounds);
        }
        if let Some(tolerance) = overrides.tolerance {
            self.rules = self.rules.with_tolerance(tolerance);
        }
        if let Some(threshold) = overrides.win_threshold {
            self.rules = self.rules.with_win_threshold(threshold);
        }
        if overrides.seed.is_some() {
            self.seed = overrides.seed;
        }
        self
    }

    /// Builds the candidate pool.
    pub fn pool(&self) -> CityPool {
        CityPool::new(self.cities.iter().cloned())
    }

    /// Validates rules and pool size, then creates a controller.
    ///
    /// A pool smaller than `max_rounds` is reported here, before any
    /// session exists.
    #[instrument(skip(self), fields(seed = ?self.seed))]
    pub fn build_controller(&self) -> Result<SessionController, ConfigError> {
        self.rules
            .validate()
            .map_err(|e| ConfigError::new(format!("Invalid rules: {}", e)))?;

        let pool = self.pool();
        let controller = match self.seed {
            Some(seed) => SessionController::seeded(pool, self.rules, seed),
            None => SessionController::new(pool, self.rules),
        }
        .map_err(|e| {
            warn!(error = %e, "City pool cannot cover a session");
            ConfigError::new(format!("Invalid city list: {}", e))
        })?;

        Ok(controller)
    }
}

/// Reads the provider API key from the environment.
#[instrument]
pub fn api_key_from_env() -> Result<String, ConfigError> {
    match std::env::var(API_KEY_VAR) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(ConfigError::new(format!(
            "{} environment variable not set",
            API_KEY_VAR
        ))),
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
