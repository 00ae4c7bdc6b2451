//! Guess Weather - terminal temperature guessing game.
//!
//! Wires the session logic from [`guess_weather_core`] to a live weather
//! service, a terminal front end and TOML configuration.
//!
//! # Architecture
//!
//! - **Config**: TOML file plus CLI overrides, validated before play
//! - **OpenWeather**: `WeatherProvider` over the OpenWeatherMap HTTP API
//! - **Cues**: terminal bell cue player
//! - **Terminal**: line-oriented command loop rendering session snapshots

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod cues;
pub mod openweather;
pub mod terminal;

// Crate-level exports
pub use config::{ConfigError, GameConfig, Overrides, ProviderConfig, api_key_from_env};
pub use cues::TerminalCues;
pub use openweather::{OpenWeatherClient, decode_payload};
pub use terminal::run_terminal;
