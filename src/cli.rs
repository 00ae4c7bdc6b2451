//! Command-line interface for guess_weather.

use clap::{Parser, Subcommand};

use crate::config::Overrides;

/// Guess Weather - guess the temperature in random cities
#[derive(Parser, Debug)]
#[command(name = "guess_weather")]
#[command(about = "Guess the current temperature in randomly chosen cities", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file (defaults are used if missing)
    #[arg(short, long, global = true, default_value = "guess_weather.toml")]
    pub config: std::path::PathBuf,

    /// Enable debug logging for the game crates
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a session in the terminal
    Play {
        /// Seed for a reproducible city order
        #[arg(long)]
        seed: Option<u64>,

        /// Rounds per session
        #[arg(long)]
        rounds: Option<usize>,

        /// Tolerance in degrees Celsius (inclusive)
        #[arg(long)]
        tolerance: Option<f64>,

        /// Correct rounds needed to win
        #[arg(long)]
        win_threshold: Option<usize>,

        /// Do not ring the terminal bell
        #[arg(long)]
        mute: bool,
    },

    /// List the configured candidate cities
    Cities,
}

impl Command {
    /// Rule overrides carried by this command.
    pub fn overrides(&self) -> Overrides {
        match self {
            Command::Play {
                seed,
                rounds,
                tolerance,
                win_threshold,
                ..
            } => Overrides {
                rounds: *rounds,
                tolerance: *tolerance,
                win_threshold: *win_threshold,
                seed: *seed,
            },
            Command::Cities => Overrides::default(),
        }
    }
}
