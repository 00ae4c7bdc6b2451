//! Guess Weather - CLI entry point.

#![warn(missing_docs)]

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use guess_weather::cli::{Cli, Command};
use guess_weather::{GameConfig, OpenWeatherClient, TerminalCues, api_key_from_env, run_terminal};
use guess_weather_core::GameHandle;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    initialize_tracing(cli.verbose);

    let config = GameConfig::load_or_default(&cli.config)?.apply(cli.command.overrides());

    match cli.command {
        Command::Play { mute, .. } => run_play(config, mute).await,
        Command::Cities => list_cities(&config),
    }
}

/// Logs go to stderr so they never interleave with the game prompt.
fn initialize_tracing(verbose: bool) {
    let default = if verbose {
        "warn,guess_weather=debug,guess_weather_core=debug"
    } else {
        "warn,guess_weather=info,guess_weather_core=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

/// Run an interactive session
#[instrument(skip(config))]
async fn run_play(config: GameConfig, mute: bool) -> Result<()> {
    let controller = config
        .build_controller()?
        .with_cues(Arc::new(TerminalCues::new(!mute)));

    let api_key = api_key_from_env()?;
    let provider = OpenWeatherClient::new(config.provider(), api_key)?;

    info!(rules = ?config.rules(), "Starting game");
    run_terminal(GameHandle::new(controller, Arc::new(provider))).await
}

/// Print the candidate pool
fn list_cities(config: &GameConfig) -> Result<()> {
    let pool = config.pool();
    println!("{} candidate cities:", pool.len());
    for city in pool.candidates() {
        println!("  {}", city);
    }
    Ok(())
}
