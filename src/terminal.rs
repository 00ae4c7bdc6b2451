//! Line-oriented terminal front end.
//!
//! Reads commands from stdin, forwards them to a [`GameHandle`] and prints
//! the resulting snapshot. Rendering is plain text built by the `render_*`
//! functions so it can be checked without a terminal.

use std::fmt::Write as _;

use guess_weather_core::{GameError, GameHandle, GuessFeedback, Outcome, Round, SessionSnapshot, SessionStatus};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument};

/// A parsed line of player input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCommand {
    /// Anything else is treated as a guess.
    Guess(String),
    /// Start over with a fresh session.
    Restart,
    /// Leave the game.
    Quit,
    /// Show the command list.
    Help,
}

/// Parses one line of input.
pub fn parse_command(line: &str) -> TerminalCommand {
    match line.trim().to_ascii_lowercase().as_str() {
        "q" | "quit" | "exit" => TerminalCommand::Quit,
        "r" | "restart" => TerminalCommand::Restart,
        "h" | "help" | "?" => TerminalCommand::Help,
        _ => TerminalCommand::Guess(line.trim().to_string()),
    }
}

/// Help text.
pub const HELP: &str = "Type a temperature in °C and press Enter. Commands: r = restart, q = quit, h = help.";

/// Prompt for the round in play.
pub fn render_prompt(snapshot: &SessionSnapshot) -> String {
    match (snapshot.status(), snapshot.current_city()) {
        (SessionStatus::SessionComplete, _) => {
            "Game over! Press r to play again or q to quit.".to_string()
        }
        (_, Some(city)) => format!(
            "Round {}/{}: what is the temperature in {} right now? ",
            snapshot.round_index() + 1,
            snapshot.max_rounds(),
            city
        ),
        (_, None) => "Press r to start.".to_string(),
    }
}

/// Verdict line for a round just played.
pub fn render_feedback(feedback: &GuessFeedback) -> String {
    let round = feedback.round();
    let verdict = if *round.correct() {
        "Correct guess!"
    } else {
        "Wrong guess."
    };
    format!(
        "{} {}: {}°C (you guessed {}°C)",
        verdict,
        round.display_name(),
        round.actual(),
        round.guessed()
    )
}

/// One history line.
pub fn render_round(round: &Round) -> String {
    format!(
        "City: {}, Guessed: {}°C, Actual: {}°C, {}",
        round.display_name(),
        round.guessed(),
        round.actual(),
        if *round.correct() { "Correct!" } else { "Incorrect." }
    )
}

/// All rounds played so far.
pub fn render_history(rounds: &[Round]) -> String {
    let mut out = String::from("Your guesses:");
    for round in rounds {
        let _ = write!(out, "\n  {}", render_round(round));
    }
    out
}

/// Final verdict.
pub fn render_outcome(outcome: &Outcome) -> String {
    format!(
        "Game over! You completed {} rounds. {}.",
        outcome.total, outcome
    )
}

/// Message for a rejected command.
pub fn render_error(error: &GameError) -> String {
    match error {
        GameError::InvalidInput(_) => "Please enter a number, e.g. 12 or -3.5.".to_string(),
        GameError::Fetch(_) => {
            "An error occurred while fetching the weather data. Try the same city again.".to_string()
        }
        GameError::SessionComplete => "Game over! Press r to play again.".to_string(),
        GameError::GuessInFlight => "Still checking your last guess...".to_string(),
        other => other.to_string(),
    }
}

/// Runs the interactive loop until the player quits or stdin closes.
#[instrument(skip(handle))]
pub async fn run_terminal(handle: GameHandle) -> anyhow::Result<()> {
    info!("Starting terminal session");
    println!("Guess the weather! {}", HELP);

    let snapshot = handle.start().await?;
    println!("{}", render_prompt(&snapshot));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = parse_command(&line);
        debug!(?command, "Command received");

        match command {
            TerminalCommand::Quit => break,
            TerminalCommand::Help => println!("{}", HELP),
            TerminalCommand::Restart => {
                let snapshot = handle.reset().await?;
                println!("New game.");
                println!("{}", render_prompt(&snapshot));
            }
            TerminalCommand::Guess(text) => {
                match handle.submit_guess(&text).await {
                    Ok(feedback) => {
                        println!("{}", render_feedback(&feedback));
                        let snapshot = handle.snapshot().await;
                        println!("{}", render_history(snapshot.rounds()));
                        if let Some(outcome) = feedback.outcome() {
                            println!("{}", render_outcome(outcome));
                        }
                        println!("{}", render_prompt(&snapshot));
                    }
                    Err(GameError::ExhaustedPool(e)) => return Err(e.into()),
                    Err(e) => {
                        println!("{}", render_error(&e));
                        println!("{}", render_prompt(&handle.snapshot().await));
                    }
                }
            }
        }
    }

    info!("Terminal session ended");
    Ok(())
}
