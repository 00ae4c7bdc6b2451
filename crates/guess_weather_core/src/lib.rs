//! Guess Weather core - session logic for the temperature guessing game.
//!
//! Each round shows a city drawn without repetition; the player guesses its
//! current temperature, the actual value is fetched from a
//! [`WeatherProvider`], and the guess is judged against a tolerance. After
//! `max_rounds` rounds the session resolves to a win or a loss.
//!
//! # Architecture
//!
//! - **CityPool**: candidate cities, non-repeating draws
//! - **GuessEvaluator**: pure tolerance check
//! - **ResultLog**: append-only round history
//! - **resolve**: pure win/lose derivation
//! - **SessionController**: the only stateful component
//! - **GameHandle**: shared access with one fetch in flight at a time
//!
//! # Example
//!
//! ```
//! use guess_weather_core::{CityPool, GameRules, SessionController, SessionStatus};
//!
//! let pool = CityPool::new(["Oslo", "Lima", "Cairo", "Perth", "Quito"]);
//! let mut controller = SessionController::seeded(pool, GameRules::default(), 7).unwrap();
//! controller.start().unwrap();
//! assert_eq!(*controller.snapshot().status(), SessionStatus::AwaitingGuess);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod city;
mod collaborators;
mod controller;
mod error;
mod evaluator;
mod handle;
mod outcome;
mod result_log;
mod rules;

// Crate-level exports - Cities
pub use city::{City, CityPool};

// Crate-level exports - Collaborators
pub use collaborators::{Cue, CuePlayer, SilentCues, WeatherProvider, WeatherReading};

// Crate-level exports - Session control
pub use controller::{
    FetchTicket, GuessFeedback, PendingGuess, SessionController, SessionId, SessionSnapshot,
    SessionStatus, parse_guess,
};
pub use handle::GameHandle;

// Crate-level exports - Errors
pub use error::{
    ExhaustedPoolError, FetchError, FetchErrorKind, GameError, IncompleteSessionError,
    InvalidInputError, RulesError,
};

// Crate-level exports - Rules and scoring
pub use evaluator::{GuessEvaluator, evaluate};
pub use outcome::{Outcome, resolve};
pub use result_log::{ResultLog, Round};
pub use rules::{DEFAULT_MAX_ROUNDS, DEFAULT_TOLERANCE, DEFAULT_WIN_THRESHOLD, GameRules};
