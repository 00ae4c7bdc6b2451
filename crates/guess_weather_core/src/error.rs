//! Error taxonomy for the guessing game.
//!
//! Every rejected command surfaces as a discrete, typed condition. Nothing in
//! here is fatal to the host process.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::controller::SessionStatus;

/// A guess that is empty, not a number, or not finite.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("Guess {:?} is not a temperature", raw)]
pub struct InvalidInputError {
    /// The text the player submitted.
    pub raw: String,
}

impl InvalidInputError {
    /// Creates a new invalid-input error for the given raw text.
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }
}

impl std::error::Error for InvalidInputError {}

/// Why a temperature lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum FetchErrorKind {
    /// The request never produced a response.
    #[display("transport failure")]
    Transport,
    /// The provider answered with a non-success status code.
    #[display("HTTP status {}", _0)]
    Status(u16),
    /// The response body could not be decoded.
    #[display("malformed payload")]
    Malformed,
}

/// Weather provider failure with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Fetch error ({}): {} at {}:{}", kind, message, file, line)]
pub struct FetchError {
    /// Failure category.
    pub kind: FetchErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl FetchError {
    /// Creates a new fetch error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Every candidate city has already been used in this session.
///
/// Only reachable when `max_rounds` exceeds the pool size, so it is
/// normally reported while validating configuration.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("City pool exhausted: {} candidates, {} already used", candidates, used)]
pub struct ExhaustedPoolError {
    /// Number of distinct candidate cities.
    pub candidates: usize,
    /// Number of cities already used (or required).
    pub used: usize,
}

/// The outcome was requested before every round was played.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Session incomplete: {} of {} rounds played", completed, required)]
pub struct IncompleteSessionError {
    /// Rounds recorded so far.
    pub completed: usize,
    /// Rounds required for an outcome.
    pub required: usize,
}

/// Invalid rule configuration.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum RulesError {
    /// A session must have at least one round.
    #[display("max_rounds must be at least 1")]
    NoRounds,

    /// The win threshold cannot exceed the number of rounds.
    #[display("win_threshold {} exceeds max_rounds {}", threshold, max_rounds)]
    UnreachableThreshold {
        /// Configured threshold.
        threshold: usize,
        /// Configured round count.
        max_rounds: usize,
    },

    /// Tolerance must be a finite, non-negative number of degrees.
    #[display("tolerance {} is not a finite non-negative number", _0)]
    BadTolerance(f64),
}

impl std::error::Error for RulesError {}

/// Error returned by [`SessionController`](crate::SessionController) commands.
#[derive(Debug, Clone, Display)]
pub enum GameError {
    /// The guess text was rejected; state unchanged.
    #[display("{}", _0)]
    InvalidInput(InvalidInputError),

    /// The weather provider failed; the round was not consumed.
    #[display("{}", _0)]
    Fetch(FetchError),

    /// No unused city remains.
    #[display("{}", _0)]
    ExhaustedPool(ExhaustedPoolError),

    /// The rules do not describe a playable session.
    #[display("{}", _0)]
    Rules(RulesError),

    /// The outcome could not be resolved from the recorded rounds.
    #[display("{}", _0)]
    Incomplete(IncompleteSessionError),

    /// The command needs a started session.
    #[display("Session has not been started")]
    NotStarted,

    /// `start` was called on a session that is already running.
    #[display("Session already started (status: {})", _0)]
    AlreadyStarted(SessionStatus),

    /// A guess is already being evaluated.
    #[display("A guess is already being evaluated")]
    GuessInFlight,

    /// Every round has been played; only `reset` is accepted.
    #[display("Session is complete; reset to play again")]
    SessionComplete,

    /// A fetch result arrived for a session or round that no longer exists.
    #[display("Discarded result for superseded session {} round {}", session, round)]
    StaleResult {
        /// Session the result was requested for.
        session: u64,
        /// Round the result was requested for.
        round: usize,
    },
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::InvalidInput(e) => Some(e),
            GameError::Fetch(e) => Some(e),
            GameError::ExhaustedPool(e) => Some(e),
            GameError::Rules(e) => Some(e),
            GameError::Incomplete(e) => Some(e),
            _ => None,
        }
    }
}

impl From<InvalidInputError> for GameError {
    fn from(err: InvalidInputError) -> Self {
        GameError::InvalidInput(err)
    }
}

impl From<FetchError> for GameError {
    fn from(err: FetchError) -> Self {
        GameError::Fetch(err)
    }
}

impl From<ExhaustedPoolError> for GameError {
    fn from(err: ExhaustedPoolError) -> Self {
        GameError::ExhaustedPool(err)
    }
}

impl From<RulesError> for GameError {
    fn from(err: RulesError) -> Self {
        GameError::Rules(err)
    }
}

impl From<IncompleteSessionError> for GameError {
    fn from(err: IncompleteSessionError) -> Self {
        GameError::Incomplete(err)
    }
}
