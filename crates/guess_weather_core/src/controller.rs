//! Session controller - the state machine driving a guessing session.
//!
//! ```text
//! NotStarted -> AwaitingGuess -> Evaluating -> AwaitingGuess | SessionComplete
//! ```
//!
//! `reset` is accepted from every state and replaces the session wholesale.
//! A guess is split into [`SessionController::begin_guess`] and
//! [`SessionController::complete_guess`] so the fetch can run without holding
//! the controller; the [`FetchTicket`] carried between them rejects results
//! that belong to a superseded session or round.

use std::collections::HashSet;
use std::sync::Arc;

use derive_getters::Getters;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{debug, info, instrument, warn};

use crate::city::{City, CityPool};
use crate::collaborators::{Cue, CuePlayer, SilentCues, WeatherProvider, WeatherReading};
use crate::error::{ExhaustedPoolError, FetchError, GameError, InvalidInputError};
use crate::evaluator::GuessEvaluator;
use crate::outcome::{Outcome, resolve};
use crate::result_log::{ResultLog, Round};
use crate::rules::GameRules;

/// Identity of one session. Increases on every `reset`.
pub type SessionId = u64;

/// Lifecycle state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Created but `start` not called yet.
    NotStarted,
    /// A city is shown and a guess is expected.
    AwaitingGuess,
    /// A guess is waiting on the weather provider.
    Evaluating,
    /// Every round has been played.
    SessionComplete,
}

/// Identity of an outstanding fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchTicket {
    /// Session the fetch belongs to.
    pub session: SessionId,
    /// Round the fetch belongs to.
    pub round: usize,
}

/// A validated guess waiting for the actual temperature.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct PendingGuess {
    ticket: FetchTicket,
    city: City,
    guessed: f64,
}

/// Result of a successfully evaluated guess.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct GuessFeedback {
    /// The round just recorded.
    round: Round,
    /// Present when this round completed the session.
    outcome: Option<Outcome>,
}

/// Read-only view of the session for rendering.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Identity of the session.
    session_id: SessionId,
    /// City awaiting a guess (or being evaluated).
    current_city: Option<City>,
    /// Zero-based index of the round in play; equals rounds played.
    round_index: usize,
    /// Rounds per session.
    max_rounds: usize,
    /// Completed rounds, oldest first.
    rounds: Vec<Round>,
    /// Lifecycle state.
    status: SessionStatus,
    /// Outcome once the session is complete.
    outcome: Option<Outcome>,
}

/// One playthrough. Replaced wholesale on reset, never rolled back.
#[derive(Debug)]
struct Session {
    id: SessionId,
    rounds: ResultLog,
    used_cities: HashSet<City>,
    current_city: Option<City>,
    status: SessionStatus,
    outcome: Option<Outcome>,
}

impl Session {
    fn new(id: SessionId) -> Self {
        Self {
            id,
            rounds: ResultLog::new(),
            used_cities: HashSet::new(),
            current_city: None,
            status: SessionStatus::NotStarted,
            outcome: None,
        }
    }
}

/// Owns all mutable game state and exposes commands plus a snapshot.
pub struct SessionController {
    pool: CityPool,
    rules: GameRules,
    evaluator: GuessEvaluator,
    rng: StdRng,
    cues: Arc<dyn CuePlayer>,
    session: Session,
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("pool", &self.pool)
            .field("rules", &self.rules)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl SessionController {
    /// Creates a controller in `NotStarted`.
    ///
    /// Fails with [`GameError::Rules`] if the rules are unplayable and with
    /// [`GameError::ExhaustedPool`] if the pool cannot supply `max_rounds`
    /// distinct cities.
    #[instrument(skip(pool), fields(candidates = pool.len()))]
    pub fn new(pool: CityPool, rules: GameRules) -> Result<Self, GameError> {
        Self::with_rng(pool, rules, StdRng::from_entropy())
    }

    /// Creates a controller whose city sequence is reproducible from `seed`.
    #[instrument(skip(pool), fields(candidates = pool.len()))]
    pub fn seeded(pool: CityPool, rules: GameRules, seed: u64) -> Result<Self, GameError> {
        Self::with_rng(pool, rules, StdRng::seed_from_u64(seed))
    }

    fn with_rng(pool: CityPool, rules: GameRules, rng: StdRng) -> Result<Self, GameError> {
        rules
            .validate()
            .inspect_err(|e| warn!(error = %e, "Rejected unplayable rules"))?;
        pool.ensure_capacity(*rules.max_rounds())?;
        info!(max_rounds = rules.max_rounds(), "Creating session controller");
        Ok(Self {
            pool,
            evaluator: GuessEvaluator::new(*rules.tolerance()),
            rules,
            rng,
            cues: Arc::new(SilentCues),
            session: Session::new(0),
        })
    }

    /// Replaces the cue player.
    pub fn with_cues(mut self, cues: Arc<dyn CuePlayer>) -> Self {
        self.cues = cues;
        self
    }

    /// The rules in force.
    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// The candidate pool.
    pub fn pool(&self) -> &CityPool {
        &self.pool
    }

    /// Current lifecycle state.
    pub fn status(&self) -> SessionStatus {
        self.session.status
    }

    /// Cities presented so far in this session.
    pub fn used_cities(&self) -> &HashSet<City> {
        &self.session.used_cities
    }

    /// Completed rounds of this session.
    pub fn results(&self) -> &ResultLog {
        &self.session.rounds
    }

    /// Draws the first city. Valid only from `NotStarted`.
    ///
    /// Calling it again without `reset` fails with
    /// [`GameError::AlreadyStarted`] and changes nothing.
    #[instrument(skip(self), fields(session = self.session.id))]
    pub fn start(&mut self) -> Result<(), GameError> {
        if self.session.status != SessionStatus::NotStarted {
            warn!(status = %self.session.status, "Start rejected");
            return Err(GameError::AlreadyStarted(self.session.status));
        }
        self.present_next_city()?;
        self.session.status = SessionStatus::AwaitingGuess;
        info!(city = ?self.session.current_city, "Session started");
        Ok(())
    }

    /// Discards the session and starts a fresh one with a new city.
    #[instrument(skip(self), fields(previous = self.session.id))]
    pub fn reset(&mut self) -> Result<(), GameError> {
        let id = self.session.id + 1;
        let mut session = Session::new(id);
        let city = self.pool.draw(&session.used_cities, &mut self.rng)?;
        session.used_cities.insert(city.clone());
        session.current_city = Some(city);
        session.status = SessionStatus::AwaitingGuess;
        self.session = session;
        info!(session = id, city = ?self.session.current_city, "Session reset");
        Ok(())
    }

    /// Validates a guess and moves to `Evaluating`.
    ///
    /// On invalid input the state is unchanged.
    #[instrument(skip(self), fields(session = self.session.id, status = %self.session.status))]
    pub fn begin_guess(&mut self, raw: &str) -> Result<PendingGuess, GameError> {
        match self.session.status {
            SessionStatus::AwaitingGuess => {}
            SessionStatus::NotStarted => return Err(GameError::NotStarted),
            SessionStatus::Evaluating => {
                warn!("Guess rejected while another is in flight");
                return Err(GameError::GuessInFlight);
            }
            SessionStatus::SessionComplete => return Err(GameError::SessionComplete),
        }

        let guessed = parse_guess(raw).inspect_err(|e| warn!(error = %e, "Invalid guess"))?;

        let city = self
            .session
            .current_city
            .clone()
            .ok_or(GameError::NotStarted)?;

        let ticket = FetchTicket {
            session: self.session.id,
            round: self.session.rounds.count(),
        };
        self.session.status = SessionStatus::Evaluating;
        debug!(?ticket, %city, guessed, "Guess accepted, awaiting temperature");

        Ok(PendingGuess {
            ticket,
            city,
            guessed,
        })
    }

    /// Applies the provider's answer for a pending guess.
    ///
    /// Results whose ticket no longer matches the live session and round are
    /// discarded with [`GameError::StaleResult`] and mutate nothing. A fetch
    /// failure returns to `AwaitingGuess` with the same city and no round
    /// consumed.
    #[instrument(skip(self, pending, result), fields(ticket = ?pending.ticket))]
    pub fn complete_guess(
        &mut self,
        pending: PendingGuess,
        result: Result<WeatherReading, FetchError>,
    ) -> Result<GuessFeedback, GameError> {
        let PendingGuess {
            ticket,
            city,
            guessed,
        } = pending;

        if !self.is_live(&ticket) {
            warn!(live_session = self.session.id, "Discarding stale fetch result");
            return Err(GameError::StaleResult {
                session: ticket.session,
                round: ticket.round,
            });
        }

        let reading = match result {
            Ok(reading) => reading,
            Err(e) => {
                warn!(error = %e, %city, "Temperature lookup failed; round not consumed");
                self.session.status = SessionStatus::AwaitingGuess;
                return Err(GameError::Fetch(e));
            }
        };

        let actual = *reading.temperature();
        let correct = self.evaluator.evaluate(guessed, actual);
        let round = Round::new(
            ticket.round,
            city,
            reading.display_name().clone(),
            guessed,
            actual,
            correct,
        );

        // Nothing is committed until the outcome or next city is known.
        let mut rounds = self.session.rounds.clone();
        rounds.append(round.clone());

        let finishing = rounds.count() == *self.rules.max_rounds();
        let (outcome, next_city) = if finishing {
            match resolve(&rounds, &self.rules) {
                Ok(outcome) => (Some(outcome), None),
                Err(e) => {
                    self.session.status = SessionStatus::AwaitingGuess;
                    return Err(e.into());
                }
            }
        } else {
            match self.pool.draw(&self.session.used_cities, &mut self.rng) {
                Ok(city) => (None, Some(city)),
                Err(e) => {
                    self.session.status = SessionStatus::AwaitingGuess;
                    return Err(e.into());
                }
            }
        };

        self.session.rounds = rounds;
        self.cues.play_cue(if correct { Cue::Correct } else { Cue::Wrong });
        info!(
            round = ticket.round,
            guessed,
            actual,
            correct,
            "Round recorded"
        );

        if let Some(outcome) = outcome {
            self.session.outcome = Some(outcome);
            self.session.status = SessionStatus::SessionComplete;
            self.cues.play_cue(if outcome.win { Cue::Win } else { Cue::Lose });
            info!(win = outcome.win, correct = outcome.correct, "Session complete");
        } else {
            if let Some(city) = next_city {
                self.session.used_cities.insert(city.clone());
                self.session.current_city = Some(city);
            }
            self.session.status = SessionStatus::AwaitingGuess;
        }

        Ok(GuessFeedback {
            round,
            outcome: self.session.outcome,
        })
    }

    /// Returns a guess whose result will never arrive to `AwaitingGuess`.
    ///
    /// The round is not consumed and the same city stays in play. Returns
    /// false, changing nothing, if the ticket no longer matches the live
    /// session and round.
    #[instrument(skip(self), fields(session = self.session.id))]
    pub fn abandon_guess(&mut self, ticket: FetchTicket) -> bool {
        if !self.is_live(&ticket) {
            debug!("Abandoned ticket already superseded");
            return false;
        }
        warn!(?ticket, "Guess abandoned before its result arrived");
        self.session.status = SessionStatus::AwaitingGuess;
        true
    }

    /// Validates, fetches and evaluates a guess in one call.
    #[instrument(skip(self, provider), fields(session = self.session.id))]
    pub async fn submit_guess(
        &mut self,
        raw: &str,
        provider: &dyn WeatherProvider,
    ) -> Result<GuessFeedback, GameError> {
        let pending = self.begin_guess(raw)?;
        let result = provider.fetch_temperature(pending.city()).await;
        self.complete_guess(pending, result)
    }

    /// Read-only view for rendering.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session.id,
            current_city: self.session.current_city.clone(),
            round_index: self.session.rounds.count(),
            max_rounds: *self.rules.max_rounds(),
            rounds: self.session.rounds.rounds().to_vec(),
            status: self.session.status,
            outcome: self.session.outcome,
        }
    }

    fn is_live(&self, ticket: &FetchTicket) -> bool {
        ticket.session == self.session.id
            && ticket.round == self.session.rounds.count()
            && self.session.status == SessionStatus::Evaluating
    }

    fn present_next_city(&mut self) -> Result<(), ExhaustedPoolError> {
        let city = self.pool.draw(&self.session.used_cities, &mut self.rng)?;
        self.session.used_cities.insert(city.clone());
        self.session.current_city = Some(city);
        Ok(())
    }
}

/// Parses a guess as a finite number of degrees.
#[instrument]
pub fn parse_guess(raw: &str) -> Result<f64, InvalidInputError> {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(InvalidInputError::new(raw)),
    }
}
