//! Shared, clonable access to one session.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::collaborators::WeatherProvider;
use crate::controller::{FetchTicket, GuessFeedback, SessionController, SessionSnapshot};
use crate::error::GameError;

/// Clonable handle pairing a controller with its weather provider.
///
/// The controller lock is released while the provider is awaited, so at most
/// one fetch is in flight: a concurrent guess sees `Evaluating` and fails with
/// [`GameError::GuessInFlight`], and a reset during the fetch turns the late
/// result into [`GameError::StaleResult`]. Dropping a `submit_guess` future
/// before it finishes abandons the guess and returns the session to
/// `AwaitingGuess` with the same city.
#[derive(Clone)]
pub struct GameHandle {
    controller: Arc<Mutex<SessionController>>,
    provider: Arc<dyn WeatherProvider>,
}

impl std::fmt::Debug for GameHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameHandle").finish_non_exhaustive()
    }
}

impl GameHandle {
    /// Wraps a controller and provider.
    pub fn new(controller: SessionController, provider: Arc<dyn WeatherProvider>) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            provider,
        }
    }

    /// Starts the session.
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<SessionSnapshot, GameError> {
        let mut controller = self.controller.lock().await;
        controller.start()?;
        Ok(controller.snapshot())
    }

    /// Submits a guess and waits for it to be evaluated.
    #[instrument(skip(self))]
    pub async fn submit_guess(&self, raw: &str) -> Result<GuessFeedback, GameError> {
        let pending = self.controller.lock().await.begin_guess(raw)?;
        let guard = AbandonOnDrop::new(self.controller.clone(), *pending.ticket());
        debug!(city = %pending.city(), "Fetching temperature without holding the session");
        let result = self.provider.fetch_temperature(pending.city()).await;

        let mut controller = self.controller.lock().await;
        guard.disarm();
        controller.complete_guess(pending, result)
    }

    /// Replaces the session with a fresh one.
    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<SessionSnapshot, GameError> {
        let mut controller = self.controller.lock().await;
        controller.reset()?;
        Ok(controller.snapshot())
    }

    /// Current snapshot.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.controller.lock().await.snapshot()
    }
}

/// Abandons an in-flight guess if the future awaiting it is dropped.
struct AbandonOnDrop {
    controller: Arc<Mutex<SessionController>>,
    ticket: Option<FetchTicket>,
}

impl AbandonOnDrop {
    fn new(controller: Arc<Mutex<SessionController>>, ticket: FetchTicket) -> Self {
        Self {
            controller,
            ticket: Some(ticket),
        }
    }

    fn disarm(mut self) {
        self.ticket = None;
    }
}

impl Drop for AbandonOnDrop {
    fn drop(&mut self) {
        let Some(ticket) = self.ticket.take() else {
            return;
        };

        if let Ok(mut controller) = self.controller.try_lock() {
            controller.abandon_guess(ticket);
            return;
        }

        // Lock is busy; finish the release on the runtime.
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let controller = self.controller.clone();
                runtime.spawn(async move {
                    controller.lock().await.abandon_guess(ticket);
                });
            }
            Err(_) => warn!(?ticket, "No runtime to release abandoned guess"),
        }
    }
}
