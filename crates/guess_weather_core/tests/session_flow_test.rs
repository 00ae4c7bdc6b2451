//! End-to-end session flows against in-memory weather providers.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use guess_weather_core::{
    City, CityPool, Cue, CuePlayer, FetchError, FetchErrorKind, GameError, GameHandle, GameRules,
    SessionController, SessionStatus, WeatherProvider, WeatherReading,
};
use tokio::sync::Notify;

/// Returns the same temperature for every city; cities listed in `failing`
/// fail with a status error.
struct FixedProvider {
    temperature: f64,
    failing: Mutex<HashSet<City>>,
    calls: AtomicUsize,
}

impl FixedProvider {
    fn new(temperature: f64) -> Self {
        Self {
            temperature,
            failing: Mutex::new(HashSet::new()),
            calls: AtomicUsize::new(0),
        }
    }

    fn fail_for(&self, city: City) {
        self.failing.lock().unwrap().insert(city);
    }

    fn recover(&self) {
        self.failing.lock().unwrap().clear();
    }
}

#[async_trait]
impl WeatherProvider for FixedProvider {
    async fn fetch_temperature(&self, city: &City) -> Result<WeatherReading, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(city) {
            return Err(FetchError::new(FetchErrorKind::Status(503), "unavailable"));
        }
        Ok(WeatherReading::new(format!("{} (reported)", city), self.temperature))
    }
}

/// Holds every fetch until the gate is opened.
struct GatedProvider {
    gate: Arc<Notify>,
    temperature: f64,
}

#[async_trait]
impl WeatherProvider for GatedProvider {
    async fn fetch_temperature(&self, city: &City) -> Result<WeatherReading, FetchError> {
        self.gate.notified().await;
        Ok(WeatherReading::new(city.as_str(), self.temperature))
    }
}

/// Never answers the first fetch; later fetches succeed.
struct StallingProvider {
    stalled: AtomicBool,
    temperature: f64,
}

#[async_trait]
impl WeatherProvider for StallingProvider {
    async fn fetch_temperature(&self, city: &City) -> Result<WeatherReading, FetchError> {
        if !self.stalled.swap(true, Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        Ok(WeatherReading::new(city.as_str(), self.temperature))
    }
}

#[derive(Default)]
struct RecordingCues {
    played: Mutex<Vec<Cue>>,
}

impl CuePlayer for RecordingCues {
    fn play_cue(&self, cue: Cue) {
        self.played.lock().unwrap().push(cue);
    }
}

fn six_city_pool() -> CityPool {
    CityPool::new(["Oslo", "Lima", "Cairo", "Perth", "Quito", "Hanoi"])
}

fn started_controller(seed: u64) -> SessionController {
    let mut controller =
        SessionController::seeded(six_city_pool(), GameRules::default(), seed).expect("Valid pool");
    controller.start().expect("Fresh controller starts");
    controller
}

#[tokio::test]
async fn test_four_of_five_within_tolerance_wins() {
    let provider = FixedProvider::new(20.0);
    let cues = Arc::new(RecordingCues::default());
    let mut controller = started_controller(3).with_cues(cues.clone());

    for guess in ["20", "21.5", "16", "24", "30"] {
        controller
            .submit_guess(guess, &provider)
            .await
            .expect("Provider succeeds");
    }

    let snapshot = controller.snapshot();
    assert_eq!(*snapshot.status(), SessionStatus::SessionComplete);
    assert_eq!(snapshot.rounds().len(), 5);
    assert_eq!(controller.results().correct_count(), 4);
    assert_eq!(controller.used_cities().len(), 5);

    let outcome = snapshot.outcome().expect("Complete session has outcome");
    assert!(outcome.win);

    let played = cues.played.lock().unwrap().clone();
    assert_eq!(
        played,
        vec![Cue::Correct, Cue::Correct, Cue::Correct, Cue::Correct, Cue::Wrong, Cue::Win]
    );
}

#[tokio::test]
async fn test_three_of_five_loses() {
    let provider = FixedProvider::new(-5.0);
    let mut controller = started_controller(11);

    for guess in ["-5", "-1", "-9", "5", "-20"] {
        controller.submit_guess(guess, &provider).await.unwrap();
    }

    let outcome = controller.snapshot().outcome().expect("Outcome present");
    assert!(!outcome.win);
    assert_eq!(outcome.correct, 3);
}

#[tokio::test]
async fn test_completed_session_uses_distinct_cities() {
    let provider = FixedProvider::new(10.0);
    for seed in 0..20 {
        let mut controller = started_controller(seed);
        for _ in 0..5 {
            controller.submit_guess("10", &provider).await.unwrap();
        }
        let cities: HashSet<City> = controller
            .snapshot()
            .rounds()
            .iter()
            .map(|r| r.city().clone())
            .collect();
        assert_eq!(cities.len(), 5, "seed {} repeated a city", seed);
        assert_eq!(controller.used_cities().len(), 5);
    }
}

#[tokio::test]
async fn test_invalid_input_leaves_state_unchanged() {
    let provider = FixedProvider::new(10.0);
    let mut controller = started_controller(5);
    let before = controller.snapshot();

    for raw in ["abc", "", "  ", "twelve"] {
        let err = controller.submit_guess(raw, &provider).await.unwrap_err();
        assert!(matches!(err, GameError::InvalidInput(_)), "{raw:?} accepted");
    }

    assert_eq!(controller.snapshot(), before);
    assert_eq!(*controller.snapshot().status(), SessionStatus::AwaitingGuess);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_fetch_failure_retries_same_city() {
    let provider = FixedProvider::new(10.0);
    let mut controller = started_controller(9);
    let city = controller
        .snapshot()
        .current_city()
        .clone()
        .expect("Started session has a city");

    provider.fail_for(city.clone());
    let err = controller.submit_guess("10", &provider).await.unwrap_err();
    match err {
        GameError::Fetch(e) => assert_eq!(e.kind, FetchErrorKind::Status(503)),
        other => panic!("Expected fetch error, got {other:?}"),
    }

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.current_city().as_ref(), Some(&city));
    assert_eq!(*snapshot.round_index(), 0);
    assert_eq!(*snapshot.status(), SessionStatus::AwaitingGuess);

    provider.recover();
    let feedback = controller.submit_guess("10", &provider).await.unwrap();
    assert_eq!(feedback.round().city(), &city);
    assert_eq!(feedback.round().display_name(), &format!("{} (reported)", city));
    assert_eq!(*controller.snapshot().round_index(), 1);
}

#[tokio::test]
async fn test_reset_discards_session() {
    let provider = FixedProvider::new(10.0);
    let mut controller = started_controller(1);
    controller.submit_guess("10", &provider).await.unwrap();
    controller.submit_guess("10", &provider).await.unwrap();

    controller.reset().unwrap();

    let snapshot = controller.snapshot();
    assert!(snapshot.rounds().is_empty());
    assert_eq!(controller.used_cities().len(), 1);
    assert_eq!(*snapshot.status(), SessionStatus::AwaitingGuess);
    assert!(snapshot.outcome().is_none());
    assert_eq!(*snapshot.session_id(), 1);
}

#[tokio::test]
async fn test_reset_after_completion_allows_new_game() {
    let provider = FixedProvider::new(10.0);
    let mut controller = started_controller(2);
    for _ in 0..5 {
        controller.submit_guess("10", &provider).await.unwrap();
    }
    assert!(matches!(
        controller.submit_guess("10", &provider).await,
        Err(GameError::SessionComplete)
    ));

    controller.reset().unwrap();
    controller.submit_guess("10", &provider).await.unwrap();
    assert_eq!(*controller.snapshot().round_index(), 1);
}

#[tokio::test]
async fn test_handle_rejects_concurrent_guess() {
    let gate = Arc::new(Notify::new());
    let provider = Arc::new(GatedProvider {
        gate: gate.clone(),
        temperature: 12.0,
    });
    let handle = GameHandle::new(
        SessionController::seeded(six_city_pool(), GameRules::default(), 4).unwrap(),
        provider,
    );
    handle.start().await.unwrap();

    let first = tokio::spawn({
        let handle = handle.clone();
        async move { handle.submit_guess("12").await }
    });

    while *handle.snapshot().await.status() != SessionStatus::Evaluating {
        tokio::task::yield_now().await;
    }

    assert!(matches!(
        handle.submit_guess("13").await,
        Err(GameError::GuessInFlight)
    ));

    gate.notify_one();
    let feedback = first.await.expect("Task completes").expect("Guess evaluated");
    assert!(*feedback.round().correct());
    assert_eq!(*handle.snapshot().await.round_index(), 1);
}

#[tokio::test]
async fn test_handle_discards_result_after_reset() {
    let gate = Arc::new(Notify::new());
    let provider = Arc::new(GatedProvider {
        gate: gate.clone(),
        temperature: 12.0,
    });
    let handle = GameHandle::new(
        SessionController::seeded(six_city_pool(), GameRules::default(), 8).unwrap(),
        provider,
    );
    handle.start().await.unwrap();

    let in_flight = tokio::spawn({
        let handle = handle.clone();
        async move { handle.submit_guess("12").await }
    });

    while *handle.snapshot().await.status() != SessionStatus::Evaluating {
        tokio::task::yield_now().await;
    }

    let fresh = handle.reset().await.unwrap();
    assert_eq!(*fresh.session_id(), 1);

    gate.notify_one();
    let result = in_flight.await.expect("Task completes");
    assert!(matches!(
        result,
        Err(GameError::StaleResult { session: 0, round: 0 })
    ));

    let snapshot = handle.snapshot().await;
    assert!(snapshot.rounds().is_empty());
    assert_eq!(*snapshot.status(), SessionStatus::AwaitingGuess);
    assert_eq!(*snapshot.session_id(), 1);
}

#[tokio::test]
async fn test_handle_recovers_when_guess_is_cancelled() {
    let provider = Arc::new(StallingProvider {
        stalled: AtomicBool::new(false),
        temperature: 9.0,
    });
    let handle = GameHandle::new(
        SessionController::seeded(six_city_pool(), GameRules::default(), 6).unwrap(),
        provider,
    );
    let city = handle.start().await.unwrap().current_city().clone();

    let timed_out = tokio::time::timeout(Duration::from_millis(50), handle.submit_guess("9")).await;
    assert!(timed_out.is_err());

    let snapshot = handle.snapshot().await;
    assert_eq!(*snapshot.status(), SessionStatus::AwaitingGuess);
    assert_eq!(snapshot.current_city(), &city);
    assert_eq!(*snapshot.round_index(), 0);

    let feedback = handle.submit_guess("9").await.expect("Retry is evaluated");
    assert_eq!(*feedback.round().index(), 0);
    assert_eq!(Some(feedback.round().city().clone()), city);
    assert_eq!(*handle.snapshot().await.round_index(), 1);
}

#[tokio::test]
async fn test_aborted_guess_task_releases_session() {
    let provider = Arc::new(StallingProvider {
        stalled: AtomicBool::new(false),
        temperature: 9.0,
    });
    let handle = GameHandle::new(
        SessionController::seeded(six_city_pool(), GameRules::default(), 7).unwrap(),
        provider,
    );
    handle.start().await.unwrap();

    let task = tokio::spawn({
        let handle = handle.clone();
        async move { handle.submit_guess("9").await }
    });
    while *handle.snapshot().await.status() != SessionStatus::Evaluating {
        tokio::task::yield_now().await;
    }

    task.abort();
    assert!(task.await.expect_err("Task was aborted").is_cancelled());

    assert_eq!(*handle.snapshot().await.status(), SessionStatus::AwaitingGuess);
    assert!(handle.submit_guess("9").await.is_ok());
}
