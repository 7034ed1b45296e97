//! Stateful coordinator between the search box and the two lookups.
//!
//! The orchestrator is the single writer of [`SearchState`]. Suggestion
//! lookups are debounced with cancel-and-replace semantics: every keystroke
//! aborts the pending timer and schedules a new one. Once a timer fires the
//! request itself runs to completion, so each result carries the sequence
//! number it was scheduled with and only the latest one is ever applied.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::{
    config::Config,
    error::LookupError,
    model::{CurrentConditions, DailyForecastEntry, Location, WeatherReport},
    provider::{ForecastSource, Geocoder, OpenMeteoForecast, OpenMeteoGeocoder},
};

/// Queries shorter than this never trigger suggestions.
pub const MIN_QUERY_CHARS: usize = 2;

/// Coarse view of the widget, derived from [`SearchState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Typing,
    SuggestionsVisible,
    Searching,
    Displaying,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq)]
enum InputStatus {
    #[default]
    Idle,
    Typing,
    Suggestions(Vec<Location>),
}

/// Outcome of the most recent search. Loading and failure are exclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LookupStatus {
    #[default]
    Idle,
    Loading,
    Ready(Box<WeatherReport>),
    Failed(String),
}

/// Everything the display layer needs to render the widget.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    query: String,
    input: InputStatus,
    lookup: LookupStatus,
}

impl SearchState {
    pub fn query_text(&self) -> &str {
        &self.query
    }

    pub fn suggestions(&self) -> &[Location] {
        match &self.input {
            InputStatus::Suggestions(list) => list,
            _ => &[],
        }
    }

    pub fn is_suggestions_visible(&self) -> bool {
        matches!(self.input, InputStatus::Suggestions(_))
    }

    pub fn lookup(&self) -> &LookupStatus {
        &self.lookup
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.lookup, LookupStatus::Loading)
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.lookup {
            LookupStatus::Failed(msg) => Some(msg.as_str()),
            _ => None,
        }
    }

    pub fn report(&self) -> Option<&WeatherReport> {
        match &self.lookup {
            LookupStatus::Ready(report) => Some(&**report),
            _ => None,
        }
    }

    pub fn current_conditions(&self) -> Option<&CurrentConditions> {
        self.report().map(|r| &r.current)
    }

    pub fn forecast(&self) -> Option<&[DailyForecastEntry]> {
        self.report().map(|r| r.daily.as_slice())
    }

    pub fn phase(&self) -> Phase {
        match (&self.lookup, &self.input) {
            (LookupStatus::Loading, _) => Phase::Searching,
            (_, InputStatus::Suggestions(_)) => Phase::SuggestionsVisible,
            (_, InputStatus::Typing) => Phase::Typing,
            (LookupStatus::Ready(_), InputStatus::Idle) => Phase::Displaying,
            (LookupStatus::Failed(_), InputStatus::Idle) => Phase::Failed,
            (LookupStatus::Idle, InputStatus::Idle) => Phase::Idle,
        }
    }
}

#[derive(Debug)]
struct SuggestionBatch {
    seq: u64,
    query: String,
    results: Vec<Location>,
}

/// Writes the terminal status of one search exactly once.
///
/// Dropping it unfinished (the search future was cancelled) records a
/// failure so the state never stays `Loading`.
#[derive(Debug)]
struct SearchGuard {
    state: Arc<watch::Sender<SearchState>>,
    finished: bool,
}

impl SearchGuard {
    fn start(state: &Arc<watch::Sender<SearchState>>) -> Self {
        state.send_modify(|s| s.lookup = LookupStatus::Loading);
        Self { state: Arc::clone(state), finished: false }
    }

    fn finish(mut self, outcome: Result<WeatherReport, LookupError>) {
        self.finished = true;
        let status = terminal_status(outcome);
        self.state.send_modify(|s| s.lookup = status);
    }
}

impl Drop for SearchGuard {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let status = terminal_status(Err(LookupError::Network("search cancelled".into())));
        self.state.send_if_modified(|s| {
            if s.is_loading() {
                s.lookup = status;
                true
            } else {
                false
            }
        });
    }
}

fn terminal_status(outcome: Result<WeatherReport, LookupError>) -> LookupStatus {
    match outcome {
        Ok(report) => {
            debug!(location = %report.location, "search finished");
            LookupStatus::Ready(Box::new(report))
        }
        Err(err) => {
            warn!(error = %err, "search failed");
            LookupStatus::Failed(err.user_message().to_string())
        }
    }
}

#[derive(Debug)]
pub struct SearchOrchestrator {
    state: Arc<watch::Sender<SearchState>>,
    geocoder: Arc<dyn Geocoder>,
    forecast: Arc<dyn ForecastSource>,
    debounce: Duration,
    suggestion_limit: usize,
    seq: u64,
    awaiting: Option<u64>,
    timer: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<SuggestionBatch>,
    rx: mpsc::UnboundedReceiver<SuggestionBatch>,
}

impl SearchOrchestrator {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        forecast: Arc<dyn ForecastSource>,
        config: &Config,
    ) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            state: Arc::new(state),
            geocoder,
            forecast,
            debounce: config.debounce(),
            suggestion_limit: config.suggestion_limit,
            seq: 0,
            awaiting: None,
            timer: None,
            tx,
            rx,
        }
    }

    /// Orchestrator wired to the Open-Meteo endpoints named in `config`.
    pub fn from_config(config: &Config) -> Result<Self, LookupError> {
        let geocoder = Arc::new(OpenMeteoGeocoder::new(config)?);
        let forecast = Arc::new(OpenMeteoForecast::new(config)?);
        Ok(Self::new(geocoder, forecast, config))
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Receiver that sees every transition, including `Loading` while a
    /// search is in flight.
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// Handles a change of the search text.
    ///
    /// Must be called from within a tokio runtime.
    pub fn input(&mut self, text: impl Into<String>) {
        let text = text.into();
        let query = text.trim().to_string();
        self.cancel_timer();
        self.state.send_modify(|s| {
            s.query = text;
            s.input = InputStatus::Typing;
        });

        if query.chars().count() < MIN_QUERY_CHARS {
            debug!("query too short, suggestions cleared");
            return;
        }

        self.seq += 1;
        let seq = self.seq;
        self.awaiting = Some(seq);

        let geocoder = Arc::clone(&self.geocoder);
        let tx = self.tx.clone();
        let delay = self.debounce;
        let limit = self.suggestion_limit;

        debug!(seq, query = %query, "scheduling suggestion lookup");
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // detached: aborting the timer after this point leaves the request running
            tokio::spawn(async move {
                let results = geocoder.suggest(&query, limit).await;
                let _ = tx.send(SuggestionBatch { seq, query, results });
            });
        }));
    }

    /// Waits for the latest scheduled suggestion lookup and applies it.
    ///
    /// Superseded results arriving first are discarded. Returns `false`
    /// right away when no lookup is pending.
    pub async fn next_suggestions(&mut self) -> bool {
        let Some(expected) = self.awaiting else {
            return false;
        };

        while let Some(batch) = self.rx.recv().await {
            if self.accept(expected, batch) {
                return true;
            }
        }

        false
    }

    /// Applies a finished suggestion lookup if one is already waiting.
    pub fn poll_suggestions(&mut self) -> bool {
        while let Ok(batch) = self.rx.try_recv() {
            if let Some(expected) = self.awaiting {
                if self.accept(expected, batch) {
                    return true;
                }
            } else {
                debug!(seq = batch.seq, "dropping suggestions, nothing pending");
            }
        }

        false
    }

    /// Searches for the current query text.
    pub async fn submit(&mut self) {
        let city = self.state.borrow().query.trim().to_string();
        self.begin_search();

        if city.is_empty() {
            let status = terminal_status(Err(LookupError::Validation("empty search text".into())));
            self.state.send_modify(|s| s.lookup = status);
            return;
        }

        let guard = SearchGuard::start(&self.state);
        let outcome = self.lookup_city(&city).await;
        guard.finish(outcome);
    }

    /// Searches for the suggestion at `index`. Returns `false` if there is none.
    pub async fn pick(&mut self, index: usize) -> bool {
        let Some(location) = self.state.borrow().suggestions().get(index).cloned() else {
            return false;
        };

        self.state.send_modify(|s| s.query = location.name.clone());
        self.begin_search();

        let guard = SearchGuard::start(&self.state);
        let outcome = self.lookup_location(location).await;
        guard.finish(outcome);
        true
    }

    /// Back to the freshly mounted state.
    pub fn reset(&mut self) {
        self.cancel_timer();
        self.state.send_replace(SearchState::default());
    }

    fn accept(&mut self, expected: u64, batch: SuggestionBatch) -> bool {
        if batch.seq != expected {
            debug!(seq = batch.seq, latest = expected, query = %batch.query, "discarding stale suggestions");
            return false;
        }

        self.awaiting = None;
        debug!(seq = batch.seq, count = batch.results.len(), "applying suggestions");
        let input = if batch.results.is_empty() {
            InputStatus::Typing
        } else {
            InputStatus::Suggestions(batch.results)
        };
        self.state.send_modify(|s| s.input = input);
        true
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.awaiting = None;
    }

    /// Hides suggestions and drops the previous result before any network call.
    fn begin_search(&mut self) {
        self.cancel_timer();
        self.state.send_modify(|s| {
            s.input = InputStatus::Idle;
            s.lookup = LookupStatus::Idle;
        });
    }

    async fn lookup_city(&self, city: &str) -> Result<WeatherReport, LookupError> {
        let location = self.geocoder.resolve_one(city).await?;
        self.lookup_location(location).await
    }

    async fn lookup_location(&self, location: Location) -> Result<WeatherReport, LookupError> {
        let forecast = self.forecast.fetch(location.latitude, location.longitude).await?;
        Ok(WeatherReport::new(location, forecast))
    }
}

impl Drop for SearchOrchestrator {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
