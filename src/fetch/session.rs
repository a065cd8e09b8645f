//! Generation-guarded fetch state shared by the listing operations.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::telemetry::{NoopTelemetrySink, TelemetryEvent, TelemetrySink};

/// The outcome of one fetch cycle, as seen by a view.
///
/// `value` holds the most recently applied payload; it stays visible while a
/// newer cycle is loading and is replaced wholesale when that cycle applies.
/// A failed cycle resets `value` to the payload's default (an empty listing)
/// and records the failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchState<T> {
    /// True while a fetch cycle is in flight.
    pub loading: bool,
    /// The applied payload, absent until the first cycle completes.
    pub value: Option<T>,
    /// The failure from the most recent applied cycle, if any.
    pub error: Option<FetchFailure>,
}

impl<T> FetchState<T> {
    const fn idle() -> Self {
        Self {
            loading: false,
            value: None,
            error: None,
        }
    }
}

/// A failure recorded against the fetch state.
///
/// The originating error is posted to the [`ErrorReporter`] collaborator
/// out-of-band; the state only keeps a display message.
///
/// [`ErrorReporter`]: super::ErrorReporter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    /// Human-readable description of the failure.
    pub message: String,
}

impl FetchFailure {
    /// Builds a failure from any error's display form.
    #[must_use]
    pub fn from_error(error: &dyn std::error::Error) -> Self {
        Self {
            message: error.to_string(),
        }
    }
}

/// Identifier for one fetch cycle issued by [`FetchSession::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleToken {
    generation: u64,
}

impl CycleToken {
    /// The cycle number this token was issued for.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// Owns the fetch state for one data source and enforces cycle ordering.
///
/// Results are applied in trigger order, not completion order: completing a
/// cycle whose token is no longer the newest is a no-op apart from a
/// telemetry event. This is what prevents a slow, superseded request from
/// overwriting the rows of a fetch triggered by more recent inputs.
pub struct FetchSession<T> {
    source: &'static str,
    latest: AtomicU64,
    state: Mutex<FetchState<T>>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl<T> FetchSession<T>
where
    T: Clone + Default,
{
    /// Creates a session for the named data source with telemetry disabled.
    #[must_use]
    pub fn new(source: &'static str) -> Self {
        Self::with_telemetry(source, Arc::new(NoopTelemetrySink))
    }

    /// Creates a session that records discarded cycles to the given sink.
    #[must_use]
    pub fn with_telemetry(source: &'static str, telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self {
            source,
            latest: AtomicU64::new(0),
            state: Mutex::new(FetchState::idle()),
            telemetry,
        }
    }

    /// Starts a new fetch cycle, superseding any cycle still in flight.
    ///
    /// The state switches to loading but keeps the previous value visible
    /// until the new cycle completes.
    #[must_use]
    pub fn begin(&self) -> CycleToken {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.lock_state().loading = true;
        CycleToken { generation }
    }

    /// Applies a cycle's result, returning whether it was applied.
    ///
    /// A result is discarded when a newer cycle has begun since the token was
    /// issued; discarded results leave the state untouched. The generation is
    /// checked while the state lock is held, so a newer cycle completing
    /// between check and apply cannot be overwritten by a stale result.
    #[must_use]
    pub fn complete(&self, token: CycleToken, result: Result<T, FetchFailure>) -> bool {
        {
            let mut state = self.lock_state();
            if token.generation == self.latest.load(Ordering::SeqCst) {
                state.loading = false;
                match result {
                    Ok(value) => {
                        state.value = Some(value);
                        state.error = None;
                    }
                    Err(failure) => {
                        state.value = Some(T::default());
                        state.error = Some(failure);
                    }
                }
                return true;
            }
        }

        self.telemetry.record(TelemetryEvent::StaleFetchDiscarded {
            source: self.source.to_owned(),
            cycle: token.generation,
        });
        false
    }

    /// Returns a copy of the current fetch state.
    #[must_use]
    pub fn snapshot(&self) -> FetchState<T> {
        self.lock_state().clone()
    }

    /// Name of the data source this session tracks.
    #[must_use]
    pub const fn source(&self) -> &'static str {
        self.source
    }

    fn lock_state(&self) -> MutexGuard<'_, FetchState<T>> {
        // A poisoned lock only means a panic elsewhere; the state itself is
        // a plain value and stays usable.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
