//! Out-of-band error reporting collaborator.
//!
//! Listing operations never surface transport failures to their callers;
//! they resolve with an empty result and post the error here instead, so a
//! host application can show a notification outside the rendered view.

use std::error::Error;

/// Fire-and-forget sink for user-visible errors.
pub trait ErrorReporter: Send + Sync {
    /// Posts an error for out-of-band surfacing.
    fn post(&self, error: &dyn Error);
}

/// Reporter that drops all errors.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ErrorReporter for NoopReporter {
    fn post(&self, _error: &dyn Error) {}
}

/// Reporter that emits errors as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn post(&self, error: &dyn Error) {
        tracing::error!(%error, "fetch error reported");
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "Test assertions panic on failure")]
pub(crate) mod test_support {
    use std::error::Error;
    use std::sync::Mutex;

    use super::ErrorReporter;

    /// Reporter that records posted error messages for assertions.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingReporter {
        messages: Mutex<Vec<String>>,
    }

    impl RecordingReporter {
        pub(crate) fn messages(&self) -> Vec<String> {
            self.messages
                .lock()
                .expect("messages mutex should be available")
                .clone()
        }
    }

    impl ErrorReporter for RecordingReporter {
        fn post(&self, error: &dyn Error) {
            self.messages
                .lock()
                .expect("messages mutex should be available")
                .push(error.to_string());
        }
    }
}
