//! Fetch-cycle coordination shared by all data sources.
//!
//! Every listing operation in Greenroom follows the same shape: a trigger
//! (initial load, page change, manual retry) starts an asynchronous fetch
//! cycle, the cycle resolves with rows or a failure, and the owning view
//! state is updated. Cycles can overlap when triggers arrive quickly, so
//! each cycle carries a monotonically increasing identifier and a resolution
//! is discarded whenever a newer cycle has started in the meantime.

mod reporter;
mod session;

pub use reporter::{ErrorReporter, NoopReporter, TracingReporter};
pub use session::{CycleToken, FetchFailure, FetchSession, FetchState};

#[cfg(test)]
pub(crate) use reporter::test_support::RecordingReporter;
