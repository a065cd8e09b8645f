//! Application telemetry events and sinks.
//!
//! Greenroom is a local-first tool, but lightweight telemetry helps when
//! debugging fetch behaviour: it captures the active catalog schema version
//! after migrations and records fetch cycles whose results arrived too late
//! to be applied.

use std::io;

use serde::{Deserialize, Serialize};

/// A structured telemetry event emitted by Greenroom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// Records the current catalog schema version after migrations apply.
    SchemaVersionRecorded {
        /// Diesel migration version string (e.g. `20260829000000`).
        schema_version: String,
    },
    /// Records a fetch cycle whose result was discarded because a newer
    /// cycle had already started.
    StaleFetchDiscarded {
        /// Name of the data source the cycle was fetching from.
        source: String,
        /// The superseded cycle number.
        cycle: u64,
    },
}

/// Destination for telemetry events.
pub trait TelemetrySink: Send + Sync {
    /// Accepts one event; implementations must not block or fail loudly.
    fn record(&self, event: TelemetryEvent);
}

/// Sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn record(&self, _event: TelemetryEvent) {}
}

/// Emits telemetry events on stderr, one JSON object per line.
///
/// Local debugging aid only; nothing leaves the machine.
#[derive(Debug, Default)]
pub struct StderrJsonlTelemetrySink;

impl StderrJsonlTelemetrySink {
    fn write_line(serialised: &str) -> io::Result<()> {
        use io::Write;

        writeln!(io::stderr().lock(), "{serialised}")
    }
}

impl TelemetrySink for StderrJsonlTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        if let Ok(serialised) = serde_json::to_string(&event) {
            let _ignored = Self::write_line(&serialised);
        }
    }
}
