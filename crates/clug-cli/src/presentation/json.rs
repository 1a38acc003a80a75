//! JSON-lines event emitter for `--json`.

use std::io::Write;

use clug_core::{RetrievalEvent, RetrievalEventEmitterPort};

/// Writes each event as one JSON object per line on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonEmitter;

impl JsonEmitter {
    /// Create a new JSON emitter.
    pub const fn new() -> Self {
        Self
    }
}

/// Serialize one event to a single line.
pub fn event_line(event: &RetrievalEvent) -> serde_json::Result<String> {
    serde_json::to_string(event)
}

impl RetrievalEventEmitterPort for JsonEmitter {
    fn emit(&self, event: RetrievalEvent) {
        match event_line(&event) {
            Ok(line) => {
                let mut out = std::io::stdout().lock();
                if let Err(err) = writeln!(out, "{line}") {
                    tracing::warn!(error = %err, "Failed to write event");
                }
            }
            Err(err) => tracing::warn!(error = %err, event = event.event_name(), "Failed to serialize event"),
        }
    }
}
