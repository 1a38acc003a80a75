//! Retrieval event emitter port.
//!
//! The pipeline reports progress as structured `RetrievalEvent`s and leaves
//! formatting to whoever implements this port (console, JSON lines, tests).

use crate::retrieval::RetrievalEvent;

/// Port for emitting retrieval events.
///
/// Called from worker tasks, so implementations must not block.
pub trait RetrievalEventEmitterPort: Send + Sync {
    /// Emit a retrieval event.
    fn emit(&self, event: RetrievalEvent);
}

/// A no-op emitter for tests and embedding contexts that don't report progress.
#[derive(Debug, Clone, Default)]
pub struct NoopEventEmitter;

impl NoopEventEmitter {
    /// Create a new no-op emitter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl RetrievalEventEmitterPort for NoopEventEmitter {
    fn emit(&self, _event: RetrievalEvent) {}
}
