//! Job event emitter port.
//!
//! This port abstracts job event emission so the orchestrator can report
//! progress without coupling to transport details (channels, terminal
//! rendering, IPC).

use crate::events::JobEvent;

/// Port for emitting job events.
///
/// Events for one job are emitted from that job's runner task, never under
/// a registry lock. Implementations may call back into the orchestrator;
/// a slow `emit` only delays the job whose event it is handling.
pub trait JobEventEmitterPort: Send + Sync {
    /// Emit a job event.
    fn emit(&self, event: JobEvent);

    /// Clone this emitter into a boxed trait object.
    fn clone_box(&self) -> Box<dyn JobEventEmitterPort>;
}

/// A no-op job event emitter for tests and headless contexts.
#[derive(Debug, Clone, Default)]
pub struct NoopJobEmitter;

impl NoopJobEmitter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl JobEventEmitterPort for NoopJobEmitter {
    fn emit(&self, _event: JobEvent) {}

    fn clone_box(&self) -> Box<dyn JobEventEmitterPort> {
        Box::new(self.clone())
    }
}
