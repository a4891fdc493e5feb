//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces the engine expects from infrastructure. They
//! contain no implementation details and use only domain types.

pub mod artifact_fetcher;
pub mod job_event_emitter;

pub use artifact_fetcher::ArtifactFetcher;
pub use job_event_emitter::{JobEventEmitterPort, NoopJobEmitter};
