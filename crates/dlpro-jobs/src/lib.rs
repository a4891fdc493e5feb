//! Job orchestration for dlpro.
//!
//! This crate turns download and convert requests into running tool
//! processes and reports on them through a [`JobEventEmitterPort`]:
//!
//! - `registry` - id assignment and the running-job table; a job's terminal
//!   event is the last one its runner task emits
//! - `args` - argument vectors for yt-dlp and ffmpeg
//! - `provisioning` - one memoized provisioning attempt shared by every caller
//! - `orchestrator` - submission, cancellation and introspection
//! - `emitter` - channel-backed emitter for hosts that consume events as a stream
//!
//! [`JobEventEmitterPort`]: dlpro_core::JobEventEmitterPort

#![deny(unsafe_code)]

pub mod args;
pub mod emitter;
pub mod orchestrator;
pub mod provisioning;
pub mod registry;

pub use args::{convert_args, download_args};
pub use emitter::ChannelJobEmitter;
pub use orchestrator::JobOrchestrator;
pub use provisioning::SharedProvisioning;
pub use registry::JobRegistry;
