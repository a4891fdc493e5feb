//! Command handlers that delegate to the job orchestrator.
//!
//! Handlers follow the canonical pattern:
//! - Signature: `pub async fn execute(ctx: &mut CliContext, ...) -> Result<(), CliError>`
//! - Thin wrappers that:
//!   1. Parse/validate CLI-specific input
//!   2. Call the orchestrator
//!   3. Render events for the terminal

pub mod convert;
pub mod download;
pub mod paths;
pub mod provision;
pub mod watch;
