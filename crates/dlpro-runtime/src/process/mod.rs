//! Subprocess execution for managed tools.
//!
//! - `lines` - byte chunk to line splitting (`\n`, `\r\n` and lone `\r`)
//! - `runner` - spawn, stream output, await exit, honour cancellation
//! - `shutdown` - SIGTERM then SIGKILL escalation for cancelled children
//! - `probe` - short version self-check before first use

mod lines;
mod probe;
mod runner;
mod shutdown;

pub use lines::LineSplitter;
pub use probe::self_check;
pub use runner::{ProcessRunner, RunEvent};
pub use shutdown::shutdown_child;
