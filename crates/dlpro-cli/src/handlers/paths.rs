//! Paths command handler.
//!
//! Displays the resolved data root and managed binary paths.

use crate::bootstrap::CliContext;

/// Print all resolved paths in `key = value` format.
pub fn execute(ctx: &CliContext) {
    println!("{}", ctx.paths);
}
