//! The `dlpro` command-line host.
//!
//! Wires the engine together in [`bootstrap`] and renders job events in the
//! terminal. It uses only the public contract of the engine crates.

#![deny(unsafe_code)]

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
