//! Runtime adapters for dlpro.
//!
//! - `fetch` - resilient HTTP artifact fetcher with atomic install
//! - `archive` - single-member extraction from zip / tar.gz / tar.xz packages
//! - `provision` - managed binary provisioner and its report
//! - `process` - subprocess runner, line splitting and graceful shutdown

#![deny(unsafe_code)]

pub mod archive;
mod cleanup;
pub mod fetch;
pub mod process;
pub mod provision;

pub use fetch::{FetchSettings, HttpFetcher};
pub use process::{ProcessRunner, RunEvent, self_check};
pub use provision::{ProvisionReport, Provisioner};
