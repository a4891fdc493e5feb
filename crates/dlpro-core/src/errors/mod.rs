//! Error taxonomy for the engine.
//!
//! Each layer owns one enum. Errors are cloneable and serializable so they can
//! be carried inside provisioning reports and job events without holding on to
//! `std::io::Error` values; I/O failures capture kind and message as strings.

mod fetch;
mod process;
mod provision;
mod request;

pub use fetch::FetchError;
pub use process::{ProcessError, SpawnError};
pub use provision::ProvisionError;
pub use request::RequestError;

pub(crate) fn io_kind(err: &std::io::Error) -> String {
    format!("{:?}", err.kind())
}
