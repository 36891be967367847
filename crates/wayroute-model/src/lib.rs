//! Shared types for the wayroute request router.
//!
//! This crate holds the value and error types used by every layer of the
//! router: typed route-argument values, the content-encoding tag shared by
//! the negotiator and the response cache, and the exception taxonomy that
//! maps application errors to HTTP responses.

mod error;
mod types;

pub use error::{ErrorKind, LogSeverity, RouteError};
pub use types::{ContentEncoding, ParamValue};
