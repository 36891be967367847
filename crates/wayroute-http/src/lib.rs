//! HTTP layer for the wayroute request router.
//!
//! This crate turns the matching engine from `wayroute-core` into a full
//! request pipeline. It handles:
//!
//! - **Parameter namespaces** ([`params`]): `route` (path placeholders),
//!   `get` (query string), `post` (form or multipart body), `cookie`, and
//!   `session`, assembled per request and discarded at request end.
//!
//! - **Multipart bodies** ([`multipart`]): a synchronous finite-state
//!   scanner over the already-collected body bytes.
//!
//! - **Content encoding** ([`encoding`]): `Accept-Encoding` negotiation
//!   (deflate preferred over gzip) and flate2 compression.
//!
//! - **Cookies** ([`cookie`]): request-cookie parsing and queued
//!   `Set-Cookie` headers flushed at response finalization.
//!
//! - **Static files** ([`static_files`]): static-mount resolution with an
//!   extension-based content-type table.
//!
//! - **Exceptions** ([`exceptions`]): the kind registry, per-kind
//!   callbacks, and the default status-plus-text responses.
//!
//! - **The router itself** ([`service`]): registration surface plus the
//!   per-request lifecycle.
//!
//! # Architecture
//!
//! ```text
//! http::Request<Bytes>
//!   -> Router::handle
//!     -> route matching (specificity order, parser aborts skip routes)
//!     -> body parsing (form pairs or multipart field map)
//!     -> cookie / session assembly
//!     -> begin hooks (skipped for static mounts)
//!     -> cache probe (hit bypasses handler and end hooks)
//!     -> handler or static responder
//!     -> end hooks | error dispatch + error hooks
//!     -> finalization: session persistence, Set-Cookie, content
//!        encoding, cache write
//!   <- http::Response<Bytes>
//! ```

pub mod context;
pub mod cookie;
pub mod encoding;
pub mod exceptions;
pub mod multipart;
pub mod params;
pub mod response;
pub mod service;
pub mod static_files;

pub use context::{Handler, Hook, RequestContext};
pub use cookie::{CookieJar, CookieOptions};
pub use exceptions::ExceptionRegistry;
pub use multipart::{FilePart, MultipartValue};
pub use params::{PostBody, RequestParams};
pub use response::RouteResponse;
pub use service::Router;
pub use static_files::MimeTypes;

// Re-export the registration-level types callers need alongside `Router`.
pub use wayroute_core::{CacheKey, RouteOptions, RouterBuildError, RouterConfig};
pub use wayroute_model::{ContentEncoding, ErrorKind, LogSeverity, ParamValue, RouteError};
