//! Integration tests driving the router through its full request
//! lifecycle: matching, body parsing, hooks, exceptions, caching,
//! encoding, and sessions.
//!
//! Everything runs in-process against [`Router::handle`]; no server or
//! network is involved.

use std::sync::Once;

use bytes::Bytes;
use http::Request;
use wayroute_http::Router;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A fresh router with tracing initialized.
#[must_use]
pub fn router() -> Router {
    init_tracing();
    Router::default()
}

/// A bodyless GET request.
#[must_use]
pub fn get(uri: &str) -> Request<Bytes> {
    Request::builder()
        .uri(uri)
        .body(Bytes::new())
        .expect("request")
}

/// A bodyless GET request with one header.
#[must_use]
pub fn get_with(uri: &str, name: &str, value: &str) -> Request<Bytes> {
    Request::builder()
        .uri(uri)
        .header(name, value)
        .body(Bytes::new())
        .expect("request")
}

/// A POST request with a content type and body.
#[must_use]
pub fn post(uri: &str, content_type: &str, body: impl Into<Bytes>) -> Request<Bytes> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", content_type)
        .body(body.into())
        .expect("request")
}

mod test_cache;
mod test_encoding;
mod test_errors;
mod test_sessions;
mod test_static;
