//! Handler-produced responses, before finalization.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::Serialize;
use wayroute_model::RouteError;

/// What a handler returns: status, content type, extra headers, and the
/// uncompressed body. Content encoding, `Set-Cookie` injection, and cache
/// writes happen later, in the router's finalization stage.
#[derive(Debug, Clone, Default)]
pub struct RouteResponse {
    /// Response status.
    pub status: StatusCode,
    /// `Content-Type` header value, if any.
    pub content_type: Option<String>,
    /// Additional response headers.
    pub headers: HeaderMap,
    /// Uncompressed body bytes.
    pub body: Bytes,
}

impl RouteResponse {
    /// A 200 response with the given content type and body.
    pub fn ok(content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: Some(content_type.into()),
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// A plain-text response.
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some(mime::TEXT_PLAIN.to_string()),
            headers: HeaderMap::new(),
            body: Bytes::from(body.into()),
        }
    }

    /// An HTML response.
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: Some(mime::TEXT_HTML.to_string()),
            headers: HeaderMap::new(),
            body: Bytes::from(body.into()),
        }
    }

    /// A JSON response serialized from `value`.
    ///
    /// # Errors
    ///
    /// Returns a value error when serialization fails.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, RouteError> {
        let body = serde_json::to_vec(value)
            .map_err(|e| RouteError::value_error("JSON serialization failed").with_source(e))?;
        Ok(Self {
            status: StatusCode::OK,
            content_type: Some(mime::APPLICATION_JSON.to_string()),
            headers: HeaderMap::new(),
            body: Bytes::from(body),
        })
    }

    /// Replace the status code.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}
