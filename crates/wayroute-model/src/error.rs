//! The router's exception taxonomy.
//!
//! Application errors carry an [`ErrorKind`] that maps to an HTTP status and
//! an optional log severity. Errors without a kind travel the "unexpected"
//! channel: always logged at error severity, always answered with 500, never
//! routed to a registered callback.

use std::fmt;

use http::StatusCode;

/// Severity at which a caught error is logged, if at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogSeverity {
    /// Do not log.
    #[default]
    None,
    /// `tracing::error!`
    Error,
    /// `tracing::warn!`
    Warn,
    /// `tracing::info!`
    Info,
    /// `tracing::debug!`
    Debug,
}

/// The kind of a typed application error.
///
/// Built-in kinds carry their own status and severity; [`ErrorKind::Custom`]
/// kinds are resolved through the router's exception registry, so an
/// unregistered custom kind degrades to the unexpected channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed request (400).
    BadRequest,
    /// Invalid value (500).
    ValueError,
    /// Invalid type (500).
    TypeError,
    /// Not acceptable (406).
    AccessError,
    /// Unauthorized (401).
    AccessDenied,
    /// Not found (404).
    NotFound,
    /// A kind registered at runtime; status and severity live in the
    /// exception registry.
    Custom(String),
}

impl ErrorKind {
    /// The kind name used in default response bodies and callback lookups.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::BadRequest => "BadRequest",
            Self::ValueError => "ValueError",
            Self::TypeError => "TypeError",
            Self::AccessError => "AccessError",
            Self::AccessDenied => "AccessDenied",
            Self::NotFound => "NotFound",
            Self::Custom(name) => name,
        }
    }

    /// The status code for built-in kinds. `Custom` kinds have none here.
    #[must_use]
    pub fn builtin_status(&self) -> Option<StatusCode> {
        match self {
            Self::BadRequest => Some(StatusCode::BAD_REQUEST),
            Self::ValueError | Self::TypeError => Some(StatusCode::INTERNAL_SERVER_ERROR),
            Self::AccessError => Some(StatusCode::NOT_ACCEPTABLE),
            Self::AccessDenied => Some(StatusCode::UNAUTHORIZED),
            Self::NotFound => Some(StatusCode::NOT_FOUND),
            Self::Custom(_) => None,
        }
    }

    /// The log severity for built-in kinds. `Custom` kinds have none here.
    #[must_use]
    pub fn builtin_severity(&self) -> Option<LogSeverity> {
        match self {
            Self::BadRequest | Self::ValueError | Self::TypeError | Self::AccessError => {
                Some(LogSeverity::Error)
            }
            Self::AccessDenied | Self::NotFound => Some(LogSeverity::Warn),
            Self::Custom(_) => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error raised by a handler, a lifecycle hook, or the router itself.
#[derive(Debug)]
pub struct RouteError {
    /// The recognized kind, or `None` for unexpected errors.
    pub kind: Option<ErrorKind>,
    /// Human-readable message, rendered in the default response body.
    pub message: String,
    /// The underlying cause, when the error wraps another one.
    pub source: Option<anyhow::Error>,
}

impl RouteError {
    /// Create a typed error.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            message: message.into(),
            source: None,
        }
    }

    /// Create an error on the unexpected channel (always 500).
    #[must_use]
    pub fn unexpected(err: impl Into<anyhow::Error>) -> Self {
        let err = err.into();
        Self {
            kind: None,
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// A `BadRequest` error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    /// A `ValueError` error.
    #[must_use]
    pub fn value_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValueError, message)
    }

    /// A `TypeError` error.
    #[must_use]
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message)
    }

    /// An `AccessError` error.
    #[must_use]
    pub fn access_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AccessError, message)
    }

    /// An `AccessDenied` error.
    #[must_use]
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AccessDenied, message)
    }

    /// A `NotFound` error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// An error with a runtime-registered kind.
    #[must_use]
    pub fn custom(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Custom(kind.into()), message)
    }

    /// Attach an underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Whether this error travels the unexpected channel.
    #[must_use]
    pub fn is_unexpected(&self) -> bool {
        self.kind.is_none()
    }
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Some(kind) => write!(f, "{kind}: {}", self.message),
            None => write!(f, "Unknown Error: {}", self.message),
        }
    }
}

impl std::error::Error for RouteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<anyhow::Error> for RouteError {
    fn from(err: anyhow::Error) -> Self {
        Self::unexpected(err)
    }
}
