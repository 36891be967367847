//! The exception registry: kind table, per-kind callbacks, and the
//! default status-plus-text responses.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use wayroute_core::RouterBuildError;
use wayroute_model::{ErrorKind, LogSeverity, RouteError};

use crate::context::{Handler, RequestContext};
use crate::response::RouteResponse;

const BUILTIN_KINDS: [&str; 6] = [
    "BadRequest",
    "ValueError",
    "TypeError",
    "AccessError",
    "AccessDenied",
    "NotFound",
];

/// Resolved status and severity for a kind.
#[derive(Debug, Clone, Copy)]
struct KindEntry {
    status: StatusCode,
    severity: LogSeverity,
}

/// Maps error kinds to statuses, severities, and response callbacks.
///
/// Built-in kinds are always resolvable. Custom kinds must be registered
/// before use; an error carrying an unregistered custom kind is handled
/// on the unexpected channel (500, generic body, no callback).
#[derive(Default)]
pub struct ExceptionRegistry {
    custom: HashMap<String, KindEntry>,
    callbacks: HashMap<ErrorKind, Arc<dyn Handler>>,
}

impl fmt::Debug for ExceptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExceptionRegistry")
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .field("callbacks", &self.callbacks.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ExceptionRegistry {
    /// Register a custom exception kind with its status and log severity.
    ///
    /// # Errors
    ///
    /// Rejects names that collide with a built-in kind or a previously
    /// registered one.
    pub fn register_kind(
        &mut self,
        name: &str,
        status: StatusCode,
        severity: LogSeverity,
    ) -> Result<(), RouterBuildError> {
        if BUILTIN_KINDS.contains(&name) || self.custom.contains_key(name) {
            return Err(RouterBuildError::DuplicateException(name.to_owned()));
        }
        self.custom
            .insert(name.to_owned(), KindEntry { status, severity });
        Ok(())
    }

    /// Attach a response callback to a kind. Replaces any previous callback
    /// for the same kind.
    ///
    /// # Errors
    ///
    /// Rejects custom kinds that have not been registered.
    pub fn set_callback(
        &mut self,
        kind: ErrorKind,
        callback: Arc<dyn Handler>,
    ) -> Result<(), RouterBuildError> {
        if let ErrorKind::Custom(name) = &kind
            && !self.custom.contains_key(name)
        {
            return Err(RouterBuildError::UnknownException(name.clone()));
        }
        self.callbacks.insert(kind, callback);
        Ok(())
    }

    fn resolve(&self, kind: &ErrorKind) -> Option<KindEntry> {
        match (kind.builtin_status(), kind.builtin_severity()) {
            (Some(status), Some(severity)) => Some(KindEntry { status, severity }),
            _ => self.custom.get(kind.as_str()).copied(),
        }
    }

    /// Turn a caught error into a response.
    ///
    /// Recognized kinds are logged at their severity, exposed to the
    /// callback through `ctx.error`, and answered by the callback or the
    /// default `<Kind>: <message>` text body. Unrecognized errors always
    /// yield a 500 with a generic body.
    pub(crate) fn dispatch(&self, err: RouteError, ctx: &mut RequestContext) -> RouteResponse {
        let Some(entry) = err.kind.as_ref().and_then(|kind| self.resolve(kind)) else {
            tracing::error!(path = %ctx.path, "unhandled error: {err}");
            let body = format!("Unknown Error: {}", err.message);
            ctx.error = Some(err);
            return RouteResponse::text(StatusCode::INTERNAL_SERVER_ERROR, body);
        };

        log_at(entry.severity, &err, &ctx.path);
        let default_body = err.to_string();
        let callback = err.kind.as_ref().and_then(|kind| self.callbacks.get(kind));
        let callback = callback.cloned();
        ctx.error = Some(err);

        if let Some(callback) = callback {
            match callback.call(ctx) {
                Ok(response) => return response,
                Err(cb_err) => {
                    tracing::error!(path = %ctx.path, "exception callback failed: {cb_err}");
                }
            }
        }
        RouteResponse::text(entry.status, default_body)
    }
}

fn log_at(severity: LogSeverity, err: &RouteError, path: &str) {
    match severity {
        LogSeverity::None => {}
        LogSeverity::Error => tracing::error!(path = %path, "{err}"),
        LogSeverity::Warn => tracing::warn!(path = %path, "{err}"),
        LogSeverity::Info => tracing::info!(path = %path, "{err}"),
        LogSeverity::Debug => tracing::debug!(path = %path, "{err}"),
    }
}
