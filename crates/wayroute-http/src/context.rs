//! Per-request context and the handler/hook traits.

use std::fmt;

use http::HeaderMap;
use wayroute_model::RouteError;

use crate::params::RequestParams;
use crate::response::RouteResponse;

/// Everything a handler or hook sees about the request in flight.
///
/// Created at request start, discarded at request end; never reused.
pub struct RequestContext {
    /// Path component of the request URI.
    pub path: String,
    /// Path plus query string, as received. This is what `CacheKey::RequestPath`
    /// and `CacheKey::Derived` fingerprints are computed from.
    pub path_and_query: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// The per-request parameter namespaces.
    pub params: RequestParams,
    /// The error being dispatched, set before exception callbacks run.
    pub error: Option<RouteError>,
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("path", &self.path)
            .field("path_and_query", &self.path_and_query)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

/// A route handler or exception callback: produces the response body.
///
/// The router performs cookie injection, encoding, and cache writes in an
/// explicit finalization stage after the handler returns — handlers only
/// build a [`RouteResponse`].
pub trait Handler: Send + Sync {
    /// Handle the request.
    fn call(&self, ctx: &mut RequestContext) -> Result<RouteResponse, RouteError>;
}

impl<F> Handler for F
where
    F: Fn(&mut RequestContext) -> Result<RouteResponse, RouteError> + Send + Sync,
{
    fn call(&self, ctx: &mut RequestContext) -> Result<RouteResponse, RouteError> {
        self(ctx)
    }
}

/// A lifecycle hook: runs before (begin), after (end), or on failure of
/// dispatch (error). Hooks never run for static-file mounts.
pub trait Hook: Send + Sync {
    /// Run the hook.
    fn call(&self, ctx: &mut RequestContext) -> Result<(), RouteError>;
}

impl<F> Hook for F
where
    F: Fn(&mut RequestContext) -> Result<(), RouteError> + Send + Sync,
{
    fn call(&self, ctx: &mut RequestContext) -> Result<(), RouteError> {
        self(ctx)
    }
}
