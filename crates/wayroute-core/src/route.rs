//! Compiled routes and the specificity-sorted route table.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::pattern::CompiledPattern;

/// What a matched route dispatches to.
///
/// `H` is the handler payload; the HTTP layer instantiates it with its
/// boxed handler trait object. Static mounts carry the root directory the
/// matched path remainder is resolved against.
pub enum RouteTarget<H> {
    /// An application handler.
    Handler(H),
    /// A static-file mount rooted at the given directory.
    StaticDir(PathBuf),
}

impl<H> fmt::Debug for RouteTarget<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handler(_) => f.write_str("Handler(..)"),
            Self::StaticDir(root) => f.debug_tuple("StaticDir").field(root).finish(),
        }
    }
}

/// How a route's cache fingerprint is derived.
#[derive(Clone, Default)]
pub enum CacheKey {
    /// Caching disabled.
    #[default]
    None,
    /// Fingerprint is the request path plus query string, as received.
    RequestPath,
    /// Fixed fingerprint shared by every request hitting the route.
    Fixed(String),
    /// Fingerprint computed from the request path plus query string.
    Derived(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl CacheKey {
    /// Resolve the fingerprint for a request, or `None` when caching is off.
    #[must_use]
    pub fn fingerprint(&self, path_and_query: &str) -> Option<String> {
        match self {
            Self::None => None,
            Self::RequestPath => Some(path_and_query.to_owned()),
            Self::Fixed(key) => Some(key.clone()),
            Self::Derived(derive) => Some(derive(path_and_query)),
        }
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::RequestPath => f.write_str("RequestPath"),
            Self::Fixed(key) => f.debug_tuple("Fixed").field(key).finish(),
            Self::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

/// Per-route registration options.
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
    /// Negotiate gzip/deflate content encoding for responses on this route.
    pub encoding: bool,
    /// Response-cache fingerprint derivation.
    pub cache: CacheKey,
}

/// A registered route: compiled pattern, target, and options.
/// Created once at registration; immutable thereafter.
#[derive(Debug)]
pub struct CompiledRoute<H> {
    /// The compiled template.
    pub pattern: CompiledPattern,
    /// Handler or static mount.
    pub target: RouteTarget<H>,
    /// Whether content-encoding negotiation is enabled.
    pub encoding: bool,
    /// Cache fingerprint derivation.
    pub cache: CacheKey,
    specificity: usize,
}

impl<H> CompiledRoute<H> {
    /// Build a route from its compiled pattern and options.
    #[must_use]
    pub fn new(pattern: CompiledPattern, target: RouteTarget<H>, options: RouteOptions) -> Self {
        let specificity = specificity_score(&pattern);
        Self {
            pattern,
            target,
            encoding: options.encoding,
            cache: options.cache,
            specificity,
        }
    }

    /// The specificity score used to order the route table.
    #[must_use]
    pub fn specificity(&self) -> usize {
        self.specificity
    }

    /// Whether this route is a static-file mount.
    #[must_use]
    pub fn is_static(&self) -> bool {
        matches!(self.target, RouteTarget::StaticDir(_))
    }
}

/// Score(route) = typed placeholders + all placeholders + `/`-separated
/// segments of the template. Longer, more constrained templates score
/// higher and are attempted first, so `/user/<int:id>` beats `/user/<id>`
/// beats `/<path>`.
fn specificity_score(pattern: &CompiledPattern) -> usize {
    let typed = pattern
        .args
        .iter()
        .filter(|arg| arg.converter.is_some())
        .count();
    typed + pattern.args.len() + pattern.template.split('/').count()
}

/// The ordered set of registered routes.
///
/// Re-sorted after every insertion by descending specificity; ties keep
/// insertion order (stable sort). Read-only during dispatch — registration
/// finishes before serving starts.
#[derive(Debug)]
pub struct RouteTable<H> {
    pub(crate) routes: Vec<Arc<CompiledRoute<H>>>,
}

impl<H> RouteTable<H> {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Insert a route and restore the specificity order.
    pub fn insert(&mut self, route: CompiledRoute<H>) {
        tracing::info!(
            template = route.pattern.template,
            specificity = route.specificity(),
            static_mount = route.is_static(),
            "registered route"
        );
        self.routes.push(Arc::new(route));
        self.routes
            .sort_by(|a, b| b.specificity().cmp(&a.specificity()));
    }

    /// Routes in match order (most specific first).
    pub fn iter(&self) -> impl Iterator<Item = &Arc<CompiledRoute<H>>> {
        self.routes.iter()
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self::new()
    }
}
