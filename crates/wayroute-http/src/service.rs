//! The router: registration surface plus the per-request lifecycle.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{CONTENT_ENCODING, CONTENT_TYPE, SET_COOKIE};
use http::{HeaderValue, Request, Response};
use wayroute_core::{
    CacheEntry, CompiledRoute, ConverterRegistry, ParamParser, ResponseCache, RouteOptions,
    RouteTable, RouteTarget, RouterBuildError, RouterConfig, SessionStore, SessionSweeper,
    compile_template,
};
use wayroute_model::{ContentEncoding, ErrorKind, LogSeverity, RouteError};

use crate::context::{Handler, Hook, RequestContext};
use crate::cookie::{CookieJar, CookieOptions};
use crate::encoding;
use crate::exceptions::ExceptionRegistry;
use crate::multipart;
use crate::params::{PostBody, RequestParams, parse_pairs};
use crate::response::RouteResponse;
use crate::static_files::{self, MimeTypes};

/// The embeddable request router.
///
/// Registration (routes, converters, exceptions, hooks) happens before
/// serving starts and takes `&mut self`; dispatch takes `&self` and is
/// safe to share across threads behind an `Arc`.
pub struct Router {
    config: RouterConfig,
    converters: ConverterRegistry,
    table: RouteTable<Arc<dyn Handler>>,
    exceptions: ExceptionRegistry,
    begin_hooks: Vec<Arc<dyn Hook>>,
    end_hooks: Vec<Arc<dyn Hook>>,
    error_hooks: Vec<Arc<dyn Hook>>,
    cache: ResponseCache,
    sessions: Arc<SessionStore>,
    mime_types: MimeTypes,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("config", &self.config)
            .field("routes", &self.table.len())
            .field("begin_hooks", &self.begin_hooks.len())
            .field("end_hooks", &self.end_hooks.len())
            .field("error_hooks", &self.error_hooks.len())
            .field("cached", &self.cache.len())
            .field("sessions", &self.sessions.len())
            .finish_non_exhaustive()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}

/// What a lifecycle run produced, before finalization.
struct Produced {
    response: RouteResponse,
    from_cache: bool,
    failed: bool,
}

impl Router {
    /// Create a router with the given configuration.
    #[must_use]
    pub fn new(config: RouterConfig) -> Self {
        let mime_types = MimeTypes::new(config.static_default_type.clone());
        Self {
            config,
            converters: ConverterRegistry::new(),
            table: RouteTable::new(),
            exceptions: ExceptionRegistry::default(),
            begin_hooks: Vec::new(),
            end_hooks: Vec::new(),
            error_hooks: Vec::new(),
            cache: ResponseCache::new(),
            sessions: Arc::new(SessionStore::new()),
            mime_types,
        }
    }

    /// Register a placeholder type usable in route templates.
    ///
    /// # Errors
    ///
    /// Rejects duplicate names and invalid regex fragments.
    pub fn add_converter(
        &mut self,
        name: &str,
        fragment: &str,
        parser: Option<ParamParser>,
    ) -> Result<(), RouterBuildError> {
        self.converters.register(name, fragment, parser)
    }

    /// Register a handler under one or more templates.
    ///
    /// # Errors
    ///
    /// Rejects templates that do not compile.
    pub fn add_route<H>(
        &mut self,
        templates: &[&str],
        handler: H,
        options: RouteOptions,
    ) -> Result<(), RouterBuildError>
    where
        H: Handler + 'static,
    {
        let handler: Arc<dyn Handler> = Arc::new(handler);
        for template in templates {
            let pattern = compile_template(template, &self.converters)?;
            self.table.insert(CompiledRoute::new(
                pattern,
                RouteTarget::Handler(Arc::clone(&handler)),
                options.clone(),
            ));
        }
        Ok(())
    }

    /// Mount a static-file directory under a template. The template's
    /// literal prefix is stripped from the request path; the remainder is
    /// resolved inside `root`. Hooks never run for static mounts.
    ///
    /// # Errors
    ///
    /// Rejects templates that do not compile.
    pub fn add_static(
        &mut self,
        template: &str,
        root: impl Into<PathBuf>,
        options: RouteOptions,
    ) -> Result<(), RouterBuildError> {
        let pattern = compile_template(template, &self.converters)?;
        self.table.insert(CompiledRoute::new(
            pattern,
            RouteTarget::StaticDir(root.into()),
            options,
        ));
        Ok(())
    }

    /// Register a custom exception kind with its status and log severity.
    ///
    /// # Errors
    ///
    /// Rejects names colliding with built-in or already-registered kinds.
    pub fn add_exception(
        &mut self,
        name: &str,
        status: http::StatusCode,
        severity: LogSeverity,
    ) -> Result<(), RouterBuildError> {
        self.exceptions.register_kind(name, status, severity)
    }

    /// Attach a response callback to an exception kind.
    ///
    /// # Errors
    ///
    /// Rejects custom kinds that have not been registered.
    pub fn on_exception<H>(&mut self, kind: ErrorKind, callback: H) -> Result<(), RouterBuildError>
    where
        H: Handler + 'static,
    {
        self.exceptions.set_callback(kind, Arc::new(callback))
    }

    /// Run a hook before dispatch of every non-static request.
    pub fn on_begin<H: Hook + 'static>(&mut self, hook: H) {
        self.begin_hooks.push(Arc::new(hook));
    }

    /// Run a hook after every successful non-static dispatch. Skipped on
    /// cache hits.
    pub fn on_end<H: Hook + 'static>(&mut self, hook: H) {
        self.end_hooks.push(Arc::new(hook));
    }

    /// Run a hook after error dispatch of a matched, non-static request.
    pub fn on_error<H: Hook + 'static>(&mut self, hook: H) {
        self.error_hooks.push(Arc::new(hook));
    }

    /// Override or extend the static content-type table.
    pub fn mime_types_mut(&mut self) -> &mut MimeTypes {
        &mut self.mime_types
    }

    /// Evict the whole response cache.
    pub fn clear_cache_all(&self) {
        self.cache.clear_all();
    }

    /// Evict one cache fingerprint.
    pub fn clear_cache(&self, fingerprint: &str) {
        self.cache.clear(fingerprint);
    }

    /// Evict every cache fingerprint matching the pattern.
    pub fn clear_cache_matching(&self, pattern: &regex::Regex) {
        self.cache.clear_matching(pattern);
    }

    /// The shared session table.
    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Start the background session sweeper at the configured interval.
    /// The returned handle stops the sweep thread when dropped.
    #[must_use]
    pub fn start_sweeper(&self) -> SessionSweeper {
        SessionSweeper::start(Arc::clone(&self.sessions), self.config.sweep_interval())
    }

    /// Dispatch one request through the full lifecycle.
    ///
    /// Never fails: every error is turned into a response by the exception
    /// registry.
    pub fn handle(&self, request: Request<Bytes>) -> Response<Bytes> {
        let path = request.uri().path().to_owned();
        let path_and_query = request
            .uri()
            .path_and_query()
            .map_or_else(|| path.clone(), |pq| pq.as_str().to_owned());
        let query = request.uri().query().map(str::as_bytes).unwrap_or_default();
        let query = parse_pairs(query);
        let (parts, body) = request.into_parts();
        let headers = parts.headers;

        let matched = {
            let found = self.table.lookup(&path);
            found.map(|m| (Arc::clone(m.route), m.params))
        };

        // The body is parsed even on a route miss, so side effects like
        // draining it stay uniform across outcomes.
        let post = parse_post_body(&headers, &body);
        let cookies = CookieJar::from_headers(&headers);
        let session = self.load_session(&cookies);

        let mut ctx = RequestContext {
            path,
            path_and_query,
            headers,
            params: RequestParams {
                route: std::collections::HashMap::new(),
                query,
                post,
                cookies,
                session,
            },
            error: None,
        };

        // A miss is answered as NotFound through the exception registry;
        // no lifecycle hooks run because there is no route to bracket.
        let Some((route, route_params)) = matched else {
            let err = RouteError::not_found(ctx.path.clone());
            let response = self.exceptions.dispatch(err, &mut ctx);
            let produced = Produced {
                response,
                from_cache: false,
                failed: true,
            };
            return self.finalize(produced, None, ContentEncoding::Identity, &mut ctx);
        };
        ctx.params.route = route_params;

        let encoding = if route.encoding {
            encoding::negotiate(&ctx.headers)
        } else {
            ContentEncoding::Identity
        };
        let fingerprint = route.cache.fingerprint(&ctx.path_and_query);

        let produced = self.run_lifecycle(&route, fingerprint.as_deref(), encoding, &mut ctx);
        self.finalize(produced, fingerprint.as_deref(), encoding, &mut ctx)
    }

    /// Resolve the request's session from its cookie, or start a fresh one
    /// with the configured lifetime.
    fn load_session(&self, cookies: &CookieJar) -> wayroute_core::Session {
        if let Some(id) = cookies.get(&self.config.session_cookie_name)
            && let Some(session) = self.sessions.load(id)
        {
            return session;
        }
        let mut session = wayroute_core::Session::new();
        session.lifetime = self.config.session_lifetime();
        session
    }

    /// Begin hooks, cache probe, handler (or static responder), end hooks.
    /// Any error is dispatched through the exception registry, then the
    /// error hooks run for matched non-static routes.
    fn run_lifecycle(
        &self,
        route: &CompiledRoute<Arc<dyn Handler>>,
        fingerprint: Option<&str>,
        encoding: ContentEncoding,
        ctx: &mut RequestContext,
    ) -> Produced {
        let hooks_apply = !route.is_static();

        if hooks_apply {
            for hook in &self.begin_hooks {
                if let Err(err) = hook.call(ctx) {
                    return self.produce_error(err, hooks_apply, ctx);
                }
            }
        }

        // A cache hit replays the stored (already encoded) body and
        // bypasses both the handler and the end hooks.
        if let Some(fingerprint) = fingerprint
            && let Some(entry) = self.cache.get(fingerprint, encoding)
        {
            tracing::debug!(fingerprint, %encoding, "cache hit");
            return Produced {
                response: RouteResponse {
                    status: http::StatusCode::OK,
                    content_type: entry.content_type,
                    headers: http::HeaderMap::new(),
                    body: entry.body,
                },
                from_cache: true,
                failed: false,
            };
        }

        let result = match &route.target {
            RouteTarget::Handler(handler) => handler.call(ctx),
            RouteTarget::StaticDir(root) => {
                let rest = ctx
                    .path
                    .strip_prefix(route.pattern.literal_prefix())
                    .unwrap_or_default();
                static_files::serve(root, rest, &self.mime_types)
            }
        };

        match result {
            Ok(response) => {
                if hooks_apply {
                    for hook in &self.end_hooks {
                        if let Err(err) = hook.call(ctx) {
                            return self.produce_error(err, hooks_apply, ctx);
                        }
                    }
                }
                Produced {
                    response,
                    from_cache: false,
                    failed: false,
                }
            }
            Err(err) => self.produce_error(err, hooks_apply, ctx),
        }
    }

    /// Dispatch an error and run the error hooks. A failure inside an
    /// error hook is itself dispatched once, then the pipeline stops.
    fn produce_error(
        &self,
        err: RouteError,
        hooks_apply: bool,
        ctx: &mut RequestContext,
    ) -> Produced {
        let mut response = self.exceptions.dispatch(err, ctx);
        if hooks_apply {
            for hook in &self.error_hooks {
                if let Err(hook_err) = hook.call(ctx) {
                    tracing::error!(path = %ctx.path, "error hook failed: {hook_err}");
                    response = self.exceptions.dispatch(hook_err, ctx);
                    break;
                }
            }
        }
        Produced {
            response,
            from_cache: false,
            failed: true,
        }
    }

    /// Session persistence, content encoding, cache write, and response
    /// assembly. Runs for every request, error or not.
    fn finalize(
        &self,
        produced: Produced,
        fingerprint: Option<&str>,
        encoding: ContentEncoding,
        ctx: &mut RequestContext,
    ) -> Response<Bytes> {
        self.finalize_session(ctx);

        let Produced {
            mut response,
            from_cache,
            failed,
        } = produced;

        // Cached bodies were stored already encoded; fresh ones are
        // encoded here. An encoder failure downgrades to identity.
        let mut applied = encoding;
        if !from_cache && encoding != ContentEncoding::Identity {
            match encoding::encode(&response.body, encoding) {
                Ok(encoded) => response.body = encoded,
                Err(err) => {
                    tracing::error!(%encoding, "encoding failed, sending identity: {err}");
                    applied = ContentEncoding::Identity;
                }
            }
        }

        if !from_cache && !failed
            && let Some(fingerprint) = fingerprint
        {
            self.cache.store(
                fingerprint,
                applied,
                CacheEntry {
                    body: response.body.clone(),
                    content_type: response.content_type.clone(),
                },
            );
        }

        build_response(response, applied, ctx.params.cookies.pending())
    }

    /// Persist the session once it carries data; refresh its cookie on
    /// every save. A session emptied during the request is dropped from
    /// the store and its cookie cleared.
    fn finalize_session(&self, ctx: &mut RequestContext) {
        let params = &mut ctx.params;
        if params.session.is_empty() {
            if let Some(id) = params.session.id() {
                self.sessions.remove(id);
                params.cookies.clear(&self.config.session_cookie_name);
            }
            return;
        }

        let id = self.sessions.save(&mut params.session);
        let options = CookieOptions {
            expires: None,
            lifetime: Some(
                i64::try_from(params.session.lifetime.as_secs()).unwrap_or(i64::MAX),
            ),
            path: params.session.path.clone(),
            domain: params.session.domain.clone(),
        };
        params
            .cookies
            .set(&self.config.session_cookie_name, &id, &options);
    }
}

/// Parse the request body into the `post` namespace.
fn parse_post_body(headers: &http::HeaderMap, body: &Bytes) -> PostBody {
    if body.is_empty() {
        return PostBody::None;
    }
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if let Some(boundary) = multipart::extract_boundary(content_type) {
        PostBody::Multipart(multipart::parse(body, &boundary))
    } else {
        PostBody::Form(parse_pairs(body))
    }
}

/// Assemble the final `http::Response`.
fn build_response(
    resp: RouteResponse,
    encoding: ContentEncoding,
    cookies: &[String],
) -> Response<Bytes> {
    let mut response = Response::new(resp.body);
    *response.status_mut() = resp.status;
    let headers = response.headers_mut();
    headers.extend(resp.headers);
    if let Some(content_type) = &resp.content_type {
        match HeaderValue::from_str(content_type) {
            Ok(value) => {
                headers.insert(CONTENT_TYPE, value);
            }
            Err(_) => tracing::warn!(content_type, "dropping invalid content type"),
        }
    }
    if let Some(value) = encoding.header_value() {
        headers.insert(CONTENT_ENCODING, HeaderValue::from_static(value));
    }
    for cookie in cookies {
        match HeaderValue::from_str(cookie) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(_) => tracing::warn!("dropping invalid Set-Cookie value"),
        }
    }
    response
}
