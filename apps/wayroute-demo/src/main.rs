//! Demo server embedding the wayroute router behind hyper.
//!
//! Shows the whole registration surface: typed and untyped routes, a
//! custom placeholder type, session login/logout, a cached and encoded
//! page, a static mount, a custom exception kind, and lifecycle hooks.
//!
//! # Usage
//!
//! ```text
//! LISTEN=127.0.0.1:8080 wayroute-demo
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LISTEN` | `127.0.0.1:8080` | Bind address |
//! | `STATIC_ROOT` | `./public` | Root of the `/static/` mount |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use wayroute_core::{CacheKey, RouteOptions, RouterConfig};
use wayroute_http::{RequestContext, RouteResponse, Router};
use wayroute_model::{ErrorKind, LogSeverity, ParamValue, RouteError};

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Assemble the demo router.
fn build_router(static_root: &str) -> Result<Router> {
    let mut router = Router::new(RouterConfig::default());

    // A placeholder type with a validating parser: the fragment matches
    // any dotted quad, the parser rejects octets above 255 so lookup
    // falls through to less specific routes.
    router.add_converter(
        "ipv4",
        "[0-9]{1,3}[.][0-9]{1,3}[.][0-9]{1,3}[.][0-9]{1,3}",
        Some(Arc::new(|raw: &str| {
            let octets = raw
                .split('.')
                .map(str::parse::<i64>)
                .collect::<Result<Vec<_>, _>>()
                .ok()?;
            octets
                .iter()
                .all(|octet| *octet <= 255)
                .then_some(ParamValue::IntList(octets))
        })),
    )?;

    router.add_exception("RateLimited", StatusCode::TOO_MANY_REQUESTS, LogSeverity::Warn)?;

    // One handler, two templates.
    router.add_route(
        &["/", "/index"],
        |_: &mut RequestContext| {
            Ok(RouteResponse::html(
                "<h1>wayroute demo</h1>\
                 <p>Try /user/42, /user/bob, /host/10.0.0.1, /sum/1,2,3 or /greet</p>",
            ))
        },
        RouteOptions::default(),
    )?;

    router.add_route(
        &["/user/<int:id>"],
        |ctx: &mut RequestContext| {
            let id = ctx
                .params
                .route
                .get("id")
                .and_then(ParamValue::as_int)
                .ok_or_else(|| RouteError::value_error("missing id"))?;
            Ok(RouteResponse::text(StatusCode::OK, format!("user #{id}")))
        },
        RouteOptions::default(),
    )?;

    router.add_route(
        &["/user/<name>"],
        |ctx: &mut RequestContext| {
            let name = ctx
                .params
                .route
                .get("name")
                .and_then(ParamValue::as_str)
                .ok_or_else(|| RouteError::value_error("missing name"))?;
            Ok(RouteResponse::text(StatusCode::OK, format!("hello, {name}")))
        },
        RouteOptions::default(),
    )?;

    router.add_route(
        &["/host/<ipv4:addr>"],
        |ctx: &mut RequestContext| {
            let addr = ctx
                .params
                .route
                .get("addr")
                .ok_or_else(|| RouteError::value_error("missing addr"))?;
            Ok(RouteResponse::text(StatusCode::OK, format!("valid host {addr}")))
        },
        RouteOptions::default(),
    )?;

    router.add_route(
        &["/sum/<list_int:xs>"],
        |ctx: &mut RequestContext| {
            let sum: i64 = ctx
                .params
                .route
                .get("xs")
                .and_then(ParamValue::as_int_list)
                .map_or(0, |xs| xs.iter().sum());
            Ok(RouteResponse::text(StatusCode::OK, sum.to_string()))
        },
        RouteOptions::default(),
    )?;

    // Cached and encoded: the second request is served from the cache,
    // already compressed for the client's Accept-Encoding.
    router.add_route(
        &["/greet"],
        |_: &mut RequestContext| {
            info!("rendering /greet (you should see this once per encoding)");
            Ok(RouteResponse::text(StatusCode::OK, "greetings ".repeat(100)))
        },
        RouteOptions {
            encoding: true,
            cache: CacheKey::RequestPath,
        },
    )?;

    router.add_route(
        &["/login/<name>"],
        |ctx: &mut RequestContext| {
            let name = ctx
                .params
                .route
                .get("name")
                .and_then(ParamValue::as_str)
                .ok_or_else(|| RouteError::bad_request("missing name"))?
                .to_owned();
            ctx.params.session.set("user", &name);
            Ok(RouteResponse::text(StatusCode::OK, format!("logged in as {name}")))
        },
        RouteOptions::default(),
    )?;

    router.add_route(
        &["/logout"],
        |ctx: &mut RequestContext| {
            ctx.params.session.remove("user");
            Ok(RouteResponse::text(StatusCode::OK, "logged out"))
        },
        RouteOptions::default(),
    )?;

    router.add_route(
        &["/whoami"],
        |ctx: &mut RequestContext| match ctx.params.session.get("user") {
            Some(user) => Ok(RouteResponse::text(StatusCode::OK, user.to_owned())),
            None => Err(RouteError::access_denied("not logged in")),
        },
        RouteOptions::default(),
    )?;

    router.add_route(
        &["/limited"],
        |_: &mut RequestContext| {
            Err::<RouteResponse, _>(RouteError::custom("RateLimited", "try again later"))
        },
        RouteOptions::default(),
    )?;

    router.add_static("/static/<path:rest>", static_root, RouteOptions::default())?;

    router.on_exception(ErrorKind::NotFound, |ctx: &mut RequestContext| {
        let path = ctx.path.clone();
        Ok(RouteResponse::html(format!("<h1>404</h1><p>no page at {path}</p>"))
            .with_status(StatusCode::NOT_FOUND))
    })?;

    router.on_begin(|ctx: &mut RequestContext| {
        info!(path = %ctx.path, "request begin");
        Ok(())
    });
    router.on_end(|ctx: &mut RequestContext| {
        info!(path = %ctx.path, "request end");
        Ok(())
    });
    router.on_error(|ctx: &mut RequestContext| {
        if let Some(err) = &ctx.error {
            info!(path = %ctx.path, "request failed: {err}");
        }
        Ok(())
    });

    Ok(router)
}

/// Collect the request body and hand the request to the router.
async fn dispatch(
    router: Arc<Router>,
    request: http::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, hyper::Error> {
    let (parts, body) = request.into_parts();
    let body = body.collect().await?.to_bytes();
    let request = http::Request::from_parts(parts, body);
    let response = router.handle(request);
    Ok(response.map(Full::new))
}

/// Run the accept loop, serving connections until a shutdown signal arrives.
async fn serve(listener: TcpListener, router: Arc<Router>) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let router = Arc::clone(&router);
                let svc = service_fn(move |request| dispatch(Arc::clone(&router), request));
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    // Wait for in-flight requests to complete.
    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_owned());
    init_tracing(&log_level)?;

    let listen = std::env::var("LISTEN").unwrap_or_else(|_| "127.0.0.1:8080".to_owned());
    let static_root = std::env::var("STATIC_ROOT").unwrap_or_else(|_| "./public".to_owned());

    let router = Arc::new(build_router(&static_root)?);
    let mut sweeper = router.start_sweeper();

    let addr: SocketAddr = listen
        .parse()
        .with_context(|| format!("invalid bind address: {listen}"))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, static_root, "wayroute demo listening");

    let result = serve(listener, Arc::clone(&router)).await;

    sweeper.stop();
    result
}
