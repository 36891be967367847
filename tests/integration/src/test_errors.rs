//! Exception taxonomy end to end: default bodies, custom kinds,
//! callbacks, hooks, and the unexpected channel.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use http::StatusCode;
    use wayroute_core::RouteOptions;
    use wayroute_http::{RequestContext, RouteResponse};
    use wayroute_model::{ErrorKind, LogSeverity, RouteError};

    use crate::{get, router};

    fn failing(err: fn() -> RouteError) -> impl Fn(&mut RequestContext) -> Result<RouteResponse, RouteError>
    {
        move |_: &mut RequestContext| Err(err())
    }

    #[test]
    fn test_should_map_builtin_kinds_to_status_and_body() {
        let cases: [(fn() -> RouteError, StatusCode, &str); 4] = [
            (
                || RouteError::bad_request("bad form"),
                StatusCode::BAD_REQUEST,
                "BadRequest: bad form",
            ),
            (
                || RouteError::value_error("bad value"),
                StatusCode::INTERNAL_SERVER_ERROR,
                "ValueError: bad value",
            ),
            (
                || RouteError::access_denied("who are you"),
                StatusCode::UNAUTHORIZED,
                "AccessDenied: who are you",
            ),
            (
                || RouteError::access_error("not like this"),
                StatusCode::NOT_ACCEPTABLE,
                "AccessError: not like this",
            ),
        ];

        for (make, status, body) in cases {
            let mut router = router();
            router
                .add_route(&["/fail"], failing(make), RouteOptions::default())
                .expect("route");
            let response = router.handle(get("/fail"));
            assert_eq!(response.status(), status);
            assert_eq!(response.body().as_ref(), body.as_bytes());
        }
    }

    #[test]
    fn test_should_answer_unexpected_errors_with_generic_500() {
        let mut router = router();
        router
            .add_route(
                &["/boom"],
                |_: &mut RequestContext| {
                    let parsed: i64 = "not a number"
                        .parse()
                        .map_err(|e| RouteError::unexpected(anyhow::Error::new(e)))?;
                    Ok(RouteResponse::text(StatusCode::OK, parsed.to_string()))
                },
                RouteOptions::default(),
            )
            .expect("route");

        let response = router.handle(get("/boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.body().starts_with(b"Unknown Error: "));
    }

    #[test]
    fn test_should_use_registered_custom_kind() {
        let mut router = router();
        router
            .add_exception("RateLimited", StatusCode::TOO_MANY_REQUESTS, LogSeverity::Warn)
            .expect("exception");
        router
            .add_route(
                &["/limited"],
                failing(|| RouteError::custom("RateLimited", "slow down")),
                RouteOptions::default(),
            )
            .expect("route");

        let response = router.handle(get("/limited"));
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.body().as_ref(), b"RateLimited: slow down");
    }

    #[test]
    fn test_should_degrade_unregistered_custom_kind_to_500() {
        let mut router = router();
        router
            .add_route(
                &["/odd"],
                failing(|| RouteError::custom("NeverRegistered", "mystery")),
                RouteOptions::default(),
            )
            .expect("route");

        let response = router.handle(get("/odd"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body().as_ref(), b"Unknown Error: mystery");
    }

    #[test]
    fn test_should_render_error_through_registered_callback() {
        let mut router = router();
        router
            .on_exception(ErrorKind::AccessDenied, |ctx: &mut RequestContext| {
                let message = ctx
                    .error
                    .as_ref()
                    .map_or_else(String::new, |err| err.message.clone());
                Ok(
                    RouteResponse::html(format!("<h1>login required</h1><p>{message}</p>"))
                        .with_status(StatusCode::UNAUTHORIZED),
                )
            })
            .expect("callback");
        router
            .add_route(
                &["/admin"],
                failing(|| RouteError::access_denied("admins only")),
                RouteOptions::default(),
            )
            .expect("route");

        let response = router.handle(get("/admin"));
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.body().as_ref(),
            b"<h1>login required</h1><p>admins only</p>".as_ref()
        );
    }

    #[test]
    fn test_should_run_error_hooks_only_for_matched_routes() {
        let errors = Arc::new(AtomicUsize::new(0));
        let mut router = router();
        let hook_errors = Arc::clone(&errors);
        router.on_error(move |_: &mut RequestContext| {
            hook_errors.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        router
            .add_route(
                &["/fail"],
                failing(|| RouteError::value_error("nope")),
                RouteOptions::default(),
            )
            .expect("route");

        router.handle(get("/fail"));
        assert_eq!(errors.load(Ordering::SeqCst), 1);

        // A route miss has no route to bracket, so no hooks fire.
        router.handle(get("/does-not-exist"));
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_should_dispatch_error_hook_failure_and_stop_the_hook_chain() {
        let later_hooks = Arc::new(AtomicUsize::new(0));
        let mut router = router();
        router.on_error(|_: &mut RequestContext| Err(RouteError::access_denied("hook down")));
        let counter = Arc::clone(&later_hooks);
        router.on_error(move |_: &mut RequestContext| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        router
            .add_route(
                &["/fail"],
                failing(|| RouteError::value_error("nope")),
                RouteOptions::default(),
            )
            .expect("route");

        // The first hook's failure is dispatched in place of the original
        // error, and the second hook never runs.
        let response = router.handle(get("/fail"));
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.body().as_ref(), b"AccessDenied: hook down");
        assert_eq!(later_hooks.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_should_dispatch_begin_hook_failures() {
        let mut router = router();
        router.on_begin(|_: &mut RequestContext| Err(RouteError::access_denied("maintenance")));
        router
            .add_route(
                &["/any"],
                |_: &mut RequestContext| Ok(RouteResponse::text(StatusCode::OK, "never")),
                RouteOptions::default(),
            )
            .expect("route");

        let response = router.handle(get("/any"));
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.body().as_ref(), b"AccessDenied: maintenance");
    }
}
