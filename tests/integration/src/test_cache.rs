//! Response-cache behavior: hit bypass, byte-identical replay, and
//! explicit eviction.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use http::StatusCode;
    use http::header::CONTENT_TYPE;
    use wayroute_core::{CacheKey, RouteOptions};
    use wayroute_http::{RequestContext, RouteResponse, Router};

    use crate::{get, router};

    fn counting_router(calls: &Arc<AtomicUsize>, cache: CacheKey) -> Router {
        let mut router = router();
        let calls = Arc::clone(calls);
        router
            .add_route(
                &["/page"],
                move |_: &mut RequestContext| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(RouteResponse::ok("text/html", "<p>rendered</p>"))
                },
                RouteOptions {
                    encoding: false,
                    cache,
                },
            )
            .expect("route");
        router
    }

    #[test]
    fn test_should_serve_repeat_requests_from_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = counting_router(&calls, CacheKey::RequestPath);

        let first = router.handle(get("/page"));
        let second = router.handle(get("/page"));
        let third = router.handle(get("/page"));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.body(), second.body());
        assert_eq!(second.body(), third.body());
        assert_eq!(
            first.headers().get(CONTENT_TYPE),
            second.headers().get(CONTENT_TYPE)
        );
        assert_eq!(second.status(), StatusCode::OK);
    }

    #[test]
    fn test_should_key_cache_by_path_and_query() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut router = router();
        let handler_calls = Arc::clone(&calls);
        router
            .add_route(
                &["/report"],
                move |ctx: &mut RequestContext| {
                    handler_calls.fetch_add(1, Ordering::SeqCst);
                    let week = ctx.params.query_first("week").unwrap_or_default().to_owned();
                    Ok(RouteResponse::text(StatusCode::OK, week))
                },
                RouteOptions {
                    encoding: false,
                    cache: CacheKey::RequestPath,
                },
            )
            .expect("route");

        assert_eq!(router.handle(get("/report?week=1")).body().as_ref(), b"1");
        assert_eq!(router.handle(get("/report?week=2")).body().as_ref(), b"2");
        assert_eq!(router.handle(get("/report?week=1")).body().as_ref(), b"1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_should_share_fixed_fingerprint_across_requests() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut router = router();
        let handler_calls = Arc::clone(&calls);
        router
            .add_route(
                &["/front"],
                move |_: &mut RequestContext| {
                    handler_calls.fetch_add(1, Ordering::SeqCst);
                    Ok(RouteResponse::text(StatusCode::OK, "front"))
                },
                RouteOptions {
                    encoding: false,
                    cache: CacheKey::Fixed("front-page".to_owned()),
                },
            )
            .expect("route");

        router.handle(get("/front?utm=a"));
        router.handle(get("/front?utm=b"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_should_rerun_handler_after_eviction() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = counting_router(&calls, CacheKey::RequestPath);

        router.handle(get("/page"));
        router.handle(get("/page"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        router.clear_cache("/page");
        router.handle(get("/page"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_should_evict_fingerprints_by_pattern() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = counting_router(&calls, CacheKey::RequestPath);

        router.handle(get("/page"));
        router.clear_cache_matching(&regex::Regex::new("^/pa").expect("pattern"));
        router.handle(get("/page"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        router.clear_cache_matching(&regex::Regex::new("^/other").expect("pattern"));
        router.handle(get("/page"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_should_not_cache_without_a_cache_key() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = counting_router(&calls, CacheKey::None);

        router.handle(get("/page"));
        router.handle(get("/page"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
