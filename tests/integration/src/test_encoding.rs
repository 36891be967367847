//! Content-encoding negotiation end to end, including cached encoded
//! bodies.

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use http::header::CONTENT_ENCODING;
    use http::StatusCode;
    use wayroute_core::{CacheKey, RouteOptions};
    use wayroute_http::{RequestContext, RouteResponse, Router};

    use crate::{get, get_with, router};

    const BODY: &str = "a page body that compresses well well well well well well";

    fn encoded_router(calls: &Arc<AtomicUsize>, cache: CacheKey) -> Router {
        let mut router = router();
        let calls = Arc::clone(calls);
        router
            .add_route(
                &["/page"],
                move |_: &mut RequestContext| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(RouteResponse::text(StatusCode::OK, BODY))
                },
                RouteOptions {
                    encoding: true,
                    cache,
                },
            )
            .expect("route");
        router
    }

    #[test]
    fn test_should_prefer_deflate_when_client_accepts_both() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = encoded_router(&calls, CacheKey::None);

        let response = router.handle(get_with("/page", "accept-encoding", "gzip, deflate, br"));
        assert_eq!(
            response.headers().get(CONTENT_ENCODING).map(http::HeaderValue::as_bytes),
            Some(b"deflate".as_ref())
        );

        let mut decoder = flate2::read::ZlibDecoder::new(response.body().as_ref());
        let mut out = String::new();
        decoder.read_to_string(&mut out).expect("decode");
        assert_eq!(out, BODY);
    }

    #[test]
    fn test_should_fall_back_to_gzip() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = encoded_router(&calls, CacheKey::None);

        let response = router.handle(get_with("/page", "accept-encoding", "gzip"));
        assert_eq!(
            response.headers().get(CONTENT_ENCODING).map(http::HeaderValue::as_bytes),
            Some(b"gzip".as_ref())
        );

        let mut decoder = flate2::read::GzDecoder::new(response.body().as_ref());
        let mut out = String::new();
        decoder.read_to_string(&mut out).expect("decode");
        assert_eq!(out, BODY);
    }

    #[test]
    fn test_should_send_identity_without_header() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = encoded_router(&calls, CacheKey::None);

        let response = router.handle(get("/page"));
        assert!(response.headers().get(CONTENT_ENCODING).is_none());
        assert_eq!(response.body().as_ref(), BODY.as_bytes());
    }

    #[test]
    fn test_should_cache_each_encoding_separately() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = encoded_router(&calls, CacheKey::RequestPath);

        // One render per encoding; repeats replay the stored bytes.
        let deflate_first = router.handle(get_with("/page", "accept-encoding", "deflate"));
        let gzip_first = router.handle(get_with("/page", "accept-encoding", "gzip"));
        let plain_first = router.handle(get("/page"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        let deflate_second = router.handle(get_with("/page", "accept-encoding", "deflate"));
        let gzip_second = router.handle(get_with("/page", "accept-encoding", "gzip"));
        let plain_second = router.handle(get("/page"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        assert_eq!(deflate_first.body(), deflate_second.body());
        assert_eq!(gzip_first.body(), gzip_second.body());
        assert_eq!(plain_first.body(), plain_second.body());
        assert_ne!(deflate_first.body(), gzip_first.body());
    }
}
