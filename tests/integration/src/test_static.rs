//! Static mounts through the router: prefix stripping, content types,
//! traversal rejection, and hook exemption.

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use http::StatusCode;
    use http::header::CONTENT_TYPE;
    use wayroute_core::RouteOptions;
    use wayroute_http::RequestContext;

    use crate::{get, router};

    fn fixture_root() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut page = std::fs::File::create(dir.path().join("index.html")).expect("create");
        page.write_all(b"<h1>static</h1>").expect("write");
        std::fs::create_dir(dir.path().join("img")).expect("mkdir");
        let mut img = std::fs::File::create(dir.path().join("img/dot.png")).expect("create");
        img.write_all(&[0x89, 0x50, 0x4E, 0x47]).expect("write");
        dir
    }

    #[test]
    fn test_should_serve_files_under_the_mount() {
        let root = fixture_root();
        let mut router = router();
        router
            .add_static("/static/<path:rest>", root.path(), RouteOptions::default())
            .expect("mount");

        let page = router.handle(get("/static/index.html"));
        assert_eq!(page.status(), StatusCode::OK);
        assert_eq!(page.body().as_ref(), b"<h1>static</h1>");
        assert_eq!(
            page.headers().get(CONTENT_TYPE).map(http::HeaderValue::as_bytes),
            Some(b"text/html".as_ref())
        );

        let img = router.handle(get("/static/img/dot.png"));
        assert_eq!(
            img.headers().get(CONTENT_TYPE).map(http::HeaderValue::as_bytes),
            Some(b"image/png".as_ref())
        );
    }

    #[test]
    fn test_should_answer_missing_files_with_404() {
        let root = fixture_root();
        let mut router = router();
        router
            .add_static("/static/<path:rest>", root.path(), RouteOptions::default())
            .expect("mount");

        let response = router.handle(get("/static/missing.css"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_should_reject_path_traversal() {
        let root = fixture_root();
        let mut router = router();
        router
            .add_static("/static/<path:rest>", root.path(), RouteOptions::default())
            .expect("mount");

        for path in ["/static/../secret.txt", "/static/%2e%2e/secret.txt"] {
            let response = router.handle(get(path));
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "path {path}");
        }
    }

    #[test]
    fn test_should_skip_hooks_for_static_mounts() {
        let hooks = Arc::new(AtomicUsize::new(0));
        let root = fixture_root();
        let mut router = router();
        let (begin, end) = (Arc::clone(&hooks), Arc::clone(&hooks));
        router.on_begin(move |_: &mut RequestContext| {
            begin.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        router.on_end(move |_: &mut RequestContext| {
            end.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        router
            .add_static("/static/<path:rest>", root.path(), RouteOptions::default())
            .expect("mount");

        router.handle(get("/static/index.html"));
        assert_eq!(hooks.load(Ordering::SeqCst), 0);
    }
}
