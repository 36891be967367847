//! Session persistence rules, cookie round-trips, and expiry sweeping.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use http::StatusCode;
    use http::header::SET_COOKIE;
    use wayroute_core::RouteOptions;
    use wayroute_http::{RequestContext, RouteResponse, Router};
    use wayroute_model::RouteError;

    use crate::{get, get_with, router};

    fn session_router() -> Router {
        let mut router = router();
        router
            .add_route(
                &["/login/<name>"],
                |ctx: &mut RequestContext| {
                    let name = ctx
                        .params
                        .route
                        .get("name")
                        .and_then(wayroute_model::ParamValue::as_str)
                        .ok_or_else(|| RouteError::bad_request("missing name"))?
                        .to_owned();
                    ctx.params.session.set("user", &name);
                    Ok(RouteResponse::text(StatusCode::OK, "in"))
                },
                RouteOptions::default(),
            )
            .expect("route");
        router
            .add_route(
                &["/whoami"],
                |ctx: &mut RequestContext| {
                    let user = ctx.params.session.get("user").unwrap_or("nobody").to_owned();
                    Ok(RouteResponse::text(StatusCode::OK, user))
                },
                RouteOptions::default(),
            )
            .expect("route");
        router
            .add_route(
                &["/logout"],
                |ctx: &mut RequestContext| {
                    ctx.params.session.remove("user");
                    Ok(RouteResponse::text(StatusCode::OK, "out"))
                },
                RouteOptions::default(),
            )
            .expect("route");
        router
    }

    fn session_cookie(response: &http::Response<bytes::Bytes>) -> Option<String> {
        response
            .headers()
            .get(SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|cookie| cookie.split(';').next())
            .map(str::to_owned)
    }

    #[test]
    fn test_should_round_trip_session_through_cookie() {
        let router = session_router();

        let login = router.handle(get("/login/alice"));
        let cookie = session_cookie(&login).expect("session cookie");
        assert!(cookie.starts_with("WayrouteSessionID="));

        let whoami = router.handle(get_with("/whoami", "cookie", &cookie));
        assert_eq!(whoami.body().as_ref(), b"alice");
    }

    #[test]
    fn test_should_not_persist_session_without_data() {
        let router = session_router();
        let response = router.handle(get("/whoami"));
        assert_eq!(response.body().as_ref(), b"nobody");
        assert!(session_cookie(&response).is_none());
        assert!(router.sessions().is_empty());
    }

    #[test]
    fn test_should_drop_session_emptied_during_request() {
        let router = session_router();

        let login = router.handle(get("/login/alice"));
        let cookie = session_cookie(&login).expect("session cookie");
        assert_eq!(router.sessions().len(), 1);

        let logout = router.handle(get_with("/logout", "cookie", &cookie));
        assert!(router.sessions().is_empty());
        // The cookie is cleared so the client forgets the dead id.
        let cleared = session_cookie(&logout).expect("clearing cookie");
        assert_eq!(cleared, "WayrouteSessionID=");

        let whoami = router.handle(get_with("/whoami", "cookie", &cookie));
        assert_eq!(whoami.body().as_ref(), b"nobody");
    }

    #[test]
    fn test_should_ignore_unknown_session_ids() {
        let router = session_router();
        let response = router.handle(get_with(
            "/whoami",
            "cookie",
            "WayrouteSessionID=not-a-real-id",
        ));
        assert_eq!(response.body().as_ref(), b"nobody");
    }

    #[test]
    fn test_should_sweep_expired_sessions_in_background() {
        let router = session_router();
        let mut session = wayroute_core::Session::new();
        session.lifetime = Duration::ZERO;
        session.set("user", "ghost");
        router.sessions().save(&mut session);
        assert_eq!(router.sessions().len(), 1);

        let mut sweeper = wayroute_core::SessionSweeper::start(
            std::sync::Arc::clone(router.sessions()),
            Duration::from_millis(10),
        );
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while !router.sessions().is_empty() && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        sweeper.stop();
        assert!(router.sessions().is_empty());
    }
}
