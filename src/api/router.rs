use axum::{middleware, routing::get, Router};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use super::auth;
use super::health;
use super::middleware::logging_middleware;
use super::state::AppState;

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/auth", auth::create_auth_router())
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::api::middleware::SessionCookie;
    use crate::infrastructure::auth::{JwtConfig, JwtSessionCodec};
    use crate::infrastructure::user::{
        test_hasher, AuthService, InMemoryUserRepository, UsersService,
    };

    fn app() -> Router {
        let users = Arc::new(UsersService::new(Arc::new(InMemoryUserRepository::new())));
        let auth = Arc::new(AuthService::new(users.clone(), Arc::new(test_hasher())));
        let codec = Arc::new(JwtSessionCodec::new(JwtConfig::new("router-test", 1)).unwrap());

        create_router_with_state(AppState::new(users, auth, codec, SessionCookie::default()))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// `name=value` part of the response's Set-Cookie header
    fn session_cookie(response: &Response) -> String {
        response.headers()[header::SET_COOKIE]
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }

    async fn signup(app: &Router, email: &str, password: &str) -> Response {
        app.clone()
            .oneshot(json_request(
                "POST",
                "/auth/signup",
                json!({"email": email, "password": password}),
            ))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = app();

        let response = app.clone().oneshot(get_request("/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.clone().oneshot(get_request("/live", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get_request("/ready", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["storage"]["users"], 0);
    }

    #[tokio::test]
    async fn test_request_id_propagated() {
        let response = app().oneshot(get_request("/health", None)).await.unwrap();

        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_signup_sets_session_and_hides_password() {
        let app = app();

        let response = signup(&app, "john.doe@gmail.com", "tux111").await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let cookie = session_cookie(&response);
        let body = body_json(response).await;
        assert_eq!(body, json!({"id": 1, "email": "john.doe@gmail.com"}));

        let response = app
            .oneshot(get_request("/auth/whoami", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["email"], "john.doe@gmail.com");
    }

    #[tokio::test]
    async fn test_duplicate_signup_rejected() {
        let app = app();

        signup(&app, "john.doe@gmail.com", "tux111").await;
        let response = signup(&app, "john.doe@gmail.com", "other").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "duplicate_email");
    }

    #[tokio::test]
    async fn test_signin_flow() {
        let app = app();
        signup(&app, "john.doe@gmail.com", "tux111").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/auth/signin",
                json!({"email": "john.doe@gmail.com", "password": "wrong"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/auth/signin",
                json!({"email": "nobody@gmail.com", "password": "tux111"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(json_request(
                "POST",
                "/auth/signin",
                json!({"email": "john.doe@gmail.com", "password": "tux111"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(session_cookie(&response).starts_with("session="));
    }

    #[tokio::test]
    async fn test_whoami_requires_session() {
        let app = app();

        let response = app
            .clone()
            .oneshot(get_request("/auth/whoami", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .oneshot(get_request("/auth/whoami", Some("session=not-a-token")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_signout_clears_cookie() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/signout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_find_routes() {
        let app = app();
        signup(&app, "john.doe@gmail.com", "tux111").await;

        let response = app.clone().oneshot(get_request("/auth/1", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.clone().oneshot(get_request("/auth/2", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app.clone().oneshot(get_request("/auth/abc", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .clone()
            .oneshot(get_request("/auth?email=john.doe@gmail.com", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

        let response = app
            .oneshot(get_request("/auth?email=nobody@gmail.com", None))
            .await
            .unwrap();
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn test_find_without_email_uses_error_format() {
        let response = app().oneshot(get_request("/auth", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["type"], "invalid_request_error");
        assert_eq!(body["error"]["param"], "email");
    }

    #[tokio::test]
    async fn test_update_and_remove() {
        let app = app();
        signup(&app, "john.doe@gmail.com", "tux111").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                "/auth/1",
                json!({"email": "jane.doe@gmail.com"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["email"], "jane.doe@gmail.com");

        let delete = || {
            Request::builder()
                .method("DELETE")
                .uri("/auth/1")
                .body(Body::empty())
                .unwrap()
        };

        let response = app.clone().oneshot(delete()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(delete()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_format() {
        let response = app()
            .oneshot(json_request("POST", "/auth/signup", json!({"email": "a@b.com"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["error"]["code"], "json_parse_error");
    }
}
