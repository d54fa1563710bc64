//! In-process router tests: routing, sessions and the access policy.
//!
//! The pool connects lazily, so every request here must be answered before
//! a query would run.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use catalog_server::{
    api,
    config::AppConfig,
    models::user::{Group, Permission, UserClaims},
    AppState,
};

fn app() -> (Router, AppConfig) {
    let config = AppConfig::default();
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database.url)
        .unwrap();
    (api::router(AppState::new(config.clone(), pool)), config)
}

fn token(config: &AppConfig, is_superuser: bool, groups: Vec<Group>, permissions: Vec<Permission>) -> String {
    let now = chrono::Utc::now().timestamp();
    UserClaims {
        sub: "testuser".into(),
        user_id: 42,
        is_superuser,
        groups,
        permissions,
        exp: now + 3600,
        iat: now,
    }
    .create_token(&config.auth.jwt_secret)
    .unwrap()
}

fn request(method: Method, uri: &str, body: Option<Value>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(_) => builder.header(header::CONTENT_TYPE, "application/json"),
        None => builder,
    }
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn with_body(builder: axum::http::request::Builder, body: Option<Value>) -> Request<Body> {
    match body {
        Some(value) => builder.body(Body::from(value.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = app();
    let (status, body) = send(app, with_body(request(Method::GET, "/api/v1/health", None), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (app, _) = app();
    let (status, body) = send(app, with_body(request(Method::GET, "/api-docs/openapi.json", None), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/loans/issue"].is_object());
    assert!(body["components"]["securitySchemes"]["bearer_auth"].is_object());
}

#[tokio::test]
async fn test_anonymous_is_unauthenticated() {
    for (method, uri, body) in [
        (Method::GET, "/api/v1/loans/mine", None),
        (Method::GET, "/api/v1/auth/me", None),
        (Method::GET, "/api/v1/loans", None),
        (Method::GET, "/api/v1/members", None),
        (
            Method::POST,
            "/api/v1/loans/return",
            Some(json!({ "instance_id": uuid::Uuid::new_v4() })),
        ),
        (Method::DELETE, "/api/v1/books/1", None),
    ] {
        let (app, _) = app();
        let (status, body) = send(app, with_body(request(method, uri, body.clone()), body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body["error"], "NotAuthenticated");
    }
}

#[tokio::test]
async fn test_policy_is_checked_before_the_body() {
    let (_, config) = app();
    let member = token(&config, false, vec![], vec![]);

    for (bearer, expected, error) in [
        (None, StatusCode::UNAUTHORIZED, "NotAuthenticated"),
        (Some(&member), StatusCode::FORBIDDEN, "NotAuthorized"),
    ] {
        let (app, _) = app();
        let mut builder = request(Method::POST, "/api/v1/loans/return", Some(json!({})));
        if let Some(bearer) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", bearer));
        }
        let (status, body) = send(app, with_body(builder, Some(json!({})))).await;
        assert_eq!(status, expected);
        assert_eq!(body["error"], error);
    }
}

#[tokio::test]
async fn test_malformed_body_without_session_is_unauthenticated() {
    let (app, _) = app();
    let req = request(Method::POST, "/api/v1/genres", None)
        .body(Body::from("not json"))
        .unwrap();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NotAuthenticated");
}

#[tokio::test]
async fn test_invalid_token_counts_as_anonymous() {
    let (app, _) = app();
    let req = request(Method::GET, "/api/v1/loans/mine", None)
        .header(header::AUTHORIZATION, "Bearer not-a-token")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_member_without_permission_is_forbidden() {
    let (_, config) = app();
    let member = token(&config, false, vec![], vec![]);
    let renew_uri = format!("/api/v1/instances/{}/renew", uuid::Uuid::new_v4());

    for (method, uri, body) in [
        (Method::GET, "/api/v1/loans", None),
        (Method::GET, "/api/v1/loans/issue", None),
        (
            Method::POST,
            "/api/v1/loans/issue",
            Some(json!({ "user_id": 1, "instance_id": uuid::Uuid::new_v4() })),
        ),
        (
            Method::POST,
            renew_uri.as_str(),
            Some(json!({ "renewal_date": "2030-01-01" })),
        ),
        (Method::GET, "/api/v1/members", None),
        (
            Method::POST,
            "/api/v1/instances",
            Some(json!({ "book_id": 1, "imprint": "Sample Imprint" })),
        ),
        (Method::POST, "/api/v1/genres", Some(json!({ "name": "Fiction" }))),
        (Method::DELETE, "/api/v1/authors/1", None),
        (
            Method::PUT,
            "/api/v1/users/1/access",
            Some(json!({ "is_superuser": true })),
        ),
    ] {
        let (app, _) = app();
        let req = with_body(
            request(method, uri, body.clone()).header(header::AUTHORIZATION, format!("Bearer {}", member)),
            body,
        );
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
        assert_eq!(body["error"], "NotAuthorized");
    }
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let (app, config) = app();
    let member = token(&config, false, vec![Group::Librarian], vec![Permission::CanMarkReturned]);

    // Librarians create copies but do not manage members
    let req = request(Method::GET, "/api/v1/members", None)
        .header(header::COOKIE, format!("{}={}", config.auth.cookie_name, member))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Permission 'can_manage_members' required");
}

#[tokio::test]
async fn test_access_change_requires_superuser() {
    let (_, config) = app();
    let staff = token(&config, false, vec![Group::Librarian], Permission::ALL.to_vec());

    let (app, _) = app();
    let body = json!({ "is_superuser": false, "permissions": ["add_book"] });
    let req = with_body(
        request(Method::PUT, "/api/v1/users/3/access", Some(body.clone()))
            .header(header::AUTHORIZATION, format!("Bearer {}", staff)),
        Some(body),
    );
    let (status, _) = send(app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let (app, config) = app();
    let response = app
        .oneshot(
            request(Method::POST, "/api/v1/auth/logout", None)
                .header(header::COOKIE, format!("{}=stale", config.auth.cookie_name))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(set_cookie.starts_with(&format!("{}=", config.auth.cookie_name)));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_unknown_route() {
    let (app, _) = app();
    let (status, _) = send(app, with_body(request(Method::GET, "/api/v1/nope", None), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
