/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - In-memory test database wired into the full router
/// - Multipart signup body construction
/// - Authenticated request builders
/// - Response envelope parsing and assertions

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::Service as _;

use trackle_api::app::{build_router, AppState};
use trackle_api::avatar::MemoryAvatarHost;
use trackle_api::config::{ApiConfig, AvatarConfig, Config, DatabaseConfig, JwtConfig};
use trackle_shared::db::run_migrations;

pub const TEST_JWT_SECRET: &str = "integration-tests-secret-key-0123456789";

pub const MULTIPART_BOUNDARY: &str = "trackle-test-boundary";

/// Test context containing the database handle and the full router
pub struct TestContext {
    pub db: SqlitePool,
    pub app: Router,
}

impl TestContext {
    /// Creates a new test context with a fresh in-memory database
    pub async fn new() -> Self {
        Self::build(MemoryAvatarHost::new()).await
    }

    /// Context whose avatar host rejects every upload
    pub async fn with_failing_avatars() -> Self {
        Self::build(MemoryAvatarHost::failing()).await
    }

    async fn build(avatars: MemoryAvatarHost) -> Self {
        // A single connection keeps the in-memory database alive for the
        // whole test; a second connection would see an empty schema.
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        run_migrations(&db).await.unwrap();

        let state = AppState::new(db.clone(), test_config(), Arc::new(avatars));
        let app = build_router(state);

        TestContext { db, app }
    }

    /// Drives one request through the router
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().call(request).await.unwrap()
    }
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            production: false,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_ttl_hours: 24,
            refresh_ttl_days: 30,
        },
        avatar: AvatarConfig {
            upload_url: None,
            dir: "./uploads".to_string(),
        },
    }
}

/// Builds a multipart form body by hand, one part per field, plus an
/// optional avatar file part. Omitting fields is how the validation
/// tests poke holes in the form.
pub fn multipart_body(fields: &[(&str, &str)], avatar: bool) -> Body {
    let mut body = String::new();

    for (name, value) in fields {
        body.push_str(&format!(
            "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }

    if avatar {
        body.push_str(&format!(
            "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"avatar\"; filename=\"avatar.png\"\r\nContent-Type: image/png\r\n\r\nnot-really-a-png\r\n"
        ));
    }

    body.push_str(&format!("--{MULTIPART_BOUNDARY}--\r\n"));
    Body::from(body)
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}")
}

/// Full signup request with every field present and an avatar attached
pub fn signup_request(name: &str, email: &str, password: &str, country: &str) -> Request<Body> {
    let fields = [
        ("name", name),
        ("email", email),
        ("password", password),
        ("country", country),
    ];

    Request::builder()
        .method("POST")
        .uri("/api/users/signup")
        .header("content-type", multipart_content_type())
        .body(multipart_body(&fields, true))
        .unwrap()
}

/// JSON request with an optional bearer token
pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    payload: &serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }

    builder.body(Body::from(payload.to_string())).unwrap()
}

/// Bodyless request with an optional bearer token
pub fn bare_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }

    builder.body(Body::empty()).unwrap()
}

/// Parses the response body as JSON
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Asserts the shared `{statusCode, data, message, success}` envelope
pub fn assert_envelope(body: &serde_json::Value, status: u16) {
    assert_eq!(body["statusCode"], status);
    assert_eq!(body["success"], status < 400);
    assert!(body["message"].is_string(), "message missing: {body}");
    assert!(
        body.get("data").is_some(),
        "data field missing: {body}"
    );
}

/// Registers a user through the API and returns (response body, access token)
pub async fn signup_user(ctx: &TestContext, name: &str, email: &str) -> (serde_json::Value, String) {
    let response = ctx
        .send(signup_request(name, email, "password123", "Norway"))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    let token = body["data"]["accessToken"].as_str().unwrap().to_string();

    (body, token)
}

/// Creates a project through the API and returns the response body
pub async fn create_project(ctx: &TestContext, token: &str, title: &str) -> serde_json::Value {
    let response = ctx
        .send(json_request(
            "POST",
            "/api/projects",
            Some(token),
            &json!({ "title": title }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    body_json(response).await
}

/// Creates a task under a project through the API and returns the response body
pub async fn create_task(
    ctx: &TestContext,
    token: &str,
    project_id: &str,
    title: &str,
) -> serde_json::Value {
    let response = ctx
        .send(json_request(
            "POST",
            &format!("/api/tasks/projects/{project_id}/tasks"),
            Some(token),
            &json!({ "title": title }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    body_json(response).await
}
