#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode},
};
use sensorium::{ServerConfig, create_app, db::Database, secrets::HashStrategy};
use tower::ServiceExt;

/// Build an app backed by an in-memory database with the default
/// fixed-cost device hashing and the credential cache enabled.
pub async fn test_app() -> Router {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let config = ServerConfig {
        db,
        jwt_secret: b"test-jwt-secret-long-enough-for-hs256".to_vec(),
        access_ttl_secs: 3600,
        device_hash_strategy: HashStrategy::FixedCost,
        secret_salt: "test-salt".to_string(),
        cache_ttl_secs: 3600,
        secure_cookies: false,
    };
    create_app(&config)
}

/// Same app with the credential cache disabled, to exercise the store path.
pub async fn test_app_no_cache() -> Router {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let config = ServerConfig {
        db,
        jwt_secret: b"test-jwt-secret-long-enough-for-hs256".to_vec(),
        access_ttl_secs: 3600,
        device_hash_strategy: HashStrategy::FixedCost,
        secret_salt: "test-salt".to_string(),
        cache_ttl_secs: 0,
        secure_cookies: false,
    };
    create_app(&config)
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&body).expect("Body was not JSON")
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.expect("Request failed")
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

pub fn authed_json_request(
    method: &str,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

pub fn authed_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .expect("Failed to build request")
}

/// Register a user and log in. Returns (access_token, refresh_token).
pub async fn register_and_login(app: &Router, email: &str) -> (String, String) {
    let response = send(
        app,
        json_request(
            "POST",
            "/api/auth/register",
            serde_json::json!({
                "email": email,
                "password": "correct-horse-battery",
                "name": "Test User",
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(
        app,
        json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({
                "email": email,
                "password": "correct-horse-battery",
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let token = json["token"].as_str().expect("Missing token").to_string();
    let refresh = json["refreshToken"]
        .as_str()
        .expect("Missing refreshToken")
        .to_string();
    (token, refresh)
}

pub struct TestDevice {
    pub device_id: String,
    pub api_key: String,
    pub api_secret: String,
}

/// Create a device for the authenticated user. The secret in the response
/// is the only time the plaintext is available.
pub async fn create_device(app: &Router, token: &str, name: &str) -> TestDevice {
    let response = send(
        app,
        authed_json_request(
            "POST",
            "/api/devices",
            token,
            serde_json::json!({ "name": name }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let device = &json["device"];
    TestDevice {
        device_id: device["device_id"]
            .as_str()
            .expect("Missing device_id")
            .to_string(),
        api_key: device["api_key"]
            .as_str()
            .expect("Missing api_key")
            .to_string(),
        api_secret: device["api_secret"]
            .as_str()
            .expect("Missing api_secret")
            .to_string(),
    }
}

/// Submit one reading with device credentials.
pub fn reading_request(
    api_key: &str,
    api_secret: &str,
    temperature: f64,
    humidity: f64,
) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/data")
        .header("content-type", "application/json")
        .header("x-api-key", api_key)
        .header("x-api-secret", api_secret)
        .body(Body::from(
            serde_json::json!({ "temperature": temperature, "humidity": humidity }).to_string(),
        ))
        .expect("Failed to build request")
}
