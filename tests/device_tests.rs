mod common;

use axum::http::StatusCode;
use common::{
    authed_json_request, authed_request, body_json, create_device, reading_request,
    register_and_login, send, test_app,
};

#[tokio::test]
async fn test_create_device_returns_secret_once() {
    let app = test_app().await;
    let (token, _) = register_and_login(&app, "alice@example.com").await;

    let response = send(
        &app,
        authed_json_request(
            "POST",
            "/api/devices",
            &token,
            serde_json::json!({ "name": "Living Room" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let device = &json["device"];

    assert_eq!(device["name"], "Living Room");
    assert_eq!(device["is_active"], true);
    assert_eq!(device["api_key"].as_str().unwrap().len(), 32);
    assert_eq!(device["api_secret"].as_str().unwrap().len(), 64);
    assert!(device.get("api_secret_hash").is_none());

    // The list view never shows the secret again
    let response = send(&app, authed_request("GET", "/api/devices", &token)).await;
    let json = body_json(response).await;
    assert!(json["devices"][0].get("api_secret").is_none());
}

#[tokio::test]
async fn test_create_device_name_too_short() {
    let app = test_app().await;
    let (token, _) = register_and_login(&app, "alice@example.com").await;

    let response = send(
        &app,
        authed_json_request(
            "POST",
            "/api/devices",
            &token,
            serde_json::json!({ "name": "x" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Name must be at least 2 characters");
}

#[tokio::test]
async fn test_create_device_name_too_long() {
    let app = test_app().await;
    let (token, _) = register_and_login(&app, "alice@example.com").await;

    let response = send(
        &app,
        authed_json_request(
            "POST",
            "/api/devices",
            &token,
            serde_json::json!({ "name": "x".repeat(51) }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_devices_scoped_to_owner() {
    let app = test_app().await;
    let (alice, _) = register_and_login(&app, "alice@example.com").await;
    let (bob, _) = register_and_login(&app, "bob@example.com").await;

    create_device(&app, &alice, "Alice Sensor").await;

    let response = send(&app, authed_request("GET", "/api/devices", &bob)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["devices"].as_array().unwrap().len(), 0);

    let response = send(&app, authed_request("GET", "/api/devices", &alice)).await;
    let json = body_json(response).await;
    assert_eq!(json["devices"].as_array().unwrap().len(), 1);
    assert_eq!(json["devices"][0]["name"], "Alice Sensor");
}

#[tokio::test]
async fn test_rename_device() {
    let app = test_app().await;
    let (token, _) = register_and_login(&app, "alice@example.com").await;
    let device = create_device(&app, &token, "Old Name").await;

    let response = send(
        &app,
        authed_json_request(
            "PATCH",
            &format!("/api/devices/{}", device.device_id),
            &token,
            serde_json::json!({ "name": "New Name" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["device"]["name"], "New Name");
}

#[tokio::test]
async fn test_rename_foreign_device_not_found() {
    let app = test_app().await;
    let (alice, _) = register_and_login(&app, "alice@example.com").await;
    let (bob, _) = register_and_login(&app, "bob@example.com").await;
    let device = create_device(&app, &alice, "Alice Sensor").await;

    let response = send(
        &app,
        authed_json_request(
            "PATCH",
            &format!("/api/devices/{}", device.device_id),
            &bob,
            serde_json::json!({ "name": "Hijacked" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Device not found");
}

#[tokio::test]
async fn test_deactivate_takes_effect_immediately() {
    let app = test_app().await;
    let (token, _) = register_and_login(&app, "alice@example.com").await;
    let device = create_device(&app, &token, "Living Room").await;

    // Warm the credential cache with a successful ingest
    let response = send(
        &app,
        reading_request(&device.api_key, &device.api_secret, 21.5, 45.0),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Disable the device; the cached entry must not keep it alive
    let response = send(
        &app,
        authed_json_request(
            "PATCH",
            &format!("/api/devices/{}/status", device.device_id),
            &token,
            serde_json::json!({ "is_active": false }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["device"]["is_active"], false);

    let response = send(
        &app,
        reading_request(&device.api_key, &device.api_secret, 21.5, 45.0),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Device is inactive");

    // Re-enable and the same credentials work again
    let response = send(
        &app,
        authed_json_request(
            "PATCH",
            &format!("/api/devices/{}/status", device.device_id),
            &token,
            serde_json::json!({ "is_active": true }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        reading_request(&device.api_key, &device.api_secret, 21.5, 45.0),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_rotate_secret_invalidates_old_secret() {
    let app = test_app().await;
    let (token, _) = register_and_login(&app, "alice@example.com").await;
    let device = create_device(&app, &token, "Living Room").await;

    // Warm the cache with the old secret
    let response = send(
        &app,
        reading_request(&device.api_key, &device.api_secret, 20.0, 50.0),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(
        &app,
        authed_request(
            "POST",
            &format!("/api/devices/{}/rotate", device.device_id),
            &token,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let new_secret = json["device"]["api_secret"].as_str().unwrap().to_string();
    assert_ne!(new_secret, device.api_secret);

    // Old secret stops working even though it was cached
    let response = send(
        &app,
        reading_request(&device.api_key, &device.api_secret, 20.0, 50.0),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        &app,
        reading_request(&device.api_key, &new_secret, 20.0, 50.0),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_delete_device() {
    let app = test_app().await;
    let (token, _) = register_and_login(&app, "alice@example.com").await;
    let device = create_device(&app, &token, "Living Room").await;

    // Warm the cache so deletion has a cached entry to evict
    let response = send(
        &app,
        reading_request(&device.api_key, &device.api_secret, 20.0, 50.0),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(
        &app,
        authed_request(
            "DELETE",
            &format!("/api/devices/{}", device.device_id),
            &token,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Device deleted successfully");

    // Deleted credentials must fail immediately, not after cache expiry
    let response = send(
        &app,
        reading_request(&device.api_key, &device.api_secret, 20.0, 50.0),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Second delete is a 404
    let response = send(
        &app,
        authed_request(
            "DELETE",
            &format!("/api/devices/{}", device.device_id),
            &token,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_foreign_device_not_found() {
    let app = test_app().await;
    let (alice, _) = register_and_login(&app, "alice@example.com").await;
    let (bob, _) = register_and_login(&app, "bob@example.com").await;
    let device = create_device(&app, &alice, "Alice Sensor").await;

    let response = send(
        &app,
        authed_request("DELETE", &format!("/api/devices/{}", device.device_id), &bob),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Still there for the owner
    let response = send(&app, authed_request("GET", "/api/devices", &alice)).await;
    let json = body_json(response).await;
    assert_eq!(json["devices"].as_array().unwrap().len(), 1);
}
