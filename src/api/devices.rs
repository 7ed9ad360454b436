//! Device management endpoints (owner-only).
//!
//! - POST `/` - Register a device; returns the plaintext secret exactly once
//! - GET `/` - List the owner's devices
//! - PATCH `/{uuid}` - Rename
//! - PATCH `/{uuid}/status` - Enable/disable; evicts the cached credentials
//! - POST `/{uuid}/rotate` - Issue a new secret; overwrites the cache entry
//! - DELETE `/{uuid}` - Delete; evicts the cached credentials synchronously

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ResultExt};
use crate::AppState;
use crate::auth::UserAuth;
use crate::cache::device_key;
use crate::db::Device;
use crate::secrets::{generate_api_key, generate_api_secret};

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 50;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(create_device).get(list_devices))
        .route("/{uuid}", patch(rename_device).delete(delete_device))
        .route("/{uuid}/status", patch(set_device_status))
        .route("/{uuid}/rotate", post(rotate_device_secret))
        .with_state(state)
}

/// Public projection of a device. The secret digest stays in the store.
#[derive(Serialize)]
struct DeviceResponse {
    device_id: String,
    name: String,
    api_key: String,
    is_active: bool,
    created_at: String,
    updated_at: String,
    last_seen: Option<String>,
}

impl From<&Device> for DeviceResponse {
    fn from(device: &Device) -> Self {
        Self {
            device_id: device.uuid.clone(),
            name: device.name.clone(),
            api_key: device.api_key.clone(),
            is_active: device.is_active,
            created_at: device.created_at.clone(),
            updated_at: device.updated_at.clone(),
            last_seen: device.last_seen.clone(),
        }
    }
}

fn validate_name(name: &str) -> Result<&str, ApiError> {
    let name = name.trim();
    if name.len() < NAME_MIN {
        return Err(ApiError::bad_request(
            "Name must be at least 2 characters",
        ));
    }
    if name.len() > NAME_MAX {
        return Err(ApiError::bad_request("Name must be at most 50 characters"));
    }
    Ok(name)
}

#[derive(Deserialize)]
struct CreateDeviceRequest {
    name: String,
}

/// Device plus the plaintext secret, returned only at creation and rotation.
#[derive(Serialize)]
struct CreatedDeviceResponse {
    #[serde(flatten)]
    device: DeviceResponse,
    api_secret: String,
}

async fn create_device(
    State(state): State<AppState>,
    UserAuth(auth): UserAuth,
    Json(payload): Json<CreateDeviceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = validate_name(&payload.name)?;

    let api_key = generate_api_key();
    let api_secret = generate_api_secret();
    let api_secret_hash = state
        .hasher
        .hash(&api_secret)
        .map_err(|e| ApiError::db_error("Failed to hash device secret", e))?;

    let uuid = uuid::Uuid::new_v4().to_string();

    state
        .db
        .devices()
        .create(&uuid, name, auth.user.id, &api_key, &api_secret_hash)
        .await
        .db_err("Failed to create device")?;

    let device = state
        .db
        .devices()
        .get_by_uuid(&uuid)
        .await
        .db_err("Failed to load created device")?
        .ok_or_else(|| ApiError::internal("Device not found after creation"))?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "device": CreatedDeviceResponse {
                device: DeviceResponse::from(&device),
                api_secret,
            }
        })),
    ))
}

#[derive(Serialize)]
struct ListDevicesResponse {
    devices: Vec<DeviceResponse>,
}

async fn list_devices(
    State(state): State<AppState>,
    UserAuth(auth): UserAuth,
) -> Result<impl IntoResponse, ApiError> {
    let devices = state
        .db
        .devices()
        .list_by_user(auth.user.id)
        .await
        .db_err("Failed to list devices")?;

    Ok((
        StatusCode::OK,
        Json(ListDevicesResponse {
            devices: devices.iter().map(DeviceResponse::from).collect(),
        }),
    ))
}

#[derive(Deserialize)]
struct RenameDeviceRequest {
    name: String,
}

async fn rename_device(
    State(state): State<AppState>,
    UserAuth(auth): UserAuth,
    Path(uuid): Path<String>,
    Json(payload): Json<RenameDeviceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = validate_name(&payload.name)?;

    let renamed = state
        .db
        .devices()
        .rename(&uuid, auth.user.id, name)
        .await
        .db_err("Failed to rename device")?;

    if !renamed {
        return Err(ApiError::not_found("Device not found"));
    }

    let device = state
        .db
        .devices()
        .get_by_uuid(&uuid)
        .await
        .db_err("Failed to load device")?
        .ok_or_else(|| ApiError::not_found("Device not found"))?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "device": DeviceResponse::from(&device) })),
    ))
}

#[derive(Deserialize)]
struct DeviceStatusRequest {
    is_active: bool,
}

async fn set_device_status(
    State(state): State<AppState>,
    UserAuth(auth): UserAuth,
    Path(uuid): Path<String>,
    Json(payload): Json<DeviceStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let device = state
        .db
        .devices()
        .get_by_uuid(&uuid)
        .await
        .db_err("Failed to load device")?
        .filter(|d| d.user_id == auth.user.id)
        .ok_or_else(|| ApiError::not_found("Device not found"))?;

    state
        .db
        .devices()
        .set_active(&uuid, auth.user.id, payload.is_active)
        .await
        .db_err("Failed to update device status")?;

    // Evict the cached credentials so the flag takes effect immediately
    // instead of after the cache TTL.
    state.cache.delete(&device_key(&device.api_key)).await;

    let device = state
        .db
        .devices()
        .get_by_uuid(&uuid)
        .await
        .db_err("Failed to load device")?
        .ok_or_else(|| ApiError::not_found("Device not found"))?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "device": DeviceResponse::from(&device) })),
    ))
}

/// Explicit secret rotation with the new plaintext returned to the owner.
/// There is deliberately no bulk re-hash path: regenerating secrets without
/// the owner seeing the new plaintext would brick every deployed sensor.
async fn rotate_device_secret(
    State(state): State<AppState>,
    UserAuth(auth): UserAuth,
    Path(uuid): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let device = state
        .db
        .devices()
        .get_by_uuid(&uuid)
        .await
        .db_err("Failed to load device")?
        .filter(|d| d.user_id == auth.user.id)
        .ok_or_else(|| ApiError::not_found("Device not found"))?;

    let api_secret = generate_api_secret();
    let api_secret_hash = state
        .hasher
        .hash(&api_secret)
        .map_err(|e| ApiError::db_error("Failed to hash device secret", e))?;

    state
        .db
        .devices()
        .update_secret(&uuid, auth.user.id, &api_secret_hash)
        .await
        .db_err("Failed to rotate device secret")?;

    let updated = state
        .db
        .devices()
        .get_by_uuid(&uuid)
        .await
        .db_err("Failed to load device")?
        .ok_or_else(|| ApiError::not_found("Device not found"))?;

    // Overwrite the cached entry rather than waiting for expiry; the old
    // digest must stop verifying immediately.
    state
        .cache
        .put(&device_key(&device.api_key), updated.clone())
        .await;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "device": CreatedDeviceResponse {
                device: DeviceResponse::from(&updated),
                api_secret,
            }
        })),
    ))
}

#[derive(Serialize)]
struct DeleteDeviceResponse {
    message: &'static str,
}

async fn delete_device(
    State(state): State<AppState>,
    UserAuth(auth): UserAuth,
    Path(uuid): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let device = state
        .db
        .devices()
        .get_by_uuid(&uuid)
        .await
        .db_err("Failed to load device")?
        .filter(|d| d.user_id == auth.user.id)
        .ok_or_else(|| ApiError::not_found("Device not found"))?;

    let deleted = state
        .db
        .devices()
        .delete(&uuid, auth.user.id)
        .await
        .db_err("Failed to delete device")?;

    if !deleted {
        return Err(ApiError::not_found("Device not found"));
    }

    // Synchronous eviction; a cached copy must not outlive the device.
    state.cache.delete(&device_key(&device.api_key)).await;

    Ok((
        StatusCode::OK,
        Json(DeleteDeviceResponse {
            message: "Device deleted successfully",
        }),
    ))
}
