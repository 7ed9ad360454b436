//! Device authenticator: the gate for ingestion endpoints.
//!
//! Two-tier credential lookup. The cache fast path serves repeat senders
//! without a database round trip; any cache miss, digest mismatch, or
//! inactive flag falls through to the authoritative store so stale entries
//! can never keep a rotated or disabled device alive.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::errors::AuthError;
use super::state::HasDeviceAuthState;
use crate::cache::device_key;
use crate::db::Device;

/// Header carrying the public API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Header carrying the plaintext API secret.
pub const API_SECRET_HEADER: &str = "x-api-secret";

/// Extractor for device-facing endpoints. On success the verified device is
/// attached to the request.
pub struct DeviceAuth(pub Device);

impl<S> FromRequestParts<S> for DeviceAuth
where
    S: HasDeviceAuthState + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let api_key = header_value(parts, API_KEY_HEADER);
        let api_secret = header_value(parts, API_SECRET_HEADER);

        let (api_key, api_secret) = match (api_key, api_secret) {
            (Some(key), Some(secret)) => (key, secret),
            _ => return Err(AuthError::MissingCredentials),
        };

        let key = device_key(&api_key);

        // Fast path: cached record with a matching digest and active flag.
        // A failing entry is stale (rotated secret or toggled flag), so fall
        // through to the store instead of rejecting.
        if let Some(cached) = state.cache().get(&key).await {
            if cached.is_active && state.hasher().verify(&api_secret, &cached.api_secret_hash) {
                return Ok(DeviceAuth(cached));
            }
            tracing::debug!(api_key = %api_key, "Stale cache entry, re-checking store");
        }

        // Authoritative path. Lookup is by api_key only; secrets are never
        // queryable since the store holds digests.
        let device = state
            .db()
            .devices()
            .get_by_api_key(&api_key)
            .await
            .map_err(|e| {
                tracing::error!("Failed to look up device: {}", e);
                AuthError::StorageError
            })?
            .ok_or(AuthError::InvalidCredentials)?;

        if !state.hasher().verify(&api_secret, &device.api_secret_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        if !device.is_active {
            return Err(AuthError::DeviceInactive);
        }

        // Cache write on the store path only; the fast path never rewrites.
        state.cache().put(&key, device.clone()).await;

        Ok(DeviceAuth(device))
    }
}

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
