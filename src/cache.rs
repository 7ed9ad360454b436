//! Credential cache for the device authentication hot path.
//!
//! Maps `device:{api_key}` to the full device record (including the secret
//! digest) so the common case skips the database. The cache is a performance
//! optimization only: correctness must hold with caching disabled, and the
//! device authenticator re-checks the store whenever a cached entry fails
//! verification or is marked inactive.
//!
//! Entries must be deleted synchronously on device deletion and overwritten
//! (not merely left to expire) on secret rotation.

use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;

use crate::db::Device;

/// Default entry TTL: 1 hour.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Build the cache key for a device: `device:{api_key}`.
/// Stable and collision-free because api_key is unique.
pub fn device_key(api_key: &str) -> String {
    format!("device:{}", api_key)
}

/// Narrow TTL key/value interface the device authenticator depends on.
/// All operations are best-effort: a failing or missing cache never fails
/// the request, it only costs a database round trip.
#[async_trait]
pub trait CredentialCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<Device>;
    async fn put(&self, key: &str, device: Device);
    async fn delete(&self, key: &str);
}

/// In-process TTL cache backed by moka. The TTL is fixed per cache instance
/// at construction.
pub struct MokaCredentialCache {
    cache: Cache<String, Device>,
}

impl MokaCredentialCache {
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(ttl)
            .build();
        Self { cache }
    }
}

#[async_trait]
impl CredentialCache for MokaCredentialCache {
    async fn get(&self, key: &str) -> Option<Device> {
        self.cache.get(key).await
    }

    async fn put(&self, key: &str, device: Device) {
        self.cache.insert(key.to_string(), device).await;
    }

    async fn delete(&self, key: &str) {
        self.cache.invalidate(key).await;
    }
}

/// Cache that stores nothing. Every authentication takes the database path;
/// used to verify correctness holds without the cache.
pub struct NoopCredentialCache;

#[async_trait]
impl CredentialCache for NoopCredentialCache {
    async fn get(&self, _key: &str) -> Option<Device> {
        None
    }

    async fn put(&self, _key: &str, _device: Device) {}

    async fn delete(&self, _key: &str) {}
}
