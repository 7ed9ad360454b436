pub mod api;
pub mod auth;
pub mod cache;
pub mod cli;
pub mod db;
pub mod jwt;
pub mod secrets;

use std::sync::Arc;
use std::time::Duration;

use api::create_api_router;
use auth::{HasAuthState, HasDeviceAuthState};
use axum::{Router, routing::get};
use cache::{CredentialCache, MokaCredentialCache};
use db::Database;
use jwt::JwtConfig;
use secrets::{HashStrategy, SecretHasher};
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// JWT secret for signing tokens
    pub jwt_secret: Vec<u8>,
    /// Access token lifetime in seconds
    pub access_ttl_secs: u64,
    /// Digest strategy for device secrets
    pub device_hash_strategy: HashStrategy,
    /// Static application salt for the fixed-cost digest
    pub secret_salt: String,
    /// Credential cache entry TTL in seconds; 0 disables the cache
    pub cache_ttl_secs: u64,
    /// Whether to set the Secure flag on session cookies
    pub secure_cookies: bool,
}

/// Shared application state. Clients are constructed once at app build time
/// and shared across requests; request handling owns no other mutable state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub cache: Arc<dyn CredentialCache>,
    pub hasher: Arc<SecretHasher>,
    pub secure_cookies: bool,
}

impl HasAuthState for AppState {
    fn jwt(&self) -> &JwtConfig {
        &self.jwt
    }

    fn db(&self) -> &Database {
        &self.db
    }
}

impl HasDeviceAuthState for AppState {
    fn cache(&self) -> &Arc<dyn CredentialCache> {
        &self.cache
    }

    fn hasher(&self) -> &SecretHasher {
        &self.hasher
    }
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let jwt = Arc::new(JwtConfig::new(&config.jwt_secret, config.access_ttl_secs));

    let cache: Arc<dyn CredentialCache> = if config.cache_ttl_secs == 0 {
        Arc::new(cache::NoopCredentialCache)
    } else {
        Arc::new(MokaCredentialCache::new(Duration::from_secs(
            config.cache_ttl_secs,
        )))
    };

    let hasher = Arc::new(SecretHasher::new(
        config.device_hash_strategy,
        config.secret_salt.clone(),
    ));

    let state = AppState {
        db: config.db.clone(),
        jwt,
        cache,
        hasher,
        secure_cookies: config.secure_cookies,
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api", create_api_router(state))
}

/// Run the server on the given listener. This function blocks until the
/// server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    axum::serve(listener, app).await
}
