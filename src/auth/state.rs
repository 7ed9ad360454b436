//! State traits the authentication extractors depend on.

use std::sync::Arc;

use crate::cache::CredentialCache;
use crate::db::Database;
use crate::jwt::JwtConfig;
use crate::secrets::SecretHasher;

/// State that can authenticate users: token verification plus user lookup.
pub trait HasAuthState {
    fn jwt(&self) -> &JwtConfig;
    fn db(&self) -> &Database;
}

/// State that can authenticate devices: credential cache, secret hasher, and
/// the backing store.
pub trait HasDeviceAuthState: HasAuthState {
    fn cache(&self) -> &Arc<dyn CredentialCache>;
    fn hasher(&self) -> &SecretHasher;
}
