//! Credential hashing and API key/secret generation.
//!
//! Two digest strategies exist for device secrets:
//!
//! - `Adaptive`: bcrypt with cost factor 10. Slow on purpose; suitable for
//!   login-frequency checks but measured at 50-100ms per verification, which
//!   blows the per-request budget on the ingestion path.
//! - `FixedCost`: SHA-256 over `salt || secret` with a static application
//!   salt, hex-encoded. 1-2ms per verification. Only acceptable because
//!   device secrets are 32 random bytes and rotatable per device.
//!
//! The device path defaults to `FixedCost`; user passwords always use bcrypt.
//! The strategy is chosen once at startup and never inferred from digest
//! shape.

use sha2::{Digest, Sha256};

/// bcrypt cost factor for adaptive hashing.
const BCRYPT_COST: u32 = 10;

/// Length of a generated API key in bytes (hex-encoded to 32 chars).
const API_KEY_BYTES: usize = 16;

/// Length of a generated API secret in bytes (hex-encoded to 64 chars).
const API_SECRET_BYTES: usize = 32;

/// Digest strategy for device secrets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum HashStrategy {
    /// bcrypt, cost 10. Slow, brute-force resistant.
    Adaptive,
    /// Salted SHA-256 with a static application salt. Fast, fixed cost.
    #[default]
    FixedCost,
}

/// Hashes and verifies device secrets under the configured strategy.
#[derive(Clone)]
pub struct SecretHasher {
    strategy: HashStrategy,
    salt: String,
}

impl SecretHasher {
    pub fn new(strategy: HashStrategy, salt: impl Into<String>) -> Self {
        Self {
            strategy,
            salt: salt.into(),
        }
    }

    pub fn strategy(&self) -> HashStrategy {
        self.strategy
    }

    /// Hash a plaintext secret into a digest. The two strategies produce
    /// mutually incompatible digest formats.
    pub fn hash(&self, secret: &str) -> Result<String, HashError> {
        match self.strategy {
            HashStrategy::Adaptive => {
                bcrypt::hash(secret, BCRYPT_COST).map_err(HashError::Bcrypt)
            }
            HashStrategy::FixedCost => Ok(self.sha256_digest(secret)),
        }
    }

    /// Verify a plaintext secret against a digest.
    /// Any digest parse failure counts as a mismatch.
    pub fn verify(&self, secret: &str, digest: &str) -> bool {
        match self.strategy {
            HashStrategy::Adaptive => bcrypt::verify(secret, digest).unwrap_or(false),
            HashStrategy::FixedCost => self.sha256_digest(secret) == digest,
        }
    }

    fn sha256_digest(&self, secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.salt.as_bytes());
        hasher.update(secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Hash a user password. Always bcrypt, regardless of the device strategy.
pub fn hash_password(password: &str) -> Result<String, HashError> {
    bcrypt::hash(password, BCRYPT_COST).map_err(HashError::Bcrypt)
}

/// Verify a user password against its bcrypt digest.
pub fn verify_password(password: &str, digest: &str) -> bool {
    bcrypt::verify(password, digest).unwrap_or(false)
}

/// Generate a new API key: 16 random bytes, hex-encoded.
pub fn generate_api_key() -> String {
    random_hex(API_KEY_BYTES)
}

/// Generate a new API secret: 32 random bytes, hex-encoded.
/// Returned to the owner exactly once, at creation or rotation.
pub fn generate_api_secret() -> String {
    random_hex(API_SECRET_BYTES)
}

fn random_hex(len: usize) -> String {
    use rand::RngCore;
    let mut bytes = vec![0u8; len];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Errors that can occur while hashing credentials.
#[derive(Debug)]
pub enum HashError {
    Bcrypt(bcrypt::BcryptError),
}

impl std::fmt::Display for HashError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashError::Bcrypt(e) => write!(f, "Failed to hash secret: {}", e),
        }
    }
}

impl std::error::Error for HashError {}
