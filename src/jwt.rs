//! JWT token generation and validation.
//!
//! Access tokens carry `{sub, name, email, exp}` and no `type` claim.
//! Refresh tokens carry `{sub, type: "refresh", exp}`. A refresh token must
//! never pass access validation, and an access token must never pass refresh
//! validation.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::db::User;

/// Discriminator value carried by refresh tokens in the `type` claim.
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

/// Default access token duration: 1 hour. Overridable via `JwtConfig::new`.
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 60 * 60;

/// Refresh token duration: 7 days.
pub const REFRESH_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// JWT claims shared by access and refresh tokens.
///
/// Access tokens set `name`/`email` and leave `token_type` absent. Refresh
/// tokens set `token_type` to `"refresh"` and carry only the subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user UUID)
    pub sub: String,
    /// Display name (access tokens only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Email (access tokens only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Token type discriminator, `"refresh"` on refresh tokens, absent otherwise
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

impl Claims {
    pub fn is_refresh(&self) -> bool {
        self.token_type.as_deref() == Some(REFRESH_TOKEN_TYPE)
    }
}

/// Configuration for JWT operations.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl_secs: u64,
}

impl JwtConfig {
    /// Create a new JWT configuration with the given secret and access TTL.
    pub fn new(secret: &[u8], access_ttl_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_ttl_secs,
        }
    }

    /// Access token duration in seconds.
    pub fn access_ttl_secs(&self) -> u64 {
        self.access_ttl_secs
    }

    /// Generate a short-lived access token for a user.
    pub fn issue_access_token(&self, user: &User) -> Result<String, JwtError> {
        let now = unix_now()?;
        let claims = Claims {
            sub: user.uuid.clone(),
            name: user.name.clone(),
            email: Some(user.email.clone()),
            token_type: None,
            iat: now,
            exp: now + self.access_ttl_secs,
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(JwtError::Encoding)
    }

    /// Generate a long-lived refresh token for a user.
    pub fn issue_refresh_token(&self, user: &User) -> Result<String, JwtError> {
        let now = unix_now()?;
        let claims = Claims {
            sub: user.uuid.clone(),
            name: None,
            email: None,
            token_type: Some(REFRESH_TOKEN_TYPE.to_string()),
            iat: now,
            exp: now + REFRESH_TOKEN_TTL_SECS,
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(JwtError::Encoding)
    }

    /// Validate and decode an access token.
    /// Rejects refresh-typed tokens with `WrongTokenType`.
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = self.decode(token)?;
        if claims.is_refresh() {
            return Err(JwtError::WrongTokenType);
        }
        Ok(claims)
    }

    /// Validate and decode a refresh token.
    /// Rejects tokens without the `"refresh"` type claim with `WrongTokenType`.
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = self.decode(token)?;
        if !claims.is_refresh() {
            return Err(JwtError::WrongTokenType);
        }
        Ok(claims)
    }

    fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Decoding(e),
            })?;

        // exp == now counts as expired. The library accepts the boundary, so
        // re-check explicitly to keep the cutoff on one side.
        let now = unix_now()?;
        if token_data.claims.exp <= now {
            return Err(JwtError::Expired);
        }

        Ok(token_data.claims)
    }
}

fn unix_now() -> Result<u64, JwtError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| JwtError::TimeError)
}

/// Errors that can occur during JWT operations.
#[derive(Debug)]
pub enum JwtError {
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// Error decoding the token (malformed, bad signature)
    Decoding(jsonwebtoken::errors::Error),
    /// Token has expired
    Expired,
    /// System time error
    TimeError,
    /// Wrong token type (e.g., using a refresh token as an access token)
    WrongTokenType,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            JwtError::Decoding(e) => write!(f, "Failed to decode token: {}", e),
            JwtError::Expired => write!(f, "Token has expired"),
            JwtError::TimeError => write!(f, "System time error"),
            JwtError::WrongTokenType => write!(f, "Wrong token type"),
        }
    }
}

impl std::error::Error for JwtError {}
