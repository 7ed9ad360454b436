//! User authenticator for bearer-token protected endpoints.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use super::cookie::{ACCESS_COOKIE_NAME, get_cookie};
use super::errors::AuthError;
use super::state::HasAuthState;
use crate::db::User;
use crate::jwt::{Claims, JwtError};

/// Verified principal attached to the request by `UserAuth`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Claims from the validated access token
    pub claims: Claims,
    /// The resolved user row
    pub user: User,
}

/// Pull the access token from the Authorization header, falling back to the
/// session cookie for browser clients. Header takes precedence.
pub fn bearer_or_cookie_token(parts: &Parts) -> Option<String> {
    if let Some(value) = parts.headers.get(header::AUTHORIZATION) {
        if let Ok(value) = value.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }
    get_cookie(&parts.headers, ACCESS_COOKIE_NAME).map(|t| t.to_string())
}

/// Extractor for endpoints that require a logged-in user.
///
/// Verifies the access token, rejects refresh-typed tokens, and resolves the
/// subject against the user store.
pub struct UserAuth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for UserAuth
where
    S: HasAuthState + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_or_cookie_token(parts).ok_or(AuthError::MissingAuth)?;

        let claims = state
            .jwt()
            .validate_access_token(&token)
            .map_err(|e| match e {
                JwtError::WrongTokenType => AuthError::WrongTokenType,
                _ => AuthError::InvalidToken,
            })?;

        let user = state
            .db()
            .users()
            .get_by_uuid(&claims.sub)
            .await
            .map_err(|e| {
                tracing::error!("Failed to look up user: {}", e);
                AuthError::StorageError
            })?
            .ok_or(AuthError::UserNotFound)?;

        Ok(UserAuth(AuthenticatedUser { claims, user }))
    }
}
