//! Authentication error taxonomy.
//!
//! Every failure is terminal for the request and surfaces as a 401/403/500
//! JSON body. Token verification failures share one generic message; callers
//! are not told why a token was rejected.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    /// X-API-Key or X-API-Secret header absent
    MissingCredentials,
    /// Unknown API key or secret mismatch
    InvalidCredentials,
    /// Credentials valid but the device is disabled
    DeviceInactive,
    /// No bearer token in header or cookie
    MissingAuth,
    /// Token expired, malformed, or bad signature
    InvalidToken,
    /// Refresh token presented where an access token is expected
    WrongTokenType,
    /// Token subject does not resolve to a stored user
    UserNotFound,
    /// Authoritative database lookup failed
    StorageError,
}

impl AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials
            | AuthError::MissingAuth
            | AuthError::InvalidToken
            | AuthError::WrongTokenType
            | AuthError::UserNotFound => StatusCode::UNAUTHORIZED,
            AuthError::InvalidCredentials | AuthError::DeviceInactive => StatusCode::FORBIDDEN,
            AuthError::StorageError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "Missing API credentials",
            AuthError::InvalidCredentials => "Invalid API credentials",
            AuthError::DeviceInactive => "Device is inactive",
            AuthError::MissingAuth => "Missing authorization token",
            AuthError::InvalidToken => "Invalid or expired token",
            AuthError::WrongTokenType => "Invalid token type",
            AuthError::UserNotFound => "User not found",
            AuthError::StorageError => "Database error",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: &'static str,
        }

        (
            self.status_code(),
            Json(ErrorResponse {
                error: self.message(),
            }),
        )
            .into_response()
    }
}
