//! Authentication endpoints.
//!
//! - POST `/register` - Create a user account
//! - POST `/login` - Verify credentials, issue access + refresh tokens
//! - POST `/refresh` - Exchange a refresh token for a new access token
//! - GET `/validate` - Check the current access token
//! - POST `/logout` - Clear session cookies
//!
//! Refresh tokens are stateless: the refresh endpoint issues a new access
//! token only and the presented refresh token stays valid until its own
//! expiry. There is no server-side revocation list.

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header::SET_COOKIE, request::Parts},
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ResultExt};
use crate::AppState;
use crate::auth::{
    ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, bearer_or_cookie_token, clear_cookie, session_cookie,
};
use crate::db::User;
use crate::jwt::{Claims, JwtError, REFRESH_TOKEN_TTL_SECS};
use crate::secrets::{hash_password, verify_password};

const MIN_PASSWORD_LENGTH: usize = 8;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/validate", get(validate))
        .route("/logout", post(logout))
        .with_state(state)
}

/// Public projection of a user. The password digest never leaves the store.
#[derive(Serialize)]
struct UserResponse {
    user_id: String,
    email: String,
    name: Option<String>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.uuid.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

#[derive(Deserialize)]
struct RegisterRequest {
    email: String,
    password: String,
    name: Option<String>,
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = payload.email.trim();

    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("Invalid email address"));
    }

    if payload.password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(
            "Password must be at least 8 characters",
        ));
    }

    let existing = state
        .db
        .users()
        .get_by_email(email)
        .await
        .db_err("Failed to check for existing user")?;
    if existing.is_some() {
        return Err(ApiError::bad_request("User already exists"));
    }

    let password_hash =
        hash_password(&payload.password).map_err(|e| ApiError::db_error("Failed to hash password", e))?;
    let uuid = uuid::Uuid::new_v4().to_string();

    state
        .db
        .users()
        .create(&uuid, email, &password_hash, payload.name.as_deref())
        .await
        .db_err("Failed to create user")?;

    let user = state
        .db
        .users()
        .get_by_uuid(&uuid)
        .await
        .db_err("Failed to load created user")?
        .ok_or_else(|| ApiError::internal("User not found after creation"))?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    token: String,
    #[serde(rename = "refreshToken")]
    refresh_token: String,
    user: UserResponse,
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .users()
        .get_by_email(payload.email.trim())
        .await
        .db_err("Failed to look up user")?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    // Same message whether the email or the password was wrong
    if !verify_password(&payload.password, &user.password_hash) {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let token = state
        .jwt
        .issue_access_token(&user)
        .map_err(|e| ApiError::db_error("Failed to issue access token", e))?;
    let refresh_token = state
        .jwt
        .issue_refresh_token(&user)
        .map_err(|e| ApiError::db_error("Failed to issue refresh token", e))?;

    let access_cookie = session_cookie(
        ACCESS_COOKIE_NAME,
        &token,
        state.jwt.access_ttl_secs(),
        state.secure_cookies,
    );
    let refresh_cookie = session_cookie(
        REFRESH_COOKIE_NAME,
        &refresh_token,
        REFRESH_TOKEN_TTL_SECS,
        state.secure_cookies,
    );

    Ok((
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, access_cookie), (SET_COOKIE, refresh_cookie)]),
        Json(LoginResponse {
            token,
            refresh_token,
            user: UserResponse::from(&user),
        }),
    ))
}

#[derive(Deserialize)]
struct RefreshRequest {
    #[serde(rename = "refreshToken")]
    refresh_token: String,
}

#[derive(Serialize)]
struct RefreshResponse {
    token: String,
}

async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = state
        .jwt
        .validate_refresh_token(&payload.refresh_token)
        .map_err(|e| match e {
            JwtError::WrongTokenType => {
                ApiError::unauthorized("Invalid token type. Expected a refresh token.")
            }
            _ => ApiError::unauthorized("Invalid or expired refresh token"),
        })?;

    let user = state
        .db
        .users()
        .get_by_uuid(&claims.sub)
        .await
        .db_err("Failed to look up user")?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    // New access token only; the refresh token is not rotated and stays
    // valid until its own expiry.
    let token = state
        .jwt
        .issue_access_token(&user)
        .map_err(|e| ApiError::db_error("Failed to issue access token", e))?;

    Ok((StatusCode::OK, Json(RefreshResponse { token })))
}

#[derive(Serialize)]
struct ValidateResponse {
    valid: bool,
    user: Claims,
}

async fn validate(
    State(state): State<AppState>,
    request: axum::extract::Request,
) -> Result<impl IntoResponse, ApiError> {
    let (parts, _body) = request.into_parts();
    let token = token_from_parts(&parts).ok_or_else(|| ApiError::unauthorized("No token provided"))?;

    let claims = state
        .jwt
        .validate_access_token(&token)
        .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

    Ok((
        StatusCode::OK,
        Json(ValidateResponse {
            valid: true,
            user: claims,
        }),
    ))
}

fn token_from_parts(parts: &Parts) -> Option<String> {
    // Cookie first for browser clients, then the Authorization header
    crate::auth::get_cookie(&parts.headers, ACCESS_COOKIE_NAME)
        .map(|t| t.to_string())
        .or_else(|| bearer_or_cookie_token(parts))
}

#[derive(Serialize)]
struct LogoutResponse {
    message: &'static str,
}

async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let clear_access = clear_cookie(ACCESS_COOKIE_NAME, state.secure_cookies);
    let clear_refresh = clear_cookie(REFRESH_COOKIE_NAME, state.secure_cookies);

    (
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, clear_access), (SET_COOKIE, clear_refresh)]),
        Json(LogoutResponse {
            message: "Logged out successfully",
        }),
    )
}
