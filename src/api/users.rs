//! User profile endpoints.

use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::get};
use serde::Serialize;

use crate::AppState;
use crate::auth::UserAuth;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/profile", get(profile))
        .with_state(state)
}

#[derive(Serialize)]
struct ProfileResponse {
    user_id: String,
    email: String,
    name: Option<String>,
}

async fn profile(UserAuth(auth): UserAuth) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ProfileResponse {
            user_id: auth.user.uuid,
            email: auth.user.email,
            name: auth.user.name,
        }),
    )
}
