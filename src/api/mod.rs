mod auth;
mod data;
mod devices;
mod error;
mod stats;
mod users;

use axum::Router;

use crate::AppState;

/// Create the API router.
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .nest("/auth", auth::router(state.clone()))
        .nest("/users", users::router(state.clone()))
        .nest("/devices", devices::router(state.clone()))
        .nest("/data", data::router(state.clone()))
        .nest("/stats", stats::router(state))
}
