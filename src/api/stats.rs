//! Aggregated statistics for the dashboard.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use serde::Serialize;

use super::error::{ApiError, ResultExt};
use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new().route("/", get(get_stats)).with_state(state)
}

#[derive(Serialize)]
struct MetricStats {
    avg: Option<f64>,
    min: Option<f64>,
    max: Option<f64>,
}

#[derive(Serialize)]
struct StatsResponse {
    stats: StatsBody,
}

#[derive(Serialize)]
struct StatsBody {
    count: i64,
    temperature: MetricStats,
    humidity: MetricStats,
}

async fn get_stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state
        .db
        .readings()
        .stats()
        .await
        .db_err("Failed to fetch stats")?;

    Ok((
        StatusCode::OK,
        Json(StatsResponse {
            stats: StatsBody {
                count: stats.count,
                temperature: MetricStats {
                    avg: stats.avg_temperature,
                    min: stats.min_temperature,
                    max: stats.max_temperature,
                },
                humidity: MetricStats {
                    avg: stats.avg_humidity,
                    min: stats.min_humidity,
                    max: stats.max_humidity,
                },
            },
        }),
    ))
}
