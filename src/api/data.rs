//! Sensor data ingestion and retrieval.
//!
//! - POST `/` - Device-authenticated single-reading insert
//! - GET `/` - Latest readings for the dashboard (public)

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ResultExt};
use crate::AppState;
use crate::auth::DeviceAuth;
use crate::db::SensorReading;

/// Inclusive temperature bounds in degrees Celsius.
const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = -50.0..=50.0;

/// Inclusive relative humidity bounds in percent.
const HUMIDITY_RANGE: std::ops::RangeInclusive<f64> = 0.0..=100.0;

/// How many readings the dashboard endpoint returns.
const RECENT_LIMIT: i64 = 10;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(ingest_reading).get(recent_readings))
        .with_state(state)
}

#[derive(Deserialize)]
struct CreateReadingRequest {
    temperature: f64,
    humidity: f64,
}

#[derive(Serialize)]
struct ReadingResponse {
    id: i64,
    device_id: String,
    temperature: f64,
    humidity: f64,
    timestamp: String,
}

impl ReadingResponse {
    fn new(reading: &SensorReading, device_uuid: &str) -> Self {
        Self {
            id: reading.id,
            device_id: device_uuid.to_string(),
            temperature: reading.temperature,
            humidity: reading.humidity,
            timestamp: reading.timestamp.clone(),
        }
    }
}

async fn ingest_reading(
    State(state): State<AppState>,
    DeviceAuth(device): DeviceAuth,
    Json(payload): Json<CreateReadingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !TEMPERATURE_RANGE.contains(&payload.temperature) || !payload.temperature.is_finite() {
        return Err(ApiError::bad_request(
            "Temperature must be between -50 and 50",
        ));
    }

    if !HUMIDITY_RANGE.contains(&payload.humidity) || !payload.humidity.is_finite() {
        return Err(ApiError::bad_request("Humidity must be between 0 and 100"));
    }

    let reading = state
        .db
        .readings()
        .insert(device.id, payload.temperature, payload.humidity)
        .await
        .db_err("Failed to store reading")?;

    if let Err(e) = state.db.devices().touch_last_seen(device.id).await {
        tracing::warn!(device = %device.uuid, "Failed to update last_seen: {}", e);
    }

    Ok((
        StatusCode::CREATED,
        Json(ReadingResponse::new(&reading, &device.uuid)),
    ))
}

#[derive(Serialize)]
struct RecentReadingsResponse {
    data: Vec<RecentReading>,
}

#[derive(Serialize)]
struct RecentReading {
    id: i64,
    temperature: f64,
    humidity: f64,
    timestamp: String,
}

async fn recent_readings(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let readings = state
        .db
        .readings()
        .recent(RECENT_LIMIT)
        .await
        .db_err("Failed to fetch readings")?;

    Ok((
        StatusCode::OK,
        Json(RecentReadingsResponse {
            data: readings
                .into_iter()
                .map(|r| RecentReading {
                    id: r.id,
                    temperature: r.temperature,
                    humidity: r.humidity,
                    timestamp: r.timestamp,
                })
                .collect(),
        }),
    ))
}
