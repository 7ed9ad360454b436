use sqlx::sqlite::SqlitePool;

/// A single stored measurement. Immutable once created.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SensorReading {
    pub id: i64,
    pub device_id: i64,
    pub temperature: f64,
    pub humidity: f64,
    pub timestamp: String,
}

/// Aggregate statistics over all readings. The averages and extrema are
/// `None` when no readings exist.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReadingStats {
    pub count: i64,
    pub avg_temperature: Option<f64>,
    pub min_temperature: Option<f64>,
    pub max_temperature: Option<f64>,
    pub avg_humidity: Option<f64>,
    pub min_humidity: Option<f64>,
    pub max_humidity: Option<f64>,
}

#[derive(Clone)]
pub struct ReadingStore {
    pool: SqlitePool,
}

impl ReadingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a reading with a server-assigned timestamp and return the
    /// stored row.
    pub async fn insert(
        &self,
        device_id: i64,
        temperature: f64,
        humidity: f64,
    ) -> Result<SensorReading, sqlx::Error> {
        let reading: SensorReading = sqlx::query_as(
            "INSERT INTO sensor_readings (device_id, temperature, humidity) VALUES (?, ?, ?) \
             RETURNING id, device_id, temperature, humidity, timestamp",
        )
        .bind(device_id)
        .bind(temperature)
        .bind(humidity)
        .fetch_one(&self.pool)
        .await?;
        Ok(reading)
    }

    /// Get the most recent readings, newest first.
    pub async fn recent(&self, limit: i64) -> Result<Vec<SensorReading>, sqlx::Error> {
        let rows: Vec<SensorReading> = sqlx::query_as(
            "SELECT id, device_id, temperature, humidity, timestamp FROM sensor_readings \
             ORDER BY timestamp DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Aggregate avg/min/max/count over all readings.
    pub async fn stats(&self) -> Result<ReadingStats, sqlx::Error> {
        let stats: ReadingStats = sqlx::query_as(
            "SELECT COUNT(*) AS count, \
                    AVG(temperature) AS avg_temperature, \
                    MIN(temperature) AS min_temperature, \
                    MAX(temperature) AS max_temperature, \
                    AVG(humidity) AS avg_humidity, \
                    MIN(humidity) AS min_humidity, \
                    MAX(humidity) AS max_humidity \
             FROM sensor_readings",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }
}
