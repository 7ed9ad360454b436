use sqlx::sqlite::SqlitePool;

/// A stored device. Also the value cached by the credential cache, so it
/// carries the secret digest; API handlers must never serialize it directly.
#[derive(Debug, Clone)]
pub struct Device {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    pub user_id: i64,
    pub api_key: String,
    pub api_secret_hash: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
    pub last_seen: Option<String>,
}

#[derive(sqlx::FromRow)]
struct DeviceRow {
    id: i64,
    uuid: String,
    name: String,
    user_id: i64,
    api_key: String,
    api_secret_hash: String,
    is_active: i32,
    created_at: String,
    updated_at: String,
    last_seen: Option<String>,
}

impl From<DeviceRow> for Device {
    fn from(row: DeviceRow) -> Self {
        Self {
            id: row.id,
            uuid: row.uuid,
            name: row.name,
            user_id: row.user_id,
            api_key: row.api_key,
            api_secret_hash: row.api_secret_hash,
            is_active: row.is_active != 0,
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_seen: row.last_seen,
        }
    }
}

const DEVICE_COLUMNS: &str = "id, uuid, name, user_id, api_key, api_secret_hash, is_active, \
                              created_at, updated_at, last_seen";

#[derive(Clone)]
pub struct DeviceStore {
    pool: SqlitePool,
}

impl DeviceStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new device. Returns the device ID.
    /// Fails on duplicate api_key (unique constraint).
    pub async fn create(
        &self,
        uuid: &str,
        name: &str,
        user_id: i64,
        api_key: &str,
        api_secret_hash: &str,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO devices (uuid, name, user_id, api_key, api_secret_hash, is_active) \
             VALUES (?, ?, ?, ?, ?, 1)",
        )
        .bind(uuid)
        .bind(name)
        .bind(user_id)
        .bind(api_key)
        .bind(api_secret_hash)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Look up a device by API key (exact match; secrets are never queryable).
    pub async fn get_by_api_key(&self, api_key: &str) -> Result<Option<Device>, sqlx::Error> {
        let row: Option<DeviceRow> = sqlx::query_as(&format!(
            "SELECT {DEVICE_COLUMNS} FROM devices WHERE api_key = ?"
        ))
        .bind(api_key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Device::from))
    }

    /// Get a device by UUID.
    pub async fn get_by_uuid(&self, uuid: &str) -> Result<Option<Device>, sqlx::Error> {
        let row: Option<DeviceRow> = sqlx::query_as(&format!(
            "SELECT {DEVICE_COLUMNS} FROM devices WHERE uuid = ?"
        ))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Device::from))
    }

    /// List all devices owned by a user.
    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<Device>, sqlx::Error> {
        let rows: Vec<DeviceRow> = sqlx::query_as(&format!(
            "SELECT {DEVICE_COLUMNS} FROM devices WHERE user_id = ? ORDER BY created_at"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Device::from).collect())
    }

    /// Rename a device, owner-scoped. Returns false if no row matched.
    pub async fn rename(&self, uuid: &str, user_id: i64, name: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE devices SET name = ?, updated_at = datetime('now') \
             WHERE uuid = ? AND user_id = ?",
        )
        .bind(name)
        .bind(uuid)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set the active flag, owner-scoped. Returns false if no row matched.
    pub async fn set_active(
        &self,
        uuid: &str,
        user_id: i64,
        is_active: bool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE devices SET is_active = ?, updated_at = datetime('now') \
             WHERE uuid = ? AND user_id = ?",
        )
        .bind(is_active as i32)
        .bind(uuid)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the secret digest, owner-scoped. Returns false if no row matched.
    pub async fn update_secret(
        &self,
        uuid: &str,
        user_id: i64,
        api_secret_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE devices SET api_secret_hash = ?, updated_at = datetime('now') \
             WHERE uuid = ? AND user_id = ?",
        )
        .bind(api_secret_hash)
        .bind(uuid)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record that a device was seen on the ingestion path.
    pub async fn touch_last_seen(&self, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE devices SET last_seen = datetime('now') WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete a device, owner-scoped. Returns false if no row matched.
    pub async fn delete(&self, uuid: &str, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM devices WHERE uuid = ? AND user_id = ?")
            .bind(uuid)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
