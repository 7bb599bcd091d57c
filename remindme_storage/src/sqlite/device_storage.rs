mod model;

use async_trait::async_trait;
use chrono::Utc;
use model::DeviceTokenStorageModel;
use remindme_models::{device::DeviceToken, user::UserId};

use crate::{DeviceTokenStorage, StorageError};

pub struct SqliteDeviceTokenStorage {
    pool: sqlx::SqlitePool,
}

impl SqliteDeviceTokenStorage {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeviceTokenStorage for SqliteDeviceTokenStorage {
    async fn list_for_owner(&self, owner_id: UserId) -> Result<Vec<DeviceToken>, StorageError> {
        let tokens = sqlx::query_as::<_, DeviceTokenStorageModel>(
            "SELECT * FROM device_tokens WHERE owner_id = ? ORDER BY id",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        tokens.into_iter().map(DeviceToken::try_from).collect()
    }

    async fn upsert(&self, owner_id: UserId, token: &str) -> Result<DeviceToken, StorageError> {
        let device_token = sqlx::query_as::<_, DeviceTokenStorageModel>(
            "
INSERT INTO device_tokens (owner_id, token, updated_at_ms)
VALUES (?, ?, ?)
ON CONFLICT (token) DO UPDATE
SET owner_id = excluded.owner_id,
    updated_at_ms = excluded.updated_at_ms
RETURNING *
",
        )
        .bind(owner_id)
        .bind(token)
        .bind(Utc::now().timestamp_millis())
        .fetch_one(&self.pool)
        .await?;

        device_token.try_into()
    }

    async fn remove(&self, token: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM device_tokens WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
