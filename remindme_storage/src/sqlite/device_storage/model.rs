use remindme_models::device::DeviceToken;

use crate::{StorageError, sqlite::instant_from_millis};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DeviceTokenStorageModel {
    pub id: i64,
    pub owner_id: i64,
    pub token: String,
    pub updated_at_ms: i64,
}

impl TryFrom<DeviceTokenStorageModel> for DeviceToken {
    type Error = StorageError;

    fn try_from(value: DeviceTokenStorageModel) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            owner_id: value.owner_id,
            token: value.token,
            updated_at: instant_from_millis(value.updated_at_ms)?,
        })
    }
}
