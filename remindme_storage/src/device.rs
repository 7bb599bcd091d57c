use async_trait::async_trait;
use remindme_models::{device::DeviceToken, user::UserId};

use crate::StorageError;

#[async_trait]
pub trait DeviceTokenStorage: Send + Sync {
    async fn list_for_owner(&self, owner_id: UserId) -> Result<Vec<DeviceToken>, StorageError>;

    /// Registers `token` for `owner_id`, refreshing it if it is already known.
    async fn upsert(&self, owner_id: UserId, token: &str) -> Result<DeviceToken, StorageError>;

    async fn remove(&self, token: &str) -> Result<bool, StorageError>;
}
