use chrono::{DateTime, Utc};

use crate::user::UserId;

pub type DeviceTokenId = i64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceToken {
    pub id: DeviceTokenId,
    pub owner_id: UserId,
    pub token: String,
    pub updated_at: DateTime<Utc>,
}
