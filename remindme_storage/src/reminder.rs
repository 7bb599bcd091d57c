use async_trait::async_trait;
use chrono::{DateTime, Utc};
use remindme_models::{
    chrono_tz::Tz,
    reminder::{Reminder, ReminderId},
    user::UserId,
};

use crate::StorageError;

pub struct NewReminder {
    pub owner_id: UserId,
    pub title: String,
    pub notes: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub timezone: Tz,
    pub images: Vec<String>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ReminderFilter {
    #[default]
    All,
    Active,
    Completed,
    Snoozed,
}

impl ReminderFilter {
    pub fn matches(&self, reminder: &Reminder) -> bool {
        match self {
            ReminderFilter::All => true,
            ReminderFilter::Active => !reminder.is_completed(),
            ReminderFilter::Completed => reminder.is_completed(),
            ReminderFilter::Snoozed => !reminder.is_completed() && reminder.is_snoozed(),
        }
    }
}

#[async_trait]
pub trait ReminderStorage: Send + Sync {
    async fn get(&self, id: ReminderId) -> Result<Option<Reminder>, StorageError>;

    async fn insert(&self, reminder: NewReminder) -> Result<Reminder, StorageError>;

    /// Commits the schedule and snooze fields of a pending reminder.
    ///
    /// Fails with [`StorageError::ReminderCompleted`] once the stored record is completed,
    /// so a late update can never revert a completion.
    async fn save(&self, reminder: &Reminder) -> Result<Reminder, StorageError>;

    /// Commits the completion of a fired reminder, but only while the stored record is
    /// still pending at `registered_at`. `Ok(None)` means the fire was superseded.
    async fn save_fired(
        &self,
        reminder: &Reminder,
        registered_at: DateTime<Utc>,
    ) -> Result<Option<Reminder>, StorageError>;

    async fn delete(&self, id: ReminderId) -> Result<bool, StorageError>;

    async fn load_pending(&self) -> Result<Vec<Reminder>, StorageError>;

    async fn list_for_owner(
        &self,
        owner_id: UserId,
        filter: ReminderFilter,
    ) -> Result<Vec<Reminder>, StorageError>;

    async fn count_for_owner(&self, owner_id: UserId) -> Result<u64, StorageError>;
}
