use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use remindme_models::reminder::{Reminder, ReminderId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleRequest {
    pub reminder_id: ReminderId,
    pub fire_at: DateTime<Utc>,
}

impl ScheduleRequest {
    pub fn new(reminder_id: ReminderId, fire_at: DateTime<Utc>) -> Self {
        Self {
            reminder_id,
            fire_at,
        }
    }
}

impl From<&Reminder> for ScheduleRequest {
    fn from(reminder: &Reminder) -> Self {
        Self::new(reminder.id, reminder.scheduled_at)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTrigger {
    pub reminder_id: ReminderId,
    pub fire_at: DateTime<Utc>,
    pub generation: u64,
}

/// Passed to the [`FireHandler`] when a trigger elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTrigger {
    pub reminder_id: ReminderId,
    /// The instant the trigger was registered for, used to detect superseded fires.
    pub fire_at: DateTime<Utc>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Scheduler is shut down")]
    ShutDown,
}

#[async_trait]
pub trait FireHandler: Send + Sync + 'static {
    async fn on_fire(&self, trigger: FiredTrigger);
}

/// Holds at most one pending one-shot trigger per reminder.
#[async_trait]
pub trait ReminderScheduler: Send + Sync + 'static {
    /// Registers a trigger, replacing any trigger already held for the same reminder.
    async fn schedule(
        &self,
        schedule_request: ScheduleRequest,
    ) -> Result<ScheduledTrigger, SchedulerError>;

    /// Returns whether a pending trigger was removed.
    async fn cancel(&self, reminder_id: ReminderId) -> bool;

    async fn pending(&self) -> Vec<ReminderId>;

    async fn shutdown(&self);
}
