use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use remindme_models::reminder::Reminder;
use remindme_push::{DispatchReport, NotificationDispatcher};
use remindme_scheduler::{FireHandler, FiredTrigger};
use remindme_storage::{ReminderStorage, StorageError};
use thiserror::Error;

use crate::{ReminderStateMachine, TransitionError};

#[derive(Debug, Error)]
enum FireError {
    #[error("reminder no longer exists")]
    Deleted,

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("completion lost a race with a concurrent update")]
    Raced,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Completes reminders whose trigger elapsed and fans the notification out.
pub struct ReminderFireHandler {
    storage: Arc<dyn ReminderStorage>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl ReminderFireHandler {
    pub fn new(storage: Arc<dyn ReminderStorage>, dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self {
            storage,
            dispatcher,
        }
    }

    /// Returns `None` when the fire was superseded or the completion could not be stored.
    pub async fn fire(&self, trigger: FiredTrigger) -> Option<DispatchReport> {
        let completed = match self.complete(trigger).await {
            Ok(completed) => completed,
            Err(FireError::Storage(err)) => {
                log::error!(
                    "Failed to complete fired reminder [reminder_id = {}]: {err}",
                    trigger.reminder_id
                );
                return None;
            }
            Err(superseded) => {
                log::info!(
                    "Superseded fire skipped [reminder_id = {}, fire_at = {}]: {superseded}",
                    trigger.reminder_id,
                    trigger.fire_at
                );
                return None;
            }
        };

        log::info!(
            "Reminder completed [reminder_id = {}, owner_id = {}]",
            completed.id,
            completed.owner_id
        );

        Some(self.dispatcher.dispatch(&completed).await)
    }

    async fn complete(&self, trigger: FiredTrigger) -> Result<Reminder, FireError> {
        let current = self
            .storage
            .get(trigger.reminder_id)
            .await?
            .ok_or(FireError::Deleted)?;

        let fired = ReminderStateMachine::fire(&current, trigger.fire_at, Utc::now())?;

        self.storage
            .save_fired(&fired, trigger.fire_at)
            .await?
            .ok_or(FireError::Raced)
    }
}

#[async_trait]
impl FireHandler for ReminderFireHandler {
    async fn on_fire(&self, trigger: FiredTrigger) {
        self.fire(trigger).await;
    }
}
