use std::sync::Arc;

use remindme_models::{
    reminder::{Reminder, ReminderId},
    time::{self, ResolvedTime},
};
use remindme_scheduler::{ReminderScheduler, ScheduleRequest};
use remindme_storage::{NewReminder, ReminderStorage};

use crate::{ReminderError, locks::KeyedLocks};

/// Every change of a reminder's instant goes through here: the record is committed
/// first and the trigger is replaced only after the commit succeeded.
///
/// Commits for the same reminder are serialized, so the last committed instant is
/// always the one left in the scheduler.
pub struct RescheduleCoordinator {
    storage: Arc<dyn ReminderStorage>,
    scheduler: Arc<dyn ReminderScheduler>,
    locks: KeyedLocks<ReminderId>,
}

impl RescheduleCoordinator {
    pub fn new(storage: Arc<dyn ReminderStorage>, scheduler: Arc<dyn ReminderScheduler>) -> Self {
        Self {
            storage,
            scheduler,
            locks: KeyedLocks::new(),
        }
    }

    pub fn resolve(&self, local: &str, timezone: &str) -> Result<ResolvedTime, ReminderError> {
        Ok(time::resolve(local, timezone)?)
    }

    pub async fn create(&self, reminder: NewReminder) -> Result<Reminder, ReminderError> {
        let created = self.storage.insert(reminder).await.inspect_err(|err| {
            log::error!("Failed to persist new reminder: {err}");
        })?;

        self.schedule(&created).await;
        Ok(created)
    }

    pub async fn commit(&self, reminder: &Reminder) -> Result<Reminder, ReminderError> {
        let _guard = self.locks.lock(reminder.id).await;

        let saved = self.storage.save(reminder).await.inspect_err(|err| {
            log::error!(
                "Failed to persist reminder, trigger left untouched [reminder_id = {}]: {err}",
                reminder.id
            );
        })?;

        self.schedule(&saved).await;
        Ok(saved)
    }

    /// Registers the trigger for whatever is stored now, if the reminder is still pending.
    pub async fn restore(&self, id: ReminderId) -> Result<bool, ReminderError> {
        let _guard = self.locks.lock(id).await;

        match self.storage.get(id).await? {
            Some(reminder) if !reminder.is_completed() => {
                self.schedule(&reminder).await;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Deletes the record, then drops its trigger. Returns whether a record existed.
    pub async fn remove(&self, id: ReminderId) -> Result<bool, ReminderError> {
        let _guard = self.locks.lock(id).await;

        if !self.storage.delete(id).await? {
            return Ok(false);
        }

        let cancelled = self.scheduler.cancel(id).await;
        log::info!("Reminder deleted [reminder_id = {id}, trigger_cancelled = {cancelled}]");

        Ok(true)
    }

    /// The stored record stays authoritative when this fails. Rehydration on the next
    /// start recreates the trigger.
    async fn schedule(&self, reminder: &Reminder) {
        match self.scheduler.schedule(ScheduleRequest::from(reminder)).await {
            Ok(trigger) => log::debug!(
                "Trigger registered [reminder_id = {}, fire_at = {}, generation = {}]",
                trigger.reminder_id,
                trigger.fire_at,
                trigger.generation
            ),
            Err(err) => log::error!(
                "Failed to register trigger after commit [reminder_id = {}]: {err}",
                reminder.id
            ),
        }
    }
}
