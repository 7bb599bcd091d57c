use std::sync::Arc;

use chrono::NaiveDateTime;
use remindme_models::{
    device::DeviceToken,
    reminder::{Reminder, ReminderId},
    settings::LimitSettings,
    user::{Owner, UserId, UserRole},
};
use remindme_scheduler::ReminderScheduler;
use remindme_storage::{DeviceTokenStorage, NewReminder, ReminderFilter, ReminderStorage};

use crate::{
    ReminderError, ReminderLifecycle, ReminderStateMachine, RescheduleCoordinator,
    ValidationError, locks::KeyedLocks, validation,
};


#[derive(Debug, Clone, Default)]
pub struct CreateReminder {
    pub title: String,
    pub local_datetime: String,
    pub timezone: String,
    pub notes: Option<String>,
    pub images: Vec<String>,
}

/// A reminder together with its trigger time as a wall-clock value in its own timezone.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderView {
    pub reminder: Reminder,
    pub local_scheduled_at: NaiveDateTime,
    pub lifecycle: ReminderLifecycle,
}

impl From<Reminder> for ReminderView {
    fn from(reminder: Reminder) -> Self {
        Self {
            local_scheduled_at: reminder.local_scheduled_at(),
            lifecycle: ReminderLifecycle::of(&reminder),
            reminder,
        }
    }
}

pub struct ReminderService {
    storage: Arc<dyn ReminderStorage>,
    devices: Arc<dyn DeviceTokenStorage>,
    coordinator: RescheduleCoordinator,
    owner_locks: KeyedLocks<UserId>,
    limits: LimitSettings,
}

impl ReminderService {
    pub fn new(
        storage: Arc<dyn ReminderStorage>,
        devices: Arc<dyn DeviceTokenStorage>,
        scheduler: Arc<dyn ReminderScheduler>,
        limits: LimitSettings,
    ) -> Self {
        let coordinator = RescheduleCoordinator::new(storage.clone(), scheduler);

        Self {
            storage,
            devices,
            coordinator,
            owner_locks: KeyedLocks::new(),
            limits,
        }
    }

    pub async fn create_reminder(
        &self,
        owner: Owner,
        request: CreateReminder,
    ) -> Result<Reminder, ReminderError> {
        let title = validation::title(&request.title)?;
        let notes = validation::notes(request.notes.as_deref())?;
        let images = validation::images(request.images)?;
        let resolved = self
            .coordinator
            .resolve(&request.local_datetime, &request.timezone)?;

        let _guard = self.owner_locks.lock(owner.id).await;
        self.ensure_within_limit(owner).await?;

        let created = self
            .coordinator
            .create(NewReminder {
                owner_id: owner.id,
                title,
                notes,
                scheduled_at: resolved.instant,
                timezone: resolved.timezone,
                images,
            })
            .await?;

        log::info!(
            "Reminder created [reminder_id = {}, owner_id = {}, scheduled_at = {}]",
            created.id,
            owner.id,
            created.scheduled_at
        );

        Ok(created)
    }

    pub async fn update_schedule(
        &self,
        owner: Owner,
        id: ReminderId,
        local_datetime: &str,
        timezone: &str,
    ) -> Result<Reminder, ReminderError> {
        let resolved = self.coordinator.resolve(local_datetime, timezone)?;
        let current = self.get_owned(owner, id).await?;

        let updated =
            ReminderStateMachine::reschedule(&current, resolved.instant, resolved.timezone)?;
        let saved = self.coordinator.commit(&updated).await?;

        log::info!(
            "Reminder rescheduled [reminder_id = {id}, scheduled_at = {}]",
            saved.scheduled_at
        );

        Ok(saved)
    }

    pub async fn snooze(
        &self,
        owner: Owner,
        id: ReminderId,
        local_datetime: &str,
        timezone: &str,
    ) -> Result<Reminder, ReminderError> {
        let resolved = self.coordinator.resolve(local_datetime, timezone)?;
        let current = self.get_owned(owner, id).await?;

        let snoozed = ReminderStateMachine::snooze(&current, resolved.instant, resolved.timezone)?;
        let saved = self.coordinator.commit(&snoozed).await?;

        log::info!(
            "Reminder snoozed [reminder_id = {id}, scheduled_at = {}]",
            saved.scheduled_at
        );

        Ok(saved)
    }

    pub async fn delete(&self, owner: Owner, id: ReminderId) -> Result<(), ReminderError> {
        self.get_owned(owner, id).await?;

        if !self.coordinator.remove(id).await? {
            return Err(ReminderError::NotFound(id));
        }

        Ok(())
    }

    pub async fn get(&self, owner: Owner, id: ReminderId) -> Result<ReminderView, ReminderError> {
        self.get_owned(owner, id).await.map(ReminderView::from)
    }

    pub async fn list(
        &self,
        owner: Owner,
        filter: ReminderFilter,
    ) -> Result<Vec<ReminderView>, ReminderError> {
        let reminders = self.storage.list_for_owner(owner.id, filter).await?;

        Ok(reminders.into_iter().map(ReminderView::from).collect())
    }

    pub async fn register_device(
        &self,
        owner: Owner,
        token: &str,
    ) -> Result<DeviceToken, ReminderError> {
        let token = validation::device_token(token)?;
        let device = self.devices.upsert(owner.id, token).await?;

        log::info!(
            "Device registered [owner_id = {}, device_id = {}]",
            owner.id,
            device.id
        );

        Ok(device)
    }

    /// Registers a trigger for every pending reminder. Past-due ones fire right away.
    pub async fn rehydrate(&self) -> Result<usize, ReminderError> {
        let pending = self.storage.load_pending().await?;

        let mut restored = 0;
        for reminder in &pending {
            if self.coordinator.restore(reminder.id).await? {
                restored += 1;
            }
        }

        log::info!("Rehydrated {restored} pending reminders");
        Ok(restored)
    }

    async fn get_owned(&self, owner: Owner, id: ReminderId) -> Result<Reminder, ReminderError> {
        match self.storage.get(id).await? {
            Some(reminder) if reminder.owner_id == owner.id => Ok(reminder),
            _ => Err(ReminderError::NotFound(id)),
        }
    }

    async fn ensure_within_limit(&self, owner: Owner) -> Result<(), ReminderError> {
        if owner.role != UserRole::Guest {
            return Ok(());
        }

        let limit = self.limits.guest_max_reminders;
        if self.storage.count_for_owner(owner.id).await? >= limit {
            return Err(ValidationError::ReminderLimitReached { limit }.into());
        }

        Ok(())
    }
}
