use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use remindme_models::{
    device::{DeviceToken, DeviceTokenId},
    reminder::{CompletionState, Reminder, ReminderId, SnoozeState},
    user::UserId,
};
use tokio::sync::RwLock;

use crate::{DeviceTokenStorage, NewReminder, ReminderFilter, ReminderStorage, StorageError};

struct InMemoryReminderStore {
    current_id: ReminderId,
    storage: HashMap<ReminderId, Reminder>,
}

pub struct InMemoryReminderStorage {
    store: RwLock<InMemoryReminderStore>,
}

impl InMemoryReminderStorage {
    pub fn new() -> Self {
        InMemoryReminderStorage {
            store: RwLock::new(InMemoryReminderStore {
                current_id: 0,
                storage: HashMap::new(),
            }),
        }
    }
}

impl Default for InMemoryReminderStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted(mut reminders: Vec<Reminder>) -> Vec<Reminder> {
    reminders.sort_by_key(|r| (r.scheduled_at, r.id));
    reminders
}

#[async_trait]
impl ReminderStorage for InMemoryReminderStorage {
    async fn get(&self, id: ReminderId) -> Result<Option<Reminder>, StorageError> {
        let store = self.store.read().await;
        Ok(store.storage.get(&id).cloned())
    }

    async fn insert(&self, reminder: NewReminder) -> Result<Reminder, StorageError> {
        let mut store = self.store.write().await;
        store.current_id += 1;
        let id = store.current_id;

        let created = Reminder {
            id,
            owner_id: reminder.owner_id,
            title: reminder.title,
            notes: reminder.notes,
            scheduled_at: reminder.scheduled_at,
            timezone: reminder.timezone,
            completion: CompletionState::Pending,
            snooze: SnoozeState::None,
            ever_snoozed: false,
            executed_at: None,
            images: reminder.images,
            created_at: Utc::now(),
        };

        store.storage.insert(id, created.clone());
        Ok(created)
    }

    async fn save(&self, reminder: &Reminder) -> Result<Reminder, StorageError> {
        let mut store = self.store.write().await;
        let stored = store
            .storage
            .get_mut(&reminder.id)
            .ok_or(StorageError::ReminderNotFound(reminder.id))?;

        if stored.is_completed() {
            return Err(StorageError::ReminderCompleted(reminder.id));
        }

        stored.title = reminder.title.clone();
        stored.notes = reminder.notes.clone();
        stored.scheduled_at = reminder.scheduled_at;
        stored.timezone = reminder.timezone;
        stored.snooze = reminder.snooze;
        stored.ever_snoozed = reminder.ever_snoozed;
        stored.images = reminder.images.clone();

        Ok(stored.clone())
    }

    async fn save_fired(
        &self,
        reminder: &Reminder,
        registered_at: DateTime<Utc>,
    ) -> Result<Option<Reminder>, StorageError> {
        let mut store = self.store.write().await;
        match store.storage.get_mut(&reminder.id) {
            Some(stored) if !stored.is_completed() && stored.scheduled_at == registered_at => {
                stored.completion = reminder.completion;
                stored.snooze = reminder.snooze;
                stored.executed_at = reminder.executed_at;
                Ok(Some(stored.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: ReminderId) -> Result<bool, StorageError> {
        let mut store = self.store.write().await;
        Ok(store.storage.remove(&id).is_some())
    }

    async fn load_pending(&self) -> Result<Vec<Reminder>, StorageError> {
        let store = self.store.read().await;
        let pending = store
            .storage
            .values()
            .filter(|r| !r.is_completed())
            .cloned()
            .collect();

        Ok(sorted(pending))
    }

    async fn list_for_owner(
        &self,
        owner_id: UserId,
        filter: ReminderFilter,
    ) -> Result<Vec<Reminder>, StorageError> {
        let store = self.store.read().await;
        let reminders = store
            .storage
            .values()
            .filter(|r| r.owner_id == owner_id && filter.matches(r))
            .cloned()
            .collect();

        Ok(sorted(reminders))
    }

    async fn count_for_owner(&self, owner_id: UserId) -> Result<u64, StorageError> {
        let store = self.store.read().await;
        let count = store
            .storage
            .values()
            .filter(|r| r.owner_id == owner_id)
            .count();

        Ok(count as u64)
    }
}

struct InMemoryDeviceTokenStore {
    current_id: DeviceTokenId,
    tokens: HashMap<String, DeviceToken>,
}

pub struct InMemoryDeviceTokenStorage {
    store: RwLock<InMemoryDeviceTokenStore>,
}

impl InMemoryDeviceTokenStorage {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(InMemoryDeviceTokenStore {
                current_id: 0,
                tokens: HashMap::new(),
            }),
        }
    }
}

impl Default for InMemoryDeviceTokenStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceTokenStorage for InMemoryDeviceTokenStorage {
    async fn list_for_owner(&self, owner_id: UserId) -> Result<Vec<DeviceToken>, StorageError> {
        let store = self.store.read().await;
        let mut tokens: Vec<DeviceToken> = store
            .tokens
            .values()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect();
        tokens.sort_by_key(|t| t.id);

        Ok(tokens)
    }

    async fn upsert(&self, owner_id: UserId, token: &str) -> Result<DeviceToken, StorageError> {
        let mut store = self.store.write().await;
        let now = Utc::now();

        if let Some(existing) = store.tokens.get_mut(token) {
            existing.owner_id = owner_id;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        store.current_id += 1;
        let device_token = DeviceToken {
            id: store.current_id,
            owner_id,
            token: token.to_string(),
            updated_at: now,
        };
        store.tokens.insert(token.to_string(), device_token.clone());

        Ok(device_token)
    }

    async fn remove(&self, token: &str) -> Result<bool, StorageError> {
        let mut store = self.store.write().await;
        Ok(store.tokens.remove(token).is_some())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use remindme_models::chrono_tz::Tz;

    use super::*;

    fn new_reminder(owner_id: UserId, hour: u32) -> NewReminder {
        NewReminder {
            owner_id,
            title: "Water the plants".to_string(),
            notes: None,
            scheduled_at: Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap(),
            timezone: Tz::UTC,
            images: vec![],
        }
    }

    #[tokio::test]
    async fn save_is_rejected_after_completion() {
        let storage = InMemoryReminderStorage::new();
        let reminder = storage.insert(new_reminder(1, 9)).await.unwrap();

        let mut fired = reminder.clone();
        fired.completion = CompletionState::Completed;
        fired.executed_at = Some(Utc::now());
        storage
            .save_fired(&fired, reminder.scheduled_at)
            .await
            .unwrap()
            .unwrap();

        let error = storage.save(&reminder).await.unwrap_err();
        assert!(matches!(error, StorageError::ReminderCompleted(id) if id == reminder.id));
    }

    #[tokio::test]
    async fn save_fired_is_superseded_by_reschedule() {
        let storage = InMemoryReminderStorage::new();
        let reminder = storage.insert(new_reminder(1, 9)).await.unwrap();

        let mut rescheduled = reminder.clone();
        rescheduled.scheduled_at = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        storage.save(&rescheduled).await.unwrap();

        let mut fired = reminder.clone();
        fired.completion = CompletionState::Completed;
        let result = storage
            .save_fired(&fired, reminder.scheduled_at)
            .await
            .unwrap();

        assert!(result.is_none());
        let stored = storage.get(reminder.id).await.unwrap().unwrap();
        assert_eq!(stored.completion, CompletionState::Pending);
    }

    #[tokio::test]
    async fn lists_are_scoped_to_owner_and_sorted() {
        let storage = InMemoryReminderStorage::new();
        let late = storage.insert(new_reminder(1, 11)).await.unwrap();
        let early = storage.insert(new_reminder(1, 8)).await.unwrap();
        storage.insert(new_reminder(2, 9)).await.unwrap();

        let listed = storage
            .list_for_owner(1, ReminderFilter::All)
            .await
            .unwrap();

        let ids: Vec<_> = listed.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![early.id, late.id]);
        assert_eq!(storage.count_for_owner(2).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn upsert_refreshes_existing_token() {
        let storage = InMemoryDeviceTokenStorage::new();
        let first = storage.upsert(1, "token-a").await.unwrap();
        let second = storage.upsert(2, "token-a").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.owner_id, 2);
        assert!(storage.list_for_owner(1).await.unwrap().is_empty());
        assert!(storage.remove("token-a").await.unwrap());
        assert!(!storage.remove("token-a").await.unwrap());
    }
}
