use chrono::TimeZone;
use remindme_models::{
    chrono_tz::Tz,
    reminder::{CompletionState, SnoozeState},
};
use sqlx::sqlite::SqlitePoolOptions;

use super::*;
use crate::{DeviceTokenStorage, NewReminder, ReminderFilter, ReminderStorage};

async fn pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    migrate(&pool).await.unwrap();
    pool
}

fn new_reminder(owner_id: i64, title: &str, hour: u32) -> NewReminder {
    NewReminder {
        owner_id,
        title: title.to_string(),
        notes: Some("Two pills after breakfast".to_string()),
        scheduled_at: Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap(),
        timezone: Tz::Asia__Dhaka,
        images: vec!["https://cdn.example.com/pill.png".to_string()],
    }
}

#[tokio::test]
async fn inserted_reminder_is_read_back() {
    let storage = SqliteReminderStorage::new(pool().await);

    let created = storage
        .insert(new_reminder(7, "Take medicine", 3))
        .await
        .unwrap();
    let fetched = storage.get(created.id).await.unwrap().unwrap();

    assert_eq!(fetched, created);
    assert_eq!(fetched.timezone, Tz::Asia__Dhaka);
    assert_eq!(
        fetched.scheduled_at,
        Utc.with_ymd_and_hms(2025, 3, 1, 3, 0, 0).unwrap()
    );
    assert_eq!(fetched.completion, CompletionState::Pending);
    assert_eq!(fetched.snooze, SnoozeState::None);
    assert_eq!(fetched.images, vec!["https://cdn.example.com/pill.png"]);
}

#[tokio::test]
async fn save_updates_schedule_and_snooze_fields() {
    let storage = SqliteReminderStorage::new(pool().await);
    let mut reminder = storage
        .insert(new_reminder(7, "Take medicine", 3))
        .await
        .unwrap();

    reminder.scheduled_at = Utc.with_ymd_and_hms(2025, 3, 1, 4, 0, 0).unwrap();
    reminder.snooze = SnoozeState::Snoozed;
    reminder.ever_snoozed = true;
    let saved = storage.save(&reminder).await.unwrap();

    assert_eq!(saved.scheduled_at, reminder.scheduled_at);
    assert_eq!(saved.snooze, SnoozeState::Snoozed);
    assert!(saved.ever_snoozed);
}

#[tokio::test]
async fn save_of_missing_reminder_is_not_found() {
    let storage = SqliteReminderStorage::new(pool().await);
    let mut reminder = storage
        .insert(new_reminder(7, "Take medicine", 3))
        .await
        .unwrap();
    storage.delete(reminder.id).await.unwrap();

    reminder.title = "Take vitamins".to_string();
    let error = storage.save(&reminder).await.unwrap_err();

    assert!(matches!(error, StorageError::ReminderNotFound(id) if id == reminder.id));
}

#[tokio::test]
async fn completed_reminder_cannot_be_saved_again() {
    let storage = SqliteReminderStorage::new(pool().await);
    let reminder = storage
        .insert(new_reminder(7, "Take medicine", 3))
        .await
        .unwrap();

    let mut fired = reminder.clone();
    fired.completion = CompletionState::Completed;
    fired.executed_at = Some(Utc.with_ymd_and_hms(2025, 3, 1, 3, 0, 1).unwrap());
    let completed = storage
        .save_fired(&fired, reminder.scheduled_at)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(completed.completion, CompletionState::Completed);
    assert_eq!(completed.executed_at, fired.executed_at);

    let error = storage.save(&reminder).await.unwrap_err();
    assert!(matches!(error, StorageError::ReminderCompleted(_)));

    let second_fire = storage
        .save_fired(&fired, reminder.scheduled_at)
        .await
        .unwrap();
    assert!(second_fire.is_none());
}

#[tokio::test]
async fn fire_registered_for_old_instant_is_superseded() {
    let storage = SqliteReminderStorage::new(pool().await);
    let reminder = storage
        .insert(new_reminder(7, "Take medicine", 3))
        .await
        .unwrap();
    let registered_at = reminder.scheduled_at;

    let mut moved = reminder.clone();
    moved.scheduled_at = Utc.with_ymd_and_hms(2025, 3, 2, 3, 0, 0).unwrap();
    storage.save(&moved).await.unwrap();

    let mut fired = reminder.clone();
    fired.completion = CompletionState::Completed;
    fired.executed_at = Some(Utc::now());

    assert!(
        storage
            .save_fired(&fired, registered_at)
            .await
            .unwrap()
            .is_none()
    );
    let stored = storage.get(reminder.id).await.unwrap().unwrap();
    assert_eq!(stored.completion, CompletionState::Pending);
}

#[tokio::test]
async fn pending_reminders_and_owner_filters() {
    let storage = SqliteReminderStorage::new(pool().await);
    let first = storage
        .insert(new_reminder(1, "Take medicine", 5))
        .await
        .unwrap();
    let second = storage
        .insert(new_reminder(1, "Call grandma", 2))
        .await
        .unwrap();
    let other = storage
        .insert(new_reminder(2, "Pay the rent", 4))
        .await
        .unwrap();

    let mut snoozed = second.clone();
    snoozed.snooze = SnoozeState::Snoozed;
    snoozed.ever_snoozed = true;
    storage.save(&snoozed).await.unwrap();

    let mut fired = first.clone();
    fired.completion = CompletionState::Completed;
    fired.executed_at = Some(Utc::now());
    storage.save_fired(&fired, first.scheduled_at).await.unwrap();

    let pending: Vec<_> = storage
        .load_pending()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(pending, vec![second.id, other.id]);

    let ids = |reminders: Vec<remindme_models::reminder::Reminder>| -> Vec<i64> {
        reminders.into_iter().map(|r| r.id).collect()
    };
    assert_eq!(
        ids(storage.list_for_owner(1, ReminderFilter::All).await.unwrap()),
        vec![second.id, first.id]
    );
    assert_eq!(
        ids(storage.list_for_owner(1, ReminderFilter::Active).await.unwrap()),
        vec![second.id]
    );
    assert_eq!(
        ids(storage.list_for_owner(1, ReminderFilter::Completed).await.unwrap()),
        vec![first.id]
    );
    assert_eq!(
        ids(storage.list_for_owner(1, ReminderFilter::Snoozed).await.unwrap()),
        vec![second.id]
    );
    assert_eq!(storage.count_for_owner(1).await.unwrap(), 2);
}

#[tokio::test]
async fn device_tokens_are_upserted_and_removed() {
    let storage = SqliteDeviceTokenStorage::new(pool().await);

    let phone = storage.upsert(1, "token-phone").await.unwrap();
    let tablet = storage.upsert(1, "token-tablet").await.unwrap();
    let refreshed = storage.upsert(1, "token-phone").await.unwrap();

    assert_eq!(phone.id, refreshed.id);
    assert!(refreshed.updated_at >= phone.updated_at);

    let tokens: Vec<_> = storage
        .list_for_owner(1)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.token)
        .collect();
    assert_eq!(tokens, vec!["token-phone", "token-tablet"]);

    assert!(storage.remove(&tablet.token).await.unwrap());
    assert!(!storage.remove(&tablet.token).await.unwrap());
    assert_eq!(storage.list_for_owner(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_lifecycle_values_are_reported_as_corrupted() {
    let pool = pool().await;
    let storage = SqliteReminderStorage::new(pool.clone());
    let created = storage
        .insert(new_reminder(7, "Take medicine", 3))
        .await
        .unwrap();

    sqlx::query("UPDATE reminders SET snooze_state = 'Dozing' WHERE id = ?")
        .bind(created.id)
        .execute(&pool)
        .await
        .unwrap();

    assert!(matches!(
        storage.get(created.id).await,
        Err(StorageError::Corrupted(_))
    ));
}
