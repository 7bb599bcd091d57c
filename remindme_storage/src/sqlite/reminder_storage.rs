mod model;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use model::{ReminderStorageModel, convert_completion, convert_snooze, encode_images};
use remindme_models::{
    reminder::{CompletionState, Reminder, ReminderId, SnoozeState},
    user::UserId,
};

use crate::{NewReminder, ReminderFilter, ReminderStorage, StorageError};

pub struct SqliteReminderStorage {
    pool: sqlx::SqlitePool,
}

impl SqliteReminderStorage {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

fn into_reminders(models: Vec<ReminderStorageModel>) -> Result<Vec<Reminder>, StorageError> {
    models.into_iter().map(Reminder::try_from).collect()
}

#[async_trait]
impl ReminderStorage for SqliteReminderStorage {
    async fn get(&self, id: ReminderId) -> Result<Option<Reminder>, StorageError> {
        let reminder =
            sqlx::query_as::<_, ReminderStorageModel>("SELECT * FROM reminders WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        reminder.map(Reminder::try_from).transpose()
    }

    async fn insert(&self, reminder: NewReminder) -> Result<Reminder, StorageError> {
        let NewReminder {
            owner_id,
            title,
            notes,
            scheduled_at,
            timezone,
            images,
        } = reminder;
        let images = encode_images(&images)?;

        let created = sqlx::query_as::<_, ReminderStorageModel>(
            "
INSERT INTO reminders
    (owner_id, title, notes, scheduled_at_ms, timezone, completion_state, snooze_state, ever_snoozed, images, created_at_ms)
VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?, ?)
RETURNING *
",
        )
        .bind(owner_id)
        .bind(title)
        .bind(notes)
        .bind(scheduled_at.timestamp_millis())
        .bind(timezone.name())
        .bind(convert_completion(CompletionState::Pending))
        .bind(convert_snooze(SnoozeState::None))
        .bind(images)
        .bind(Utc::now().timestamp_millis())
        .fetch_one(&self.pool)
        .await?;

        created.try_into()
    }

    async fn save(&self, reminder: &Reminder) -> Result<Reminder, StorageError> {
        let ReminderStorageModel {
            id,
            title,
            notes,
            scheduled_at_ms,
            timezone,
            snooze_state,
            ever_snoozed,
            images,
            ..
        } = ReminderStorageModel::try_from(reminder)?;

        let updated = sqlx::query_as::<_, ReminderStorageModel>(
            "
UPDATE reminders
SET title = ?,
    notes = ?,
    scheduled_at_ms = ?,
    timezone = ?,
    snooze_state = ?,
    ever_snoozed = ?,
    images = ?
WHERE id = ? AND completion_state = ?
RETURNING *
",
        )
        .bind(title)
        .bind(notes)
        .bind(scheduled_at_ms)
        .bind(timezone)
        .bind(snooze_state)
        .bind(ever_snoozed)
        .bind(images)
        .bind(id)
        .bind(convert_completion(CompletionState::Pending))
        .fetch_optional(&self.pool)
        .await?;

        if let Some(updated) = updated {
            return updated.try_into();
        }

        if self.get(id).await?.is_some() {
            Err(StorageError::ReminderCompleted(id))
        } else {
            Err(StorageError::ReminderNotFound(id))
        }
    }

    async fn save_fired(
        &self,
        reminder: &Reminder,
        registered_at: DateTime<Utc>,
    ) -> Result<Option<Reminder>, StorageError> {
        let fired = sqlx::query_as::<_, ReminderStorageModel>(
            "
UPDATE reminders
SET completion_state = ?,
    snooze_state = ?,
    executed_at_ms = ?
WHERE id = ? AND completion_state = ? AND scheduled_at_ms = ?
RETURNING *
",
        )
        .bind(convert_completion(reminder.completion))
        .bind(convert_snooze(reminder.snooze))
        .bind(reminder.executed_at.map(|at| at.timestamp_millis()))
        .bind(reminder.id)
        .bind(convert_completion(CompletionState::Pending))
        .bind(registered_at.timestamp_millis())
        .fetch_optional(&self.pool)
        .await?;

        fired.map(Reminder::try_from).transpose()
    }

    async fn delete(&self, id: ReminderId) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM reminders WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn load_pending(&self) -> Result<Vec<Reminder>, StorageError> {
        let reminders = sqlx::query_as::<_, ReminderStorageModel>(
            "SELECT * FROM reminders WHERE completion_state = ? ORDER BY scheduled_at_ms, id",
        )
        .bind(convert_completion(CompletionState::Pending))
        .fetch_all(&self.pool)
        .await?;

        into_reminders(reminders)
    }

    async fn list_for_owner(
        &self,
        owner_id: UserId,
        filter: ReminderFilter,
    ) -> Result<Vec<Reminder>, StorageError> {
        let condition = match filter {
            ReminderFilter::All => "",
            ReminderFilter::Active => " AND completion_state = 'Pending'",
            ReminderFilter::Completed => " AND completion_state = 'Completed'",
            ReminderFilter::Snoozed => {
                " AND completion_state = 'Pending' AND snooze_state = 'Snoozed'"
            }
        };
        let query = format!(
            "SELECT * FROM reminders WHERE owner_id = ?{condition} ORDER BY scheduled_at_ms, id"
        );

        let reminders = sqlx::query_as::<_, ReminderStorageModel>(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        into_reminders(reminders)
    }

    async fn count_for_owner(&self, owner_id: UserId) -> Result<u64, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reminders WHERE owner_id = ?")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }
}
