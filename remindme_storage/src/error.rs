use remindme_models::reminder::ReminderId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Reminder {0} does not exist")]
    ReminderNotFound(ReminderId),

    #[error("Reminder {0} is already completed")]
    ReminderCompleted(ReminderId),

    #[error("Stored record is corrupted: {0}")]
    Corrupted(String),
}
