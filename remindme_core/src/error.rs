use remindme_models::{reminder::ReminderId, time::TimeResolveError};
use remindme_storage::StorageError;
use thiserror::Error;

use crate::TransitionError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error(transparent)]
    Time(#[from] TimeResolveError),

    #[error("title must be between {min} and {max} characters, got {len}")]
    TitleLength { len: usize, min: usize, max: usize },

    #[error("notes must be at most {max} characters, got {len}")]
    NotesTooLong { len: usize, max: usize },

    #[error("image reference {0:?} is not an http(s) URL to a jpeg, jpg, png or gif")]
    InvalidImage(String),

    #[error("device token must not be empty")]
    EmptyDeviceToken,

    #[error("guest users can only create up to {limit} reminders")]
    ReminderLimitReached { limit: u64 },
}

#[derive(Debug, Error)]
pub enum ReminderError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("reminder {0} not found")]
    NotFound(ReminderId),

    #[error("reminder {0} is already completed")]
    InvalidState(ReminderId),

    #[error("storage failure: {0}")]
    Persistence(StorageError),
}

impl From<TimeResolveError> for ReminderError {
    fn from(err: TimeResolveError) -> Self {
        ReminderError::Validation(err.into())
    }
}

impl From<StorageError> for ReminderError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ReminderNotFound(id) => ReminderError::NotFound(id),
            StorageError::ReminderCompleted(id) => ReminderError::InvalidState(id),
            other => ReminderError::Persistence(other),
        }
    }
}

impl From<TransitionError> for ReminderError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::AlreadyCompleted(id) => ReminderError::InvalidState(id),
            TransitionError::Superseded { reminder_id, .. } => {
                ReminderError::InvalidState(reminder_id)
            }
        }
    }
}
