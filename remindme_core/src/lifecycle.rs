use chrono::{DateTime, Utc};
use remindme_models::{
    chrono_tz::Tz,
    reminder::{CompletionState, Reminder, ReminderId, SnoozeState},
};
use thiserror::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReminderLifecycle {
    Pending,
    Snoozed,
    Completed,
}

impl ReminderLifecycle {
    pub fn of(reminder: &Reminder) -> Self {
        if reminder.is_completed() {
            ReminderLifecycle::Completed
        } else if reminder.is_snoozed() {
            ReminderLifecycle::Snoozed
        } else {
            ReminderLifecycle::Pending
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("reminder {0} is already completed")]
    AlreadyCompleted(ReminderId),

    #[error(
        "fire for reminder {reminder_id} registered at {registered_at} was superseded by {scheduled_at}"
    )]
    Superseded {
        reminder_id: ReminderId,
        registered_at: DateTime<Utc>,
        scheduled_at: DateTime<Utc>,
    },
}

/// Legal transitions of a reminder. Every transition returns the updated record
/// and leaves persisting it to the caller.
pub struct ReminderStateMachine;

impl ReminderStateMachine {
    /// Moves the trigger instant. Pending and snoozed reminders keep their state.
    pub fn reschedule(
        reminder: &Reminder,
        instant: DateTime<Utc>,
        timezone: Tz,
    ) -> Result<Reminder, TransitionError> {
        Self::ensure_open(reminder)?;

        Ok(Reminder {
            scheduled_at: instant,
            timezone,
            ..reminder.clone()
        })
    }

    pub fn snooze(
        reminder: &Reminder,
        instant: DateTime<Utc>,
        timezone: Tz,
    ) -> Result<Reminder, TransitionError> {
        Self::ensure_open(reminder)?;

        Ok(Reminder {
            scheduled_at: instant,
            timezone,
            snooze: SnoozeState::Snoozed,
            ever_snoozed: true,
            ..reminder.clone()
        })
    }

    /// Completes a reminder whose trigger registered for `registered_at` elapsed.
    ///
    /// A reminder that has moved to another instant since the trigger was
    /// registered is [`TransitionError::Superseded`].
    pub fn fire(
        reminder: &Reminder,
        registered_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Reminder, TransitionError> {
        Self::ensure_open(reminder)?;

        if reminder.scheduled_at != registered_at {
            return Err(TransitionError::Superseded {
                reminder_id: reminder.id,
                registered_at,
                scheduled_at: reminder.scheduled_at,
            });
        }

        Ok(Reminder {
            completion: CompletionState::Completed,
            snooze: SnoozeState::None,
            executed_at: Some(now),
            ..reminder.clone()
        })
    }

    fn ensure_open(reminder: &Reminder) -> Result<(), TransitionError> {
        match ReminderLifecycle::of(reminder) {
            ReminderLifecycle::Completed => Err(TransitionError::AlreadyCompleted(reminder.id)),
            ReminderLifecycle::Pending | ReminderLifecycle::Snoozed => Ok(()),
        }
    }
}
