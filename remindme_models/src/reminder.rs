use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::{time, user::UserId};

pub type ReminderId = i64;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CompletionState {
    Pending,
    Completed,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SnoozeState {
    None,
    Snoozed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub id: ReminderId,
    pub owner_id: UserId,
    pub title: String,
    pub notes: Option<String>,
    /// Absolute trigger instant. `timezone` never reinterprets it.
    pub scheduled_at: DateTime<Utc>,
    pub timezone: Tz,
    pub completion: CompletionState,
    pub snooze: SnoozeState,
    pub ever_snoozed: bool,
    pub executed_at: Option<DateTime<Utc>>,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Reminder {
    pub fn is_completed(&self) -> bool {
        self.completion == CompletionState::Completed
    }

    pub fn is_snoozed(&self) -> bool {
        self.snooze == SnoozeState::Snoozed
    }

    /// Wall-clock time of the trigger in the reminder's own timezone.
    pub fn local_scheduled_at(&self) -> NaiveDateTime {
        time::to_local(self.scheduled_at, self.timezone)
    }
}
