use remindme_models::{
    chrono_tz::Tz,
    reminder::{CompletionState, Reminder, SnoozeState},
};

use crate::{StorageError, sqlite::instant_from_millis};

#[derive(sqlx::FromRow)]
pub struct ReminderStorageModel {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub notes: Option<String>,
    pub scheduled_at_ms: i64,
    pub timezone: String,
    pub completion_state: String,
    pub snooze_state: String,
    pub ever_snoozed: i64,
    pub executed_at_ms: Option<i64>,
    pub images: String,
    pub created_at_ms: i64,
}

impl TryFrom<&Reminder> for ReminderStorageModel {
    type Error = StorageError;

    fn try_from(value: &Reminder) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            owner_id: value.owner_id,
            title: value.title.clone(),
            notes: value.notes.clone(),
            scheduled_at_ms: value.scheduled_at.timestamp_millis(),
            timezone: value.timezone.name().to_string(),
            completion_state: convert_completion(value.completion).to_string(),
            snooze_state: convert_snooze(value.snooze).to_string(),
            ever_snoozed: i64::from(value.ever_snoozed),
            executed_at_ms: value.executed_at.map(|at| at.timestamp_millis()),
            images: encode_images(&value.images)?,
            created_at_ms: value.created_at.timestamp_millis(),
        })
    }
}

impl TryFrom<ReminderStorageModel> for Reminder {
    type Error = StorageError;

    fn try_from(value: ReminderStorageModel) -> Result<Self, Self::Error> {
        let timezone = value.timezone.parse::<Tz>().map_err(|_| {
            StorageError::Corrupted(format!(
                "unknown timezone {:?} on reminder {}",
                value.timezone, value.id
            ))
        })?;
        let images = serde_json::from_str(&value.images).map_err(|e| {
            StorageError::Corrupted(format!("invalid images on reminder {}: {e}", value.id))
        })?;

        Ok(Self {
            id: value.id,
            owner_id: value.owner_id,
            title: value.title,
            notes: value.notes,
            scheduled_at: instant_from_millis(value.scheduled_at_ms)?,
            timezone,
            completion: parse_completion(&value.completion_state)?,
            snooze: parse_snooze(&value.snooze_state)?,
            ever_snoozed: value.ever_snoozed != 0,
            executed_at: value.executed_at_ms.map(instant_from_millis).transpose()?,
            images,
            created_at: instant_from_millis(value.created_at_ms)?,
        })
    }
}

pub fn encode_images(images: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(images)
        .map_err(|e| StorageError::Corrupted(format!("unable to encode images: {e}")))
}

pub fn convert_completion(state: CompletionState) -> &'static str {
    match state {
        CompletionState::Pending => "Pending",
        CompletionState::Completed => "Completed",
    }
}

pub fn convert_snooze(state: SnoozeState) -> &'static str {
    match state {
        SnoozeState::None => "None",
        SnoozeState::Snoozed => "Snoozed",
    }
}

fn parse_completion(state: &str) -> Result<CompletionState, StorageError> {
    match state {
        "Pending" => Ok(CompletionState::Pending),
        "Completed" => Ok(CompletionState::Completed),
        other => Err(StorageError::Corrupted(format!(
            "unknown completion state {other}"
        ))),
    }
}

fn parse_snooze(state: &str) -> Result<SnoozeState, StorageError> {
    match state {
        "None" => Ok(SnoozeState::None),
        "Snoozed" => Ok(SnoozeState::Snoozed),
        other => Err(StorageError::Corrupted(format!("unknown snooze state {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn unknown_completion_state_is_rejected(state in "[A-Za-z]{0,12}") {
            prop_assume!(state != "Pending" && state != "Completed");
            prop_assert!(parse_completion(&state).is_err());
        }

        #[test]
        fn unknown_snooze_state_is_rejected(state in "[A-Za-z]{0,12}") {
            prop_assume!(state != "None" && state != "Snoozed");
            prop_assert!(parse_snooze(&state).is_err());
        }

        #[test]
        fn timezone_name_survives_storage(index in 0usize..chrono_tz::TZ_VARIANTS.len()) {
            let timezone = chrono_tz::TZ_VARIANTS[index];
            let parsed: Tz = timezone.name().parse().unwrap();
            prop_assert_eq!(parsed, timezone);
        }
    }
}
