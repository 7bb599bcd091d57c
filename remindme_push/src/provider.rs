use async_trait::async_trait;
use remindme_models::reminder::Reminder;
use thiserror::Error;

pub const DEFAULT_BODY: &str = "You have a scheduled reminder!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub image: Option<String>,
}

impl PushMessage {
    pub fn for_reminder(reminder: &Reminder) -> Self {
        let body = reminder
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
            .unwrap_or(DEFAULT_BODY)
            .to_string();

        Self {
            title: format!("Reminder: {}", reminder.title),
            body,
            image: reminder.images.first().cloned(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PushError {
    #[error("Device token is not registered with the push provider")]
    InvalidToken,

    #[error("Push provider rejected the message [status = {status}]: {message}")]
    Rejected { status: u16, message: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("Push client is shut down")]
    ShutDown,
}

impl PushError {
    /// Only a permanently invalid token justifies forgetting the device.
    pub fn is_invalid_token(&self) -> bool {
        matches!(self, PushError::InvalidToken)
    }
}

#[async_trait]
pub trait PushProvider: Send + Sync + 'static {
    async fn send(&self, token: &str, message: &PushMessage) -> Result<(), PushError>;
}
