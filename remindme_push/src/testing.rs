//! Push provider fakes for tests of crates that dispatch notifications.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;

use crate::{PushError, PushMessage, PushProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptedOutcome {
    #[default]
    Deliver,
    InvalidToken,
    Transient,
}

/// Provider that answers each token with a preconfigured outcome and records every
/// message it was asked to send.
#[derive(Default)]
pub struct ScriptedPushProvider {
    outcomes: Mutex<HashMap<String, ScriptedOutcome>>,
    sent: Mutex<Vec<(String, PushMessage)>>,
}

impl ScriptedPushProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outcome(self, token: &str, outcome: ScriptedOutcome) -> Self {
        self.set_outcome(token, outcome);
        self
    }

    pub fn set_outcome(&self, token: &str, outcome: ScriptedOutcome) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(token.to_string(), outcome);
    }

    pub fn sent(&self) -> Vec<(String, PushMessage)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl PushProvider for ScriptedPushProvider {
    async fn send(&self, token: &str, message: &PushMessage) -> Result<(), PushError> {
        self.sent
            .lock()
            .unwrap()
            .push((token.to_string(), message.clone()));

        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .get(token)
            .copied()
            .unwrap_or_default();

        match outcome {
            ScriptedOutcome::Deliver => Ok(()),
            ScriptedOutcome::InvalidToken => Err(PushError::InvalidToken),
            ScriptedOutcome::Transient => Err(PushError::Rejected {
                status: 503,
                message: "unavailable".to_string(),
            }),
        }
    }
}
