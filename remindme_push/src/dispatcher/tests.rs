use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use remindme_models::{
    chrono_tz::Tz,
    device::DeviceToken,
    reminder::{CompletionState, Reminder, SnoozeState},
    user::UserId,
};
use remindme_storage::{DeviceTokenStorage, InMemoryDeviceTokenStorage, StorageError};

use crate::{
    DEFAULT_BODY, DispatchReport, NotificationDispatcher,
    testing::{ScriptedOutcome, ScriptedPushProvider},
};

const OWNER: UserId = 7;

fn reminder(notes: Option<&str>) -> Reminder {
    Reminder {
        id: 1,
        owner_id: OWNER,
        title: "Take medicine".to_string(),
        notes: notes.map(str::to_string),
        scheduled_at: Utc.with_ymd_and_hms(2025, 3, 1, 3, 0, 0).unwrap(),
        timezone: Tz::Asia__Dhaka,
        completion: CompletionState::Completed,
        snooze: SnoozeState::None,
        ever_snoozed: false,
        executed_at: Some(Utc.with_ymd_and_hms(2025, 3, 1, 3, 0, 0).unwrap()),
        images: vec!["https://example.com/pill.png".to_string()],
        created_at: Utc.with_ymd_and_hms(2025, 2, 28, 12, 0, 0).unwrap(),
    }
}

struct TestContext {
    devices: Arc<InMemoryDeviceTokenStorage>,
    provider: Arc<ScriptedPushProvider>,
    dispatcher: NotificationDispatcher,
}

impl TestContext {
    async fn with_tokens(tokens: &[&str], provider: ScriptedPushProvider) -> Self {
        let devices = Arc::new(InMemoryDeviceTokenStorage::new());
        for token in tokens {
            devices.upsert(OWNER, token).await.unwrap();
        }
        let provider = Arc::new(provider);
        let dispatcher = NotificationDispatcher::new(devices.clone(), provider.clone());

        Self {
            devices,
            provider,
            dispatcher,
        }
    }

    async fn remaining_tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = self
            .devices
            .list_for_owner(OWNER)
            .await
            .unwrap()
            .into_iter()
            .map(|device| device.token)
            .collect();
        tokens.sort();
        tokens
    }
}

#[tokio::test]
async fn sends_to_every_registered_device() {
    let ctx = TestContext::with_tokens(&["token-a", "token-b"], ScriptedPushProvider::new()).await;

    let report = ctx.dispatcher.dispatch(&reminder(Some("Two pills"))).await;

    assert_eq!(
        report,
        DispatchReport {
            attempted: 2,
            delivered: 2,
            pruned: 0,
            failed: 0
        }
    );

    let sent = ctx.provider.sent();
    assert_eq!(sent.len(), 2);
    for (_, message) in sent {
        assert_eq!(message.title, "Reminder: Take medicine");
        assert_eq!(message.body, "Two pills");
        assert_eq!(message.image.as_deref(), Some("https://example.com/pill.png"));
    }
}

#[tokio::test]
async fn blank_notes_use_default_body() {
    let ctx = TestContext::with_tokens(&["token-a"], ScriptedPushProvider::new()).await;

    ctx.dispatcher.dispatch(&reminder(Some("   "))).await;

    let sent = ctx.provider.sent();
    assert_eq!(sent[0].1.body, DEFAULT_BODY);
}

#[tokio::test]
async fn no_devices_is_not_an_error() {
    let ctx = TestContext::with_tokens(&[], ScriptedPushProvider::new()).await;

    let report = ctx.dispatcher.dispatch(&reminder(None)).await;

    assert_eq!(report, DispatchReport::default());
    assert_eq!(ctx.provider.sent_count(), 0);
}

#[tokio::test]
async fn invalid_token_is_pruned_and_others_still_delivered() {
    let provider = ScriptedPushProvider::new()
        .with_outcome("token-stale", ScriptedOutcome::InvalidToken);
    let ctx = TestContext::with_tokens(&["token-a", "token-stale"], provider).await;

    let report = ctx.dispatcher.dispatch(&reminder(None)).await;

    assert_eq!(report.attempted, 2);
    assert_eq!(report.delivered, 1);
    assert_eq!(report.pruned, 1);
    assert_eq!(ctx.remaining_tokens().await, vec!["token-a".to_string()]);
}

#[tokio::test]
async fn transient_failure_keeps_token() {
    let provider =
        ScriptedPushProvider::new().with_outcome("token-a", ScriptedOutcome::Transient);
    let ctx = TestContext::with_tokens(&["token-a"], provider).await;

    let report = ctx.dispatcher.dispatch(&reminder(None)).await;

    assert_eq!(report.failed, 1);
    assert_eq!(report.pruned, 0);
    assert_eq!(ctx.remaining_tokens().await, vec!["token-a".to_string()]);
}

struct BrokenDeviceStorage;

#[async_trait]
impl DeviceTokenStorage for BrokenDeviceStorage {
    async fn list_for_owner(&self, _owner_id: UserId) -> Result<Vec<DeviceToken>, StorageError> {
        Err(StorageError::Corrupted("device table unavailable".to_string()))
    }

    async fn upsert(&self, _owner_id: UserId, _token: &str) -> Result<DeviceToken, StorageError> {
        Err(StorageError::Corrupted("device table unavailable".to_string()))
    }

    async fn remove(&self, _token: &str) -> Result<bool, StorageError> {
        Err(StorageError::Corrupted("device table unavailable".to_string()))
    }
}

#[tokio::test]
async fn listing_failure_yields_empty_report() {
    let provider = Arc::new(ScriptedPushProvider::new());
    let dispatcher = NotificationDispatcher::new(Arc::new(BrokenDeviceStorage), provider.clone());

    let report = dispatcher.dispatch(&reminder(None)).await;

    assert_eq!(report, DispatchReport::default());
    assert_eq!(provider.sent_count(), 0);
}
