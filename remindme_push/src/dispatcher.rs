use std::sync::Arc;

use remindme_models::reminder::Reminder;
use remindme_storage::DeviceTokenStorage;
use tokio::task::JoinSet;

use crate::{PushError, PushMessage, PushProvider};

#[cfg(test)]
mod tests;

/// Outcome of one fan-out to the owner's devices.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub attempted: usize,
    pub delivered: usize,
    pub pruned: usize,
    pub failed: usize,
}

/// Sends a reminder notification to every device its owner registered.
///
/// Individual delivery failures never fail the dispatch. Tokens the provider reports
/// as permanently invalid are removed from storage.
pub struct NotificationDispatcher {
    devices: Arc<dyn DeviceTokenStorage>,
    provider: Arc<dyn PushProvider>,
}

impl NotificationDispatcher {
    pub fn new(devices: Arc<dyn DeviceTokenStorage>, provider: Arc<dyn PushProvider>) -> Self {
        Self { devices, provider }
    }

    pub async fn dispatch(&self, reminder: &Reminder) -> DispatchReport {
        let mut report = DispatchReport::default();

        let tokens = match self.devices.list_for_owner(reminder.owner_id).await {
            Ok(tokens) => tokens,
            Err(err) => {
                log::error!(
                    "Failed to list device tokens [reminder_id = {}, owner_id = {}]: {err}",
                    reminder.id,
                    reminder.owner_id
                );
                return report;
            }
        };

        if tokens.is_empty() {
            log::info!(
                "No devices registered, nothing to dispatch [reminder_id = {}, owner_id = {}]",
                reminder.id,
                reminder.owner_id
            );
            return report;
        }

        let message = Arc::new(PushMessage::for_reminder(reminder));
        let mut sends = JoinSet::new();
        for device in tokens {
            let provider = self.provider.clone();
            let message = message.clone();
            sends.spawn(async move {
                let result = provider.send(&device.token, &message).await;
                (device.token, result)
            });
        }

        while let Some(joined) = sends.join_next().await {
            report.attempted += 1;
            match joined {
                Ok((_, Ok(()))) => report.delivered += 1,
                Ok((token, Err(err))) => {
                    self.handle_failure(reminder, &token, err, &mut report)
                        .await
                }
                Err(join_err) => {
                    log::error!(
                        "Push task failed [reminder_id = {}]: {join_err}",
                        reminder.id
                    );
                    report.failed += 1;
                }
            }
        }

        log::info!(
            "Dispatched reminder [reminder_id = {}, attempted = {}, delivered = {}, pruned = {}, failed = {}]",
            reminder.id,
            report.attempted,
            report.delivered,
            report.pruned,
            report.failed
        );

        report
    }

    async fn handle_failure(
        &self,
        reminder: &Reminder,
        token: &str,
        err: PushError,
        report: &mut DispatchReport,
    ) {
        report.failed += 1;

        if !err.is_invalid_token() {
            log::warn!(
                "Push delivery failed [reminder_id = {}, owner_id = {}]: {err}",
                reminder.id,
                reminder.owner_id
            );
            return;
        }

        match self.devices.remove(token).await {
            Ok(_) => {
                log::info!(
                    "Pruned invalid device token [reminder_id = {}, owner_id = {}]",
                    reminder.id,
                    reminder.owner_id
                );
                report.pruned += 1;
            }
            Err(remove_err) => log::error!(
                "Failed to prune invalid device token [owner_id = {}]: {remove_err}",
                reminder.owner_id
            ),
        }
    }
}
