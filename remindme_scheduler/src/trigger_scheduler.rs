use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::{sync::RwLock, time};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use remindme_models::reminder::ReminderId;

use crate::{
    FireHandler, FiredTrigger, ReminderScheduler, ScheduleRequest, ScheduledTrigger,
    SchedulerError,
};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

struct TriggerHandle {
    generation: u64,
    fire_at: DateTime<Utc>,
    cancellation_token: CancellationToken,
}

impl TriggerHandle {
    fn cancel(&self) {
        self.cancellation_token.cancel();
    }
}

type TriggerStore = RwLock<HashMap<ReminderId, TriggerHandle>>;

/// One tokio task per pending trigger, indexed by reminder id.
///
/// Every trigger gets a generation number. A task that wakes up only fires if the
/// map still holds its own generation, so a replaced trigger can never fire.
pub struct TriggerScheduler {
    triggers: Arc<TriggerStore>,
    handler: Arc<dyn FireHandler>,
    generation: AtomicU64,
    shutdown: CancellationToken,
    tasks: TaskTracker,
}

impl TriggerScheduler {
    pub fn new(handler: Arc<dyn FireHandler>) -> Self {
        Self {
            triggers: Arc::new(RwLock::new(HashMap::new())),
            handler,
            generation: AtomicU64::new(0),
            shutdown: CancellationToken::new(),
            tasks: TaskTracker::new(),
        }
    }

    fn spawn_trigger(&self, request: ScheduleRequest, generation: u64) -> TriggerHandle {
        let cancellation_token = self.shutdown.child_token();
        let task_cancellation_token = cancellation_token.clone();
        let triggers = Arc::clone(&self.triggers);
        let handler = Arc::clone(&self.handler);
        let fired = FiredTrigger {
            reminder_id: request.reminder_id,
            fire_at: request.fire_at,
        };
        let delay = get_target_delay(request.fire_at, Utc::now());

        log::info!(
            "[SCHEDULE] Sleeping for {:?} delay. [reminder_id = {}, generation = {}]",
            delay,
            request.reminder_id,
            generation
        );

        self.tasks.spawn(async move {
            run_trigger(
                fired,
                generation,
                delay,
                task_cancellation_token,
                triggers,
                handler,
            )
            .await
        });

        TriggerHandle {
            generation,
            fire_at: request.fire_at,
            cancellation_token,
        }
    }
}

impl Drop for TriggerScheduler {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[async_trait]
impl ReminderScheduler for TriggerScheduler {
    async fn schedule(
        &self,
        schedule_request: ScheduleRequest,
    ) -> Result<ScheduledTrigger, SchedulerError> {
        if self.shutdown.is_cancelled() {
            return Err(SchedulerError::ShutDown);
        }

        let reminder_id = schedule_request.reminder_id;
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;

        let mut triggers = self.triggers.write().await;
        if self.shutdown.is_cancelled() {
            return Err(SchedulerError::ShutDown);
        }

        if let Some(previous) = triggers.remove(&reminder_id) {
            previous.cancel();
            log::info!(
                "[REPLACE] Cancelled previous trigger. [reminder_id = {}, previous_fire_at = {}, previous_generation = {}]",
                reminder_id,
                previous.fire_at,
                previous.generation
            );
        }

        let handle = self.spawn_trigger(schedule_request, generation);
        triggers.insert(reminder_id, handle);

        Ok(ScheduledTrigger {
            reminder_id,
            fire_at: schedule_request.fire_at,
            generation,
        })
    }

    async fn cancel(&self, reminder_id: ReminderId) -> bool {
        match self.triggers.write().await.remove(&reminder_id) {
            Some(handle) => {
                handle.cancel();
                log::info!("[CANCEL] Cancelled trigger. [reminder_id = {reminder_id}]");
                true
            }
            None => false,
        }
    }

    async fn pending(&self) -> Vec<ReminderId> {
        let mut ids: Vec<ReminderId> = self.triggers.read().await.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Cancels pending triggers and waits for fires that are already running.
    async fn shutdown(&self) {
        let cancelled = {
            let mut triggers = self.triggers.write().await;
            self.shutdown.cancel();
            triggers.drain().count()
        };

        log::info!("Scheduler shutting down, cancelled {cancelled} triggers");

        self.tasks.close();
        if time::timeout(SHUTDOWN_TIMEOUT, self.tasks.wait()).await.is_err() {
            log::warn!(
                "Scheduler shutdown timed out with {} tasks still running",
                self.tasks.len()
            );
        }
    }
}

async fn run_trigger(
    fired: FiredTrigger,
    generation: u64,
    delay: Duration,
    cancellation_token: CancellationToken,
    triggers: Arc<TriggerStore>,
    handler: Arc<dyn FireHandler>,
) {
    tokio::select! {
        biased;
        _ = cancellation_token.cancelled() => {
            log::debug!(
                "Trigger was cancelled. [reminder_id = {}, generation = {}]",
                fired.reminder_id,
                generation
            );
            return;
        }
        _ = time::sleep(delay) => {}
    }

    if !release_trigger(&triggers, fired.reminder_id, generation).await {
        log::info!(
            "Trigger was replaced before it could fire. [reminder_id = {}, generation = {}]",
            fired.reminder_id,
            generation
        );
        return;
    }

    log::info!(
        "[FIRE] Trigger elapsed. [reminder_id = {}, fire_at = {}]",
        fired.reminder_id,
        fired.fire_at
    );
    handler.on_fire(fired).await;
}

/// Removes the map entry if it still belongs to `generation`.
async fn release_trigger(
    triggers: &TriggerStore,
    reminder_id: ReminderId,
    generation: u64,
) -> bool {
    let mut triggers = triggers.write().await;
    match triggers.get(&reminder_id) {
        Some(handle) if handle.generation == generation => {
            triggers.remove(&reminder_id);
            true
        }
        _ => false,
    }
}

pub(crate) fn get_target_delay(fire_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (fire_at - now).to_std().unwrap_or(Duration::ZERO)
}
