mod appsettings;

use std::sync::Arc;

use anyhow::Context;
use remindme_core::{ReminderFireHandler, ReminderService};
use remindme_push::{FcmPushProvider, NotificationDispatcher};
use remindme_scheduler::{ReminderScheduler, TriggerScheduler};
use remindme_storage::sqlite::{self, SqliteDeviceTokenStorage, SqliteReminderStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let settings = appsettings::load().context("Failed to load settings")?;

    let pool = sqlite::connect(&settings.database.url)
        .await
        .context("Failed to open database")?;
    sqlite::migrate(&pool)
        .await
        .context("Failed to run migrations")?;

    let reminders = Arc::new(SqliteReminderStorage::new(pool.clone()));
    let devices = Arc::new(SqliteDeviceTokenStorage::new(pool.clone()));

    let push = Arc::new(
        FcmPushProvider::new(&settings.push).context("Failed to build push client")?,
    );
    let dispatcher = Arc::new(NotificationDispatcher::new(devices.clone(), push.clone()));
    let fire_handler = Arc::new(ReminderFireHandler::new(reminders.clone(), dispatcher));
    let scheduler = Arc::new(TriggerScheduler::new(fire_handler));

    let service = ReminderService::new(reminders, devices, scheduler.clone(), settings.limits);
    let rehydrated = service
        .rehydrate()
        .await
        .context("Failed to rehydrate pending reminders")?;
    log::info!("Started with {rehydrated} pending triggers");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    log::info!("Shutdown requested");

    scheduler.shutdown().await;
    push.shutdown();
    pool.close().await;

    log::info!("Shutdown complete");
    Ok(())
}
