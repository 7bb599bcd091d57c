pub mod device_storage;
pub mod reminder_storage;

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::StorageError;

pub use device_storage::SqliteDeviceTokenStorage;
pub use reminder_storage::SqliteReminderStorage;

pub async fn connect(url: &str) -> Result<SqlitePool, StorageError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    log::info!("Connected to database [url = {url}]");
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), StorageError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

fn instant_from_millis(millis: i64) -> Result<DateTime<Utc>, StorageError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| StorageError::Corrupted(format!("timestamp out of range: {millis}")))
}

#[cfg(test)]
mod tests;
