mod device;
mod error;
mod reminder;

pub mod in_memory;
pub mod sqlite;

pub use device::DeviceTokenStorage;
pub use error::StorageError;
pub use in_memory::{InMemoryDeviceTokenStorage, InMemoryReminderStorage};
pub use reminder::{NewReminder, ReminderFilter, ReminderStorage};
