pub mod device;
pub mod reminder;
pub mod settings;
pub mod time;
pub mod user;

pub use chrono;
pub use chrono_tz;
