mod dispatcher;
mod fcm;
mod provider;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use dispatcher::{DispatchReport, NotificationDispatcher};
pub use fcm::FcmPushProvider;
pub use provider::{DEFAULT_BODY, PushError, PushMessage, PushProvider};
