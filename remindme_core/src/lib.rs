mod coordinator;
mod error;
mod fire;
mod lifecycle;
mod locks;
mod service;
mod validation;

pub use coordinator::RescheduleCoordinator;
pub use error::{ReminderError, ValidationError};
pub use fire::ReminderFireHandler;
pub use lifecycle::{ReminderLifecycle, ReminderStateMachine, TransitionError};
pub use service::{CreateReminder, ReminderService, ReminderView};
