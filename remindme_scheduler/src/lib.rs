mod scheduler;
mod trigger_scheduler;

pub use scheduler::{
    FireHandler, FiredTrigger, ReminderScheduler, ScheduleRequest, ScheduledTrigger,
    SchedulerError,
};
pub use trigger_scheduler::TriggerScheduler;
