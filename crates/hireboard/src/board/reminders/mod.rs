//! Deadline reminder workflow: the qualification window, the sent-marker
//! deduplication, and the owned recurring scheduler.

pub mod scheduler;
pub mod service;

pub use scheduler::ReminderScheduler;
pub use service::{
    days_until, DeadlineNotification, ReminderError, ReminderOutcome, ReminderService,
    REMINDER_WINDOW_DAYS,
};
