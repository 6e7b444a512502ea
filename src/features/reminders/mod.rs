//! # Reminders Feature
//!
//! One-shot local reminders tied to item due dates. The store consumes the
//! [`ReminderScheduler`] capability; [`LocalReminderScheduler`] is the
//! in-process adapter used by the host binary.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 2.0.0: Scheduler is an injected capability with pluggable delivery
//! - 1.0.0: Initial release

pub mod notifier;
pub mod scheduler;

#[cfg(test)]
pub mod testing;

pub use notifier::{CommandNotifier, FiredReminder, LogNotifier, Notifier};
pub use scheduler::{LocalReminderScheduler, ReminderScheduler};
