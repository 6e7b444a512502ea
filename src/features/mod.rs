//! # Features
//!
//! - `todos`: item store, persistence and reminder reconciliation
//! - `reminders`: reminder scheduler capability and local adapter

pub mod reminders;
pub mod todos;

pub use reminders::{LocalReminderScheduler, ReminderScheduler};
pub use todos::{TodoItem, TodoStore};
