// Core layer - configuration, errors and due-time helpers
pub mod core;

// Features layer - todo store and reminders
pub mod features;

pub use crate::core::Config;

pub use features::{
    // Reminders
    LocalReminderScheduler, ReminderScheduler,
    // Todos
    TodoItem, TodoStore,
};
