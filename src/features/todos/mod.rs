//! # Feature: Todo Items
//!
//! The item store: owns the task list, keeps it durable and keeps each
//! item's reminder aligned with its due date.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod item;
pub mod persistence;
pub mod reconcile;
pub mod store;

pub use item::TodoItem;
pub use persistence::{JsonFileRepository, MemoryRepository, TodoRepository};
pub use reconcile::ReminderAction;
pub use store::TodoStore;
