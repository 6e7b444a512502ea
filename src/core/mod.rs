//! # Core Module
//!
//! Configuration, error taxonomy and due-time helpers shared by the
//! todo features and the host binary.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod config;
pub mod due;
pub mod error;

// Re-export commonly used items
pub use config::{Config, DEFAULT_EMOJI};
pub use due::{format_relative, parse_due, parse_duration, DueStatus};
pub use error::{PersistenceError, SchedulingError, ValidationError};
