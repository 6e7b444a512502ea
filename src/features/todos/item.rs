//! # Todo Item
//!
//! The persisted task record and the input normalisation applied before
//! anything reaches the store's list.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use crate::core::{ValidationError, DEFAULT_EMOJI};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    /// Assigned at creation, never reassigned
    pub id: Uuid,

    /// Trimmed, never empty
    pub title: String,

    #[serde(default = "default_emoji")]
    pub emoji: String,

    /// Absent means no reminder
    pub due_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub is_completed: bool,

    /// Handle of the reminder currently armed for this item, if any
    #[serde(default)]
    pub notification_id: Option<String>,
}

fn default_emoji() -> String {
    DEFAULT_EMOJI.to_string()
}

impl TodoItem {
    /// Fresh, incomplete item without a reminder
    pub fn new(title: impl Into<String>, emoji: impl Into<String>, due_date: Option<DateTime<Utc>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            emoji: emoji.into(),
            due_date,
            is_completed: false,
            notification_id: None,
        }
    }

    /// Text shown when the reminder fires
    pub fn reminder_title(&self) -> String {
        format!("{} {}", self.emoji, self.title)
    }

    pub fn is_due_after(&self, now: DateTime<Utc>) -> bool {
        self.due_date.is_some_and(|due| due > now)
    }
}

/// Trim a title and reject it when nothing is left
pub fn normalize_title(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

/// Fall back to `placeholder` for a missing or blank emoji
pub fn normalize_emoji(raw: Option<&str>, placeholder: &str) -> String {
    match raw.map(str::trim) {
        Some(emoji) if !emoji.is_empty() => emoji.to_string(),
        _ => placeholder.to_string(),
    }
}
