//! # Reminder Reconciliation Policy
//!
//! Decides what the scheduler has to do so that an item's reminder matches
//! its current due date. Pure: the store executes the decision.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use crate::features::todos::item::TodoItem;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderAction {
    /// Arm (or replace) a reminder
    Schedule {
        existing_id: Option<String>,
        title: String,
        fire_at: DateTime<Utc>,
    },
    /// Drop the reminder the item still holds
    Cancel { notification_id: String },
    NoOp,
}

impl ReminderAction {
    /// Completed items and items without a future due date hold no reminder.
    pub fn plan(item: &TodoItem, now: DateTime<Utc>) -> Self {
        match item.due_date {
            Some(fire_at) if fire_at > now && !item.is_completed => ReminderAction::Schedule {
                existing_id: item.notification_id.clone(),
                title: item.reminder_title(),
                fire_at,
            },
            _ => match &item.notification_id {
                Some(id) => ReminderAction::Cancel {
                    notification_id: id.clone(),
                },
                None => ReminderAction::NoOp,
            },
        }
    }
}
