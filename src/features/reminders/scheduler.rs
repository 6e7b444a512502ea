//! # Reminder Scheduler
//!
//! The capability the todo store uses to arm, replace and cancel one-shot
//! reminders, plus an in-process implementation backed by tokio timers.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Replaced the polling loop with a capability trait and per-alarm timers
//! - 1.0.0: Initial release

use crate::core::{Config, SchedulingError};
use crate::features::reminders::notifier::{CommandNotifier, FiredReminder, LogNotifier, Notifier};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Schedules fire-once reminders addressed by an opaque id
#[async_trait]
pub trait ReminderScheduler: Send + Sync {
    /// Ask the host whether reminders may be displayed
    async fn request_permission(&self) -> bool;

    /// Arm a reminder for `fire_at` and return its id.
    ///
    /// When `existing_id` is given, any alarm under that id is cancelled
    /// first so the call replaces it instead of adding a duplicate.
    async fn schedule(
        &self,
        existing_id: Option<&str>,
        title: &str,
        fire_at: DateTime<Utc>,
    ) -> Result<String, SchedulingError>;

    /// Cancel a reminder. Unknown or already-fired ids are ignored.
    async fn cancel(&self, id: &str);
}

struct Alarm {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Runs reminders as tokio timers inside this process
pub struct LocalReminderScheduler {
    alarms: Arc<DashMap<String, Alarm>>,
    notifier: Arc<dyn Notifier>,
    /// `TWODO_REMINDERS`; only consulted when permission is requested
    enabled: bool,
    granted: AtomicBool,
    next_generation: AtomicU64,
}

impl LocalReminderScheduler {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            alarms: Arc::new(DashMap::new()),
            notifier,
            enabled: true,
            granted: AtomicBool::new(false),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Pick the notifier from `TWODO_NOTIFY_COMMAND` and honour `TWODO_REMINDERS`
    pub fn from_config(config: &Config) -> Self {
        let notifier: Arc<dyn Notifier> = match config
            .notify_command
            .as_deref()
            .and_then(CommandNotifier::from_command_line)
        {
            Some(command) => Arc::new(command),
            None => Arc::new(LogNotifier),
        };
        Self::new(notifier).with_enabled(config.reminders_enabled)
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Number of armed reminders that have not fired yet
    pub fn pending_count(&self) -> usize {
        self.alarms.len()
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.alarms.contains_key(id)
    }
}

#[async_trait]
impl ReminderScheduler for LocalReminderScheduler {
    async fn request_permission(&self) -> bool {
        let granted = self.enabled && self.notifier.is_available().await;
        self.granted.store(granted, Ordering::SeqCst);
        if granted {
            info!("🔔 Reminder permission granted");
        } else {
            warn!("🔕 Reminder permission denied; items will be saved without reminders");
        }
        granted
    }

    async fn schedule(
        &self,
        existing_id: Option<&str>,
        title: &str,
        fire_at: DateTime<Utc>,
    ) -> Result<String, SchedulingError> {
        if !self.granted.load(Ordering::SeqCst) {
            return Err(SchedulingError::PermissionDenied);
        }

        let now = Utc::now();
        if fire_at <= now {
            return Err(SchedulingError::FireTimeInPast { fire_at });
        }
        let delay = (fire_at - now)
            .to_std()
            .map_err(|e| SchedulingError::Platform(e.to_string()))?;

        let id = existing_id
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);

        // The entry stays locked until the new alarm is stored, so a timer
        // firing immediately cannot observe the slot before it is filled.
        let entry = self.alarms.entry(id.clone());
        if let Entry::Occupied(existing) = &entry {
            existing.get().handle.abort();
            debug!("Replacing reminder {}", id);
        }

        let alarms = Arc::clone(&self.alarms);
        let notifier = Arc::clone(&self.notifier);
        let reminder = FiredReminder {
            id: id.clone(),
            title: title.to_string(),
            fire_at,
        };
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            alarms.remove_if(&reminder.id, |_, alarm| alarm.generation == generation);
            if let Err(e) = notifier.deliver(&reminder).await {
                warn!("Failed to deliver reminder {}: {}", reminder.id, e);
            }
        });

        entry.insert(Alarm { generation, handle });
        debug!("⏰ Scheduled reminder {} for {}", id, fire_at);
        Ok(id)
    }

    async fn cancel(&self, id: &str) {
        if let Some((_, alarm)) = self.alarms.remove(id) {
            alarm.handle.abort();
            debug!("Cancelled reminder {}", id);
        }
    }
}

// Timer tasks hold their own clone of `alarms`, so the table can outlive the
// scheduler. Aborting every task here is what stops pending reminders and
// releases those clones.
impl Drop for LocalReminderScheduler {
    fn drop(&mut self) {
        for alarm in self.alarms.iter() {
            alarm.handle.abort();
        }
    }
}
