//! # Reminder Delivery
//!
//! Sinks that surface a fired reminder to the user. Displaying the actual
//! system notification is delegated to the host: either an external
//! program (`notify-send`, `terminal-notifier`, ...) or the log.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::path::Path;
use tokio::process::Command;

/// A reminder whose fire time has arrived
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredReminder {
    pub id: String,
    pub title: String,
    pub fire_at: DateTime<Utc>,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Whether this sink can display reminders at all
    async fn is_available(&self) -> bool;

    async fn deliver(&self, reminder: &FiredReminder) -> Result<()>;
}

/// Writes fired reminders to the log
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn is_available(&self) -> bool {
        true
    }

    async fn deliver(&self, reminder: &FiredReminder) -> Result<()> {
        info!("⏰ Reminder: {} (due {})", reminder.title, reminder.fire_at);
        Ok(())
    }
}

/// Runs an external program with the reminder title as its last argument
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    program: String,
    args: Vec<String>,
}

impl CommandNotifier {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a whitespace-separated command line, e.g. `notify-send -u critical`
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Locate the program directly or on PATH
    fn resolve(&self) -> bool {
        let program = Path::new(&self.program);
        if program.components().count() > 1 {
            return program.is_file();
        }
        std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
            .unwrap_or(false)
    }
}

#[async_trait]
impl Notifier for CommandNotifier {
    async fn is_available(&self) -> bool {
        let found = self.resolve();
        if !found {
            debug!("Notify command '{}' not found", self.program);
        }
        found
    }

    async fn deliver(&self, reminder: &FiredReminder) -> Result<()> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(&reminder.title)
            .status()
            .await
            .map_err(|e| anyhow!("Failed to run {}: {}", self.program, e))?;

        if !status.success() {
            return Err(anyhow!("{} exited with {}", self.program, status));
        }
        debug!("Delivered reminder {} via {}", reminder.id, self.program);
        Ok(())
    }
}
