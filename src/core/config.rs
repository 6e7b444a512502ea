//! # Configuration
//!
//! Environment-driven settings for the todo host. Values come from the
//! process environment (optionally seeded from a `.env` file by the binary).
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

/// Placeholder glyph for items created without an emoji
pub const DEFAULT_EMOJI: &str = "📝";

/// Default env_logger filter
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// JSON file holding the full item list
    pub data_file: PathBuf,
    pub log_level: String,
    /// When false the scheduler never grants reminder permission
    pub reminders_enabled: bool,
    /// External program used to deliver fired reminders (e.g. `notify-send`)
    pub notify_command: Option<String>,
    pub default_emoji: String,
}

impl Config {
    /// Build the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_file = match non_empty(lookup("TWODO_DATA_FILE")) {
            Some(path) => PathBuf::from(path),
            None => {
                let home = non_empty(lookup("HOME"))
                    .context("HOME is not set and TWODO_DATA_FILE was not provided")?;
                PathBuf::from(home).join(".twodo").join("todos.json")
            }
        };

        let log_level =
            non_empty(lookup("LOG_LEVEL")).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        let reminders_enabled = match non_empty(lookup("TWODO_REMINDERS")) {
            None => true,
            Some(v) => match v.to_lowercase().as_str() {
                "enabled" | "true" | "on" | "1" => true,
                "disabled" | "false" | "off" | "0" => false,
                other => {
                    return Err(anyhow!(
                        "Invalid TWODO_REMINDERS value '{}': expected enabled or disabled",
                        other
                    ))
                }
            },
        };

        let notify_command = non_empty(lookup("TWODO_NOTIFY_COMMAND"));

        let default_emoji = match lookup("TWODO_DEFAULT_EMOJI") {
            None => DEFAULT_EMOJI.to_string(),
            Some(v) if v.trim().is_empty() => {
                return Err(anyhow!("TWODO_DEFAULT_EMOJI must not be blank"))
            }
            Some(v) => v.trim().to_string(),
        };

        Ok(Config {
            data_file,
            log_level,
            reminders_enabled,
            notify_command,
            default_emoji,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
