//! # Due Times
//!
//! Parsing and formatting helpers for item due dates, shared by
//! presentation layers. The store itself only ever sees
//! `DateTime<Utc>` values.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Utc};

/// Local wall-clock format accepted by [`parse_due`]
pub const LOCAL_DUE_FORMAT: &str = "%Y-%m-%d %H:%M";

// ============================================================================
// Parsing
// ============================================================================

/// Parse a compact duration such as `30m`, `2h`, `1d`, `1w` or `1h30m`.
///
/// Every number must carry a unit (`s`, `m`, `h`, `d`, `w`). Returns `None`
/// for malformed input or a zero total.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim().to_lowercase();
    let mut total_seconds: i64 = 0;
    let mut current_number = String::new();

    for c in input.chars() {
        if c.is_ascii_digit() {
            current_number.push(c);
            continue;
        }
        if current_number.is_empty() {
            return None;
        }
        let value: i64 = current_number.parse().ok()?;
        current_number.clear();

        let unit_seconds = match c {
            's' => 1,
            'm' => 60,
            'h' => 60 * 60,
            'd' => 60 * 60 * 24,
            'w' => 60 * 60 * 24 * 7,
            _ => return None,
        };
        total_seconds = total_seconds.checked_add(value.checked_mul(unit_seconds)?)?;
    }

    // Dangling number without a unit
    if !current_number.is_empty() || total_seconds == 0 {
        return None;
    }
    Duration::try_seconds(total_seconds)
}

/// Parse user input for a due date.
///
/// Accepted forms:
/// - `none` or `-` clears the due date (`Ok(None)`)
/// - a relative offset from `now`, e.g. `+45m` or `1h30m`
/// - an RFC 3339 timestamp
/// - local wall-clock time `YYYY-MM-DD HH:MM`
pub fn parse_due(input: &str, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Missing due time"));
    }
    if trimmed.eq_ignore_ascii_case("none") || trimmed == "-" {
        return Ok(None);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, LOCAL_DUE_FORMAT) {
        return Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|local| Some(local.with_timezone(&Utc)))
            .ok_or_else(|| anyhow!("'{}' does not exist in the local time zone", trimmed));
    }

    let offset = trimmed.strip_prefix('+').unwrap_or(trimmed);
    match parse_duration(offset) {
        Some(delta) => now
            .checked_add_signed(delta)
            .map(Some)
            .ok_or_else(|| anyhow!("Due time '{}' is too far in the future", trimmed)),
        None => Err(anyhow!(
            "Invalid due time '{}'. Use `30m`, `2h`, `1h30m`, `{}` or RFC 3339",
            trimmed,
            "YYYY-MM-DD HH:MM"
        )),
    }
}

// ============================================================================
// Formatting
// ============================================================================

fn plural(n: i64, unit: &str) -> String {
    format!("{} {}{}", n, unit, if n == 1 { "" } else { "s" })
}

/// Human-readable span, coarsened to the two most significant units
pub fn format_span(seconds: i64) -> String {
    let seconds = seconds.abs();
    if seconds < 60 {
        plural(seconds, "second")
    } else if seconds < 3600 {
        plural(seconds / 60, "minute")
    } else if seconds < 86400 {
        let (hours, mins) = (seconds / 3600, (seconds % 3600) / 60);
        if mins > 0 {
            format!("{} {}", plural(hours, "hour"), plural(mins, "minute"))
        } else {
            plural(hours, "hour")
        }
    } else {
        let (days, hours) = (seconds / 86400, (seconds % 86400) / 3600);
        if hours > 0 {
            format!("{} {}", plural(days, "day"), plural(hours, "hour"))
        } else {
            plural(days, "day")
        }
    }
}

/// "in 2 hours" / "5 minutes ago" / "now"
pub fn format_relative(due: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = (due - now).num_seconds();
    if delta == 0 {
        "now".to_string()
    } else if delta > 0 {
        format!("in {}", format_span(delta))
    } else {
        format!("{} ago", format_span(delta))
    }
}

/// Urgency bucket of a due date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    Overdue,
    /// Due within the next 24 hours
    Soon,
    Later,
}

impl DueStatus {
    pub fn of(due: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if due < now {
            DueStatus::Overdue
        } else if due <= now + Duration::hours(24) {
            DueStatus::Soon
        } else {
            DueStatus::Later
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            DueStatus::Overdue => "🔥",
            DueStatus::Soon => "⏰",
            DueStatus::Later => "📅",
        }
    }
}
