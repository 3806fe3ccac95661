//! Activity log shown under the progress bar.
//!
//! Keeps the most recent [`MAX_LOG_ENTRIES`] events of a session view:
//! uploads, tick failures, stop requests and terminal outcomes.

use std::collections::VecDeque;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::notice::Severity;

/// Entries kept in memory; older ones are dropped first.
pub const MAX_LOG_ENTRIES: usize = 100;

/// Log severity level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    /// Get CSS class for styling.
    pub fn css_class(&self) -> &'static str {
        match self {
            LogLevel::Info => "log-info",
            LogLevel::Success => "log-success",
            LogLevel::Warning => "log-warning",
            LogLevel::Error => "log-error",
        }
    }

    /// Get emoji prefix for display.
    pub fn emoji(&self) -> &'static str {
        match self {
            LogLevel::Info => "ℹ️",
            LogLevel::Success => "✅",
            LogLevel::Warning => "⚠️",
            LogLevel::Error => "❌",
        }
    }
}

impl From<Severity> for LogLevel {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Info => LogLevel::Info,
            Severity::Success => LogLevel::Success,
            Severity::Warning => LogLevel::Warning,
            Severity::Error => LogLevel::Error,
        }
    }
}

/// A single log entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Timestamp string (HH:MM:SS)
    pub timestamp: String,
}

/// Bounded, oldest-first log.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActivityLog {
    entries: VecDeque<LogEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry stamped with the local wall clock.
    pub fn push(&mut self, level: LogLevel, message: impl Into<String>) {
        self.push_at(level, message, chrono::Local::now().time());
    }

    pub fn push_at(&mut self, level: LogLevel, message: impl Into<String>, at: NaiveTime) {
        self.entries.push_back(LogEntry {
            level,
            message: message.into(),
            timestamp: at.format("%H:%M:%S").to_string(),
        });
        while self.entries.len() > MAX_LOG_ENTRIES {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_capped_oldest_first() {
        let mut log = ActivityLog::new();
        let at = NaiveTime::from_hms_opt(9, 5, 7).unwrap();
        for i in 0..(MAX_LOG_ENTRIES + 5) {
            log.push_at(LogLevel::Info, format!("tick {}", i), at);
        }
        assert_eq!(log.len(), MAX_LOG_ENTRIES);
        let first = log.entries().next().unwrap();
        assert_eq!(first.message, "tick 5");
        assert_eq!(first.timestamp, "09:05:07");
    }

    #[test]
    fn test_severity_maps_to_level() {
        assert_eq!(LogLevel::from(Severity::Warning), LogLevel::Warning);
        assert_eq!(LogLevel::Error.css_class(), "log-error");
    }
}
