// src/event_log/record.rs

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{ConsoleLevel, EntryType};

/// What the supervisor wants to log; turned into a [`LogRecord`] by the
/// `EventLog`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub entry_type: EntryType,
    pub message: String,
    pub data: Option<serde_json::Value>,
    pub error_context: Option<String>,
    /// Console severity; only meaningful for `supervisor` entries.
    pub level: ConsoleLevel,
    /// Start time of the current child, used for `appUptimeMs`.
    pub app_started_at: Option<DateTime<Utc>>,
}

impl LogEntry {
    pub fn new(entry_type: EntryType, message: impl Into<String>) -> Self {
        Self {
            entry_type,
            message: message.into(),
            data: None,
            error_context: None,
            level: ConsoleLevel::default(),
            app_started_at: None,
        }
    }

    pub fn supervisor(level: ConsoleLevel, message: impl Into<String>) -> Self {
        Self::new(EntryType::Supervisor, message).with_level(level)
    }

    pub fn app_output(text: impl Into<String>) -> Self {
        Self::new(EntryType::AppOutput, text)
    }

    pub fn app_error(text: impl Into<String>) -> Self {
        Self::new(EntryType::AppError, text)
    }

    pub fn with_level(mut self, level: ConsoleLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_error_context(mut self, context: impl Into<String>) -> Self {
        self.error_context = Some(context.into());
        self
    }

    pub fn with_app_started_at(mut self, started_at: Option<DateTime<Utc>>) -> Self {
        self.app_started_at = started_at;
        self
    }
}

/// One line of the internal event stream (serialised as NDJSON).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub app_name: String,
    pub hostname: String,
    pub pid: u32,
    /// UTC, ISO-8601 with millisecond precision.
    pub timestamp: String,
    pub app_uptime_ms: u64,
    pub supervisor_uptime_ms: u64,
    pub entry_type: EntryType,
    pub message: String,
    pub data: Option<serde_json::Value>,
    pub error_context: Option<String>,
}

/// Milliseconds between `since` and `now`, clamped at zero.
pub fn elapsed_ms(since: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    u64::try_from((now - since).num_milliseconds()).unwrap_or(0)
}
