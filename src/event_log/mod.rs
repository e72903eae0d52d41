// src/event_log/mod.rs

//! Structured lifecycle log.
//!
//! [`EventLog`] turns a [`LogEntry`] into a [`LogRecord`], serialises it as
//! one JSON line and writes it to the [`EventStream`], which fans it out to
//! the configured sinks. `supervisor` entries are also mirrored to the
//! console through `tracing`.

pub mod record;
pub mod stream;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{error, info, warn};

use crate::errors::Result;
use crate::types::{ConsoleLevel, EntryType};

pub use record::{LogEntry, LogRecord, elapsed_ms};
pub use stream::EventStream;

#[derive(Debug)]
pub struct EventLog {
    app_name: String,
    hostname: String,
    pid: u32,
    supervisor_started_at: DateTime<Utc>,
    stream: EventStream,
}

impl EventLog {
    pub fn new(
        app_name: impl Into<String>,
        hostname: impl Into<String>,
        stream: EventStream,
    ) -> Self {
        Self::with_start_time(app_name, hostname, stream, Utc::now())
    }

    /// Like [`EventLog::new`] with an explicit supervisor start time.
    pub fn with_start_time(
        app_name: impl Into<String>,
        hostname: impl Into<String>,
        stream: EventStream,
        supervisor_started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            hostname: hostname.into(),
            pid: std::process::id(),
            supervisor_started_at,
            stream,
        }
    }

    pub fn stream(&self) -> &EventStream {
        &self.stream
    }

    pub fn build_record(&self, entry: &LogEntry, now: DateTime<Utc>) -> LogRecord {
        LogRecord {
            app_name: self.app_name.clone(),
            hostname: self.hostname.clone(),
            pid: self.pid,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            app_uptime_ms: entry
                .app_started_at
                .map_or(0, |started| elapsed_ms(started, now)),
            supervisor_uptime_ms: elapsed_ms(self.supervisor_started_at, now),
            entry_type: entry.entry_type,
            message: entry.message.clone(),
            data: entry.data.clone(),
            error_context: entry.error_context.clone(),
        }
    }

    pub async fn record(&mut self, entry: LogEntry) -> Result<()> {
        self.record_at(entry, Utc::now()).await
    }

    pub async fn record_at(&mut self, entry: LogEntry, now: DateTime<Utc>) -> Result<()> {
        let record = self.build_record(&entry, now);

        if entry.entry_type == EntryType::Supervisor {
            mirror_to_console(&self.app_name, &entry);
        }

        let line = serde_json::to_string(&record)?;
        self.stream.write_line(&line).await
    }

    pub async fn flush(&mut self) -> Result<()> {
        self.stream.flush().await
    }
}

fn mirror_to_console(app: &str, entry: &LogEntry) {
    let severity = entry.level.as_str();
    match entry.level {
        ConsoleLevel::Error => error!(app, severity, "{}", entry.message),
        ConsoleLevel::Warning => warn!(app, severity, "{}", entry.message),
        ConsoleLevel::Important | ConsoleLevel::Success | ConsoleLevel::Message => {
            info!(app, severity, "{}", entry.message)
        }
    }
}

/// Hostname reported in records and alerts.
pub fn local_hostname() -> String {
    sysinfo::System::host_name().unwrap_or_else(|| "unknown".to_string())
}
