use std::sync::{Arc, Mutex};
use std::time::Duration;

use warden::errors::{Result, WardenError};
use warden::notify::{AlertContext, NotificationChannel};
use warden::sinks::LogSink;
use warden::types::BoxFuture;

/// Shared, ordered list of strings written by fakes.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn snapshot(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

/// Parse every NDJSON line captured by a [`MemorySink`].
pub fn parsed_records(lines: &Journal) -> Vec<serde_json::Value> {
    snapshot(lines)
        .iter()
        .map(|line| serde_json::from_str(line).expect("sink received invalid JSON"))
        .collect()
}

/// Log sink that keeps every line in memory.
pub struct MemorySink {
    lines: Journal,
    fail_writes: bool,
}

impl MemorySink {
    pub fn new(lines: Journal) -> Self {
        Self {
            lines,
            fail_writes: false,
        }
    }

    pub fn failing(lines: Journal) -> Self {
        Self {
            lines,
            fail_writes: true,
        }
    }
}

impl LogSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn init(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async { Ok(()) })
    }

    fn write<'a>(&'a mut self, line: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if self.fail_writes {
                return Err(WardenError::write("memory", "disk full"));
            }
            self.lines.lock().unwrap().push(line.to_string());
            Ok(())
        })
    }
}

/// Notification channel that journals `<name>:start` / `<name>:end` around
/// each send and keeps the alerts it received.
pub struct RecordingChannel {
    name: String,
    journal: Journal,
    alerts: Arc<Mutex<Vec<AlertContext>>>,
    delay: Duration,
    fail: bool,
}

impl RecordingChannel {
    pub fn new(name: &str, journal: Journal) -> Self {
        Self {
            name: name.to_string(),
            journal,
            alerts: Arc::new(Mutex::new(Vec::new())),
            delay: Duration::ZERO,
            fail: false,
        }
    }

    /// Hold each send open for `delay` before completing.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn alerts(&self) -> Arc<Mutex<Vec<AlertContext>>> {
        Arc::clone(&self.alerts)
    }

    pub fn boxed(self) -> Box<dyn NotificationChannel> {
        Box::new(self)
    }
}

impl NotificationChannel for RecordingChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async { Ok(()) })
    }

    fn send<'a>(&'a mut self, alert: &'a AlertContext) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.journal
                .lock()
                .unwrap()
                .push(format!("{}:start", self.name));

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            self.alerts.lock().unwrap().push(alert.clone());
            self.journal
                .lock()
                .unwrap()
                .push(format!("{}:end", self.name));

            if self.fail {
                return Err(WardenError::send(&self.name, "connection refused"));
            }
            Ok(())
        })
    }
}
