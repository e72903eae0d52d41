use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::Serialize;

/// Boxed, `Send` future returned by the plugin traits (`LogSink`,
/// `NotificationChannel`, `ChildBackend`).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Category of an event log record.
///
/// Only `supervisor` records are mirrored to the console; `app-error`
/// records also feed the stderr window used for crash diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryType {
    Supervisor,
    AppOutput,
    AppError,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Supervisor => "supervisor",
            EntryType::AppOutput => "app-output",
            EntryType::AppError => "app-error",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-facing severity used when mirroring supervisor records to the
/// console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleLevel {
    Error,
    Important,
    Success,
    Warning,
    #[default]
    Message,
}

impl ConsoleLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsoleLevel::Error => "error",
            ConsoleLevel::Important => "important",
            ConsoleLevel::Success => "success",
            ConsoleLevel::Warning => "warning",
            ConsoleLevel::Message => "message",
        }
    }
}

/// Classification attached to every crash alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NotificationType {
    /// Ordinary crash; a restart is pending.
    #[serde(rename = "app-crash")]
    Crash,
    /// The configured restart limit has been reached.
    #[serde(rename = "app-restart-limit")]
    RestartLimitReached,
    /// Restarts are disabled in the configuration.
    #[serde(rename = "app-no-restart")]
    NoRestartAllowed,
}

impl NotificationType {
    pub fn code(&self) -> &'static str {
        match self {
            NotificationType::Crash => "app-crash",
            NotificationType::RestartLimitReached => "app-restart-limit",
            NotificationType::NoRestartAllowed => "app-no-restart",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Which pipe of the child a chunk of output came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}
