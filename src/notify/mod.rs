// src/notify/mod.rs

//! Crash notifications.
//!
//! - [`NotificationChannel`] is implemented by every provider.
//! - [`AlertContext`] is the shared payload handed to each channel.
//! - [`dispatch::Notifier`] fans an alert out to all channels, one at a
//!   time.
//! - [`render`] turns an alert into the human-readable message providers
//!   transmit.
//! - [`registry`] maps `[[notifications]]` `type` strings to factories.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::AppSection;
use crate::errors::Result;
use crate::types::{BoxFuture, NotificationType};

pub mod console;
pub mod dispatch;
pub mod registry;
pub mod render;
pub mod webhook;

pub use console::ConsoleChannel;
pub use dispatch::Notifier;
pub use render::{format_uptime, render_alert};
pub use webhook::WebhookChannel;

/// How the supervised application is described in alerts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppIdentity {
    pub name: String,
    pub version: String,
    pub environment: String,
}

impl From<&AppSection> for AppIdentity {
    fn from(app: &AppSection) -> Self {
        Self {
            name: app.name.clone(),
            version: app.version.clone(),
            environment: app.environment.clone(),
        }
    }
}

/// Payload shared by every channel for a single crash.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertContext {
    pub notification_type: NotificationType,
    pub timestamp: DateTime<Utc>,
    pub app: AppIdentity,
    pub hostname: String,
    /// `"N"`, or `"N/max"` when a restart limit is configured.
    pub restart_count: String,
    pub message: String,
    /// Recent stderr; empty when the child printed nothing.
    pub stderr: String,
    pub app_started_at: Option<DateTime<Utc>>,
}

impl AlertContext {
    /// Child uptime at the time of the alert.
    pub fn uptime(&self) -> Option<chrono::Duration> {
        self.app_started_at.map(|started| self.timestamp - started)
    }
}

/// Trait implemented by every notification provider.
///
/// Construction (by a registry factory) validates configuration and `init`
/// prepares the provider; both fail with `InitError`. `send` fails with
/// `SendError` when the alert could not be delivered.
pub trait NotificationChannel: Send {
    fn name(&self) -> &str;

    fn init(&mut self) -> BoxFuture<'_, Result<()>>;

    fn send<'a>(&'a mut self, alert: &'a AlertContext) -> BoxFuture<'a, Result<()>>;
}
