// src/notify/console.rs

use tracing::warn;

use crate::config::PluginConfig;
use crate::errors::Result;
use crate::types::BoxFuture;

use super::{AlertContext, NotificationChannel, render_alert};

/// Emits rendered alerts through `tracing` at warn level.
#[derive(Debug, Default)]
pub struct ConsoleChannel;

impl ConsoleChannel {
    pub fn from_config(_cfg: &PluginConfig) -> Result<Box<dyn NotificationChannel>> {
        Ok(Box::new(ConsoleChannel))
    }
}

impl NotificationChannel for ConsoleChannel {
    fn name(&self) -> &str {
        "console"
    }

    fn init(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async { Ok(()) })
    }

    fn send<'a>(&'a mut self, alert: &'a AlertContext) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            warn!(
                notification_type = %alert.notification_type,
                "\n{}",
                render_alert(alert)
            );
            Ok(())
        })
    }
}
