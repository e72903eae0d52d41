// src/notify/dispatch.rs

use tracing::{debug, error, info};

use crate::errors::Result;

use super::{AlertContext, NotificationChannel};

/// Sequential fan-out of alerts.
///
/// Channels are sent to in configuration order; each send is awaited to
/// completion (success or failure) before the next channel starts, so at
/// most one send is in flight. A failing channel does not stop the others;
/// the first failure is returned after every channel has been attempted.
#[derive(Default)]
pub struct Notifier {
    channels: Vec<Box<dyn NotificationChannel>>,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.channels.iter().map(|c| c.name().to_string()).collect();
        f.debug_struct("Notifier").field("channels", &names).finish()
    }
}

impl Notifier {
    pub fn new(channels: Vec<Box<dyn NotificationChannel>>) -> Self {
        Self { channels }
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub async fn dispatch(&mut self, alert: &AlertContext) -> Result<()> {
        if self.channels.is_empty() {
            debug!(
                notification_type = %alert.notification_type,
                "no notification channels configured"
            );
            return Ok(());
        }

        let mut first_error = None;

        for channel in self.channels.iter_mut() {
            debug!(
                channel = %channel.name(),
                notification_type = %alert.notification_type,
                "sending notification"
            );

            match channel.send(alert).await {
                Ok(()) => {
                    info!(
                        channel = %channel.name(),
                        notification_type = %alert.notification_type,
                        "notification sent"
                    );
                }
                Err(err) => {
                    error!(
                        channel = %channel.name(),
                        error = %err,
                        "notification channel failed"
                    );
                    first_error.get_or_insert(err);
                }
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}
