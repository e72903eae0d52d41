// src/notify/registry.rs

//! `type` string → notification channel factory.

use tracing::info;

use crate::config::PluginConfig;
use crate::errors::{Result, WardenError};

use super::{ConsoleChannel, NotificationChannel, WebhookChannel};

pub type ChannelFactory = fn(&PluginConfig) -> Result<Box<dyn NotificationChannel>>;

const FACTORIES: &[(&str, ChannelFactory)] = &[
    ("webhook", WebhookChannel::from_config),
    ("console", ConsoleChannel::from_config),
];

pub fn is_known(kind: &str) -> bool {
    factory_for(kind).is_some()
}

pub fn known_kinds() -> Vec<&'static str> {
    FACTORIES.iter().map(|(kind, _)| *kind).collect()
}

fn factory_for(kind: &str) -> Option<ChannelFactory> {
    FACTORIES
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, factory)| *factory)
}

pub fn build(cfg: &PluginConfig) -> Result<Box<dyn NotificationChannel>> {
    let factory = factory_for(&cfg.kind).ok_or_else(|| {
        WardenError::init(
            format!("notification '{}'", cfg.kind),
            "unknown notification type",
        )
    })?;
    factory(cfg)
}

/// Construct and initialise every configured channel, in order. The first
/// failure aborts startup.
pub async fn build_all(cfgs: &[PluginConfig]) -> Result<Vec<Box<dyn NotificationChannel>>> {
    let mut channels = Vec::with_capacity(cfgs.len());
    for cfg in cfgs {
        let mut channel = build(cfg)?;
        channel.init().await?;
        info!(channel = %channel.name(), "notification channel initialised");
        channels.push(channel);
    }
    Ok(channels)
}
