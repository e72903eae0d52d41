// src/sinks/registry.rs

//! `type` string → sink factory.

use tracing::info;

use crate::config::PluginConfig;
use crate::errors::{Result, WardenError};

use super::{FileSink, LogSink, StdoutSink};

pub type SinkFactory = fn(&PluginConfig) -> Result<Box<dyn LogSink>>;

const FACTORIES: &[(&str, SinkFactory)] = &[
    ("file", FileSink::from_config),
    ("stdout", StdoutSink::from_config),
];

pub fn is_known(kind: &str) -> bool {
    factory_for(kind).is_some()
}

pub fn known_kinds() -> Vec<&'static str> {
    FACTORIES.iter().map(|(kind, _)| *kind).collect()
}

fn factory_for(kind: &str) -> Option<SinkFactory> {
    FACTORIES
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, factory)| *factory)
}

/// Construct a sink from its config without initialising it.
pub fn build(cfg: &PluginConfig) -> Result<Box<dyn LogSink>> {
    let factory = factory_for(&cfg.kind).ok_or_else(|| {
        WardenError::init(format!("stream '{}'", cfg.kind), "unknown stream type")
    })?;
    factory(cfg)
}

/// Construct and initialise every configured sink, in order.
///
/// The first failure aborts the whole pipeline; no partially initialised
/// set is returned.
pub async fn build_all(cfgs: &[PluginConfig]) -> Result<Vec<Box<dyn LogSink>>> {
    let mut sinks = Vec::with_capacity(cfgs.len());
    for cfg in cfgs {
        let mut sink = build(cfg)?;
        sink.init().await?;
        info!(sink = %sink.name(), "log sink initialised");
        sinks.push(sink);
    }
    Ok(sinks)
}
