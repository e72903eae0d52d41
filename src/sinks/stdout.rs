// src/sinks/stdout.rs

use tokio::io::{AsyncWriteExt, Stdout};

use crate::config::PluginConfig;
use crate::errors::{Result, WardenError};
use crate::types::BoxFuture;

use super::LogSink;

/// Writes NDJSON records to standard output, e.g. for a log shipper
/// reading the supervisor's stdout.
#[derive(Debug, Default)]
pub struct StdoutSink {
    out: Option<Stdout>,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(_cfg: &PluginConfig) -> Result<Box<dyn LogSink>> {
        Ok(Box::new(StdoutSink::new()))
    }
}

impl LogSink for StdoutSink {
    fn name(&self) -> &str {
        "stdout"
    }

    fn init(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.out = Some(tokio::io::stdout());
            Ok(())
        })
    }

    fn write<'a>(&'a mut self, line: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let out = self
                .out
                .as_mut()
                .ok_or_else(|| WardenError::write("stdout", "sink used before init"))?;

            out.write_all(line.as_bytes())
                .await
                .map_err(|e| WardenError::write("stdout", e))?;
            out.write_all(b"\n")
                .await
                .map_err(|e| WardenError::write("stdout", e))
        })
    }

    fn flush(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            match self.out.as_mut() {
                Some(out) => out.flush().await.map_err(|e| WardenError::write("stdout", e)),
                None => Ok(()),
            }
        })
    }
}
