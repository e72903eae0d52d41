// src/event_log/stream.rs

use tracing::{debug, error};

use crate::errors::Result;
use crate::sinks::LogSink;

/// Internal append-only stream of NDJSON records.
///
/// Every record is handed to each attached sink in attach order. All sinks
/// are attempted; the first failure is returned once they have been.
#[derive(Default)]
pub struct EventStream {
    sinks: Vec<Box<dyn LogSink>>,
    lines_written: u64,
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.sinks.iter().map(|s| s.name().to_string()).collect();
        f.debug_struct("EventStream")
            .field("sinks", &names)
            .field("lines_written", &self.lines_written)
            .finish()
    }
}

impl EventStream {
    pub fn new(sinks: Vec<Box<dyn LogSink>>) -> Self {
        Self {
            sinks,
            lines_written: 0,
        }
    }

    pub fn attach(&mut self, sink: Box<dyn LogSink>) {
        debug!(sink = %sink.name(), "attaching log sink");
        self.sinks.push(sink);
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    pub async fn write_line(&mut self, line: &str) -> Result<()> {
        let mut first_error = None;

        for sink in self.sinks.iter_mut() {
            if let Err(err) = sink.write(line).await {
                error!(sink = %sink.name(), error = %err, "log sink write failed");
                first_error.get_or_insert(err);
            }
        }

        self.lines_written += 1;
        first_error.map_or(Ok(()), Err)
    }

    pub async fn flush(&mut self) -> Result<()> {
        let mut first_error = None;

        for sink in self.sinks.iter_mut() {
            if let Err(err) = sink.flush().await {
                error!(sink = %sink.name(), error = %err, "log sink flush failed");
                first_error.get_or_insert(err);
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}
