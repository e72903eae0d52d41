// src/sinks/mod.rs

//! Log sink plugins.
//!
//! A sink receives every NDJSON record written to the internal
//! [`EventStream`](crate::event_log::EventStream). Sinks are selected by
//! the `type` key of a `[[streams]]` entry through [`registry`].
//!
//! - [`file`] appends records to a file.
//! - [`stdout`] writes records to standard output.

use crate::errors::Result;
use crate::types::BoxFuture;

pub mod file;
pub mod registry;
pub mod stdout;

pub use file::FileSink;
pub use stdout::StdoutSink;

/// Trait implemented by every log consumer.
///
/// Construction (by a registry factory) validates configuration; `init`
/// acquires resources. Both report misconfiguration as `InitError`.
pub trait LogSink: Send {
    /// Short identifier used in errors and logs.
    fn name(&self) -> &str;

    fn init(&mut self) -> BoxFuture<'_, Result<()>>;

    /// Write one record. `line` has no trailing newline.
    fn write<'a>(&'a mut self, line: &'a str) -> BoxFuture<'a, Result<()>>;

    fn flush(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async { Ok(()) })
    }
}
