// src/sinks/file.rs

use std::path::PathBuf;

use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::config::PluginConfig;
use crate::errors::{Result, WardenError};
use crate::types::BoxFuture;

use super::LogSink;

/// Appends NDJSON records to `path`, creating parent directories.
#[derive(Debug)]
pub struct FileSink {
    name: String,
    path: PathBuf,
    file: Option<File>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: format!("file:{}", path.display()),
            path,
            file: None,
        }
    }

    pub fn from_config(cfg: &PluginConfig) -> Result<Box<dyn LogSink>> {
        let path = cfg
            .str_option("path")
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| WardenError::init("stream 'file'", "missing required option `path`"))?;
        Ok(Box::new(FileSink::new(path)))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl LogSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)
                        .await
                        .map_err(|e| WardenError::init(&self.name, e))?;
                }
            }

            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await
                .map_err(|e| WardenError::init(&self.name, e))?;

            self.file = Some(file);
            Ok(())
        })
    }

    fn write<'a>(&'a mut self, line: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let file = self
                .file
                .as_mut()
                .ok_or_else(|| WardenError::write(&self.name, "sink used before init"))?;

            let mut buf = Vec::with_capacity(line.len() + 1);
            buf.extend_from_slice(line.as_bytes());
            buf.push(b'\n');

            file.write_all(&buf)
                .await
                .map_err(|e| WardenError::write(&self.name, e))
        })
    }

    fn flush(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            match self.file.as_mut() {
                Some(file) => file
                    .flush()
                    .await
                    .map_err(|e| WardenError::write(&self.name, e)),
                None => Ok(()),
            }
        })
    }
}
