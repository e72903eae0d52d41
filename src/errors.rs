// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WardenError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A sink or channel refused its configuration during startup.
    #[error("Failed to initialise {component}: {reason}")]
    InitError { component: String, reason: String },

    /// A notification channel failed to deliver an alert.
    #[error("Notification channel '{channel}' failed to send: {reason}")]
    SendError { channel: String, reason: String },

    /// A log sink failed to accept a record.
    #[error("Log sink '{sink}' failed to write: {reason}")]
    WriteError { sink: String, reason: String },

    #[error("Failed to spawn managed application: {0}")]
    SpawnError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WardenError {
    pub fn init(component: impl Into<String>, reason: impl ToString) -> Self {
        WardenError::InitError {
            component: component.into(),
            reason: reason.to_string(),
        }
    }

    pub fn send(channel: impl Into<String>, reason: impl ToString) -> Self {
        WardenError::SendError {
            channel: channel.into(),
            reason: reason.to_string(),
        }
    }

    pub fn write(sink: impl Into<String>, reason: impl ToString) -> Self {
        WardenError::WriteError {
            sink: sink.into(),
            reason: reason.to_string(),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, WardenError>;
