// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [app]
/// name = "api"
/// entry = "./bin/api"
///
/// [supervisor]
/// restart_on_crash = true
/// max_restarts = 5
///
/// [[streams]]
/// type = "file"
/// path = "logs/api.ndjson"
///
/// [[notifications]]
/// type = "webhook"
/// url = "https://hooks.example.com/T000"
/// ```
///
/// Only `[app]` is required; everything else has an explicit default.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    pub app: AppSection,

    #[serde(default)]
    pub supervisor: SupervisorSection,

    /// Log sinks, in the order records are fanned out to them.
    #[serde(default)]
    pub streams: Vec<PluginConfig>,

    /// Notification channels, in dispatch order.
    #[serde(default)]
    pub notifications: Vec<PluginConfig>,
}

/// Validated configuration. Only obtainable through
/// `ConfigFile::try_from(RawConfigFile)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub app: AppSection,
    pub supervisor: SupervisorSection,
    pub streams: Vec<PluginConfig>,
    pub notifications: Vec<PluginConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            app: raw.app,
            supervisor: raw.supervisor,
            streams: raw.streams,
            notifications: raw.notifications,
        }
    }
}

/// `[app]` section: what to run and how to describe it in alerts.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    pub name: String,

    /// Program to execute.
    pub entry: String,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub cwd: Option<PathBuf>,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default = "default_environment")]
    pub environment: String,

    /// Extra environment variables for the child.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

fn default_version() -> String {
    "unknown".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

/// `[supervisor]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SupervisorSection {
    #[serde(default = "default_restart_on_crash")]
    pub restart_on_crash: bool,

    /// `0` means unlimited.
    #[serde(default)]
    pub max_restarts: u32,

    /// Retention window of the stderr buffer attached to crash alerts.
    #[serde(default = "default_stderr_window_ms")]
    pub stderr_window_ms: u64,

    /// Pause between a crash and the respawn.
    #[serde(default)]
    pub restart_delay_ms: u64,

    /// Delay before the supervisor exits, so pending log writes can land.
    #[serde(default = "default_exit_grace_ms")]
    pub exit_grace_ms: u64,

    #[serde(default)]
    pub debug: bool,
}

fn default_restart_on_crash() -> bool {
    true
}

fn default_stderr_window_ms() -> u64 {
    50
}

fn default_exit_grace_ms() -> u64 {
    250
}

impl Default for SupervisorSection {
    fn default() -> Self {
        Self {
            restart_on_crash: default_restart_on_crash(),
            max_restarts: 0,
            stderr_window_ms: default_stderr_window_ms(),
            restart_delay_ms: 0,
            exit_grace_ms: default_exit_grace_ms(),
            debug: false,
        }
    }
}

impl SupervisorSection {
    pub fn stderr_window(&self) -> Duration {
        Duration::from_millis(self.stderr_window_ms)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }

    pub fn exit_grace(&self) -> Duration {
        Duration::from_millis(self.exit_grace_ms)
    }
}

/// One `[[streams]]` or `[[notifications]]` entry.
///
/// `type` selects the factory in the matching registry; the remaining keys
/// are handed to that factory untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginConfig {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(flatten)]
    pub options: toml::Table,
}

impl PluginConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            options: toml::Table::new(),
        }
    }

    pub fn with_option(mut self, key: &str, value: impl Into<toml::Value>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }

    /// String option lookup; `None` when absent or not a string.
    pub fn str_option(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(|v| v.as_str())
    }
}
