#![allow(dead_code)]

use std::collections::BTreeMap;

use warden::config::{AppSection, ConfigFile, PluginConfig, RawConfigFile, SupervisorSection};

/// Builder for `ConfigFile` to simplify test setup.
///
/// Defaults differ from the TOML defaults in one place: `exit_grace_ms` is
/// `0` so tests don't sleep before the supervisor returns.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new(name: &str, entry: &str) -> Self {
        Self {
            config: RawConfigFile {
                app: AppSection {
                    name: name.to_string(),
                    entry: entry.to_string(),
                    args: Vec::new(),
                    cwd: None,
                    version: "1.0.0".to_string(),
                    environment: "test".to_string(),
                    env: BTreeMap::new(),
                },
                supervisor: SupervisorSection {
                    exit_grace_ms: 0,
                    ..SupervisorSection::default()
                },
                streams: Vec::new(),
                notifications: Vec::new(),
            },
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.config.app.args.push(arg.to_string());
        self
    }

    pub fn restart_on_crash(mut self, val: bool) -> Self {
        self.config.supervisor.restart_on_crash = val;
        self
    }

    pub fn max_restarts(mut self, val: u32) -> Self {
        self.config.supervisor.max_restarts = val;
        self
    }

    pub fn stderr_window_ms(mut self, val: u64) -> Self {
        self.config.supervisor.stderr_window_ms = val;
        self
    }

    pub fn restart_delay_ms(mut self, val: u64) -> Self {
        self.config.supervisor.restart_delay_ms = val;
        self
    }

    pub fn exit_grace_ms(mut self, val: u64) -> Self {
        self.config.supervisor.exit_grace_ms = val;
        self
    }

    pub fn with_stream(mut self, stream: PluginConfig) -> Self {
        self.config.streams.push(stream);
        self
    }

    pub fn with_notification(mut self, channel: PluginConfig) -> Self {
        self.config.notifications.push(channel);
        self
    }

    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}
