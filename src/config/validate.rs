// src/config/validate.rs

use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, WardenError};
use crate::notify::registry as channel_registry;
use crate::sinks::registry as sink_registry;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::WardenError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_app(cfg)?;
    validate_streams(cfg)?;
    validate_notifications(cfg)?;
    ensure_not_supervising_self(cfg)?;
    Ok(())
}

fn validate_app(cfg: &RawConfigFile) -> Result<()> {
    if cfg.app.name.trim().is_empty() {
        return Err(WardenError::ConfigError(
            "[app].name must not be empty".to_string(),
        ));
    }
    if cfg.app.entry.trim().is_empty() {
        return Err(WardenError::ConfigError(
            "[app].entry must name the program to supervise".to_string(),
        ));
    }
    Ok(())
}

fn validate_streams(cfg: &RawConfigFile) -> Result<()> {
    for (idx, stream) in cfg.streams.iter().enumerate() {
        if !sink_registry::is_known(&stream.kind) {
            return Err(WardenError::ConfigError(format!(
                "[[streams]] entry {} has unknown type '{}' (expected one of: {})",
                idx,
                stream.kind,
                sink_registry::known_kinds().join(", ")
            )));
        }
    }
    Ok(())
}

fn validate_notifications(cfg: &RawConfigFile) -> Result<()> {
    for (idx, channel) in cfg.notifications.iter().enumerate() {
        if !channel_registry::is_known(&channel.kind) {
            return Err(WardenError::ConfigError(format!(
                "[[notifications]] entry {} has unknown type '{}' (expected one of: {})",
                idx,
                channel.kind,
                channel_registry::known_kinds().join(", ")
            )));
        }
    }
    Ok(())
}

fn ensure_not_supervising_self(cfg: &RawConfigFile) -> Result<()> {
    let Ok(own_exe) = std::env::current_exe().and_then(|p| p.canonicalize()) else {
        // Nothing to compare against.
        return Ok(());
    };

    if let Some(entry) = resolve_entry(&cfg.app.entry, cfg.app.cwd.as_deref()) {
        if entry == own_exe {
            return Err(WardenError::ConfigError(format!(
                "[app].entry '{}' points at the supervisor itself; set it to the application you want to supervise",
                cfg.app.entry
            )));
        }
    }
    Ok(())
}

/// Best-effort resolution of the entry point to a canonical path.
///
/// Paths containing a separator are resolved against `cwd` (when given);
/// bare program names are looked up on `PATH`.
pub(crate) fn resolve_entry(entry: &str, cwd: Option<&Path>) -> Option<PathBuf> {
    let candidate = Path::new(entry);

    if candidate.is_absolute() || entry.contains(std::path::MAIN_SEPARATOR) || entry.contains('/') {
        let full = match cwd {
            Some(dir) if candidate.is_relative() => dir.join(candidate),
            _ => candidate.to_path_buf(),
        };
        return full.canonicalize().ok();
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(entry))
        .find(|p| p.is_file())
        .and_then(|p| p.canonicalize().ok())
}
