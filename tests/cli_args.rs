// tests/cli_args.rs

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use warden::cli::{CliArgs, LogLevel};
use warden::config::default_config_path;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn config_defaults_to_warden_toml() -> TestResult {
    let args = CliArgs::try_parse_from(["warden"])?;

    assert_eq!(args.config, default_config_path());
    assert_eq!(args.config, PathBuf::from("Warden.toml"));
    assert!(args.log_level.is_none());
    assert!(!args.debug);
    assert!(!args.dry_run);
    Ok(())
}

#[test]
fn flags_override_defaults() -> TestResult {
    let args = CliArgs::try_parse_from([
        "warden",
        "--config",
        "deploy/api.toml",
        "--log-level",
        "trace",
        "--dry-run",
    ])?;

    assert_eq!(args.config, PathBuf::from("deploy/api.toml"));
    assert!(matches!(args.log_level, Some(LogLevel::Trace)));
    assert!(args.dry_run);
    Ok(())
}

#[test]
fn unknown_log_level_is_rejected() {
    assert!(CliArgs::try_parse_from(["warden", "--log-level", "loud"]).is_err());
}
