// tests/config_loading.rs

use std::error::Error;
use std::fs;
use std::path::Path;

use tempfile::TempDir;
use warden::config::{ConfigFile, PluginConfig, load_and_validate, load_from_path};
use warden::errors::WardenError;
use warden_test_utils::builders::ConfigFileBuilder;

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(dir: &TempDir, body: &str) -> std::io::Result<std::path::PathBuf> {
    let path = dir.path().join("Warden.toml");
    fs::write(&path, body)?;
    Ok(path)
}

fn config_error(result: warden::errors::Result<ConfigFile>) -> String {
    match result {
        Err(WardenError::ConfigError(msg)) => msg,
        Err(other) => panic!("expected config error, got {other}"),
        Ok(cfg) => panic!("expected config error, got {cfg:?}"),
    }
}

#[test]
fn minimal_config_gets_defaults() -> TestResult {
    let dir = TempDir::new()?;
    let path = write_config(
        &dir,
        r#"
[app]
name = "api"
entry = "node"
"#,
    )?;

    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.app.name, "api");
    assert_eq!(cfg.app.entry, "node");
    assert!(cfg.app.args.is_empty());
    assert_eq!(cfg.app.version, "unknown");
    assert_eq!(cfg.app.environment, "development");

    let sup = &cfg.supervisor;
    assert!(sup.restart_on_crash);
    assert_eq!(sup.max_restarts, 0);
    assert_eq!(sup.stderr_window_ms, 50);
    assert_eq!(sup.restart_delay_ms, 0);
    assert_eq!(sup.exit_grace_ms, 250);
    assert!(!sup.debug);

    assert!(cfg.streams.is_empty());
    assert!(cfg.notifications.is_empty());
    Ok(())
}

#[test]
fn full_config_is_parsed() -> TestResult {
    let dir = TempDir::new()?;
    let path = write_config(
        &dir,
        r#"
[app]
name = "api"
entry = "./bin/api"
args = ["--port", "8080"]
cwd = "/srv/api"
version = "1.2.0"
environment = "production"

[app.env]
RUST_LOG = "info"

[supervisor]
restart_on_crash = true
max_restarts = 5
stderr_window_ms = 200
restart_delay_ms = 1000
exit_grace_ms = 0
debug = true

[[streams]]
type = "file"
path = "logs/api.ndjson"

[[streams]]
type = "stdout"

[[notifications]]
type = "webhook"
url = "https://hooks.example.com/T000"
username = "warden"

[[notifications]]
type = "console"
"#,
    )?;

    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.app.args, vec!["--port", "8080"]);
    assert_eq!(cfg.app.cwd.as_deref(), Some(Path::new("/srv/api")));
    assert_eq!(cfg.app.env.get("RUST_LOG").map(String::as_str), Some("info"));
    assert_eq!(cfg.supervisor.max_restarts, 5);
    assert_eq!(cfg.supervisor.restart_delay().as_millis(), 1000);
    assert!(cfg.supervisor.debug);

    let stream_kinds: Vec<_> = cfg.streams.iter().map(|s| s.kind.as_str()).collect();
    assert_eq!(stream_kinds, vec!["file", "stdout"]);
    assert_eq!(cfg.streams[0].str_option("path"), Some("logs/api.ndjson"));

    let channel_kinds: Vec<_> = cfg.notifications.iter().map(|n| n.kind.as_str()).collect();
    assert_eq!(channel_kinds, vec!["webhook", "console"]);
    assert_eq!(cfg.notifications[0].str_option("username"), Some("warden"));
    Ok(())
}

#[test]
fn missing_app_section_is_a_parse_error() -> TestResult {
    let dir = TempDir::new()?;
    let path = write_config(&dir, "[supervisor]\nmax_restarts = 3\n")?;

    let result = load_from_path(&path);

    assert!(matches!(result, Err(WardenError::TomlError(_))));
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() {
    let result = load_and_validate("/definitely/not/here/Warden.toml");
    assert!(matches!(result, Err(WardenError::IoError(_))));
}

#[test]
fn unknown_stream_type_is_rejected() {
    let raw = ConfigFileBuilder::new("api", "node")
        .with_stream(PluginConfig::new("kafka"))
        .build_raw();

    let msg = config_error(ConfigFile::try_from(raw));

    assert!(msg.contains("has unknown type 'kafka'"), "{msg}");
    assert!(msg.contains("file"), "{msg}");
}

#[test]
fn unknown_notification_type_is_rejected() {
    let raw = ConfigFileBuilder::new("api", "node")
        .with_notification(PluginConfig::new("pager"))
        .build_raw();

    let msg = config_error(ConfigFile::try_from(raw));

    assert!(msg.contains("has unknown type 'pager'"), "{msg}");
}

#[test]
fn empty_name_and_entry_are_rejected() {
    let msg = config_error(ConfigFile::try_from(
        ConfigFileBuilder::new("  ", "node").build_raw(),
    ));
    assert_eq!(msg, "[app].name must not be empty");

    let msg = config_error(ConfigFile::try_from(
        ConfigFileBuilder::new("api", "").build_raw(),
    ));
    assert_eq!(msg, "[app].entry must name the program to supervise");
}

#[test]
fn supervising_itself_is_rejected() -> TestResult {
    let own_exe = std::env::current_exe()?;
    let raw = ConfigFileBuilder::new("loop", &own_exe.to_string_lossy()).build_raw();

    let msg = config_error(ConfigFile::try_from(raw));

    assert!(msg.contains("points at the supervisor itself"), "{msg}");
    Ok(())
}

#[test]
fn relative_entry_is_resolved_against_cwd() -> TestResult {
    let own_exe = std::env::current_exe()?.canonicalize()?;
    let (Some(dir), Some(file)) = (own_exe.parent(), own_exe.file_name()) else {
        return Ok(());
    };

    let mut raw = ConfigFileBuilder::new("loop", &format!("./{}", file.to_string_lossy()))
        .build_raw();
    raw.app.cwd = Some(dir.to_path_buf());

    let msg = config_error(ConfigFile::try_from(raw));

    assert!(msg.contains("points at the supervisor itself"), "{msg}");
    Ok(())
}

#[test]
fn missing_entry_program_is_left_to_spawn_time() -> TestResult {
    let raw = ConfigFileBuilder::new("api", "./no-such-binary").build_raw();
    let cfg = ConfigFile::try_from(raw)?;
    assert_eq!(cfg.app.entry, "./no-such-binary");
    Ok(())
}
