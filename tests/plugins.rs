// tests/plugins.rs

mod common;
use crate::common::at_ms;

use std::error::Error;

use tempfile::TempDir;
use warden::config::PluginConfig;
use warden::errors::WardenError;
use warden::notify::{AlertContext, AppIdentity, WebhookChannel, format_uptime, render_alert};
use warden::sinks::{FileSink, LogSink};
use warden::types::NotificationType;
use warden::{notify, sinks};

type TestResult = Result<(), Box<dyn Error>>;

fn sample_alert() -> AlertContext {
    AlertContext {
        notification_type: NotificationType::Crash,
        timestamp: at_ms(3_723_000),
        app: AppIdentity {
            name: "api".to_string(),
            version: "1.2.0".to_string(),
            environment: "production".to_string(),
        },
        hostname: "web-1".to_string(),
        restart_count: "1/5".to_string(),
        message: "api crashed; restarting (restart 1/5)".to_string(),
        stderr: "Error: ECONNREFUSED\n    at connect".to_string(),
        app_started_at: Some(at_ms(0)),
    }
}

#[tokio::test]
async fn file_sink_appends_lines_and_creates_parents() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("logs").join("api.ndjson");

    let mut sink = FileSink::new(&path);
    sink.init().await?;
    sink.write("{\"n\":1}").await?;
    sink.write("{\"n\":2}").await?;
    sink.flush().await?;

    // Reopening appends instead of truncating.
    let mut again = FileSink::new(&path);
    again.init().await?;
    again.write("{\"n\":3}").await?;
    again.flush().await?;

    let contents = std::fs::read_to_string(&path)?;
    assert_eq!(contents, "{\"n\":1}\n{\"n\":2}\n{\"n\":3}\n");
    assert!(sink.name().starts_with("file:"));
    Ok(())
}

#[tokio::test]
async fn file_sink_write_before_init_fails() {
    let mut sink = FileSink::new("unused.ndjson");
    let result = sink.write("{}").await;
    assert!(matches!(result, Err(WardenError::WriteError { .. })));
}

#[test]
fn file_sink_requires_a_path() {
    let result = FileSink::from_config(&PluginConfig::new("file"));
    assert!(matches!(result, Err(WardenError::InitError { .. })));
}

#[tokio::test]
async fn sink_registry_builds_in_order() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("out.ndjson");
    let cfgs = vec![
        PluginConfig::new("file").with_option("path", path.to_string_lossy().to_string()),
        PluginConfig::new("stdout"),
    ];

    let built = sinks::registry::build_all(&cfgs).await?;

    let names: Vec<_> = built.iter().map(|s| s.name().to_string()).collect();
    assert_eq!(names.len(), 2);
    assert!(names[0].starts_with("file:"));
    assert_eq!(names[1], "stdout");
    assert!(path.exists());
    Ok(())
}

#[tokio::test]
async fn sink_registry_stops_at_first_failure() {
    let cfgs = vec![PluginConfig::new("stdout"), PluginConfig::new("file")];
    let result = sinks::registry::build_all(&cfgs).await;
    assert!(matches!(result.err(), Some(WardenError::InitError { .. })));
}

#[test]
fn registries_know_their_kinds() {
    assert_eq!(sinks::registry::known_kinds(), vec!["file", "stdout"]);
    assert_eq!(notify::registry::known_kinds(), vec!["webhook", "console"]);
    assert!(sinks::registry::is_known("stdout"));
    assert!(!sinks::registry::is_known("webhook"));
    assert!(notify::registry::is_known("console"));
    assert!(!notify::registry::is_known("file"));
}

#[test]
fn webhook_url_is_validated() {
    assert!(WebhookChannel::new("https://hooks.example.com/T000", None).is_ok());
    assert!(matches!(
        WebhookChannel::new("not a url", None),
        Err(WardenError::InitError { .. })
    ));
    assert!(matches!(
        WebhookChannel::new("ftp://hooks.example.com/", None),
        Err(WardenError::InitError { .. })
    ));
    assert!(matches!(
        WebhookChannel::from_config(&PluginConfig::new("webhook")).err(),
        Some(WardenError::InitError { .. })
    ));
}

#[test]
fn webhook_payload_carries_rendered_text() -> TestResult {
    let channel = WebhookChannel::new("https://hooks.example.com/T000", Some("warden".into()))?;

    let payload = channel.payload(&sample_alert());

    assert_eq!(payload["username"], "warden");
    assert_eq!(payload["notificationType"], "app-crash");
    assert_eq!(payload["restartCount"], "1/5");
    assert_eq!(payload["app"]["name"], "api");
    let text = payload["text"].as_str().unwrap_or_default();
    assert!(text.starts_with("[app-crash] api (production) v1.2.0"));
    Ok(())
}

#[test]
fn webhook_payload_omits_missing_username() -> TestResult {
    let channel = WebhookChannel::new("http://localhost:9/hook", None)?;
    let payload = channel.payload(&sample_alert());
    assert!(payload.get("username").is_none());
    Ok(())
}

#[tokio::test]
async fn webhook_send_to_closed_port_is_a_send_error() -> TestResult {
    let mut channel = WebhookChannel::new("http://127.0.0.1:9/hook", None)?;
    warden::notify::NotificationChannel::init(&mut channel).await?;

    let result = warden::notify::NotificationChannel::send(&mut channel, &sample_alert()).await;

    match result {
        Err(WardenError::SendError { channel, .. }) => assert_eq!(channel, "webhook"),
        other => panic!("expected send error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn rendered_alert_includes_uptime_and_stderr() {
    let text = render_alert(&sample_alert());
    let lines: Vec<_> = text.lines().collect();

    assert_eq!(lines[0], "[app-crash] api (production) v1.2.0");
    assert!(lines[1].starts_with("Time: "));
    assert_eq!(lines[2], "Host: web-1");
    assert!(lines[3].starts_with("Booted: "));
    assert!(lines[3].ends_with("(uptime 1h 2m 3s)"));
    assert_eq!(lines[4], "Restarts: 1/5");
    assert_eq!(lines[5], "Message: api crashed; restarting (restart 1/5)");
    assert_eq!(lines[6], "```");
    assert_eq!(lines[7], "Error: ECONNREFUSED");
    assert_eq!(lines.last().copied(), Some("```"));
}

#[test]
fn rendered_alert_without_child_or_stderr() {
    let alert = AlertContext {
        stderr: String::new(),
        app_started_at: None,
        ..sample_alert()
    };

    let text = render_alert(&alert);

    assert!(text.contains("Status: not running"));
    assert!(!text.contains("```"));
    assert!(text.ends_with("Message: api crashed; restarting (restart 1/5)"));
}

#[test]
fn uptime_formatting() {
    use chrono::Duration;

    assert_eq!(format_uptime(Duration::milliseconds(250)), "250ms");
    assert_eq!(format_uptime(Duration::seconds(4)), "4s");
    assert_eq!(format_uptime(Duration::seconds(65)), "1m 5s");
    assert_eq!(format_uptime(Duration::seconds(3723)), "1h 2m 3s");
    assert_eq!(format_uptime(Duration::milliseconds(-10)), "0ms");
}
