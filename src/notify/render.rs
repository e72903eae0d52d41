// src/notify/render.rs

//! Plain-text rendering of alerts, shared by all providers.

use std::fmt::Write;

use chrono::SecondsFormat;

use super::AlertContext;

/// Render an alert as a multi-line message:
///
/// ```text
/// [app-crash] api (production) v1.2.0
/// Time: 2026-10-19T08:00:00Z
/// Host: web-1
/// Booted: 2026-10-19T07:00:00Z (uptime 1h 0m 0s)
/// Restarts: 1/5
/// Message: api crashed; restarting (restart 1/5)
/// ```
///
/// followed by a fenced stderr block when the snapshot is non-empty.
pub fn render_alert(alert: &AlertContext) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "[{}] {} ({}) v{}",
        alert.notification_type.code(),
        alert.app.name,
        alert.app.environment,
        alert.app.version
    );
    let _ = writeln!(
        out,
        "Time: {}",
        alert.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    let _ = writeln!(out, "Host: {}", alert.hostname);

    match (alert.app_started_at, alert.uptime()) {
        (Some(started), Some(uptime)) => {
            let _ = writeln!(
                out,
                "Booted: {} (uptime {})",
                started.to_rfc3339_opts(SecondsFormat::Secs, true),
                format_uptime(uptime)
            );
        }
        _ => {
            let _ = writeln!(out, "Status: not running");
        }
    }

    let _ = writeln!(out, "Restarts: {}", alert.restart_count);
    let _ = writeln!(out, "Message: {}", alert.message);

    if !alert.stderr.trim().is_empty() {
        let _ = writeln!(out, "```");
        let _ = writeln!(out, "{}", alert.stderr.trim_end());
        let _ = writeln!(out, "```");
    }

    out.trim_end().to_string()
}

/// Compact human duration: `"1h 2m 3s"`, `"2m 5s"`, `"4s"`, or `"250ms"`
/// below one second. Negative durations render as `"0ms"`.
pub fn format_uptime(uptime: chrono::Duration) -> String {
    let total_ms = uptime.num_milliseconds().max(0);
    if total_ms < 1000 {
        return format!("{total_ms}ms");
    }

    let total_secs = total_ms / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}
