// src/engine/stderr_window.rs

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Bounded, time-windowed buffer of recent child stderr.
///
/// Entries older than `retention` relative to the most recently appended
/// entry are evicted lazily on each append. Only used to attach "what did
/// the app print right before it died" to crash alerts.
#[derive(Debug, Clone)]
pub struct StderrWindow {
    retention: chrono::Duration,
    entries: VecDeque<(DateTime<Utc>, String)>,
}

impl StderrWindow {
    pub fn new(retention: Duration) -> Self {
        let retention =
            chrono::Duration::from_std(retention).unwrap_or(chrono::Duration::MAX);
        Self {
            retention,
            entries: VecDeque::new(),
        }
    }

    pub fn record(&mut self, text: impl Into<String>, now: DateTime<Utc>) {
        self.entries.push_back((now, text.into()));

        // Always inspect the current front, never a cached one.
        while let Some((ts, _)) = self.entries.front() {
            if now - *ts > self.retention {
                self.entries.pop_front();
            } else {
                break;
            }
        }
    }

    /// Retained texts joined with `\n`, in arrival order. Empty when
    /// nothing has been recorded.
    pub fn snapshot(&self) -> String {
        self.entries
            .iter()
            .map(|(_, text)| text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
