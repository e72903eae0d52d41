// tests/stderr_window.rs

mod common;
use crate::common::at_ms;

use std::time::Duration;

use warden::engine::StderrWindow;

#[test]
fn entries_older_than_window_are_evicted_on_append() {
    let mut window = StderrWindow::new(Duration::from_millis(50));

    window.record("a", at_ms(0));
    window.record("b", at_ms(10));
    window.record("c", at_ms(60));

    assert_eq!(window.snapshot(), "b\nc");
    assert_eq!(window.len(), 2);
}

#[test]
fn never_appended_window_is_empty() {
    let window = StderrWindow::new(Duration::from_millis(50));
    assert_eq!(window.snapshot(), "");
    assert!(window.is_empty());
}

#[test]
fn clear_empties_the_window() {
    let mut window = StderrWindow::new(Duration::from_millis(50));
    window.record("boom", at_ms(0));
    window.record("bang", at_ms(5));

    window.clear();

    assert_eq!(window.snapshot(), "");
    window.clear();
    assert_eq!(window.snapshot(), "");
}

#[test]
fn zero_window_keeps_only_the_latest_write() {
    let mut window = StderrWindow::new(Duration::ZERO);

    window.record("first", at_ms(0));
    window.record("second", at_ms(1));
    window.record("third", at_ms(2));

    assert_eq!(window.snapshot(), "third");
}

#[test]
fn eviction_walks_past_several_stale_entries() {
    let mut window = StderrWindow::new(Duration::from_millis(50));

    for (i, text) in ["one", "two", "three", "four"].iter().enumerate() {
        window.record(*text, at_ms(i as i64));
    }
    window.record("late", at_ms(500));

    assert_eq!(window.snapshot(), "late");
}

#[test]
fn snapshot_preserves_arrival_order() {
    let mut window = StderrWindow::new(Duration::from_secs(10));

    window.record("Traceback (most recent call last):", at_ms(0));
    window.record("  File \"app.py\", line 3", at_ms(1));
    window.record("ValueError: bad", at_ms(2));

    assert_eq!(
        window.snapshot(),
        "Traceback (most recent call last):\n  File \"app.py\", line 3\nValueError: bad"
    );
}
