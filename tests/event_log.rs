// tests/event_log.rs

mod common;
use crate::common::at_ms;

use std::error::Error;

use serde_json::json;
use warden::errors::WardenError;
use warden::event_log::{EventLog, EventStream, LogEntry, elapsed_ms};
use warden::sinks::LogSink;
use warden::types::{ConsoleLevel, EntryType};
use warden_test_utils::recording::{MemorySink, journal, parsed_records, snapshot};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn record_uptimes_are_measured_from_their_own_start_times() {
    let log = EventLog::with_start_time("api", "web-1", EventStream::default(), at_ms(0));
    let entry = LogEntry::app_output("ready").with_app_started_at(Some(at_ms(1000)));

    let record = log.build_record(&entry, at_ms(3000));

    assert_eq!(record.app_uptime_ms, 2000);
    assert_eq!(record.supervisor_uptime_ms, 3000);
    assert_eq!(record.app_name, "api");
    assert_eq!(record.hostname, "web-1");
    assert_eq!(record.pid, std::process::id());
    assert_eq!(record.entry_type, EntryType::AppOutput);
}

#[test]
fn app_uptime_is_zero_when_no_child_is_running() {
    let log = EventLog::with_start_time("api", "web-1", EventStream::default(), at_ms(0));
    let entry = LogEntry::supervisor(ConsoleLevel::Message, "starting api");

    let record = log.build_record(&entry, at_ms(500));

    assert_eq!(record.app_uptime_ms, 0);
    assert_eq!(record.supervisor_uptime_ms, 500);
}

#[test]
fn elapsed_is_clamped_at_zero() {
    assert_eq!(elapsed_ms(at_ms(100), at_ms(50)), 0);
    assert_eq!(elapsed_ms(at_ms(0), at_ms(1234)), 1234);
}

#[test]
fn record_serialises_with_camel_case_fields() -> TestResult {
    let log = EventLog::with_start_time("api", "web-1", EventStream::default(), at_ms(0));
    let entry = LogEntry::supervisor(ConsoleLevel::Error, "api crashed 1 time(s)")
        .with_data(json!({ "exitCode": 1, "signal": null }))
        .with_error_context("boom");

    let value = serde_json::to_value(log.build_record(&entry, at_ms(1500)))?;

    assert_eq!(value["entryType"], "supervisor");
    assert_eq!(value["appUptimeMs"], 0);
    assert_eq!(value["supervisorUptimeMs"], 1500);
    assert_eq!(value["errorContext"], "boom");
    assert_eq!(value["data"]["exitCode"], 1);
    let timestamp = value["timestamp"].as_str().unwrap_or_default();
    assert!(timestamp.ends_with('Z'), "timestamp {timestamp} is not UTC");
    assert!(timestamp.contains(".500"), "timestamp {timestamp} lacks millis");
    Ok(())
}

#[tokio::test]
async fn every_sink_receives_every_line_in_order() -> TestResult {
    let first = journal();
    let second = journal();
    let sinks: Vec<Box<dyn LogSink>> = vec![
        Box::new(MemorySink::new(first.clone())),
        Box::new(MemorySink::new(second.clone())),
    ];
    let mut log = EventLog::new("api", "web-1", EventStream::new(sinks));

    log.record(LogEntry::app_output("one")).await?;
    log.record(LogEntry::app_error("two")).await?;
    log.flush().await?;

    assert_eq!(snapshot(&first), snapshot(&second));
    assert_eq!(log.stream().lines_written(), 2);

    let records = parsed_records(&first);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["message"], "one");
    assert_eq!(records[1]["message"], "two");
    assert_eq!(records[1]["entryType"], "app-error");
    Ok(())
}

#[tokio::test]
async fn failing_sink_does_not_starve_the_others() -> TestResult {
    let failing = journal();
    let healthy = journal();
    let sinks: Vec<Box<dyn LogSink>> = vec![
        Box::new(MemorySink::failing(failing.clone())),
        Box::new(MemorySink::new(healthy.clone())),
    ];
    let mut stream = EventStream::new(sinks);

    let result = stream.write_line("{\"message\":\"hello\"}").await;

    match result {
        Err(WardenError::WriteError { sink, .. }) => assert_eq!(sink, "memory"),
        other => panic!("expected write error, got {other:?}"),
    }
    assert_eq!(snapshot(&healthy), vec!["{\"message\":\"hello\"}".to_string()]);
    assert!(snapshot(&failing).is_empty());
    Ok(())
}

#[tokio::test]
async fn stream_with_no_sinks_accepts_lines() -> TestResult {
    let mut stream = EventStream::default();
    assert_eq!(stream.sink_count(), 0);

    stream.write_line("{}").await?;
    stream.attach(Box::new(MemorySink::new(journal())));

    assert_eq!(stream.sink_count(), 1);
    assert_eq!(stream.lines_written(), 1);
    Ok(())
}
