#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};

pub use warden_test_utils::{init_tracing, with_timeout};

/// Fixed base instant plus `ms` milliseconds.
pub fn at_ms(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(1_760_000_000_000 + ms)
        .single()
        .expect("valid timestamp")
}
