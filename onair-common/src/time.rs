//! Timestamp helpers
//!
//! All persisted timestamps are unix epoch milliseconds (i64). Millisecond
//! integers keep feed-cursor comparisons strict and cheap; `chrono` is used
//! only at display boundaries.

use chrono::{DateTime, TimeZone, Utc};

/// Current time as unix epoch milliseconds
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert persisted milliseconds back to a wall-clock time
pub fn ms_to_datetime(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
}
