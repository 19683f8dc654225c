// src/engine/format.rs
//! Time display helpers for the shell.

use std::time::Duration;

/// `m:ss`, minutes unbounded.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Time left as `-m:ss`.
pub fn format_remaining(position: Duration, duration: Duration) -> String {
    format!("-{}", format_duration(duration.saturating_sub(position)))
}
