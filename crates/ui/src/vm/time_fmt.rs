use chrono::{DateTime, Utc};

#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}

/// `M:SS`, matching the header countdown.
#[must_use]
pub fn format_countdown(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// CSS hook for the countdown: calm, then warning under 30 minutes,
/// urgent under 10.
#[must_use]
pub fn countdown_class(seconds: u32) -> &'static str {
    if seconds <= 600 {
        "timer timer--danger"
    } else if seconds <= 1_800 {
        "timer timer--warning"
    } else {
        "timer timer--ok"
    }
}
