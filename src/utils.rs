//! Formatting helpers shared by front ends

use std::time::Duration;

/// Format a playback position as `m:ss`
pub fn format_time(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// `elapsed / total`, with `--:--` while the total is unknown
pub fn format_progress(elapsed: Duration, total: Option<Duration>) -> String {
    match total {
        Some(total) => format!("{} / {}", format_time(elapsed), format_time(total)),
        None => format!("{} / --:--", format_time(elapsed)),
    }
}

/// Format a millisecond timestamp relative to now
pub fn format_relative_time(timestamp_ms: i64) -> String {
    relative_time_between(timestamp_ms, chrono::Utc::now().timestamp_millis())
}

fn relative_time_between(then_ms: i64, now_ms: i64) -> String {
    let diff_secs = (now_ms - then_ms).max(0) / 1000;
    let diff_mins = diff_secs / 60;
    let diff_hours = diff_mins / 60;
    let diff_days = diff_hours / 24;

    if diff_days > 30 {
        format!("{} months ago", diff_days / 30)
    } else if diff_days > 0 {
        format!("{} days ago", diff_days)
    } else if diff_hours > 0 {
        format!("{} hours ago", diff_hours)
    } else if diff_mins > 0 {
        format!("{} minutes ago", diff_mins)
    } else {
        "just now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_is_minutes_and_padded_seconds() {
        assert_eq!(format_time(Duration::ZERO), "0:00");
        assert_eq!(format_time(Duration::from_millis(7_900)), "0:07");
        assert_eq!(format_time(Duration::from_secs(754)), "12:34");
    }

    #[test]
    fn progress_without_total() {
        assert_eq!(format_progress(Duration::from_secs(3), None), "0:03 / --:--");
        assert_eq!(
            format_progress(Duration::from_secs(3), Some(Duration::from_secs(65))),
            "0:03 / 1:05"
        );
    }

    #[test]
    fn relative_time_buckets() {
        let now = 100 * 24 * 3_600_000;
        assert_eq!(relative_time_between(now - 5_000, now), "just now");
        assert_eq!(relative_time_between(now - 3 * 60_000, now), "3 minutes ago");
        assert_eq!(relative_time_between(now - 2 * 3_600_000, now), "2 hours ago");
        assert_eq!(relative_time_between(now - 4 * 24 * 3_600_000, now), "4 days ago");
        assert_eq!(relative_time_between(now - 65 * 24 * 3_600_000, now), "2 months ago");
        assert_eq!(relative_time_between(now + 10_000, now), "just now");
    }
}
