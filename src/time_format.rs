use std::time::Duration;

/// Renders an elapsed duration as a short sentence such as `2 days, 1 hour`.
///
/// Only the two most significant units are shown once a unit above seconds is
/// non-zero. Sub-second precision is truncated.
pub fn format_time(elapsed: Duration) -> String {
    let total_seconds = elapsed.as_secs();
    let seconds = total_seconds % 60;
    let minutes = (total_seconds / 60) % 60;
    let hours = (total_seconds / 3600) % 24;
    let days = total_seconds / 86400;

    let parts = if days > 0 {
        [plural(days, "day"), plural(hours, "hour")]
    } else if hours > 0 {
        [plural(hours, "hour"), plural(minutes, "minute")]
    } else if minutes > 0 {
        [plural(minutes, "minute"), plural(seconds, "second")]
    } else {
        return plural(seconds, "second");
    };
    parts.join(", ")
}

fn plural(value: u64, unit: &str) -> String {
    if value == 1 {
        format!("1 {unit}")
    } else {
        format!("{value} {unit}s")
    }
}

#[cfg(test)]
mod test {
    use super::format_time;
    use std::time::Duration;

    fn millis(ms: u64) -> String {
        format_time(Duration::from_millis(ms))
    }

    #[test]
    fn formats_seconds() {
        assert_eq!(millis(0), "0 seconds");
        assert_eq!(millis(999), "0 seconds");
        assert_eq!(millis(1000), "1 second");
        assert_eq!(millis(1000 * 59), "59 seconds");
    }

    #[test]
    fn formats_minutes_with_seconds() {
        assert_eq!(millis(1000 * 60), "1 minute, 0 seconds");
        assert_eq!(millis(1000 * 61), "1 minute, 1 second");
        assert_eq!(millis(1000 * (60 * 60 - 1)), "59 minutes, 59 seconds");
    }

    #[test]
    fn drops_seconds_once_hours_show() {
        assert_eq!(millis(1000 * 60 * 60), "1 hour, 0 minutes");
        assert_eq!(millis(1000 * (60 * 60 * 24 - 60)), "23 hours, 59 minutes");
        assert_eq!(millis(1000 * (60 * 60 * 2 + 59)), "2 hours, 0 minutes");
    }

    #[test]
    fn days_show_hours_only() {
        assert_eq!(millis(1000 * 60 * 60 * 24), "1 day, 0 hours");
        assert_eq!(millis(1000 * 60 * 60 * 49), "2 days, 1 hour");
        assert_eq!(millis(1000 * 60 * 60 * 24 * 365), "365 days, 0 hours");
    }
}
