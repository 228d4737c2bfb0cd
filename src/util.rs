use std::time::Duration;

/// Renders a duration as the clock the timer shows: `MM:SS`, growing to
/// `H:MM:SS` past an hour. Second granularity; sub-second remainder drops.
pub fn format_clock(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock_zero() {
        assert_eq!(format_clock(Duration::ZERO), "00:00");
    }

    #[test]
    fn test_format_clock_seconds_only() {
        assert_eq!(format_clock(Duration::from_secs(42)), "00:42");
    }

    #[test]
    fn test_format_clock_minutes() {
        assert_eq!(format_clock(Duration::from_secs(25 * 60)), "25:00");
        assert_eq!(format_clock(Duration::from_secs(24 * 60 + 59)), "24:59");
    }

    #[test]
    fn test_format_clock_hours() {
        assert_eq!(format_clock(Duration::from_secs(3600)), "1:00:00");
        assert_eq!(format_clock(Duration::from_secs(2 * 3600 + 61)), "2:01:01");
    }

    #[test]
    fn test_format_clock_drops_subsecond_remainder() {
        assert_eq!(format_clock(Duration::from_millis(59_900)), "00:59");
    }
}
