use std::time::Duration;

/// Formats a duration the way progress lines show it
///
/// Days, hours, and minutes are shown only when non-zero. Milliseconds are shown
/// for durations under an hour; from an hour up only whole seconds are kept.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use threadget::output::format_run_time;
///
/// assert_eq!(format_run_time(Duration::from_millis(1500)), "1.500s");
/// assert_eq!(format_run_time(Duration::from_secs(3723)), "1h 2m 3s");
/// ```
pub fn format_run_time(elapsed: Duration) -> String {
    let total_ms = elapsed.as_millis();
    let ms = total_ms % 1000;
    let mut secs = total_ms / 1000;

    let days = secs / 86_400;
    secs %= 86_400;
    let hours = secs / 3_600;
    secs %= 3_600;
    let mins = secs / 60;
    secs %= 60;

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{}d ", days));
    }
    if hours > 0 {
        out.push_str(&format!("{}h ", hours));
    }
    if mins > 0 {
        out.push_str(&format!("{}m ", mins));
    }

    let show_ms = days == 0 && hours == 0;
    if show_ms && (secs > 0 || ms > 0) {
        out.push_str(&format!("{}.{:03}s", secs, ms));
    } else {
        out.push_str(&format!("{}s", secs));
    }
    out
}
