//! Human-readable clock formatting for transport displays
//!
//! Songs on a soundboard are minutes long, so clocks use `M:SS` below an
//! hour and `H:MM:SS` above it.

const HOUR: u64 = 3600;

/// Format seconds as a transport clock.
///
/// Negative and non-finite inputs render as `0:00`.
///
/// # Examples
///
/// ```
/// use dugout_common::human_time::format_clock;
///
/// assert_eq!(format_clock(0.0), "0:00");
/// assert_eq!(format_clock(65.4), "1:05");
/// assert_eq!(format_clock(3725.0), "1:02:05");
/// ```
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };

    if total >= HOUR {
        format!("{}:{:02}:{:02}", total / HOUR, (total % HOUR) / 60, total % 60)
    } else {
        format!("{}:{:02}", total / 60, total % 60)
    }
}

/// Format the time remaining in a track as a negative clock (`-M:SS`).
///
/// Returns `None` when the duration is unknown or zero, matching the rule
/// that duration-less sources have no progress display.
///
/// # Examples
///
/// ```
/// use dugout_common::human_time::format_remaining;
///
/// assert_eq!(format_remaining(30.0, Some(95.0)).as_deref(), Some("-1:05"));
/// assert_eq!(format_remaining(30.0, None), None);
/// ```
pub fn format_remaining(elapsed: f64, duration: Option<f64>) -> Option<String> {
    let duration = duration.filter(|d| d.is_finite() && *d > 0.0)?;
    let remaining = (duration - elapsed).max(0.0);
    // Round up so the display reaches -0:00 only at the very end
    Some(format!("-{}", format_clock(remaining.ceil())))
}
