//! Human-readable durations for status lines.

/// Format seconds with a unit picked by magnitude.
///
/// ```
/// use annoyer_core::format_duration;
/// assert_eq!(format_duration(12.345), "12.35 sec.");
/// assert_eq!(format_duration(90.0), "1.5 min.");
/// assert_eq!(format_duration(5400.0), "1.5 hr.");
/// ```
pub fn format_duration(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    if seconds < 60.0 {
        format!("{seconds:.2} sec.")
    } else if seconds < 3600.0 {
        format!("{:.1} min.", seconds / 60.0)
    } else {
        format!("{:.1} hr.", seconds / 3600.0)
    }
}
