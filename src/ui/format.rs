//! Text formatting helpers for the status screens.

use core::fmt::Write;

use heapless::String;

/// Format a second count as `HH:MM:SS`.
///
/// Hours are not capped; past 99 hours the field simply widens (the
/// buffer holds several years of uptime).
pub fn format_hms(total_secs: u32) -> String<12> {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    let mut out = String::new();
    let _ = write!(out, "{hours:02}:{minutes:02}:{secs:02}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_pads_each_field() {
        assert_eq!(format_hms(0).as_str(), "00:00:00");
        assert_eq!(format_hms(61).as_str(), "00:01:01");
        assert_eq!(format_hms(3_599).as_str(), "00:59:59");
        assert_eq!(format_hms(3_600).as_str(), "01:00:00");
    }

    #[test]
    fn long_uptimes_widen_the_hour_field() {
        assert_eq!(format_hms(90 * 3600 + 125).as_str(), "90:02:05");
        assert_eq!(format_hms(123 * 3600).as_str(), "123:00:00");
    }
}
