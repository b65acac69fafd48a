//! Race clock conversions between the `mm:ss` notation used in result
//! sheets and plain seconds.
//!
//! The simulation rounds its own clock to milliseconds, so losing precision
//! beyond two decimal digits of seconds is acceptable here.

use crate::error::{RaceError, Result};

/// Parse a `mm:ss` clock value into seconds.
///
/// The minutes part can exceed 59 (cross-country times are commonly written
/// as e.g. `62:30.4`), and the seconds part may carry decimals.
pub fn parse_clock(text: &str) -> Result<f64> {
    let (m, s) = text
        .split_once(':')
        .ok_or_else(|| RaceError::ClockFormat(text.to_string()))?;
    let minutes: f64 = m.trim().parse().map_err(|_| RaceError::ClockFormat(text.to_string()))?;
    let seconds: f64 = s.trim().parse().map_err(|_| RaceError::ClockFormat(text.to_string()))?;
    Ok(minutes * 60.0 + seconds)
}

/// Format seconds as `[h:]mm:ss`, omitting the hour field when zero.
///
/// Minutes and seconds are zero-padded to two digits and truncated, not
/// rounded, to whole seconds.
pub fn format_clock(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}
