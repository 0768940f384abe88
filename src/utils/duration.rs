//! `mm:ss` text representation of timer durations

use crate::error::ParseDurationError;

/// Parse a duration typed by the user into seconds.
///
/// A bare integer is whole minutes; `mm:ss` sums minutes and seconds.
pub fn parse_duration(text: &str) -> Result<f64, ParseDurationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseDurationError::Empty);
    }

    let segments: Vec<&str> = text.split(':').collect();
    match segments.as_slice() {
        [minutes] => Ok(parse_segment(minutes)? as f64 * 60.0),
        [minutes, seconds] => {
            let minutes = parse_segment(minutes)?;
            let seconds = parse_segment(seconds)?;
            Ok(minutes.saturating_mul(60).saturating_add(seconds) as f64)
        }
        _ => Err(ParseDurationError::WrongSegmentCount(segments.len())),
    }
}

fn parse_segment(segment: &str) -> Result<u64, ParseDurationError> {
    let segment = segment.trim();
    segment
        .parse::<u64>()
        .map_err(|_| ParseDurationError::InvalidNumber(segment.to_string()))
}

/// Format seconds as `mm:ss`. Minutes are not wrapped at the hour.
pub fn format_duration(seconds: f64) -> String {
    // Partial seconds round up so a running display never reads 00:00 early
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.ceil() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}
