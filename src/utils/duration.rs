//! Interval parsing utilities.
//!
//! This module parses polling interval strings (e.g., "30s", "5m", "-1")
//! into signed seconds. Zero and negative intervals mean "poll once".

/// Parse an interval string (e.g., "5h", "30m", "1800s", "-1") to seconds
///
/// Supports various formats, each optionally preceded by `-`:
/// - Raw seconds: "1800"
/// - Seconds: "1800s", "1800sec", "1800secs", "1800second", "1800seconds"
/// - Minutes: "30m", "30min", "30mins", "30minute", "30minutes"
/// - Hours: "5h", "5hr", "5hrs", "5hour", "5hours"
///
/// # Arguments
/// * `interval` - The interval string to parse
///
/// # Returns
/// * `Ok(i64)` - The interval in seconds if parsing succeeds
/// * `Err(String)` - An error message if parsing fails
///
/// # Examples
/// ```
/// use fleetwatch::utils::duration::parse_interval_seconds;
///
/// assert_eq!(parse_interval_seconds("1800"), Ok(1800));
/// assert_eq!(parse_interval_seconds("30m"), Ok(1800));
/// assert_eq!(parse_interval_seconds("-1"), Ok(-1));
/// assert!(parse_interval_seconds("invalid").is_err());
/// ```
pub fn parse_interval_seconds(interval: &str) -> Result<i64, String> {
    let trimmed = interval.trim();
    let (sign, magnitude) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest.trim_start()),
        None => (1, trimmed),
    };

    parse_unsigned_seconds(magnitude)
        .and_then(|secs| i64::try_from(secs).ok())
        .map(|secs| sign * secs)
        .ok_or_else(|| format!("Invalid interval format: {}", interval))
}

fn parse_unsigned_seconds(duration: &str) -> Option<u64> {
    const UNITS: [(&[&str], u64); 3] = [
        (&["hours", "hour", "hrs", "hr", "h"], 3600),
        (&["minutes", "minute", "mins", "min", "m"], 60),
        (&["seconds", "second", "secs", "sec", "s"], 1),
    ];

    // Longer suffixes are listed first so "30min" is not read as "30mi" + "n"
    for (suffixes, multiplier) in UNITS {
        if suffixes.iter().any(|suffix| duration.ends_with(suffix)) {
            let num_str = extract_number_part(duration);
            if let Ok(value) = num_str.parse::<u64>() {
                if suffixes.contains(&&duration[num_str.len()..]) {
                    return value.checked_mul(multiplier);
                }
            }
        }
    }

    // Only try raw seconds parsing if no unit suffix is found
    duration.parse::<u64>().ok()
}

/// Extract the numeric part from a duration string by finding the first non-digit character
fn extract_number_part(duration: &str) -> &str {
    let end = duration
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(duration.len());
    &duration[..end]
}
