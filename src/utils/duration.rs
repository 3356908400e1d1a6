//! Duration parsing for command-line values.

use std::time::Duration;

/// Parse a duration string such as "90s", "30m", "1h30m" or "500ms".
///
/// Accepts the same grammar as durations in the YAML configuration.
///
/// # Examples
/// ```
/// use linksweep::utils::duration::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("30m"), Ok(Duration::from_secs(1800)));
/// assert_eq!(parse_duration("1h 30m"), Ok(Duration::from_secs(5400)));
/// assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
/// assert!(parse_duration("soon").is_err());
/// ```
pub fn parse_duration(duration: &str) -> Result<Duration, String> {
    humantime::parse_duration(duration.trim())
        .map_err(|e| format!("Invalid duration '{}': {}", duration, e))
}
