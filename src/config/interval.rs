use std::time::Duration;

use crate::config::ConfigError;

/// Parse an interval like "500ms", "30s", "5m", "6h", "1d", or bare seconds.
pub fn parse_interval(s: &str) -> Result<Duration, ConfigError> {
    let s = s.trim().to_lowercase();
    let invalid = || ConfigError::InvalidInterval(s.clone());

    let duration = if let Some(millis) = s.strip_suffix("ms") {
        millis
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| invalid())?
    } else if let Some(hours) = s.strip_suffix('h') {
        hours
            .trim()
            .parse::<u64>()
            .ok()
            .and_then(|h| h.checked_mul(3600))
            .map(Duration::from_secs)
            .ok_or_else(invalid)?
    } else if let Some(minutes) = s.strip_suffix('m') {
        minutes
            .trim()
            .parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
            .ok_or_else(invalid)?
    } else if let Some(days) = s.strip_suffix('d') {
        days.trim()
            .parse::<u64>()
            .ok()
            .and_then(|d| d.checked_mul(86400))
            .map(Duration::from_secs)
            .ok_or_else(invalid)?
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| invalid())?
    } else {
        s.parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| invalid())?
    };

    if duration.is_zero() {
        return Err(invalid());
    }

    Ok(duration)
}

/// Format an interval using the largest unit that divides it evenly.
pub fn format_interval(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis % 1000 != 0 {
        return format!("{}ms", millis);
    }

    let secs = duration.as_secs();
    if secs >= 86400 && secs.is_multiple_of(86400) {
        format!("{}d", secs / 86400)
    } else if secs >= 3600 && secs.is_multiple_of(3600) {
        format!("{}h", secs / 3600)
    } else if secs >= 60 && secs.is_multiple_of(60) {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}
