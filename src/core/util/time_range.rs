use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use crate::errors::CostModelError;

/// Layout accepted for absolute instants, e.g. `2024-03-01T00:00:00.000Z`.
pub const TIME_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn minutes(&self) -> f64 {
        self.duration().num_milliseconds() as f64 / 60_000.0
    }

    pub fn hours(&self) -> f64 {
        self.minutes() / 60.0
    }
}

/// Parses a duration such as `24h`, `7d`, `1h30m` or `250ms`.
///
/// `y` is a 365-day year, as in PromQL; every other unit is humantime's.
/// Returns `None` for an empty, signed, malformed or out-of-range string.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let std_duration = humantime::parse_duration(&expand_years(s)?).ok()?;
    Duration::from_std(std_duration).ok()
}

// humantime counts `y` as 365.25 days; rewrite `<n>y` to `<n*365>d`.
fn expand_years(s: &str) -> Option<String> {
    let mut out = String::with_capacity(s.len());
    let mut digits = String::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }

        let bare_y = c == 'y' && !chars.peek().is_some_and(|n| n.is_ascii_alphabetic());
        if bare_y && !digits.is_empty() {
            let years: u64 = digits.parse().ok()?;
            out.push_str(&format!("{}d", years.checked_mul(365)?));
        } else {
            out.push_str(&digits);
            out.push(c);
        }
        digits.clear();
    }
    out.push_str(&digits);

    Some(out)
}

/// Resolves `(start, end)` for a window ending `offset` before `now`.
///
/// An empty offset means the window ends at `now`. A window that does not
/// parse, or parses to zero length, is an `InvalidRange`.
pub fn resolve_window(
    window: &str,
    offset: &str,
    now: DateTime<Utc>,
) -> Result<TimeWindow, CostModelError> {
    let mut end = now;
    if !offset.trim().is_empty() {
        let o = parse_duration(offset).ok_or_else(|| {
            CostModelError::InvalidRange(format!("error parsing offset ({})", offset))
        })?;
        end = now.checked_sub_signed(o).ok_or_else(|| {
            CostModelError::InvalidRange(format!("offset {} is out of range", offset))
        })?;
    }

    let dur = parse_duration(window).ok_or_else(|| {
        CostModelError::InvalidRange(format!("error parsing window ({})", window))
    })?;
    if dur <= Duration::zero() {
        return Err(CostModelError::InvalidRange(format!(
            "window {}, offset {}",
            window, offset
        )));
    }

    let start = end.checked_sub_signed(dur).ok_or_else(|| {
        CostModelError::InvalidRange(format!("window {} is out of range", window))
    })?;

    Ok(TimeWindow { start, end })
}

/// Checks that `window` and `offset` parse, without resolving instants.
pub fn validate_window(window: &str, offset: &str) -> Result<(), CostModelError> {
    resolve_window(window, offset, Utc::now()).map(|_| ())
}

pub fn parse_time(s: &str) -> Result<DateTime<Utc>, CostModelError> {
    NaiveDateTime::parse_from_str(s, TIME_LAYOUT)
        .map(|dt| dt.and_utc())
        .map_err(|e| CostModelError::InvalidRange(format!("error parsing time {}: {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("24h"), Some(Duration::hours(24)));
        assert_eq!(parse_duration("7d"), Some(Duration::days(7)));
        assert_eq!(parse_duration("1w"), Some(Duration::days(7)));
        assert_eq!(parse_duration("90s"), Some(Duration::seconds(90)));
        assert_eq!(parse_duration("250ms"), Some(Duration::milliseconds(250)));
        assert_eq!(parse_duration("1h30m"), Some(Duration::minutes(90)));
        assert_eq!(parse_duration("1y"), Some(Duration::days(365)));
        assert_eq!(parse_duration("1y12h"), Some(Duration::days(365) + Duration::hours(12)));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        for bad in ["", "h", "24", "24x", "-1h", "1h-", "abc", "1..5h", "y"] {
            assert_eq!(parse_duration(bad), None, "{:?} should not parse", bad);
        }
    }

    #[test]
    fn test_resolve_window_without_offset() {
        let w = resolve_window("24h", "", now()).unwrap();
        assert_eq!(w.end, now());
        assert_eq!(w.start, now() - Duration::hours(24));
        assert_eq!(w.hours(), 24.0);
        assert_eq!(w.minutes(), 1440.0);
    }

    #[test]
    fn test_resolve_window_with_offset() {
        let w = resolve_window("1h", "2h", now()).unwrap();
        assert_eq!(w.end, now() - Duration::hours(2));
        assert_eq!(w.start, now() - Duration::hours(3));
        assert!(w.end > w.start);
    }

    #[test]
    fn test_resolve_window_rejects_zero_length() {
        assert!(matches!(
            resolve_window("0h", "", now()),
            Err(CostModelError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_resolve_window_rejects_unparsable() {
        assert!(matches!(
            resolve_window("yesterday", "", now()),
            Err(CostModelError::InvalidRange(_))
        ));
        assert!(matches!(
            resolve_window("1d", "soon", now()),
            Err(CostModelError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_out_of_range_window_or_offset_is_invalid() {
        assert!(matches!(
            resolve_window("300000y", "", now()),
            Err(CostModelError::InvalidRange(_))
        ));
        assert!(matches!(
            validate_window("1h", "300000y"),
            Err(CostModelError::InvalidRange(_))
        ));
        assert!(matches!(
            resolve_window("99999999999999999999d", "", now()),
            Err(CostModelError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_valid_windows_are_positive() {
        for (window, offset) in [("1m", ""), ("2d", "1d"), ("30m", "1w"), ("1y", "")] {
            let w = resolve_window(window, offset, now()).unwrap();
            assert!(w.end > w.start);
            assert!(w.hours() > 0.0);
        }
    }

    #[test]
    fn test_parse_time() {
        let t = parse_time("2024-03-01T06:30:00.000Z").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2024, 3, 1, 6, 30, 0).unwrap());
        assert!(parse_time("2024-03-01 06:30").is_err());
    }
}
