//! Date formatting helpers
//!
//! The published-date widgets all consume one `FormattedDateTime` value:
//! absolute strings for display, a relative phrase for the card byline and
//! a freshness flag for the "New" badge. Invalid input never errors; it
//! produces the `"Invalid Date"` sentinel so the presentation layer can
//! render it as-is.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Europe::London;

/// Sentinel used for every string field when the input cannot be parsed.
pub const INVALID_DATE: &str = "Invalid Date";

/// Documents published within this window are considered fresh.
const FRESH_WINDOW_MS: i64 = 1000 * 60 * 60 * 24 * 3;

/// A fully formatted date/time value
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FormattedDateTime {
    /// ISO-8601 instant, e.g. "2024-01-15T10:30:00.000Z"
    pub iso: String,
    /// Long date, e.g. "Monday 15 January 2024"
    pub date: String,
    /// Wall-clock time in Europe/London, e.g. "10:30"
    pub time: String,
    /// Combined date and time, e.g. "Monday 15 January 2024 at 10:30"
    pub date_time: String,
    /// Relative phrase, e.g. "2 hours ago", "in 3 days", "now"
    pub relative_to_now: String,
    /// Published within the last 3 days
    pub is_fresh: bool,
}

impl FormattedDateTime {
    fn invalid() -> Self {
        Self {
            iso: INVALID_DATE.to_string(),
            date: INVALID_DATE.to_string(),
            time: INVALID_DATE.to_string(),
            date_time: INVALID_DATE.to_string(),
            relative_to_now: INVALID_DATE.to_string(),
            is_fresh: false,
        }
    }
}

/// Format a date/time string for display.
///
/// Accepts anything [`parse_date_input`] understands; unparseable input
/// yields the sentinel result rather than an error.
pub fn format_date_time(input: &str) -> FormattedDateTime {
    format_date_time_at(input, Utc::now())
}

/// Same as [`format_date_time`] with an explicit "now" (the relative
/// phrase and freshness flag depend on it).
pub fn format_date_time_at(input: &str, now: DateTime<Utc>) -> FormattedDateTime {
    let Some(date) = parse_date_input(input) else {
        return FormattedDateTime::invalid();
    };

    let delta_ms = (date - now).num_milliseconds();
    let local = date.with_timezone(&London);

    let long_date = local.format("%A %-d %B %Y").to_string();
    let time = local.format("%H:%M").to_string();

    FormattedDateTime {
        iso: date.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        date_time: format!("{} at {}", long_date, time),
        date: long_date,
        time,
        relative_to_now: relative_phrase(delta_ms),
        is_fresh: delta_ms > -FRESH_WINDOW_MS,
    }
}

/// True iff the instant is within the 3-day freshness window of `now`.
pub fn is_fresh(date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    (date - now).num_milliseconds() > -FRESH_WINDOW_MS
}

/// Express a signed millisecond delta as the coarsest applicable unit.
///
/// Thresholds are evaluated in ascending order: minutes (< 60), hours
/// (< 24), days (< 14), weeks (< 8), months (< 12), else years. Minutes,
/// hours and days use ceiling division; weeks, months and years use floor.
/// The asymmetry is load-bearing: "59 minutes ago" stays in minutes while
/// "60 minutes ago" rounds to "1 hour ago".
fn relative_phrase(delta_ms: i64) -> String {
    let minutes = ceil_div(delta_ms as f64, 1000.0 * 60.0);
    if minutes.abs() < 60 {
        return phrase(minutes, "minute");
    }

    let hours = ceil_div(minutes as f64, 60.0);
    if hours.abs() < 24 {
        return phrase(hours, "hour");
    }

    let days = ceil_div(hours as f64, 24.0);
    if days.abs() < 14 {
        return phrase(days, "day");
    }

    let weeks = floor_div(days as f64, 7.0);
    if weeks.abs() < 8 {
        return phrase(weeks, "week");
    }

    let months = floor_div(days as f64, 30.0);
    if months.abs() < 12 {
        return phrase(months, "month");
    }

    phrase(floor_div(days as f64, 365.0), "year")
}

fn ceil_div(a: f64, b: f64) -> i64 {
    (a / b).ceil() as i64
}

fn floor_div(a: f64, b: f64) -> i64 {
    (a / b).floor() as i64
}

/// Auto-numeric phrasing for a signed unit count.
fn phrase(value: i64, unit: &str) -> String {
    match (value, unit) {
        (0, "minute") | (0, "hour") => return "now".to_string(),
        (0, "day") => return "today".to_string(),
        (-1, "day") => return "yesterday".to_string(),
        (1, "day") => return "tomorrow".to_string(),
        (0, _) => return format!("this {}", unit),
        _ => {}
    }

    let n = value.unsigned_abs();
    let noun = if n == 1 {
        unit.to_string()
    } else {
        format!("{}s", unit)
    };

    if value > 0 {
        format!("in {} {}", n, noun)
    } else {
        format!("{} {} ago", n, noun)
    }
}

/// Parse a date string in the formats the content uses.
///
/// Naive dates and date-times are taken as UTC, per the content's date
/// convention.
pub fn parse_date_input(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d"];
    for fmt in date_formats {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0)?));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn at_offset(minutes: i64) -> FormattedDateTime {
        let target = now() + Duration::minutes(minutes);
        format_date_time_at(&target.to_rfc3339(), now())
    }

    #[test]
    fn test_invalid_input_yields_sentinel() {
        let formatted = format_date_time("not-a-date");
        assert_eq!(formatted.iso, INVALID_DATE);
        assert_eq!(formatted.date, INVALID_DATE);
        assert_eq!(formatted.time, INVALID_DATE);
        assert_eq!(formatted.date_time, INVALID_DATE);
        assert_eq!(formatted.relative_to_now, INVALID_DATE);
        assert!(!formatted.is_fresh);
    }

    #[test]
    fn test_absolute_formats() {
        let formatted = format_date_time_at("2024-01-15T10:30:00Z", now());
        assert_eq!(formatted.iso, "2024-01-15T10:30:00.000Z");
        assert_eq!(formatted.date, "Monday 15 January 2024");
        assert_eq!(formatted.time, "10:30");
        assert_eq!(formatted.date_time, "Monday 15 January 2024 at 10:30");
    }

    #[test]
    fn test_plain_date_parses_as_utc_midnight() {
        let formatted = format_date_time_at("2024-01-15", now());
        assert_eq!(formatted.iso, "2024-01-15T00:00:00.000Z");
    }

    #[test]
    fn test_minutes_to_hours_boundary() {
        // Ceiling semantics: -59 stays in minutes, -60 and -61 become hours
        assert_eq!(at_offset(-59).relative_to_now, "59 minutes ago");
        assert_eq!(at_offset(-60).relative_to_now, "1 hour ago");
        assert_eq!(at_offset(-61).relative_to_now, "1 hour ago");
    }

    #[test]
    fn test_relative_now_and_future() {
        assert_eq!(at_offset(0).relative_to_now, "now");
        assert_eq!(at_offset(3).relative_to_now, "in 3 minutes");
        assert_eq!(at_offset(3 * 24 * 60).relative_to_now, "in 3 days");
    }

    #[test]
    fn test_relative_coarse_units_use_floor() {
        // 20 days ago: days no longer applies, weeks = floor(-20/7) = -3
        assert_eq!(at_offset(-20 * 24 * 60).relative_to_now, "3 weeks ago");
        // 60 days ago: weeks = floor(-60/7) = -9, months = floor(-60/30) = -2
        assert_eq!(at_offset(-60 * 24 * 60).relative_to_now, "2 months ago");
        assert_eq!(at_offset(-730 * 24 * 60).relative_to_now, "2 years ago");
    }

    #[test]
    fn test_yesterday_and_tomorrow() {
        assert_eq!(at_offset(-25 * 60).relative_to_now, "yesterday");
        assert_eq!(at_offset(25 * 60).relative_to_now, "in 2 days");
    }

    #[test]
    fn test_freshness_window() {
        assert!(at_offset(-2 * 24 * 60).is_fresh, "2 days ago is fresh");
        assert!(!at_offset(-4 * 24 * 60).is_fresh, "4 days ago is stale");
    }
}
