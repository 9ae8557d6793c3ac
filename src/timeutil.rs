//! Wall-clock time parsing and minute arithmetic.
//!
//! Punch times from the record store may arrive as bare times ("08:00:00"), as
//! timestamps ("2024-05-06 08:00:00"), or with a trailing UTC offset
//! ("2024-05-06T08:00:00+08:00"). Offsets are discarded: every punch is treated as
//! local wall-clock time already.

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::Decimal;

/// Minutes in one day, added when an interval crosses midnight.
pub const MINUTES_PER_DAY: i64 = 1440;

const SECONDS_PER_DAY: i64 = MINUTES_PER_DAY * 60;

const TIME_FORMATS: [&str; 5] = ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Remove a trailing `Z` or `[+-]HH`, `[+-]HHMM`, `[+-]HH:MM` offset.
///
/// Only strips when the suffix follows a time component, so a bare date such as
/// "2024-05-06" is returned unchanged.
pub fn strip_offset(raw: &str) -> &str {
    let s = raw.trim();

    if let Some(rest) = s.strip_suffix('Z') {
        return rest;
    }

    let Some(pos) = s.rfind(['+', '-']) else {
        return s;
    };
    let (head, tail) = (&s[..pos], &s[pos + 1..]);

    let is_offset = match tail.as_bytes() {
        [a, b] => a.is_ascii_digit() && b.is_ascii_digit(),
        [a, b, c, d] => [a, b, c, d].iter().all(|x| x.is_ascii_digit()),
        [a, b, b':', c, d] => [a, b, c, d].iter().all(|x| x.is_ascii_digit()),
        _ => false,
    };

    if is_offset && head.contains(':') && head.ends_with(|c: char| c.is_ascii_digit()) {
        head
    } else {
        s
    }
}

/// Parse a punch value into local wall-clock time.
///
/// Returns `None` for empty or malformed input; callers treat that as a missing punch.
pub fn parse_wall_clock(raw: &str) -> Option<NaiveTime> {
    let s = strip_offset(raw);
    if s.is_empty() {
        return None;
    }

    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.time())
        })
}

/// Minutes since midnight, seconds truncated.
pub fn minute_of_day(time: NaiveTime) -> i64 {
    i64::from(time.num_seconds_from_midnight()) / 60
}

/// Whole minutes from `start` to `end`.
///
/// An `end` earlier than `start` is an overnight interval: one day is added before
/// subtracting. The result is never negative.
pub fn minutes_between(start: NaiveTime, end: NaiveTime) -> i64 {
    let start = i64::from(start.num_seconds_from_midnight());
    let mut end = i64::from(end.num_seconds_from_midnight());
    if end < start {
        end += SECONDS_PER_DAY;
    }
    (end - start) / 60
}

/// `minutes_between` for optional punches; a missing side contributes zero.
pub fn span_minutes(start: Option<NaiveTime>, end: Option<NaiveTime>) -> i64 {
    match (start, end) {
        (Some(start), Some(end)) => minutes_between(start, end),
        _ => 0,
    }
}

/// Convert minutes to fractional hours.
pub fn minutes_to_hours(minutes: i64) -> Decimal {
    Decimal::from(minutes) / Decimal::from(60)
}
