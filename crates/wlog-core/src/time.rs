//! Time value helpers: millisecond arithmetic, `HH:MM` clock times and
//! `hh:mm` / `±hh:mm` duration rendering.
//!
//! All interval math in this crate is done on epoch milliseconds so that
//! day-boundary clipping stays exact across DST transitions. Local calendar
//! positions (midnight, a configured clock time on a given day) are resolved
//! through [`local_instant`].

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Timelike, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MS_PER_MINUTE: i64 = 60_000;
pub const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;

/// Accepts `H:MM` and `HH:MM`.
static CLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").unwrap());

/// A string that is not a valid 24h clock time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid time of day: {0:?}")]
pub struct ClockError(String);

/// A time of day with minute resolution, serialized as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub const fn time(self) -> NaiveTime {
        self.0
    }
}

impl FromStr for ClockTime {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || ClockError(s.to_string());
        let caps = CLOCK_RE.captures(trimmed).ok_or_else(invalid)?;
        let hour: u32 = caps[1].parse().map_err(|_| invalid())?;
        let minute: u32 = caps[2].parse().map_err(|_| invalid())?;
        Self::new(hour, minute).ok_or_else(invalid)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ClockError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

/// Parses `H:MM`/`HH:MM`, returning `None` for anything else.
pub fn parse_clock(s: &str) -> Option<ClockTime> {
    s.parse().ok()
}

/// Converts fractional hours to whole milliseconds.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn hours_to_ms(hours: f64) -> i64 {
    (hours * MS_PER_HOUR as f64).round() as i64
}

/// Rounds to the nearest whole minute, halves rounding up.
pub const fn round_to_minutes(ms: i64) -> i64 {
    ms.saturating_add(MS_PER_MINUTE / 2).div_euclid(MS_PER_MINUTE)
}

/// Sums durations, saturating instead of overflowing.
pub fn sum_ms(values: impl IntoIterator<Item = i64>) -> i64 {
    values.into_iter().fold(0, i64::saturating_add)
}

/// Formats a duration as `hh:mm`. Negative durations render as `00:00`.
pub fn format_duration(ms: i64) -> String {
    let minutes = round_to_minutes(ms.max(0));
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Formats a duration as `+hh:mm` or `-hh:mm`; zero is `+00:00`.
pub fn format_signed_duration(ms: i64) -> String {
    let sign = if ms >= 0 { '+' } else { '-' };
    let minutes = round_to_minutes(ms.saturating_abs());
    format!("{sign}{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Length of the intersection of `[a_start, a_end)` and `[b_start, b_end)`.
pub fn overlap_ms(a_start: i64, a_end: i64, b_start: i64, b_end: i64) -> i64 {
    (a_end.min(b_end) - a_start.max(b_start)).max(0)
}

/// Resolves a local wall-clock position to an instant in `tz`.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant. Times that
/// fall into a DST gap are moved forward by one hour.
pub fn local_instant<Tz: TimeZone>(tz: &Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Tz> {
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .unwrap_or_else(|| tz.from_utc_datetime(&naive)),
    }
}

/// Local midnight at the start of `date`.
pub fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    local_instant(tz, date, NaiveTime::MIN)
}

/// First day of the month and first day of the following month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next))
}

/// True for Monday through Friday.
pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Full English weekday name.
pub const fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
