//! Shared helpers for command implementations.

use anyhow::{Result, bail};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use wlog_core::time::local_instant;
use wlog_core::{Entry, EntryId};

/// A calendar month selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

/// Parses `YYYY-MM`.
pub fn parse_year_month(s: &str) -> Result<YearMonth, String> {
    let invalid = || format!("expected YYYY-MM, got {s:?}");
    let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok(YearMonth { year, month })
}

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parses a user-supplied local time.
///
/// Accepts `HH:MM` (on `today`), `YYYY-MM-DD HH:MM[:SS]` with a space or `T`,
/// and RFC 3339 with an explicit offset.
pub fn parse_local_datetime<Tz: TimeZone>(
    tz: &Tz,
    input: &str,
    today: NaiveDate,
) -> Result<DateTime<Tz>> {
    let input = input.trim();
    if let Ok(time) = NaiveTime::parse_from_str(input, "%H:%M") {
        return Ok(local_instant(tz, today, time));
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(input) {
        return Ok(at.with_timezone(tz));
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(local_instant(tz, naive.date(), naive.time()));
        }
    }
    bail!("invalid time {input:?}: expected HH:MM, YYYY-MM-DD HH:MM or RFC 3339")
}

/// Length of the ID prefix shown in listings.
pub const SHORT_ID_LEN: usize = 8;

pub fn short_id(id: &EntryId) -> &str {
    let id = id.as_str();
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

/// Resolves a full ID or a unique prefix of one.
pub fn resolve_id(entries: &[Entry], input: &str) -> Result<EntryId> {
    let input = input.trim();
    if input.is_empty() {
        bail!("entry ID cannot be empty");
    }
    if let Some(entry) = entries.iter().find(|entry| entry.id.as_str() == input) {
        return Ok(entry.id.clone());
    }
    let mut matches = entries
        .iter()
        .filter(|entry| entry.id.as_str().starts_with(input));
    match (matches.next(), matches.next()) {
        (Some(entry), None) => Ok(entry.id.clone()),
        (None, _) => bail!("no entry with ID {input}"),
        (Some(_), Some(_)) => bail!("entry ID prefix {input} is ambiguous"),
    }
}

/// `HH:MM` in the instant's own time zone.
pub fn clock<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    at.naive_local().format("%H:%M").to_string()
}

/// `DD.MM.YYYY`.
pub fn day(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}
