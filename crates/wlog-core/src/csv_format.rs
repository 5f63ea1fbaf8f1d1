//! Monthly CSV export and tolerant CSV import.
//!
//! Exports are `;`-separated with a UTF-8 byte-order mark so spreadsheet
//! applications pick the right encoding. Fields are quoted only when they
//! contain a quote, separator or line break.

use std::string::FromUtf8Error;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, Trim, WriterBuilder};
use thiserror::Error;

use crate::entry::{Entry, EntryKind, EntryType};
use crate::holidays::HolidayResolver;
use crate::ledger::entries_in_month;
use crate::report::{EntryRow, entry_rows};
use crate::settings::Settings;
use crate::time::{format_duration, local_instant, parse_clock, sum_ms};

const BOM: &str = "\u{feff}";

pub const CSV_HEADER: [&str; 11] = [
    "Date",
    "Start",
    "End",
    "Duration (hh:mm)",
    "Surcharge (hh:mm)",
    "Weekday",
    "Kind",
    "PauseMinutes",
    "Overdrive",
    "Location",
    "TargetHoursPerDay",
];

const TRUTHY: [&str; 5] = ["true", "1", "yes", "ja", "x"];

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to write CSV: {0}")]
    Write(#[from] csv::Error),

    #[error("failed to flush CSV: {0}")]
    Flush(#[from] std::io::Error),

    #[error("CSV output is not UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),
}

/// Renders one month of entries followed by a `Total` row.
///
/// Durations are net of pauses. Start and end stay blank for day markers.
pub fn export_month_csv<Tz, R>(
    entries: &[Entry],
    year: i32,
    month: u32,
    settings: &Settings,
    tz: &Tz,
    holidays: &R,
) -> Result<String, CsvError>
where
    Tz: TimeZone,
    R: HolidayResolver + ?Sized,
{
    let rows = entry_rows(entries_in_month(entries, year, month, tz), settings, tz, holidays);

    let mut writer = WriterBuilder::new()
        .delimiter(b';')
        .terminator(Terminator::Any(b'\n'))
        .quote_style(QuoteStyle::Necessary)
        .from_writer(BOM.as_bytes().to_vec());
    writer.write_record(CSV_HEADER)?;

    let target_hours = settings.hours_per_day.to_string();
    for row in &rows {
        writer.write_record(row_fields(row, settings, &target_hours))?;
    }

    let total_ms = sum_ms(rows.iter().map(|row| row.net_ms));
    let total_surcharge_ms = sum_ms(rows.iter().map(|row| row.surcharge_ms));
    let (total, total_surcharge) = (format_duration(total_ms), format_duration(total_surcharge_ms));
    writer.write_record([
        "Total",
        "",
        "",
        total.as_str(),
        total_surcharge.as_str(),
        "",
        "",
        "",
        "",
        "",
        "",
    ])?;

    let bytes = writer.into_inner().map_err(|err| err.into_error())?;
    tracing::debug!(year, month, rows = rows.len(), "exported month to CSV");
    Ok(String::from_utf8(bytes)?)
}

fn row_fields<Tz: TimeZone>(
    row: &EntryRow<'_, Tz>,
    settings: &Settings,
    target_hours: &str,
) -> [String; 11] {
    let clock = |at: &DateTime<Tz>| at.naive_local().format("%H:%M").to_string();
    let (start, end, pause, overdrive) = match &row.entry.kind {
        EntryKind::Work {
            pause_minutes,
            overdrive,
            ..
        } => (
            clock(&row.start),
            row.end.as_ref().map(clock).unwrap_or_default(),
            pause_minutes.map(|p| p.to_string()).unwrap_or_default(),
            overdrive.to_string(),
        ),
        EntryKind::Vacation { .. } | EntryKind::FreeOrHoliday { .. } => {
            (String::new(), String::new(), String::new(), String::new())
        }
    };
    [
        row.date().format("%d.%m.%Y").to_string(),
        start,
        end,
        format_duration(row.net_ms),
        format_duration(row.surcharge_ms),
        row.weekday().to_string(),
        row.entry.entry_type().code().to_string(),
        pause,
        overdrive,
        settings.location.clone(),
        target_hours.to_string(),
    ]
}

/// Column positions located from the header row.
#[derive(Debug)]
struct Columns {
    date: usize,
    start: usize,
    end: Option<usize>,
    kind: Option<usize>,
    pause: Option<usize>,
    overdrive: Option<usize>,
}

impl Columns {
    fn locate(header: &StringRecord) -> Option<Self> {
        let names: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();
        Some(Self {
            date: position(&names, |h| h.contains("date") || h.contains("datum"))?,
            start: position(&names, |h| h == "start")?,
            end: position(&names, |h| h == "end" || h == "ende"),
            kind: position(&names, |h| matches!(h, "kind" | "type" | "typ" | "art")),
            pause: position(&names, |h| h.contains("pause")),
            overdrive: position(&names, |h| h.contains("overdrive")),
        })
    }
}

fn position(names: &[String], matches: impl Fn(&str) -> bool) -> Option<usize> {
    names.iter().position(|name| matches(name.as_str()))
}

/// Reads entries from CSV text. Every accepted row gets a fresh id.
///
/// Rows that cannot be understood are skipped; a file without a date or a
/// start column yields nothing.
pub fn import_csv<Tz: TimeZone>(text: &str, tz: &Tz) -> Vec<Entry> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.trim_start_matches(BOM).as_bytes());
    let mut records = reader.records().filter_map(Result::ok);

    let Some(columns) = records.next().as_ref().and_then(Columns::locate) else {
        tracing::debug!("CSV has no date or start column");
        return Vec::new();
    };

    let mut entries = Vec::new();
    for (line, record) in records.enumerate() {
        match parse_row(&record, &columns, tz) {
            Some(kind) => entries.push(Entry::new(kind)),
            None => tracing::debug!(row = line + 2, "skipping CSV row"),
        }
    }
    entries
}

fn parse_row<Tz: TimeZone>(record: &StringRecord, columns: &Columns, tz: &Tz) -> Option<EntryKind> {
    let field = |index: Option<usize>| {
        index
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    let date = parse_date(field(Some(columns.date))?)?;
    let entry_type = match field(columns.kind) {
        Some(kind) => kind.parse().ok()?,
        None => EntryType::Work,
    };
    if entry_type != EntryType::Work {
        return EntryKind::day_marker(entry_type, date);
    }

    let start_clock = parse_clock(field(Some(columns.start))?)?;
    let start = local_instant(tz, date, start_clock.time());
    let end = match field(columns.end) {
        None => None,
        Some(raw) => {
            let end_clock = parse_clock(raw)?;
            let end_date = if end_clock < start_clock {
                date + Duration::days(1)
            } else {
                date
            };
            Some(local_instant(tz, end_date, end_clock.time()).with_timezone(&Utc))
        }
    };
    let pause = field(columns.pause)
        .and_then(|p| p.parse::<i64>().ok())
        .filter(|p| *p >= 0);
    let overdrive = field(columns.overdrive)
        .is_some_and(|value| TRUTHY.contains(&value.to_lowercase().as_str()));

    EntryKind::work(start.with_timezone(&Utc), end, pause, overdrive).ok()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%d.%m.%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
}
