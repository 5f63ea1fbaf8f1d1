//! Month report: one line per entry plus worked, premium, expected and balance.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{NaiveDate, TimeZone};
use serde::Serialize;
use wlog_core::storage::{Store, load_entries, load_settings};
use wlog_core::{
    EntryRow, EntryType, HolidayProvider, MonthSummary, format_duration, format_signed_duration,
    summarize_month,
};

use super::util::{YearMonth, clock, day, short_id};

#[derive(Debug, Serialize)]
struct JsonReport {
    month: String,
    region: String,
    worked: String,
    surcharge: String,
    expected: String,
    delta: String,
    worked_ms: i64,
    surcharge_ms: i64,
    expected_ms: i64,
    delta_ms: i64,
    entries: Vec<JsonRow>,
}

#[derive(Debug, Serialize)]
struct JsonRow {
    id: String,
    date: NaiveDate,
    weekday: &'static str,
    kind: &'static str,
    start: Option<String>,
    end: Option<String>,
    net: String,
    surcharge: String,
}

/// Writes the report for `month`; `today` caps the expected time.
pub fn run<W: Write, S: Store + ?Sized, Tz: TimeZone>(
    writer: &mut W,
    store: &S,
    tz: &Tz,
    month: YearMonth,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let settings = load_settings(store);
    let entries = load_entries(store, tz);
    let holidays = HolidayProvider::new(store, settings.state_code.as_str());
    let summary = summarize_month(&entries, month.year, month.month, &settings, tz, &holidays, today);

    if json {
        let report = json_report(&summary, holidays.region());
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        writer.write_all(format_report(&summary, holidays.region()).as_bytes())?;
    }
    Ok(())
}

fn json_report<Tz: TimeZone>(summary: &MonthSummary<'_, Tz>, region: &str) -> JsonReport {
    JsonReport {
        month: format!("{:04}-{:02}", summary.year, summary.month),
        region: region.to_string(),
        worked: format_duration(summary.worked_ms),
        surcharge: format_duration(summary.surcharge_ms),
        expected: format_duration(summary.expected_ms),
        delta: format_signed_duration(summary.delta_ms),
        worked_ms: summary.worked_ms,
        surcharge_ms: summary.surcharge_ms,
        expected_ms: summary.expected_ms,
        delta_ms: summary.delta_ms,
        entries: summary
            .rows
            .iter()
            .map(|row| {
                let (start, end) = times(row);
                JsonRow {
                    id: row.entry.id.to_string(),
                    date: row.date(),
                    weekday: row.weekday(),
                    kind: row.entry.entry_type().code(),
                    start,
                    end,
                    net: format_duration(row.net_ms),
                    surcharge: format_duration(row.surcharge_ms),
                }
            })
            .collect(),
    }
}

/// Start and end clock times; day markers have neither.
fn times<Tz: TimeZone>(row: &EntryRow<'_, Tz>) -> (Option<String>, Option<String>) {
    if row.entry.entry_type() != EntryType::Work {
        return (None, None);
    }
    (Some(clock(&row.start)), row.end.as_ref().map(clock))
}

fn format_report<Tz: TimeZone>(summary: &MonthSummary<'_, Tz>, region: &str) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "Report {:02}.{:04} ({region})",
        summary.month, summary.year
    );
    let _ = writeln!(output);

    if summary.rows.is_empty() {
        let _ = writeln!(output, "No entries.");
    } else {
        let _ = writeln!(
            output,
            "{:<10}  {:<9}  {:<4}  {:<5}  {:<5}  {:<5}  {:<9}  ID",
            "Date", "Weekday", "Kind", "Start", "End", "Net", "Surcharge"
        );
        for row in &summary.rows {
            let (start, end) = times(row);
            let end = match (&start, end) {
                (Some(_), None) => "...".to_string(),
                (_, end) => end.unwrap_or_default(),
            };
            let _ = writeln!(
                output,
                "{:<10}  {:<9}  {:<4}  {:<5}  {:<5}  {:<5}  {:<9}  {}",
                day(row.date()),
                row.weekday(),
                row.entry.entry_type().code(),
                start.unwrap_or_default(),
                end,
                format_duration(row.net_ms),
                format_duration(row.surcharge_ms),
                short_id(&row.entry.id)
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "Worked:    {}", format_duration(summary.worked_ms));
    let _ = writeln!(output, "Surcharge: {}", format_duration(summary.surcharge_ms));
    let _ = writeln!(output, "Expected:  {}", format_duration(summary.expected_ms));
    let _ = writeln!(output, "Balance:   {}", format_signed_duration(summary.delta_ms));
    output
}
