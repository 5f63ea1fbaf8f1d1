//! Today's entries and the running timer.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Datelike, TimeZone};
use wlog_core::storage::{Store, load_entries, load_settings};
use wlog_core::time::weekday_name;
use wlog_core::{HolidayProvider, format_duration, summarize_day};

use super::util::{clock, day, short_id};

pub fn run<W: Write, S: Store + ?Sized, Tz: TimeZone>(
    writer: &mut W,
    store: &S,
    now: &DateTime<Tz>,
) -> Result<()> {
    let tz = now.timezone();
    let today = now.date_naive();
    let settings = load_settings(store);
    let entries = load_entries(store, &tz);
    let holidays = HolidayProvider::new(store, settings.state_code.as_str());
    let summary = summarize_day(&entries, today, &settings, &tz, &holidays);

    writeln!(writer, "{} {}", weekday_name(today.weekday()), day(today))?;
    if summary.rows.is_empty() {
        writeln!(writer, "No entries today.")?;
    }
    for row in &summary.rows {
        let span = match &row.end {
            Some(end) => format!("{}-{}", clock(&row.start), clock(end)),
            None if row.entry.is_running() => format!("{}-", clock(&row.start)),
            None => "all day".to_string(),
        };
        writeln!(
            writer,
            "  {}  {:<4}  {:<11}  net {}  surcharge {}",
            short_id(&row.entry.id),
            row.entry.entry_type().code(),
            span,
            format_duration(row.net_ms),
            format_duration(row.surcharge_ms)
        )?;
    }
    writeln!(
        writer,
        "Worked: {} of {}",
        format_duration(summary.worked_ms),
        format_duration(settings.day_target_ms())
    )?;

    match summary.running {
        Some(entry) => {
            let start = entry.start_in(&tz);
            let elapsed = now.timestamp_millis() - start.timestamp_millis();
            writeln!(
                writer,
                "Running: {} since {} {}, {} elapsed",
                short_id(&entry.id),
                day(start.date_naive()),
                clock(&start),
                format_duration(elapsed)
            )?;
        }
        None => writeln!(writer, "Timer stopped.")?,
    }
    Ok(())
}
