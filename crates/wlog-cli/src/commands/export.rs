//! Monthly CSV export.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::TimeZone;
use wlog_core::storage::{Store, load_entries, load_settings};
use wlog_core::{HolidayProvider, export_month_csv};

use super::util::YearMonth;

/// Writes the CSV for `month`, byte-order mark included.
pub fn run<W: Write, S: Store + ?Sized, Tz: TimeZone>(
    writer: &mut W,
    store: &S,
    tz: &Tz,
    month: YearMonth,
) -> Result<()> {
    let settings = load_settings(store);
    let entries = load_entries(store, tz);
    let holidays = HolidayProvider::new(store, settings.state_code.as_str());
    let csv = export_month_csv(&entries, month.year, month.month, &settings, tz, &holidays)
        .context("failed to render CSV")?;
    writer.write_all(csv.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{DateTime, NaiveDate, Utc};
    use insta::assert_snapshot;
    use wlog_core::storage::save_entries;
    use wlog_core::{Entry, EntryKind, MemoryStore};

    #[test]
    fn export_writes_bom_rows_and_total() {
        let store = MemoryStore::new();
        let start = DateTime::parse_from_rfc3339("2025-09-01T08:00:00Z").unwrap().with_timezone(&Utc);
        let end = DateTime::parse_from_rfc3339("2025-09-01T12:00:00Z").unwrap().with_timezone(&Utc);
        let entries = vec![
            Entry::new(EntryKind::work(start, Some(end), Some(0), false).unwrap()),
            Entry::new(EntryKind::FreeOrHoliday {
                date: NaiveDate::from_ymd_opt(2025, 9, 2).unwrap(),
            }),
        ];
        save_entries(&store, &entries).unwrap();

        let mut output = Vec::new();
        let month = YearMonth {
            year: 2025,
            month: 9,
        };
        run(&mut output, &store, &Utc, month).unwrap();

        let output = String::from_utf8(output).unwrap();
        let body = output.strip_prefix('\u{feff}').unwrap();
        assert_snapshot!(body.trim_end(), @r"
        Date;Start;End;Duration (hh:mm);Surcharge (hh:mm);Weekday;Kind;PauseMinutes;Overdrive;Location;TargetHoursPerDay
        01.09.2025;08:00;12:00;04:00;00:00;Monday;work;0;false;;8.5
        02.09.2025;;;08:30;00:00;Tuesday;f;;;;8.5
        Total;;;12:30;00:00;;;;;;
        ");
    }
}
