//! Day and month summaries built from the accounting primitives.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone};

use crate::accounting::net_ms;
use crate::entry::{Entry, EntryKind};
use crate::expected::expected_ms;
use crate::holidays::HolidayResolver;
use crate::ledger::{entries_in_month, entries_on_day, running_entry};
use crate::settings::Settings;
use crate::surcharge::premium_ms;
use crate::time::{sum_ms, weekday_name};

/// One entry with its computed values, in the ledger's time zone.
#[derive(Debug, Clone)]
pub struct EntryRow<'a, Tz: TimeZone> {
    pub entry: &'a Entry,
    pub start: DateTime<Tz>,
    pub end: Option<DateTime<Tz>>,
    pub net_ms: i64,
    pub surcharge_ms: i64,
}

impl<Tz: TimeZone> EntryRow<'_, Tz> {
    pub fn date(&self) -> NaiveDate {
        self.entry.local_date(&self.start.timezone())
    }

    pub fn weekday(&self) -> &'static str {
        weekday_name(self.date().weekday())
    }
}

/// Computes rows for `entries`, keeping their order.
pub fn entry_rows<'a, Tz, R>(
    entries: impl IntoIterator<Item = &'a Entry>,
    settings: &Settings,
    tz: &Tz,
    holidays: &R,
) -> Vec<EntryRow<'a, Tz>>
where
    Tz: TimeZone,
    R: HolidayResolver + ?Sized,
{
    entries
        .into_iter()
        .map(|entry| {
            let start = entry.start_in(tz);
            let end = entry.end_in(tz);
            let surcharge_ms = match entry.kind {
                EntryKind::Work { .. } => premium_ms(&start, end.as_ref(), settings, holidays),
                EntryKind::Vacation { .. } | EntryKind::FreeOrHoliday { .. } => 0,
            };
            EntryRow {
                entry,
                net_ms: net_ms(entry, settings),
                start,
                end,
                surcharge_ms,
            }
        })
        .collect()
}

/// Totals for one month.
#[derive(Debug, Clone)]
pub struct MonthSummary<'a, Tz: TimeZone> {
    pub year: i32,
    pub month: u32,
    pub rows: Vec<EntryRow<'a, Tz>>,
    pub worked_ms: i64,
    pub surcharge_ms: i64,
    pub expected_ms: i64,
    /// `worked_ms - expected_ms`.
    pub delta_ms: i64,
}

/// Summarizes `year`/`month`; `today` caps the expected time.
pub fn summarize_month<'a, Tz, R>(
    entries: &'a [Entry],
    year: i32,
    month: u32,
    settings: &Settings,
    tz: &Tz,
    holidays: &R,
    today: NaiveDate,
) -> MonthSummary<'a, Tz>
where
    Tz: TimeZone,
    R: HolidayResolver + ?Sized,
{
    let rows = entry_rows(entries_in_month(entries, year, month, tz), settings, tz, holidays);
    let worked_ms = sum_ms(rows.iter().map(|row| row.net_ms));
    let surcharge_ms = sum_ms(rows.iter().map(|row| row.surcharge_ms));
    let expected_ms = expected_ms(year, month, &holidays.resolve(year), settings, today);
    MonthSummary {
        year,
        month,
        rows,
        worked_ms,
        surcharge_ms,
        expected_ms,
        delta_ms: worked_ms.saturating_sub(expected_ms),
    }
}

/// Totals for one day.
#[derive(Debug, Clone)]
pub struct DaySummary<'a, Tz: TimeZone> {
    pub date: NaiveDate,
    pub rows: Vec<EntryRow<'a, Tz>>,
    pub worked_ms: i64,
    /// The running entry, wherever it started.
    pub running: Option<&'a Entry>,
}

pub fn summarize_day<'a, Tz, R>(
    entries: &'a [Entry],
    date: NaiveDate,
    settings: &Settings,
    tz: &Tz,
    holidays: &R,
) -> DaySummary<'a, Tz>
where
    Tz: TimeZone,
    R: HolidayResolver + ?Sized,
{
    let rows = entry_rows(entries_on_day(entries, date, tz), settings, tz, holidays);
    DaySummary {
        date,
        worked_ms: sum_ms(rows.iter().map(|row| row.net_ms)),
        rows,
        running: running_entry(entries),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;

    use crate::entry::EntryType;
    use crate::holidays::Nationwide;
    use crate::ledger::{add_leave, add_work};
    use crate::time::{MS_PER_HOUR, format_duration, format_signed_duration};

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn september() -> Vec<Entry> {
        let mut entries = Vec::new();
        // Monday, 8h net after the 30 minute pause.
        add_work(&mut entries, utc("2025-09-01T08:00:00Z"), Some(utc("2025-09-01T16:30:00Z")), Some(30), false)
            .unwrap();
        // Tuesday night shift, 7h of night premium.
        add_work(&mut entries, utc("2025-09-02T22:00:00Z"), Some(utc("2025-09-03T05:00:00Z")), Some(0), false)
            .unwrap();
        add_leave(&mut entries, EntryType::Vacation, date(2025, 9, 4)).unwrap();
        // Belongs to August.
        add_work(&mut entries, utc("2025-08-29T08:00:00Z"), Some(utc("2025-08-29T12:00:00Z")), None, false)
            .unwrap();
        entries
    }

    #[test]
    fn month_totals() {
        let entries = september();
        let settings = Settings {
            hours_per_day: 8.0,
            ..Settings::default()
        };
        let summary = summarize_month(&entries, 2025, 9, &settings, &Utc, &Nationwide, date(2025, 9, 4));

        assert_eq!(summary.rows.len(), 3);
        assert_eq!(summary.worked_ms, (8 + 7 + 8) * MS_PER_HOUR);
        assert_eq!(summary.surcharge_ms, 7 * MS_PER_HOUR);
        assert_eq!(summary.expected_ms, 4 * 8 * MS_PER_HOUR);
        assert_eq!(summary.delta_ms, -9 * MS_PER_HOUR);
        assert_eq!(summary.rows[1].weekday(), "Tuesday");
        assert_eq!(summary.rows[2].surcharge_ms, 0);
    }

    #[test]
    fn day_summary_reports_running_entry() {
        let mut entries = september();
        add_work(&mut entries, utc("2025-09-05T07:00:00Z"), None, None, false).unwrap();

        let day = summarize_day(&entries, date(2025, 9, 5), &Settings::default(), &Utc, &Nationwide);
        assert_eq!(day.rows.len(), 1);
        assert_eq!(day.worked_ms, 0);
        assert_eq!(day.running.map(|e| &e.id), Some(&entries[4].id));

        let monday = summarize_day(&entries, date(2025, 9, 1), &Settings::default(), &Utc, &Nationwide);
        assert_eq!(monday.worked_ms, 8 * MS_PER_HOUR);
    }

    #[test]
    fn oversized_day_target_cannot_break_totals() {
        let entries = september();

        // Out of range, so normalization keeps the 8.5h default.
        let settings = Settings::normalize(&serde_json::json!({ "hoursPerDay": 1e12 }));
        let summary = summarize_month(&entries, 2025, 9, &settings, &Utc, &Nationwide, date(2025, 9, 4));
        assert_eq!(summary.expected_ms, 4 * 30_600_000);
        assert_eq!(format_duration(summary.worked_ms), "23:30");
        assert_eq!(format_signed_duration(summary.delta_ms), "-10:30");

        // Built directly, the totals saturate.
        let huge = Settings {
            hours_per_day: 1e12,
            ..Settings::default()
        };
        let summary = summarize_month(&entries, 2025, 9, &huge, &Utc, &Nationwide, date(2025, 9, 4));
        assert_eq!(summary.expected_ms, i64::MAX);
        assert!(summary.delta_ms < 0);
        assert_eq!(format_duration(summary.expected_ms), "2562047788015:12");
        assert!(format_signed_duration(summary.delta_ms).starts_with('-'));
    }
}
