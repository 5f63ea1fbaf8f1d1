//! Premium ("surcharge") time for night, Sunday and holiday work.
//!
//! A work interval is cut at local midnights. Each day segment then earns
//! either its whole length (Sunday or holiday, when that rule is on) or its
//! overlap with the night window. The two rules never combine on one day.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Weekday};

use crate::holidays::{HolidayResolver, HolidaySet};
use crate::settings::Settings;
use crate::time::{ClockTime, local_instant, local_midnight, overlap_ms};

/// Premium milliseconds earned by `[start, end)`.
///
/// Running intervals and disabled surcharges earn nothing. Holiday sets are
/// requested from `holidays` at most once per calendar year touched.
pub fn premium_ms<Tz, R>(
    start: &DateTime<Tz>,
    end: Option<&DateTime<Tz>>,
    settings: &Settings,
    holidays: &R,
) -> i64
where
    Tz: TimeZone,
    R: HolidayResolver + ?Sized,
{
    let Some(end) = end else {
        return 0;
    };
    if !settings.surcharge_enabled {
        return 0;
    }
    let start_ms = start.timestamp_millis();
    let end_ms = end.timestamp_millis();
    if end_ms <= start_ms {
        return 0;
    }

    let tz = start.timezone();
    let mut sets: HashMap<i32, HolidaySet> = HashMap::new();
    let mut total = 0;
    let mut day = start.date_naive();
    loop {
        let day_start = local_midnight(&tz, day).timestamp_millis();
        if day_start >= end_ms {
            break;
        }
        let Some(next) = day.succ_opt() else {
            break;
        };
        let day_end = local_midnight(&tz, next).timestamp_millis();
        let seg_start = start_ms.max(day_start);
        let seg_end = end_ms.min(day_end);

        if seg_end > seg_start {
            let full_day = settings.surcharge_sunday_holiday
                && (day.weekday() == Weekday::Sun
                    || sets
                        .entry(day.year())
                        .or_insert_with(|| holidays.resolve(day.year()))
                        .contains(day));
            total += if full_day {
                seg_end - seg_start
            } else {
                night_overlap(&tz, day, (day_start, day_end), (seg_start, seg_end), settings)
            };
        }
        day = next;
    }
    total
}

/// Overlap of one day segment with that day's part of the night window.
///
/// A window with `from >= to` wraps midnight, so on any single day it covers
/// `[00:00, to)` and `[from, 24:00)`. Equal bounds cover the whole day.
fn night_overlap<Tz: TimeZone>(
    tz: &Tz,
    day: NaiveDate,
    (day_start, day_end): (i64, i64),
    (seg_start, seg_end): (i64, i64),
    settings: &Settings,
) -> i64 {
    let from = settings.surcharge_night_from;
    let to = settings.surcharge_night_to;
    let at = |clock: ClockTime| local_instant(tz, day, clock.time()).timestamp_millis();

    if from < to {
        overlap_ms(seg_start, seg_end, at(from), at(to))
    } else {
        overlap_ms(seg_start, seg_end, day_start, at(to))
            + overlap_ms(seg_start, seg_end, at(from), day_end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;

    use chrono::{FixedOffset, Utc};

    use crate::holidays::Nationwide;
    use crate::test_zone::CentralEurope;
    use crate::time::MS_PER_HOUR;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn premium(start: &str, end: &str, settings: &Settings) -> i64 {
        premium_ms(&utc(start), Some(&utc(end)), settings, &Nationwide)
    }

    fn no_holidays(year: i32) -> HolidaySet {
        HolidaySet::regional("XX", year, std::iter::empty())
    }

    #[test]
    fn daytime_on_a_weekday_earns_nothing() {
        // 2025-06-02 is a Monday.
        let settings = Settings::default();
        assert_eq!(premium("2025-06-02T09:00:00Z", "2025-06-02T17:00:00Z", &settings), 0);
    }

    #[test]
    fn full_night_across_midnight() {
        let settings = Settings::default();
        assert_eq!(
            premium("2025-06-02T22:00:00Z", "2025-06-03T05:00:00Z", &settings),
            25_200_000
        );
    }

    #[test]
    fn partial_night_overlap() {
        let settings = Settings::default();
        assert_eq!(
            premium("2025-06-02T20:00:00Z", "2025-06-02T23:30:00Z", &settings),
            90 * 60_000
        );
        assert_eq!(
            premium("2025-06-03T04:00:00Z", "2025-06-03T12:00:00Z", &settings),
            MS_PER_HOUR
        );
    }

    #[test]
    fn sunday_earns_whole_segment() {
        // 2025-06-01 is a Sunday.
        let settings = Settings {
            surcharge_night_from: ClockTime::new(10, 0).unwrap(),
            surcharge_night_to: ClockTime::new(12, 0).unwrap(),
            ..Settings::default()
        };
        assert_eq!(
            premium("2025-06-01T09:00:00Z", "2025-06-01T17:00:00Z", &settings),
            8 * MS_PER_HOUR
        );
    }

    #[test]
    fn holiday_earns_whole_segment() {
        // German Unity Day 2025 is a Friday.
        let settings = Settings::default();
        let start = utc("2025-10-03T09:00:00Z");
        let end = utc("2025-10-03T17:00:00Z");
        assert_eq!(premium_ms(&start, Some(&end), &settings, &Nationwide), 8 * MS_PER_HOUR);
        assert_eq!(premium_ms(&start, Some(&end), &settings, &no_holidays), 0);
    }

    #[test]
    fn sunday_rule_can_be_disabled() {
        let settings = Settings {
            surcharge_sunday_holiday: false,
            ..Settings::default()
        };
        assert_eq!(premium("2025-06-01T09:00:00Z", "2025-06-01T17:00:00Z", &settings), 0);
        assert_eq!(
            premium("2025-06-01T22:00:00Z", "2025-06-01T23:00:00Z", &settings),
            MS_PER_HOUR
        );
    }

    #[test]
    fn disabled_or_running_earns_nothing() {
        let disabled = Settings {
            surcharge_enabled: false,
            ..Settings::default()
        };
        assert_eq!(premium("2025-06-01T09:00:00Z", "2025-06-01T17:00:00Z", &disabled), 0);

        let start = utc("2025-06-01T09:00:00Z");
        assert_eq!(premium_ms(&start, None, &Settings::default(), &Nationwide), 0);
    }

    #[test]
    fn degenerate_intervals_earn_nothing() {
        let settings = Settings::default();
        assert_eq!(premium("2025-06-01T09:00:00Z", "2025-06-01T09:00:00Z", &settings), 0);
        assert_eq!(premium("2025-06-01T10:00:00Z", "2025-06-01T09:00:00Z", &settings), 0);
    }

    #[test]
    fn multi_day_interval_accumulates_per_day() {
        // Mon 20:00 to Wed 08:00: 2h + (5h + 2h) + 5h of night.
        let settings = Settings::default();
        assert_eq!(
            premium("2025-06-02T20:00:00Z", "2025-06-04T08:00:00Z", &settings),
            14 * MS_PER_HOUR
        );
    }

    #[test]
    fn non_wrapping_window() {
        let settings = Settings {
            surcharge_night_from: ClockTime::new(1, 0).unwrap(),
            surcharge_night_to: ClockTime::new(4, 0).unwrap(),
            ..Settings::default()
        };
        assert_eq!(
            premium("2025-06-02T22:00:00Z", "2025-06-03T05:00:00Z", &settings),
            3 * MS_PER_HOUR
        );
    }

    #[test]
    fn equal_bounds_cover_the_whole_day() {
        let settings = Settings {
            surcharge_night_from: ClockTime::new(0, 0).unwrap(),
            surcharge_night_to: ClockTime::new(0, 0).unwrap(),
            ..Settings::default()
        };
        assert_eq!(
            premium("2025-06-02T09:00:00Z", "2025-06-02T17:00:00Z", &settings),
            8 * MS_PER_HOUR
        );
    }

    #[test]
    fn days_follow_the_local_offset() {
        // 21:00-23:00 at +01:00 is 20:00-22:00 UTC; only the local hour after
        // 22:00 is night.
        let cet = FixedOffset::east_opt(3600).unwrap();
        let start = utc("2025-06-02T20:00:00Z").with_timezone(&cet);
        let end = utc("2025-06-02T22:00:00Z").with_timezone(&cet);
        assert_eq!(
            premium_ms(&start, Some(&end), &Settings::default(), &Nationwide),
            MS_PER_HOUR
        );
    }

    fn premium_in_central_europe(start: &str, end: &str, settings: &Settings) -> i64 {
        let start = utc(start).with_timezone(&CentralEurope);
        let end = utc(end).with_timezone(&CentralEurope);
        premium_ms(&start, Some(&end), settings, &Nationwide)
    }

    #[test]
    fn night_shift_into_spring_forward() {
        // Sat 22:00 CET to Sun 06:00 CEST is 7h. The Sunday window 00:00-05:00
        // lasts only 4h, so 2h + 4h are night.
        let settings = Settings {
            surcharge_sunday_holiday: false,
            ..Settings::default()
        };
        assert_eq!(
            premium_in_central_europe("2025-03-29T21:00:00Z", "2025-03-30T04:00:00Z", &settings),
            6 * MS_PER_HOUR
        );
    }

    #[test]
    fn night_shift_into_fall_back() {
        // Sat 22:00 CEST to Sun 06:00 CET is 9h; the Sunday window lasts 6h.
        let settings = Settings {
            surcharge_sunday_holiday: false,
            ..Settings::default()
        };
        assert_eq!(
            premium_in_central_europe("2025-10-25T20:00:00Z", "2025-10-26T05:00:00Z", &settings),
            8 * MS_PER_HOUR
        );
    }

    #[test]
    fn whole_sunday_of_fall_back_has_25_hours() {
        assert_eq!(
            premium_in_central_europe(
                "2025-10-25T22:00:00Z",
                "2025-10-26T23:00:00Z",
                &Settings::default()
            ),
            25 * MS_PER_HOUR
        );
    }

    #[test]
    fn holiday_sets_are_resolved_once_per_year() {
        let calls = Cell::new(0);
        let counting = |year| {
            calls.set(calls.get() + 1);
            HolidaySet::nationwide(year)
        };
        // Wed 2025-12-31 20:00 to Fri 2026-01-02 02:00: 2h night, New Year
        // in full, 2h night.
        let start = utc("2025-12-31T20:00:00Z");
        let end = utc("2026-01-02T02:00:00Z");
        let premium = premium_ms(&start, Some(&end), &Settings::default(), &counting);
        assert_eq!(premium, 28 * MS_PER_HOUR);
        assert_eq!(calls.get(), 2);
    }

    // Sunday and holiday segments take the full-day rule only; the night
    // window is never added on top, even where it overlaps the same hours.
    #[test]
    fn quirk_full_day_rule_replaces_night_window() {
        let settings = Settings::default();
        // Sunday 21:00-23:00 earns 2h, not 2h plus the hour after 22:00.
        assert_eq!(
            premium("2025-06-01T21:00:00Z", "2025-06-01T23:00:00Z", &settings),
            2 * MS_PER_HOUR
        );
        // Saturday 22:00 to Sunday 06:00: 2h of Saturday night, then the
        // Sunday part counts whole, including 05:00-06:00 outside the window.
        assert_eq!(
            premium("2025-05-31T22:00:00Z", "2025-06-01T06:00:00Z", &settings),
            8 * MS_PER_HOUR
        );
    }
}
