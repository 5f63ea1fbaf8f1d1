//! Expected working time for a month.

use chrono::{Datelike, NaiveDate};

use crate::holidays::HolidaySet;
use crate::settings::Settings;
use crate::time::{is_weekday, month_bounds};

/// Target milliseconds for `year`/`month`: one `hours_per_day` per weekday.
///
/// Holidays in `holidays` are skipped when
/// `exclude_public_holidays_from_expected` is set. If `today` lies in the
/// month, days after it are not counted yet. Invalid months yield 0.
pub fn expected_ms(
    year: i32,
    month: u32,
    holidays: &HolidaySet,
    settings: &Settings,
    today: NaiveDate,
) -> i64 {
    let Some((first, next)) = month_bounds(year, month) else {
        return 0;
    };
    let end = if today.year() == year && today.month() == month {
        today.succ_opt().unwrap_or(next)
    } else {
        next
    };

    let days = first
        .iter_days()
        .take_while(|day| *day < end)
        .filter(|day| is_weekday(*day))
        .filter(|day| !settings.exclude_public_holidays_from_expected || !holidays.contains(*day))
        .count();
    i64::try_from(days)
        .unwrap_or(i64::MAX)
        .saturating_mul(settings.day_target_ms())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::time::MS_PER_HOUR;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn eight_hours() -> Settings {
        Settings {
            hours_per_day: 8.0,
            ..Settings::default()
        }
    }

    #[test]
    fn full_past_month_counts_every_weekday() {
        // September 2025 has 22 weekdays and no nationwide holidays.
        let expected = expected_ms(
            2025,
            9,
            &HolidaySet::nationwide(2025),
            &eight_hours(),
            date(2026, 1, 1),
        );
        assert_eq!(expected, 176 * MS_PER_HOUR);
    }

    #[test]
    fn holidays_are_excluded_when_enabled() {
        // October 2025: 23 weekdays, German Unity Day on Friday the 3rd.
        let holidays = HolidaySet::nationwide(2025);
        let today = date(2026, 1, 1);
        assert_eq!(
            expected_ms(2025, 10, &holidays, &eight_hours(), today),
            22 * 8 * MS_PER_HOUR
        );

        let including = Settings {
            exclude_public_holidays_from_expected: false,
            ..eight_hours()
        };
        assert_eq!(
            expected_ms(2025, 10, &holidays, &including, today),
            23 * 8 * MS_PER_HOUR
        );
    }

    #[test]
    fn current_month_stops_after_today() {
        // 1-5 and 8-10 September.
        let expected = expected_ms(
            2025,
            9,
            &HolidaySet::nationwide(2025),
            &eight_hours(),
            date(2025, 9, 10),
        );
        assert_eq!(expected, 8 * 8 * MS_PER_HOUR);
    }

    #[test]
    fn future_months_are_not_capped() {
        let expected = expected_ms(
            2025,
            9,
            &HolidaySet::nationwide(2025),
            &eight_hours(),
            date(2025, 8, 15),
        );
        assert_eq!(expected, 176 * MS_PER_HOUR);
    }

    #[test]
    fn fractional_hours_per_day() {
        let settings = Settings::default();
        let expected = expected_ms(2025, 9, &HolidaySet::nationwide(2025), &settings, date(2026, 1, 1));
        assert_eq!(expected, 22 * 30_600_000);
    }

    #[test]
    fn invalid_month_is_zero() {
        assert_eq!(
            expected_ms(2025, 13, &HolidaySet::nationwide(2025), &eight_hours(), date(2025, 1, 1)),
            0
        );
    }
}
