//! A Central European zone with EU daylight saving rules, for DST tests.
//!
//! Standard time is UTC+1, summer time UTC+2, switching at 01:00 UTC on the
//! last Sunday of March and of October.

use chrono::{
    Datelike, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
};

const HOUR: i32 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CentralEurope;

fn last_sunday(year: i32, month: u32) -> NaiveDate {
    let last = NaiveDate::from_ymd_opt(year, month, 31).unwrap();
    last - chrono::Duration::days(i64::from(last.weekday().num_days_from_sunday()))
}

fn summer_time(utc: &NaiveDateTime) -> bool {
    let year = utc.year();
    let switch = NaiveTime::from_hms_opt(1, 0, 0).unwrap();
    let begins = last_sunday(year, 3).and_time(switch);
    let ends = last_sunday(year, 10).and_time(switch);
    *utc >= begins && *utc < ends
}

fn offset(hours: i32) -> FixedOffset {
    FixedOffset::east_opt(hours * HOUR).unwrap()
}

impl TimeZone for CentralEurope {
    type Offset = FixedOffset;

    fn from_offset(_offset: &FixedOffset) -> Self {
        Self
    }

    fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
        self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
    }

    fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
        // Summer time first so an ambiguous wall time lists the earlier instant first.
        let valid: Vec<FixedOffset> = [offset(2), offset(1)]
            .into_iter()
            .filter(|candidate| self.offset_from_utc_datetime(&(*local - *candidate)) == *candidate)
            .collect();
        match valid.as_slice() {
            [] => LocalResult::None,
            [single] => LocalResult::Single(*single),
            [earlier, later, ..] => LocalResult::Ambiguous(*earlier, *later),
        }
    }

    fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
        self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
    }

    fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
        if summer_time(utc) { offset(2) } else { offset(1) }
    }
}
