//! Public holiday sets.
//!
//! The nationwide set is computed locally from fixed dates and the Gregorian
//! Easter date. A region-specific set can replace it once it has been fetched
//! and cached through [`HolidayProvider::refine`]; until then every lookup
//! falls back to the nationwide set without touching the network.

use std::collections::BTreeSet;
use std::future::Future;

use chrono::{Datelike, Duration, NaiveDate};
use thiserror::Error;

use crate::storage::{Store, StoreError, holiday_cache_key};

/// Fixed-date holidays observed everywhere, as (month, day).
const FIXED_HOLIDAYS: [(u32, u32); 5] = [
    (1, 1),   // New Year
    (5, 1),   // Labour Day
    (10, 3),  // German Unity Day
    (12, 25), // Christmas Day
    (12, 26), // Boxing Day
];

/// Movable holidays as day offsets from Easter Sunday.
const EASTER_OFFSETS: [i64; 4] = [
    -2, // Good Friday
    1,  // Easter Monday
    39, // Ascension
    50, // Whit Monday
];

#[derive(Debug, Error)]
pub enum HolidayError {
    #[error("holiday fetch failed: {0}")]
    Fetch(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("no holidays for {region} in {year}")]
    NoDatesForYear { region: String, year: i32 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Holiday dates of one year, optionally for one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidaySet {
    region: Option<String>,
    year: i32,
    dates: BTreeSet<NaiveDate>,
}

impl HolidaySet {
    /// Holidays observed in every region.
    pub fn nationwide(year: i32) -> Self {
        let mut dates: BTreeSet<NaiveDate> = FIXED_HOLIDAYS
            .iter()
            .filter_map(|&(month, day)| NaiveDate::from_ymd_opt(year, month, day))
            .collect();
        if let Some(easter) = easter_sunday(year) {
            dates.extend(EASTER_OFFSETS.iter().map(|&offset| easter + Duration::days(offset)));
        }
        Self {
            region: None,
            year,
            dates,
        }
    }

    /// A regional set; dates outside `year` are dropped.
    pub fn regional(
        region: impl Into<String>,
        year: i32,
        dates: impl IntoIterator<Item = NaiveDate>,
    ) -> Self {
        Self {
            region: Some(region.into()),
            year,
            dates: dates.into_iter().filter(|d| d.year() == year).collect(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Region code, or `None` for the nationwide set.
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dates.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Easter Sunday by the anonymous Gregorian algorithm.
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15).rem_euclid(30);
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k).rem_euclid(7);
    let m = (a + 11 * h + 22 * l) / 451;
    let n = h + l - 7 * m + 114;
    let month = u32::try_from(n / 31).ok()?;
    let day = u32::try_from(n % 31 + 1).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Supplies the holiday set for a given year.
pub trait HolidayResolver {
    fn resolve(&self, year: i32) -> HolidaySet;
}

impl<F> HolidayResolver for F
where
    F: Fn(i32) -> HolidaySet,
{
    fn resolve(&self, year: i32) -> HolidaySet {
        self(year)
    }
}

/// Resolves every year to the nationwide set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nationwide;

impl HolidayResolver for Nationwide {
    fn resolve(&self, year: i32) -> HolidaySet {
        HolidaySet::nationwide(year)
    }
}

/// Fetches a region's holidays from some external source.
pub trait HolidayFetcher {
    type Error: std::error::Error + Send + Sync + 'static;

    /// ISO dates (`YYYY-MM-DD`, optionally followed by a time) for `region`
    /// in `year`.
    fn fetch(
        &self,
        region: &str,
        year: i32,
    ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send;
}

/// Cache-first access to regional holiday sets.
#[derive(Debug)]
pub struct HolidayProvider<'a, S: Store + ?Sized> {
    store: &'a S,
    region: String,
}

impl<'a, S: Store + ?Sized> HolidayProvider<'a, S> {
    pub fn new(store: &'a S, region: impl Into<String>) -> Self {
        Self {
            store,
            region: region.into().to_uppercase(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// The cached regional set, if one was stored for `year`.
    pub fn cached(&self, year: i32) -> Option<HolidaySet> {
        let key = holiday_cache_key(&self.region, year);
        let raw = match self.store.get(&key) {
            Ok(raw) => raw?,
            Err(err) => {
                tracing::warn!(error = %err, key = %key, "failed to read holiday cache");
                return None;
            }
        };
        let Ok(dates) = serde_json::from_str::<Vec<String>>(&raw) else {
            tracing::debug!(key = %key, "ignoring malformed holiday cache entry");
            return None;
        };
        let set = HolidaySet::regional(self.region.clone(), year, parse_dates(&dates));
        if set.is_empty() {
            return None;
        }
        tracing::debug!(key = %key, count = set.len(), "holiday cache hit");
        Some(set)
    }

    /// Cached regional set, else the nationwide set. Never blocks.
    pub fn holiday_set(&self, year: i32) -> HolidaySet {
        self.cached(year)
            .unwrap_or_else(|| HolidaySet::nationwide(year))
    }

    /// Fetches the regional set for `year` and caches it.
    ///
    /// On error the cache is left as it was and callers keep using
    /// [`Self::holiday_set`]. A failed cache write is logged but the fetched
    /// set is still returned.
    pub async fn refine<F: HolidayFetcher>(
        &self,
        fetcher: &F,
        year: i32,
    ) -> Result<HolidaySet, HolidayError> {
        let raw = fetcher
            .fetch(&self.region, year)
            .await
            .map_err(|err| HolidayError::Fetch(Box::new(err)))?;
        let set = HolidaySet::regional(self.region.clone(), year, parse_dates(&raw));
        if set.is_empty() {
            return Err(HolidayError::NoDatesForYear {
                region: self.region.clone(),
                year,
            });
        }

        let key = holiday_cache_key(&self.region, year);
        let encoded: Vec<String> = set.dates().map(|d| d.format("%Y-%m-%d").to_string()).collect();
        let written = serde_json::to_string(&encoded)
            .map_err(StoreError::from)
            .and_then(|json| self.store.set(&key, &json));
        if let Err(err) = written {
            tracing::warn!(error = %err, key = %key, "failed to cache holidays");
        }
        tracing::debug!(key = %key, count = set.len(), "refined holiday set");
        Ok(set)
    }
}

impl<S: Store + ?Sized> HolidayResolver for HolidayProvider<'_, S> {
    fn resolve(&self, year: i32) -> HolidaySet {
        self.holiday_set(year)
    }
}

/// Parses the leading `YYYY-MM-DD` of each string, skipping anything else.
fn parse_dates(raw: &[String]) -> Vec<NaiveDate> {
    raw.iter()
        .filter_map(|s| {
            let date = s.trim().get(..10)?;
            NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
        })
        .collect()
}
