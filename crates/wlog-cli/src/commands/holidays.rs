//! Public holiday listing and regional refresh.

use std::io::Write;

use anyhow::Result;
use chrono::Datelike;
use wlog_core::storage::{Store, holiday_cache_prefix, load_settings};
use wlog_core::time::weekday_name;
use wlog_core::{HolidayFetcher, HolidayProvider};

use super::util::day;

/// Lists the holidays the ledger uses for `year`.
///
/// `cached_years` are the years with a stored regional list.
pub fn show<W: Write, S: Store + ?Sized>(
    writer: &mut W,
    store: &S,
    year: i32,
    cached_years: &[i32],
) -> Result<()> {
    let settings = load_settings(store);
    let provider = HolidayProvider::new(store, settings.state_code.as_str());
    let set = provider.holiday_set(year);

    let source = if set.region().is_some() {
        "regional list".to_string()
    } else {
        "nationwide only; run `wlog holidays --refresh` for regional dates".to_string()
    };
    writeln!(writer, "Holidays {year} for {} ({source})", provider.region())?;
    for date in set.dates() {
        writeln!(writer, "  {}  {}", day(date), weekday_name(date.weekday()))?;
    }
    if !cached_years.is_empty() {
        let years: Vec<String> = cached_years.iter().map(ToString::to_string).collect();
        writeln!(writer, "Cached years: {}", years.join(", "))?;
    }
    Ok(())
}

/// Fetches and caches the regional list for `year`.
///
/// A failed refresh is reported but not fatal; the ledger keeps using the
/// cached or nationwide set.
pub async fn refresh<W: Write, S: Store + ?Sized, F: HolidayFetcher>(
    writer: &mut W,
    store: &S,
    fetcher: &F,
    year: i32,
) -> Result<()> {
    let settings = load_settings(store);
    let provider = HolidayProvider::new(store, settings.state_code.as_str());
    match provider.refine(fetcher, year).await {
        Ok(set) => {
            writeln!(
                writer,
                "Fetched {} holidays for {} {year}.",
                set.len(),
                provider.region()
            )?;
        }
        Err(err) => {
            tracing::warn!(error = %err, region = provider.region(), year, "holiday refresh failed");
            writeln!(writer, "Holiday refresh failed: {err}")?;
        }
    }
    Ok(())
}

/// Years encoded in holiday cache `keys` for `region`, ascending.
pub fn cached_years(keys: &[String], region: &str) -> Vec<i32> {
    let prefix = holiday_cache_prefix(region);
    let mut years: Vec<i32> = keys
        .iter()
        .filter_map(|key| key.strip_prefix(&prefix)?.parse().ok())
        .collect();
    years.sort_unstable();
    years
}
