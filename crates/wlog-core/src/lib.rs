//! Time accounting engine for the work-time ledger.
//!
//! This crate contains the types and pure computations for:
//! - Entries: timed work intervals and whole-day leave markers
//! - Accounting: net worked time, night/Sunday/holiday premium, expected time
//! - Holidays: nationwide sets plus cached regional refinement
//! - Serialization: persisted records, JSON backups, monthly CSV
//!
//! Storage and holiday fetching are capabilities supplied by the caller via
//! [`Store`] and [`HolidayFetcher`].

mod accounting;
pub mod backup;
pub mod csv_format;
mod dienstbeginn;
pub mod entry;
mod expected;
pub mod holidays;
pub mod ledger;
pub mod report;
pub mod settings;
pub mod storage;
mod surcharge;
#[cfg(test)]
mod test_zone;
pub mod time;

pub use accounting::net_ms;
pub use backup::{Restored, decode_backup, encode_backup};
pub use csv_format::{CsvError, export_month_csv, import_csv};
pub use dienstbeginn::rounded_start;
pub use entry::{Entry, EntryError, EntryId, EntryKind, EntryType, UnknownEntryType};
pub use expected::expected_ms;
pub use holidays::{
    HolidayError, HolidayFetcher, HolidayProvider, HolidayResolver, HolidaySet, Nationwide,
};
pub use ledger::{ImportMode, Toggle};
pub use report::{DaySummary, EntryRow, MonthSummary, summarize_day, summarize_month};
pub use settings::{Settings, SettingsError};
pub use storage::{MemoryStore, Store, StoreError};
pub use surcharge::premium_ms;
pub use time::{ClockTime, format_duration, format_signed_duration};
