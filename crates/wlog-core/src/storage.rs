//! Persistence capability.
//!
//! The engine only needs `get`/`set` of opaque strings. Entries, settings and
//! each cached holiday set live under their own key; the values are JSON
//! produced and consumed by this crate.
//!
//! Loads never fail: a read error or a malformed payload degrades to an empty
//! entry list or default settings. Saves propagate [`StoreError`].

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::TimeZone;
use thiserror::Error;

use crate::backup::{encode_entries, normalize_entries};
use crate::entry::Entry;
use crate::settings::Settings;

pub const ENTRIES_KEY: &str = "wlog.entries.v1";
pub const SETTINGS_KEY: &str = "wlog.settings.v1";
const HOLIDAY_KEY_PREFIX: &str = "wlog.holidays.v1";

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be read or written.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// A value could not be encoded for storage.
    #[error("failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A key-value store of opaque strings.
pub trait Store {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: Store + ?Sized> Store for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// Common prefix of every cached holiday key for `region`.
pub fn holiday_cache_prefix(region: &str) -> String {
    format!("{HOLIDAY_KEY_PREFIX}.{}.", region.to_uppercase())
}

/// Cache key for one region's holidays in one year.
pub fn holiday_cache_key(region: &str, year: i32) -> String {
    format!("{}{year}", holiday_cache_prefix(region))
}

/// Loads the entry list, tolerating missing or damaged data.
///
/// `tz` resolves day markers that were stored as full timestamps.
pub fn load_entries<S: Store + ?Sized, Tz: TimeZone>(store: &S, tz: &Tz) -> Vec<Entry> {
    let raw = match store.get(ENTRIES_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            tracing::warn!(error = %err, "failed to read entries, starting empty");
            return Vec::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => normalize_entries(&value, tz),
        Err(err) => {
            tracing::warn!(error = %err, "stored entries are not valid JSON, starting empty");
            Vec::new()
        }
    }
}

pub fn save_entries<S: Store + ?Sized>(store: &S, entries: &[Entry]) -> Result<(), StoreError> {
    let json = encode_entries(entries)?;
    store.set(ENTRIES_KEY, &json)
}

/// Loads settings, falling back to defaults.
pub fn load_settings<S: Store + ?Sized>(store: &S) -> Settings {
    match store.get(SETTINGS_KEY) {
        Ok(Some(raw)) => Settings::from_json_str(&raw),
        Ok(None) => Settings::default(),
        Err(err) => {
            tracing::warn!(error = %err, "failed to read settings, using defaults");
            Settings::default()
        }
    }
}

pub fn save_settings<S: Store + ?Sized>(store: &S, settings: &Settings) -> Result<(), StoreError> {
    let json = serde_json::to_string(settings)?;
    store.set(SETTINGS_KEY, &json)
}

/// In-process store, mainly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self
            .values
            .lock()
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self
            .values
            .lock()
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{NaiveDate, Utc};

    use crate::entry::EntryKind;

    struct BrokenStore;

    impl Store for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("disk on fire".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk on fire".to_string()))
        }
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn holiday_key_is_per_region_and_year() {
        assert_eq!(holiday_cache_key("by", 2025), "wlog.holidays.v1.BY.2025");
        assert_ne!(holiday_cache_key("BY", 2025), holiday_cache_key("BY", 2026));
        assert!(holiday_cache_key("nw", 2025).starts_with(&holiday_cache_prefix("NW")));
    }

    #[test]
    fn missing_values_load_as_defaults() {
        let store = MemoryStore::new();
        assert!(load_entries(&store, &Utc).is_empty());
        assert_eq!(load_settings(&store), Settings::default());
    }

    #[test]
    fn read_errors_load_as_defaults() {
        assert!(load_entries(&BrokenStore, &Utc).is_empty());
        assert_eq!(load_settings(&BrokenStore), Settings::default());
    }

    #[test]
    fn corrupt_entries_load_empty() {
        let store = MemoryStore::new();
        store.set(ENTRIES_KEY, "{{{").unwrap();
        assert!(load_entries(&store, &Utc).is_empty());
    }

    #[test]
    fn entries_and_settings_roundtrip() {
        let store = MemoryStore::new();
        let entries = vec![
            Entry::new(
                EntryKind::work(
                    "2025-02-03T08:00:00Z".parse().unwrap(),
                    Some("2025-02-03T16:30:00Z".parse().unwrap()),
                    Some(45),
                    true,
                )
                .unwrap(),
            ),
            Entry::new(EntryKind::Vacation {
                date: NaiveDate::from_ymd_opt(2025, 2, 4).unwrap(),
            }),
        ];
        save_entries(&store, &entries).unwrap();
        assert_eq!(load_entries(&store, &Utc), entries);

        let settings = Settings {
            hours_per_day: 7.0,
            ..Settings::default()
        };
        save_settings(&store, &settings).unwrap();
        assert_eq!(load_settings(&store), settings);
    }

    #[test]
    fn save_errors_propagate() {
        assert!(save_settings(&BrokenStore, &Settings::default()).is_err());
        assert!(save_entries(&BrokenStore, &[]).is_err());
    }
}
