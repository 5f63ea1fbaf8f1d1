//! Ledger entries: timed work intervals and whole-day leave markers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::time::local_midnight;

/// Validation failures for interactive entry edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    /// The entry would end before it starts.
    #[error("end {end} is before start {start}")]
    EndBeforeStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A pause override below zero minutes.
    #[error("pause must not be negative, got {0} minutes")]
    NegativePause(i64),

    /// No entry with this id exists.
    #[error("no entry with id {0}")]
    NotFound(EntryId),

    /// Another work entry is still running.
    #[error("entry {0} is still running")]
    AlreadyRunning(EntryId),

    /// Work cannot be recorded as a whole-day marker.
    #[error("{0} is not a whole-day entry type")]
    NotDayMarker(EntryType),

    /// An identifier was empty.
    #[error("entry ID cannot be empty")]
    EmptyId,
}

/// An opaque, non-empty entry identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Result<Self, EntryError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(EntryError::EmptyId);
        }
        Ok(Self(id))
    }

    /// A fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EntryId {
    type Error = EntryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntryId> for String {
    fn from(id: EntryId) -> Self {
        id.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EntryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The three kinds of ledger entry, keyed by their short storage codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    Work,
    Vacation,
    FreeOrHoliday,
}

impl EntryType {
    /// Short code used in storage, backups and CSV.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Vacation => "u",
            Self::FreeOrHoliday => "f",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for EntryType {
    type Err = UnknownEntryType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "work" | "arbeit" => Ok(Self::Work),
            "u" | "vacation" | "urlaub" => Ok(Self::Vacation),
            "f" | "free" | "holiday" | "frei" | "feiertag" => Ok(Self::FreeOrHoliday),
            _ => Err(UnknownEntryType(s.to_string())),
        }
    }
}

impl Serialize for EntryType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for EntryType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown entry type strings.
#[derive(Debug, Clone, Error)]
#[error("unknown entry type: {0}")]
pub struct UnknownEntryType(String);

/// What an entry records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// A clocked interval; `end == None` means the timer is running.
    Work {
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        /// Overrides `Settings::default_pause_minutes` when present.
        pause_minutes: Option<u32>,
        /// Suppresses Dienstbeginn rounding.
        overdrive: bool,
    },
    /// A whole day of paid leave.
    Vacation { date: NaiveDate },
    /// A whole day off or public holiday credited as worked.
    FreeOrHoliday { date: NaiveDate },
}

impl EntryKind {
    /// Builds a validated work interval.
    pub fn work(
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        pause_minutes: Option<i64>,
        overdrive: bool,
    ) -> Result<Self, EntryError> {
        if let Some(end) = end.filter(|end| *end < start) {
            return Err(EntryError::EndBeforeStart { start, end });
        }
        let pause_minutes = match pause_minutes {
            Some(p) if p < 0 => return Err(EntryError::NegativePause(p)),
            Some(p) => Some(u32::try_from(p).unwrap_or(u32::MAX)),
            None => None,
        };
        Ok(Self::Work {
            start,
            end,
            pause_minutes,
            overdrive,
        })
    }

    /// Builds a whole-day marker of the given type; `Work` is not a day marker.
    pub const fn day_marker(entry_type: EntryType, date: NaiveDate) -> Option<Self> {
        match entry_type {
            EntryType::Work => None,
            EntryType::Vacation => Some(Self::Vacation { date }),
            EntryType::FreeOrHoliday => Some(Self::FreeOrHoliday { date }),
        }
    }

    pub const fn entry_type(&self) -> EntryType {
        match self {
            Self::Work { .. } => EntryType::Work,
            Self::Vacation { .. } => EntryType::Vacation,
            Self::FreeOrHoliday { .. } => EntryType::FreeOrHoliday,
        }
    }
}

/// One ledger record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: EntryId,
    pub kind: EntryKind,
}

impl Entry {
    /// Wraps `kind` with a freshly generated id.
    pub fn new(kind: EntryKind) -> Self {
        Self {
            id: EntryId::generate(),
            kind,
        }
    }

    pub const fn entry_type(&self) -> EntryType {
        self.kind.entry_type()
    }

    /// True for a work entry without an end.
    pub const fn is_running(&self) -> bool {
        matches!(self.kind, EntryKind::Work { end: None, .. })
    }

    /// Start of the entry in `tz`; day markers start at local midnight.
    pub fn start_in<Tz: TimeZone>(&self, tz: &Tz) -> DateTime<Tz> {
        match &self.kind {
            EntryKind::Work { start, .. } => start.with_timezone(tz),
            EntryKind::Vacation { date } | EntryKind::FreeOrHoliday { date } => {
                local_midnight(tz, *date)
            }
        }
    }

    /// End of a work entry in `tz`.
    pub fn end_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Tz>> {
        match &self.kind {
            EntryKind::Work { end, .. } => end.map(|end| end.with_timezone(tz)),
            EntryKind::Vacation { .. } | EntryKind::FreeOrHoliday { .. } => None,
        }
    }

    /// Calendar date the entry belongs to in `tz`.
    pub fn local_date<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        match &self.kind {
            EntryKind::Work { start, .. } => start.with_timezone(tz).date_naive(),
            EntryKind::Vacation { date } | EntryKind::FreeOrHoliday { date } => *date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn entry_id_rejects_empty() {
        assert_eq!(EntryId::new(""), Err(EntryError::EmptyId));
        assert_eq!(EntryId::new("   "), Err(EntryError::EmptyId));
        assert!(EntryId::new("abc").is_ok());
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(EntryId::generate(), EntryId::generate());
    }

    #[test]
    fn entry_type_codes_roundtrip() {
        for t in [EntryType::Work, EntryType::Vacation, EntryType::FreeOrHoliday] {
            let parsed: EntryType = t.code().parse().expect("should parse");
            assert_eq!(parsed, t);
        }
    }

    #[test]
    fn entry_type_accepts_long_names() {
        assert_eq!("Urlaub".parse::<EntryType>().unwrap(), EntryType::Vacation);
        assert_eq!("holiday".parse::<EntryType>().unwrap(), EntryType::FreeOrHoliday);
        let err = "sick".parse::<EntryType>().unwrap_err();
        assert_eq!(err.to_string(), "unknown entry type: sick");
    }

    #[test]
    fn work_rejects_end_before_start() {
        let err = EntryKind::work(
            at("2025-01-01T10:00:00Z"),
            Some(at("2025-01-01T09:00:00Z")),
            None,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, EntryError::EndBeforeStart { .. }));
    }

    #[test]
    fn work_rejects_negative_pause() {
        let err = EntryKind::work(at("2025-01-01T10:00:00Z"), None, Some(-5), false).unwrap_err();
        assert_eq!(err, EntryError::NegativePause(-5));
    }

    #[test]
    fn work_accepts_zero_length() {
        let t = at("2025-01-01T10:00:00Z");
        assert!(EntryKind::work(t, Some(t), Some(0), false).is_ok());
    }

    #[test]
    fn day_marker_refuses_work() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        assert!(EntryKind::day_marker(EntryType::Work, date).is_none());
        assert_eq!(
            EntryKind::day_marker(EntryType::Vacation, date),
            Some(EntryKind::Vacation { date })
        );
    }

    #[test]
    fn running_only_for_open_work() {
        let open = Entry::new(EntryKind::work(at("2025-01-01T08:00:00Z"), None, None, false).unwrap());
        let leave = Entry::new(EntryKind::Vacation {
            date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        });
        assert!(open.is_running());
        assert!(!leave.is_running());
    }
}
