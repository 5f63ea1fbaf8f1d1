//! JSON entry records, backups and restore normalization.
//!
//! The record shape is shared by persistence and backup files:
//!
//! ```json
//! { "id": "...", "type": "work", "start": "2025-06-02T07:00:00.000Z",
//!   "end": "2025-06-02T15:30:00.000Z", "pauseMin": 30, "overdrive": false }
//! ```
//!
//! Day markers (`"u"`, `"f"`) carry `start` as a plain `YYYY-MM-DD`.
//! Decoding is tolerant: each field is validated on its own, bad optional
//! fields fall back to their defaults, and records without a usable start
//! are dropped.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::entry::{Entry, EntryId, EntryKind, EntryType};
use crate::settings::Settings;
use crate::time::{local_instant, local_midnight};

/// Format version written into backups.
pub const BACKUP_VERSION: u32 = 1;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Local timestamps accepted without an offset.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EntryRecord<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    entry_type: EntryType,
    start: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pause_min: Option<u32>,
    overdrive: bool,
}

impl<'a> From<&'a Entry> for EntryRecord<'a> {
    fn from(entry: &'a Entry) -> Self {
        let (start, end, pause_min, overdrive) = match &entry.kind {
            EntryKind::Work {
                start,
                end,
                pause_minutes,
                overdrive,
            } => (instant(start), end.as_ref().map(instant), *pause_minutes, *overdrive),
            EntryKind::Vacation { date } | EntryKind::FreeOrHoliday { date } => {
                (date.format(DATE_FORMAT).to_string(), None, None, false)
            }
        };
        Self {
            id: entry.id.as_str(),
            entry_type: entry.entry_type(),
            start,
            end,
            pause_min,
            overdrive,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Backup<'a> {
    version: u32,
    exported_at: String,
    settings: &'a Settings,
    entries: Vec<EntryRecord<'a>>,
}

fn instant(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Compact JSON array of entry records, as persisted.
pub fn encode_entries(entries: &[Entry]) -> Result<String, serde_json::Error> {
    let records: Vec<EntryRecord<'_>> = entries.iter().map(EntryRecord::from).collect();
    serde_json::to_string(&records)
}

/// Pretty-printed backup document.
pub fn encode_backup(
    entries: &[Entry],
    settings: &Settings,
    exported_at: DateTime<Utc>,
) -> Result<String, serde_json::Error> {
    let backup = Backup {
        version: BACKUP_VERSION,
        exported_at: instant(&exported_at),
        settings,
        entries: entries.iter().map(EntryRecord::from).collect(),
    };
    serde_json::to_string_pretty(&backup)
}

/// What a backup file yielded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Restored {
    pub entries: Vec<Entry>,
    /// Present only if the file carried a settings object.
    pub settings: Option<Settings>,
}

/// Parses and normalizes a backup file. Never fails; unreadable input
/// restores nothing.
pub fn decode_backup<Tz: TimeZone>(text: &str, tz: &Tz) -> Restored {
    match serde_json::from_str::<Value>(text.trim_start_matches('\u{feff}')) {
        Ok(data) => normalize_backup(&data, tz),
        Err(err) => {
            tracing::warn!(error = %err, "backup is not valid JSON");
            Restored::default()
        }
    }
}

/// Accepts a bare entry array or a `{ entries, settings }` envelope.
pub fn normalize_backup<Tz: TimeZone>(data: &Value, tz: &Tz) -> Restored {
    match data {
        Value::Array(_) => Restored {
            entries: normalize_entries(data, tz),
            settings: None,
        },
        Value::Object(map) => Restored {
            entries: map
                .get("entries")
                .map(|list| normalize_entries(list, tz))
                .unwrap_or_default(),
            settings: map
                .get("settings")
                .filter(|s| s.is_object())
                .map(Settings::normalize),
        },
        _ => {
            tracing::debug!("backup is neither an array nor an object");
            Restored::default()
        }
    }
}

/// Keeps the well-formed records of a JSON array.
pub fn normalize_entries<Tz: TimeZone>(list: &Value, tz: &Tz) -> Vec<Entry> {
    let Some(items) = list.as_array() else {
        tracing::debug!("entry list is not an array");
        return Vec::new();
    };
    let entries: Vec<Entry> = items
        .iter()
        .filter_map(|item| normalize_entry(item.as_object()?, tz))
        .collect();
    if entries.len() < items.len() {
        tracing::debug!(
            kept = entries.len(),
            dropped = items.len() - entries.len(),
            "dropped malformed entry records"
        );
    }
    entries
}

fn normalize_entry<Tz: TimeZone>(record: &Map<String, Value>, tz: &Tz) -> Option<Entry> {
    let entry_type = record
        .get("type")
        .and_then(Value::as_str)
        .and_then(|t| t.parse().ok())
        .unwrap_or(EntryType::Work);
    let start = record.get("start")?;

    let kind = if entry_type == EntryType::Work {
        let start = parse_instant(start, tz)?;
        let end = record.get("end").and_then(|end| parse_instant(end, tz));
        let pause = record.get("pauseMin").and_then(pause_minutes);
        let overdrive = record
            .get("overdrive")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        EntryKind::work(start, end, pause, overdrive).ok()?
    } else {
        EntryKind::day_marker(entry_type, parse_date(start, tz)?)?
    };

    let id = record
        .get("id")
        .and_then(Value::as_str)
        .and_then(|id| EntryId::new(id).ok())
        .unwrap_or_else(EntryId::generate);
    Some(Entry { id, kind })
}

/// An instant from RFC 3339, a local timestamp, a bare date (local
/// midnight) or epoch milliseconds.
fn parse_instant<Tz: TimeZone>(value: &Value, tz: &Tz) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(at) = DateTime::parse_from_rfc3339(s) {
                return Some(at.with_timezone(&Utc));
            }
            if let Some(naive) = NAIVE_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
            {
                return Some(local_instant(tz, naive.date(), naive.time()).with_timezone(&Utc));
            }
            let date = NaiveDate::parse_from_str(s, DATE_FORMAT).ok()?;
            Some(local_midnight(tz, date).with_timezone(&Utc))
        }
        Value::Number(n) => DateTime::from_timestamp_millis(n.as_i64()?),
        _ => None,
    }
}

/// A calendar date, either given directly or as the local date of an instant.
fn parse_date<Tz: TimeZone>(value: &Value, tz: &Tz) -> Option<NaiveDate> {
    if let Some(date) = value
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok())
    {
        return Some(date);
    }
    parse_instant(value, tz).map(|at| at.with_timezone(tz).date_naive())
}

#[allow(clippy::cast_possible_truncation)]
fn pause_minutes(value: &Value) -> Option<i64> {
    let minutes = value.as_f64()?;
    (minutes.is_finite() && minutes >= 0.0).then(|| minutes.round() as i64)
}
