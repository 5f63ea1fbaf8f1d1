//! Operations on a caller-owned entry list.
//!
//! Nothing here persists anything; callers load the list, apply an
//! operation and save it back.

use chrono::{DateTime, Datelike, NaiveDate, SubsecRound, TimeZone, Utc};

use crate::dienstbeginn::rounded_start;
use crate::entry::{Entry, EntryError, EntryId, EntryKind, EntryType};
use crate::settings::Settings;

/// Outcome of [`toggle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle {
    Started(EntryId),
    Stopped(EntryId),
}

/// How imported entries combine with the existing list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Discard existing entries.
    #[default]
    Replace,
    /// Keep existing entries and add the imported ones after them.
    Append,
}

/// The running work entry, if any.
pub fn running_entry(entries: &[Entry]) -> Option<&Entry> {
    entries.iter().find(|entry| entry.is_running())
}

/// Stops the running entry at `now`, or starts a new one.
///
/// A new entry starts at `now` after Dienstbeginn rounding. Instants are
/// kept to whole seconds.
pub fn toggle<Tz: TimeZone>(
    entries: &mut Vec<Entry>,
    now: DateTime<Tz>,
    settings: &Settings,
    overdrive: bool,
) -> Toggle {
    let now = now.trunc_subsecs(0);
    if let Some(running) = entries.iter_mut().find(|entry| entry.is_running()) {
        if let EntryKind::Work { start, end, .. } = &mut running.kind {
            let stop = now.with_timezone(&Utc).max(*start);
            *end = Some(stop);
        }
        tracing::debug!(id = %running.id, "stopped running entry");
        return Toggle::Stopped(running.id.clone());
    }

    let start = rounded_start(now, settings, overdrive).with_timezone(&Utc);
    let entry = Entry::new(EntryKind::Work {
        start,
        end: None,
        pause_minutes: None,
        overdrive,
    });
    let id = entry.id.clone();
    tracing::debug!(%id, %start, "started entry");
    entries.push(entry);
    Toggle::Started(id)
}

/// Appends a validated work entry. An open entry is refused while another
/// one is running.
pub fn add_work(
    entries: &mut Vec<Entry>,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    pause_minutes: Option<i64>,
    overdrive: bool,
) -> Result<EntryId, EntryError> {
    let kind = EntryKind::work(start, end, pause_minutes, overdrive)?;
    if let (None, Some(running)) = (end, running_entry(entries)) {
        return Err(EntryError::AlreadyRunning(running.id.clone()));
    }
    Ok(push(entries, kind))
}

/// Appends a whole-day vacation or free/holiday marker.
pub fn add_leave(
    entries: &mut Vec<Entry>,
    entry_type: EntryType,
    date: NaiveDate,
) -> Result<EntryId, EntryError> {
    let kind =
        EntryKind::day_marker(entry_type, date).ok_or(EntryError::NotDayMarker(entry_type))?;
    Ok(push(entries, kind))
}

fn push(entries: &mut Vec<Entry>, kind: EntryKind) -> EntryId {
    let entry = Entry::new(kind);
    let id = entry.id.clone();
    entries.push(entry);
    id
}

/// Replaces an entry's contents wholesale, keeping its id.
pub fn replace(entries: &mut [Entry], id: &EntryId, kind: EntryKind) -> Result<(), EntryError> {
    if let EntryKind::Work {
        start,
        end,
        pause_minutes,
        overdrive,
    } = &kind
    {
        EntryKind::work(*start, *end, pause_minutes.map(i64::from), *overdrive)?;
        let other_running = entries.iter().find(|e| e.is_running() && e.id != *id);
        if let (None, Some(other)) = (end, other_running) {
            return Err(EntryError::AlreadyRunning(other.id.clone()));
        }
    }
    let entry = entries
        .iter_mut()
        .find(|entry| entry.id == *id)
        .ok_or_else(|| EntryError::NotFound(id.clone()))?;
    entry.kind = kind;
    Ok(())
}

/// Deletes an entry and returns it.
pub fn remove(entries: &mut Vec<Entry>, id: &EntryId) -> Result<Entry, EntryError> {
    let index = entries
        .iter()
        .position(|entry| entry.id == *id)
        .ok_or_else(|| EntryError::NotFound(id.clone()))?;
    Ok(entries.remove(index))
}

/// Combines imported entries with the existing list.
pub fn merge_imported(existing: &mut Vec<Entry>, imported: Vec<Entry>, mode: ImportMode) {
    match mode {
        ImportMode::Replace => *existing = imported,
        ImportMode::Append => existing.extend(imported),
    }
}

/// Entries whose local start date falls in `year`/`month`, ordered by start.
pub fn entries_in_month<'a, Tz: TimeZone>(
    entries: &'a [Entry],
    year: i32,
    month: u32,
    tz: &Tz,
) -> Vec<&'a Entry> {
    sorted_where(entries, tz, |date| date.year() == year && date.month() == month)
}

/// Entries whose local start date is `date`, ordered by start.
pub fn entries_on_day<'a, Tz: TimeZone>(
    entries: &'a [Entry],
    date: NaiveDate,
    tz: &Tz,
) -> Vec<&'a Entry> {
    sorted_where(entries, tz, |d| d == date)
}

fn sorted_where<'a, Tz: TimeZone>(
    entries: &'a [Entry],
    tz: &Tz,
    keep: impl Fn(NaiveDate) -> bool,
) -> Vec<&'a Entry> {
    let mut selected: Vec<&Entry> = entries
        .iter()
        .filter(|entry| keep(entry.local_date(tz)))
        .collect();
    selected.sort_by_key(|entry| entry.start_in(tz).timestamp_millis());
    selected
}
