//! Manual entry management: add, leave days, edit and delete.

use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use wlog_core::ledger::{add_leave, add_work, remove, replace};
use wlog_core::storage::{Store, load_entries, load_settings};
use wlog_core::{Entry, EntryKind, EntryType, format_duration, net_ms};

use super::save;
use super::util::{clock, day, parse_local_datetime, resolve_id, short_id};

/// Adds a work entry; times are parsed relative to `now`'s date.
pub fn add<W: Write, S: Store + ?Sized, Tz: TimeZone>(
    writer: &mut W,
    store: &S,
    now: &DateTime<Tz>,
    start: &str,
    end: Option<&str>,
    pause_minutes: Option<i64>,
    overdrive: bool,
) -> Result<()> {
    let tz = now.timezone();
    let today = now.date_naive();
    let start = parse_local_datetime(&tz, start, today)?.with_timezone(&Utc);
    let end = end
        .map(|end| parse_local_datetime(&tz, end, today))
        .transpose()?
        .map(|end| end.with_timezone(&Utc));

    let mut entries = load_entries(store, &tz);
    let id = add_work(&mut entries, start, end, pause_minutes, overdrive)
        .context("failed to add entry")?;
    save(store, &entries)?;

    if let Some(entry) = entries.iter().find(|entry| entry.id == id) {
        write_summary(writer, "Added", entry, &load_settings(store), &tz)?;
    }
    Ok(())
}

/// Records a whole-day leave marker.
pub fn leave<W: Write, S: Store + ?Sized, Tz: TimeZone>(
    writer: &mut W,
    store: &S,
    tz: &Tz,
    kind: EntryType,
    date: NaiveDate,
) -> Result<()> {
    let mut entries = load_entries(store, tz);
    let id = add_leave(&mut entries, kind, date).context("failed to add leave day")?;
    save(store, &entries)?;

    if let Some(entry) = entries.iter().find(|entry| entry.id == id) {
        write_summary(writer, "Added", entry, &load_settings(store), tz)?;
    }
    Ok(())
}

/// Requested changes for [`edit`]. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct EditArgs {
    pub start: Option<String>,
    pub end: Option<String>,
    /// Clears the end so the entry runs again.
    pub running: bool,
    pub pause_minutes: Option<i64>,
    /// Drops the pause override.
    pub default_pause: bool,
    pub overdrive: Option<bool>,
    pub date: Option<NaiveDate>,
}

pub fn edit<W: Write, S: Store + ?Sized, Tz: TimeZone>(
    writer: &mut W,
    store: &S,
    now: &DateTime<Tz>,
    id: &str,
    args: &EditArgs,
) -> Result<()> {
    let tz = now.timezone();
    let today = now.date_naive();
    let mut entries = load_entries(store, &tz);
    let id = resolve_id(&entries, id)?;
    let Some(current) = entries.iter().find(|entry| entry.id == id) else {
        bail!("no entry with ID {id}");
    };

    let kind = match &current.kind {
        EntryKind::Work {
            start,
            end,
            pause_minutes,
            overdrive,
        } => {
            if args.date.is_some() {
                bail!("--date only applies to leave entries; use --start/--end");
            }
            let start = match &args.start {
                Some(input) => parse_local_datetime(&tz, input, today)?.with_timezone(&Utc),
                None => *start,
            };
            let end = match (&args.end, args.running) {
                (_, true) => None,
                (Some(input), false) => {
                    Some(parse_local_datetime(&tz, input, today)?.with_timezone(&Utc))
                }
                (None, false) => *end,
            };
            let pause_minutes = if args.default_pause {
                None
            } else {
                args.pause_minutes.or_else(|| pause_minutes.map(i64::from))
            };
            EntryKind::work(start, end, pause_minutes, args.overdrive.unwrap_or(*overdrive))?
        }
        EntryKind::Vacation { date } | EntryKind::FreeOrHoliday { date } => {
            if args.start.is_some() || args.end.is_some() || args.running {
                bail!("leave entries have no times; use --date");
            }
            let date = args.date.unwrap_or(*date);
            EntryKind::day_marker(current.entry_type(), date)
                .context("entry is not a whole-day entry")?
        }
    };

    replace(&mut entries, &id, kind).context("failed to update entry")?;
    save(store, &entries)?;

    if let Some(entry) = entries.iter().find(|entry| entry.id == id) {
        write_summary(writer, "Updated", entry, &load_settings(store), &tz)?;
    }
    Ok(())
}

pub fn delete<W: Write, S: Store + ?Sized, Tz: TimeZone>(
    writer: &mut W,
    store: &S,
    tz: &Tz,
    id: &str,
) -> Result<()> {
    let mut entries = load_entries(store, tz);
    let id = resolve_id(&entries, id)?;
    let removed = remove(&mut entries, &id)?;
    save(store, &entries)?;
    write_summary(writer, "Deleted", &removed, &load_settings(store), tz)
}

fn write_summary<W: Write, Tz: TimeZone>(
    writer: &mut W,
    verb: &str,
    entry: &Entry,
    settings: &wlog_core::Settings,
    tz: &Tz,
) -> Result<()> {
    let date = day(entry.local_date(tz));
    match entry.end_in(tz) {
        Some(end) => writeln!(
            writer,
            "{verb} {} {}: {date} {}-{}, net {}",
            short_id(&entry.id),
            entry.entry_type(),
            clock(&entry.start_in(tz)),
            clock(&end),
            format_duration(net_ms(entry, settings))
        )?,
        None if entry.is_running() => writeln!(
            writer,
            "{verb} {} {}: {date} {}, running",
            short_id(&entry.id),
            entry.entry_type(),
            clock(&entry.start_in(tz))
        )?,
        None => writeln!(
            writer,
            "{verb} {} {}: {date}, credit {}",
            short_id(&entry.id),
            entry.entry_type(),
            format_duration(net_ms(entry, settings))
        )?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use wlog_core::MemoryStore;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn masked(output: Vec<u8>, entries: &[Entry]) -> String {
        let mut output = String::from_utf8(output).unwrap();
        for (n, entry) in entries.iter().enumerate() {
            output = output.replace(short_id(&entry.id), &format!("[ID{n}]"));
        }
        output
    }

    #[test]
    fn add_edit_delete_flow() {
        let store = MemoryStore::new();
        let now = at("2025-09-01T18:00:00Z");
        let mut output = Vec::new();

        add(&mut output, &store, &now, "08:00", Some("16:30"), None, false).unwrap();
        leave(&mut output, &store, &Utc, EntryType::Vacation, date(2025, 9, 2)).unwrap();
        let entries = load_entries(&store, &Utc);

        let edits = EditArgs {
            end: Some("17:00".to_string()),
            pause_minutes: Some(60),
            ..EditArgs::default()
        };
        edit(&mut output, &store, &now, entries[0].id.as_str(), &edits).unwrap();
        let moved = EditArgs {
            date: Some(date(2025, 9, 3)),
            ..EditArgs::default()
        };
        edit(&mut output, &store, &now, entries[1].id.as_str(), &moved).unwrap();
        delete(&mut output, &store, &Utc, entries[0].id.as_str()).unwrap();

        assert_eq!(load_entries(&store, &Utc).len(), 1);
        assert_snapshot!(masked(output, &entries).trim_end(), @r"
        Added [ID0] work: 01.09.2025 08:00-16:30, net 08:00
        Added [ID1] u: 02.09.2025, credit 08:30
        Updated [ID0] work: 01.09.2025 08:00-17:00, net 08:00
        Updated [ID1] u: 03.09.2025, credit 08:30
        Deleted [ID0] work: 01.09.2025 08:00-17:00, net 08:00
        ");
    }

    #[test]
    fn add_rejects_invalid_intervals() {
        let store = MemoryStore::new();
        let now = at("2025-09-01T18:00:00Z");
        let mut output = Vec::new();

        assert!(add(&mut output, &store, &now, "16:00", Some("08:00"), None, false).is_err());
        assert!(add(&mut output, &store, &now, "08:00", Some("16:00"), Some(-5), false).is_err());

        add(&mut output, &store, &now, "08:00", None, None, false).unwrap();
        assert!(add(&mut output, &store, &now, "09:00", None, None, false).is_err());
        assert_eq!(load_entries(&store, &Utc).len(), 1);
    }

    #[test]
    fn edit_can_reopen_and_rejects_times_on_leave() {
        let store = MemoryStore::new();
        let now = at("2025-09-01T18:00:00Z");
        let mut output = Vec::new();
        add(&mut output, &store, &now, "08:00", Some("12:00"), None, false).unwrap();
        leave(&mut output, &store, &Utc, EntryType::FreeOrHoliday, date(2025, 9, 2)).unwrap();
        let entries = load_entries(&store, &Utc);

        let reopen = EditArgs {
            running: true,
            ..EditArgs::default()
        };
        edit(&mut output, &store, &now, entries[0].id.as_str(), &reopen).unwrap();
        assert!(load_entries(&store, &Utc)[0].is_running());

        let bad = EditArgs {
            start: Some("08:00".to_string()),
            ..EditArgs::default()
        };
        assert!(edit(&mut output, &store, &now, entries[1].id.as_str(), &bad).is_err());
        assert!(delete(&mut output, &store, &Utc, "no-such-id").is_err());
    }
}
