//! Start/stop the timer.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeZone};
use wlog_core::ledger::toggle;
use wlog_core::storage::{Store, load_entries, load_settings};
use wlog_core::{Toggle, format_duration, net_ms};

use super::save;
use super::util::{clock, short_id};

pub fn run<W: Write, S: Store + ?Sized, Tz: TimeZone>(
    writer: &mut W,
    store: &S,
    now: DateTime<Tz>,
    overdrive: bool,
) -> Result<()> {
    let tz = now.timezone();
    let settings = load_settings(store);
    let mut entries = load_entries(store, &tz);

    let outcome = toggle(&mut entries, now.clone(), &settings, overdrive);
    save(store, &entries)?;

    let id = match &outcome {
        Toggle::Started(id) | Toggle::Stopped(id) => id,
    };
    let Some(entry) = entries.iter().find(|entry| entry.id == *id) else {
        return Ok(());
    };
    match &outcome {
        Toggle::Started(_) => {
            let start = entry.start_in(&tz);
            write!(writer, "Started {} at {}", short_id(id), clock(&start))?;
            if clock(&start) != clock(&now) {
                write!(writer, " (Dienstbeginn, clocked {})", clock(&now))?;
            }
            writeln!(writer)?;
        }
        Toggle::Stopped(_) => {
            let end = entry.end_in(&tz).unwrap_or(now);
            writeln!(
                writer,
                "Stopped {} at {}, net {}",
                short_id(id),
                clock(&end),
                format_duration(net_ms(entry, &settings))
            )?;
        }
    }
    Ok(())
}
