//! Net worked time of a single entry.

use crate::entry::{Entry, EntryKind};
use crate::settings::Settings;
use crate::time::MS_PER_MINUTE;

/// Net milliseconds credited for `entry`.
///
/// Day markers earn a flat `hours_per_day`. Work earns its duration minus
/// the pause (the entry's override, else the default), never below zero;
/// a running entry earns nothing yet.
pub fn net_ms(entry: &Entry, settings: &Settings) -> i64 {
    match &entry.kind {
        EntryKind::Vacation { .. } | EntryKind::FreeOrHoliday { .. } => settings.day_target_ms(),
        EntryKind::Work { end: None, .. } => 0,
        EntryKind::Work {
            start,
            end: Some(end),
            pause_minutes,
            ..
        } => {
            let raw = (*end - *start).num_milliseconds();
            let pause = pause_minutes.unwrap_or(settings.default_pause_minutes);
            (raw - i64::from(pause) * MS_PER_MINUTE).max(0)
        }
    }
}
