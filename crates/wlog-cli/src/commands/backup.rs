//! JSON backup and restore.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use wlog_core::ledger::merge_imported;
use wlog_core::storage::{Store, load_entries, load_settings, save_settings};
use wlog_core::{ImportMode, decode_backup, encode_backup};

use super::save;

/// Writes every entry and the current settings as a backup document.
pub fn run<W: Write, S: Store + ?Sized, Tz: TimeZone>(
    writer: &mut W,
    store: &S,
    tz: &Tz,
    exported_at: DateTime<Utc>,
) -> Result<()> {
    let settings = load_settings(store);
    let entries = load_entries(store, tz);
    let document =
        encode_backup(&entries, &settings, exported_at).context("failed to encode backup")?;
    writeln!(writer, "{document}")?;
    tracing::debug!(entries = entries.len(), "wrote backup");
    Ok(())
}

/// Restores entries from a backup document.
///
/// Settings carried by the backup are applied only with `apply_settings`.
/// A backup without entries leaves the ledger untouched.
pub fn restore<W: Write, S: Store + ?Sized, Tz: TimeZone>(
    writer: &mut W,
    store: &S,
    tz: &Tz,
    text: &str,
    mode: ImportMode,
    apply_settings: bool,
) -> Result<()> {
    let restored = decode_backup(text, tz);

    if restored.entries.is_empty() {
        writeln!(writer, "No entries found; ledger unchanged.")?;
    } else {
        let count = restored.entries.len();
        let mut entries = load_entries(store, tz);
        merge_imported(&mut entries, restored.entries, mode);
        save(store, &entries)?;
        writeln!(writer, "Restored {count} entries; {} total.", entries.len())?;
    }

    match (restored.settings, apply_settings) {
        (Some(settings), true) => {
            save_settings(store, &settings).context("failed to save settings")?;
            writeln!(writer, "Settings restored.")?;
        }
        (Some(_), false) => {
            writeln!(writer, "Backup settings ignored; pass --apply-settings to use them.")?;
        }
        (None, _) => {}
    }
    Ok(())
}
