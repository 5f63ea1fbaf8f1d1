//! CSV import into the ledger.

use std::io::Write;

use anyhow::Result;
use chrono::TimeZone;
use wlog_core::ledger::merge_imported;
use wlog_core::storage::{Store, load_entries};
use wlog_core::{ImportMode, import_csv};

use super::save;

/// Imports entries from CSV `text`, replacing or appending per `mode`.
///
/// A file that yields no entries leaves the ledger untouched.
pub fn run<W: Write, S: Store + ?Sized, Tz: TimeZone>(
    writer: &mut W,
    store: &S,
    tz: &Tz,
    text: &str,
    mode: ImportMode,
) -> Result<()> {
    let imported = import_csv(text, tz);
    if imported.is_empty() {
        writeln!(writer, "No entries found; ledger unchanged.")?;
        return Ok(());
    }

    let count = imported.len();
    let mut entries = load_entries(store, tz);
    merge_imported(&mut entries, imported, mode);
    save(store, &entries)?;
    tracing::debug!(count, ?mode, "imported CSV");

    let verb = match mode {
        ImportMode::Replace => "replaced existing entries",
        ImportMode::Append => "appended",
    };
    writeln!(writer, "Imported {count} entries ({verb}); {} total.", entries.len())?;
    Ok(())
}
