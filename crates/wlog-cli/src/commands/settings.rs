//! Show and edit the accounting settings.

use std::io::Write;

use anyhow::{Context, Result};
use serde_json::Value;
use wlog_core::storage::{Store, load_settings, save_settings};

pub fn show<W: Write, S: Store + ?Sized>(writer: &mut W, store: &S) -> Result<()> {
    let settings = load_settings(store);
    writeln!(writer, "{}", serde_json::to_string_pretty(&settings)?)?;
    Ok(())
}

/// Sets one field. `raw` is read as JSON first (`7.5`, `true`), then as a
/// plain string (`08:00`, `NW`).
pub fn set<W: Write, S: Store + ?Sized>(
    writer: &mut W,
    store: &S,
    field: &str,
    raw: &str,
) -> Result<()> {
    let settings = load_settings(store);
    let parsed = serde_json::from_str::<Value>(raw).ok();
    let updated = match parsed.map(|value| settings.with_field(field, &value)) {
        Some(Ok(updated)) => updated,
        _ => settings.with_field(field, &Value::String(raw.to_string()))?,
    };
    save_settings(store, &updated).context("failed to save settings")?;

    let shown = serde_json::to_value(&updated)?
        .get(field)
        .map_or_else(|| raw.to_string(), Value::to_string);
    writeln!(writer, "{field} = {shown}")?;
    Ok(())
}
