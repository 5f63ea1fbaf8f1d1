//! CLI subcommand implementations.
//!
//! Every command takes the store and the current time explicitly, so tests
//! run against a `MemoryStore` in UTC with a fixed clock.

pub mod backup;
pub mod entries;
pub mod export;
pub mod holidays;
pub mod import;
pub mod report;
pub mod settings;
pub mod today;
pub mod toggle;
pub mod util;

use anyhow::{Context, Result};
use wlog_core::Entry;
use wlog_core::storage::{Store, save_entries};

fn save<S: Store + ?Sized>(store: &S, entries: &[Entry]) -> Result<()> {
    save_entries(store, entries).context("failed to save entries")
}
