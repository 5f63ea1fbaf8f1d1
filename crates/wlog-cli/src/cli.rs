//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use wlog_core::EntryType;

use crate::commands::util::{YearMonth, parse_year_month};

/// Work-time ledger.
///
/// Clocks work intervals, records leave days and reports net time, night and
/// Sunday/holiday premium and the monthly balance against the target.
#[derive(Debug, Parser)]
#[command(name = "wlog", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the timer, or stop the running entry.
    Toggle {
        /// Skip Dienstbeginn rounding for the new entry.
        #[arg(long)]
        overdrive: bool,
    },

    /// Show today's entries and the running timer.
    Today,

    /// Add a work entry.
    Add {
        /// Start time (`HH:MM` today, `YYYY-MM-DD HH:MM`, or RFC 3339).
        start: String,

        /// End time; omit to start a running entry.
        end: Option<String>,

        /// Pause in minutes, overriding the default pause.
        #[arg(long)]
        pause: Option<i64>,

        /// Mark the entry as overdrive.
        #[arg(long)]
        overdrive: bool,
    },

    /// Record a whole day of vacation (`u`) or free/holiday (`f`).
    Leave {
        /// Entry type: `u`/`vacation` or `f`/`free`.
        kind: EntryType,

        /// The day (`YYYY-MM-DD`).
        date: NaiveDate,
    },

    /// Change an existing entry.
    Edit {
        /// Entry ID or unique prefix.
        id: String,

        /// New start time (work entries).
        #[arg(long)]
        start: Option<String>,

        /// New end time (work entries).
        #[arg(long, conflicts_with = "running")]
        end: Option<String>,

        /// Clear the end time so the entry runs again.
        #[arg(long)]
        running: bool,

        /// New pause override in minutes.
        #[arg(long, conflicts_with = "default_pause")]
        pause: Option<i64>,

        /// Drop the pause override and use the default pause.
        #[arg(long)]
        default_pause: bool,

        /// Set or clear the overdrive flag.
        #[arg(long)]
        overdrive: Option<bool>,

        /// New day (leave entries).
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Delete an entry.
    Delete {
        /// Entry ID or unique prefix.
        id: String,
    },

    /// Show the month report.
    Report {
        /// Month to report (`YYYY-MM`, default: current month).
        #[arg(long, value_parser = parse_year_month)]
        month: Option<YearMonth>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Export a month as CSV.
    Export {
        /// Month to export (`YYYY-MM`, default: current month).
        #[arg(long, value_parser = parse_year_month)]
        month: Option<YearMonth>,

        /// Write to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import entries from a CSV file.
    Import {
        /// CSV file to read.
        file: PathBuf,

        /// Keep existing entries instead of replacing them.
        #[arg(long)]
        append: bool,
    },

    /// Write a JSON backup of all entries and settings.
    Backup {
        /// Write to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Restore entries from a JSON backup.
    Restore {
        /// Backup file to read.
        file: PathBuf,

        /// Keep existing entries instead of replacing them.
        #[arg(long)]
        append: bool,

        /// Also replace the settings with those in the backup.
        #[arg(long)]
        apply_settings: bool,
    },

    /// Show or change accounting settings.
    #[command(subcommand)]
    Settings(SettingsAction),

    /// Show the public holidays used for a year.
    Holidays {
        /// Year to show (default: current year).
        #[arg(long)]
        year: Option<i32>,

        /// Fetch the regional holidays from the holiday API first.
        #[arg(long)]
        refresh: bool,
    },
}

/// Settings subcommands.
#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    /// Print the current settings as JSON.
    Show,

    /// Change one field (e.g. `hoursPerDay 7.5`, `stateCode NW`).
    Set {
        /// Field name as shown by `settings show`.
        field: String,

        /// New value; parsed as JSON, else taken as a string.
        value: String,
    },
}
