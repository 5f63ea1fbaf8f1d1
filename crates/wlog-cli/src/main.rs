use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wlog_cli::commands::util::YearMonth;
use wlog_cli::commands::{backup, entries, export, holidays, import, report, settings, today, toggle};
use wlog_cli::{Cli, Commands, Config, SettingsAction};
use wlog_core::ImportMode;
use wlog_core::storage::load_settings;

/// Load config and open database.
fn open_database(config_path: Option<&Path>) -> Result<(wlog_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let db = wlog_db::Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    Ok((db, config))
}

/// Stdout, or a freshly created file.
fn output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

const fn import_mode(append: bool) -> ImportMode {
    if append {
        ImportMode::Append
    } else {
        ImportMode::Replace
    }
}

#[expect(
    clippy::too_many_lines,
    reason = "CLI command dispatch is inherently verbose"
)]
fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (db, config) = open_database(cli.config.as_deref())?;
    let now = Local::now();
    let tz = Local;
    let current_month = YearMonth::of(now.date_naive());
    let mut stdout = io::stdout().lock();

    match command {
        Commands::Toggle { overdrive } => toggle::run(&mut stdout, &db, now, *overdrive)?,
        Commands::Today => today::run(&mut stdout, &db, &now)?,
        Commands::Add {
            start,
            end,
            pause,
            overdrive,
        } => entries::add(
            &mut stdout,
            &db,
            &now,
            start,
            end.as_deref(),
            *pause,
            *overdrive,
        )?,
        Commands::Leave { kind, date } => entries::leave(&mut stdout, &db, &tz, *kind, *date)?,
        Commands::Edit {
            id,
            start,
            end,
            running,
            pause,
            default_pause,
            overdrive,
            date,
        } => {
            let args = entries::EditArgs {
                start: start.clone(),
                end: end.clone(),
                running: *running,
                pause_minutes: *pause,
                default_pause: *default_pause,
                overdrive: *overdrive,
                date: *date,
            };
            entries::edit(&mut stdout, &db, &now, id, &args)?;
        }
        Commands::Delete { id } => entries::delete(&mut stdout, &db, &tz, id)?,
        Commands::Report { month, json } => report::run(
            &mut stdout,
            &db,
            &tz,
            month.unwrap_or(current_month),
            now.date_naive(),
            *json,
        )?,
        Commands::Export { month, output: path } => {
            let mut writer = output(path.as_deref())?;
            export::run(&mut writer, &db, &tz, month.unwrap_or(current_month))?;
            writer.flush()?;
        }
        Commands::Import { file, append } => {
            let text = read_file(file)?;
            import::run(&mut stdout, &db, &tz, &text, import_mode(*append))?;
        }
        Commands::Backup { output: path } => {
            let mut writer = output(path.as_deref())?;
            backup::run(&mut writer, &db, &tz, Utc::now())?;
            writer.flush()?;
        }
        Commands::Restore {
            file,
            append,
            apply_settings,
        } => {
            let text = read_file(file)?;
            backup::restore(
                &mut stdout,
                &db,
                &tz,
                &text,
                import_mode(*append),
                *apply_settings,
            )?;
        }
        Commands::Settings(SettingsAction::Show) => settings::show(&mut stdout, &db)?,
        Commands::Settings(SettingsAction::Set { field, value }) => {
            settings::set(&mut stdout, &db, field, value)?;
        }
        Commands::Holidays { year, refresh } => {
            let year = year.unwrap_or_else(|| now.year());
            if *refresh {
                let client =
                    wlog_holidays::Client::new(&config.holiday_api_url, config.holiday_timeout())
                        .context("failed to create holiday client")?;
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .context("failed to start async runtime")?;
                runtime.block_on(holidays::refresh(&mut stdout, &db, &client, year))?;
            }
            let region = load_settings(&db).state_code;
            let keys = db
                .keys_with_prefix(&wlog_core::storage::holiday_cache_prefix(&region))
                .context("failed to list cached holidays")?;
            holidays::show(&mut stdout, &db, year, &holidays::cached_years(&keys, &region))?;
        }
    }

    Ok(())
}
