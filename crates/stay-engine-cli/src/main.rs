//! `staycalc` — check recorded stays and planned trips against a rolling
//! N-in-M day limit (90 days in any 180 by default).

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Serialize;
use stay_engine::{
    can_stay_for_duration, evaluate_candidate, next_full_entry_date, overstay_report,
    summarize_timeline, EntrySearchOptions, TravelLog, WindowRule,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser)]
#[command(name = "staycalc", version, about = "Rolling-window stay calculator")]
struct Cli {
    /// Length of the rolling window in days
    #[arg(long, global = true, default_value_t = 180)]
    window_days: u32,

    /// Days allowed inside one window
    #[arg(long, global = true, default_value_t = 90)]
    quota_days: u32,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Days used and remaining in the window ending on a date
    Status {
        /// Travel log (JSON). Use "-" for stdin
        file: PathBuf,
        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Check a candidate trip against stays and planned trips
    Check {
        file: PathBuf,
        #[arg(long)]
        entry: NaiveDate,
        #[arg(long)]
        exit: NaiveDate,
        /// Planned trip id to leave out (the trip being edited)
        #[arg(long)]
        exclude: Option<String>,
    },
    /// Evaluate every planned trip and the window to display
    Plan {
        file: PathBuf,
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Ignore planned trips when framing the timeline
        #[arg(long)]
        hide_proposed: bool,
    },
    /// How many days of a stay starting on a date are legal
    Duration {
        file: PathBuf,
        #[arg(long)]
        entry: NaiveDate,
        #[arg(long)]
        days: u32,
    },
    /// Earliest date a full stay can begin
    NextEntry {
        file: PathBuf,
        /// Length of the stay that must fit, defaults to the quota
        #[arg(long)]
        days: Option<u32>,
        /// First candidate entry date, defaults to today
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Number of entry dates to try
        #[arg(long, default_value_t = 365)]
        horizon: u32,
    },
    /// Validate a travel log and print it normalised
    Validate { file: PathBuf },
}

fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let rule = WindowRule::new(cli.window_days, cli.quota_days)?;
    debug!(window_days = rule.window_days, quota_days = rule.quota_days, "using rule");

    match cli.command {
        Command::Status { file, date } => {
            let log = load_log(&file)?;
            let report = overstay_report(date.unwrap_or_else(today), &log.stays, &rule);
            emit(cli.json, &report, || render::status(&report, &rule))
        }
        Command::Check {
            file,
            entry,
            exit,
            exclude,
        } => {
            let log = load_log(&file)?;
            let others: Vec<_> = log
                .proposed_trips
                .into_iter()
                .filter(|trip| exclude.as_deref() != Some(trip.id.as_str()))
                .collect();
            let result = evaluate_candidate(entry, exit, &log.stays, &others, &rule)?;
            emit(cli.json, &result, || render::candidate(&result, &rule))
        }
        Command::Plan {
            file,
            date,
            hide_proposed,
        } => {
            let log = load_log(&file)?;
            let proposed = log.visible_proposed(!hide_proposed);
            let summary =
                summarize_timeline(&log.stays, proposed, date.unwrap_or_else(today), &rule);
            emit(cli.json, &summary, || render::plan(&summary, &rule))
        }
        Command::Duration { file, entry, days } => {
            let log = load_log(&file)?;
            let check = can_stay_for_duration(entry, days, &log.stays, &rule)?;
            emit(cli.json, &check, || render::duration(&check))
        }
        Command::NextEntry {
            file,
            days,
            from,
            horizon,
        } => {
            let log = load_log(&file)?;
            let defaults = EntrySearchOptions::for_rule(&rule);
            let options = EntrySearchOptions {
                desired_days: days.unwrap_or(defaults.desired_days),
                horizon_days: horizon,
            };
            let from = from.unwrap_or_else(today);
            let found = next_full_entry_date(from, &log.stays, &rule, &options)?;
            emit(cli.json, &found, || render::next_entry(found.as_ref(), &options))
        }
        Command::Validate { file } => {
            let log = load_log(&file)?;
            println!("{}", log.to_json_pretty()?);
            Ok(())
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn load_log(path: &Path) -> Result<TravelLog> {
    let json = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read travel log from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };
    let log = TravelLog::from_json(&json)
        .with_context(|| format!("invalid travel log {}", path.display()))?;
    debug!(
        stays = log.stays.len(),
        proposed = log.proposed_trips.len(),
        "loaded travel log"
    );
    Ok(log)
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}
