//! Logs command - inspect and prune the command log in logs.duckdb

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;
use serde::Serialize;

use super::get_tally_dir;
use crate::output;
use tally_core::{LogEntry, LoggingService};

/// A century of retention is the most `clear` accepts
const MAX_RETENTION_DAYS: i64 = 36_500;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent log entries
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Show only failed commands
        #[arg(long)]
        errors: bool,
    },
    /// Clear old log entries
    Clear {
        /// Delete logs older than N days
        #[arg(
            long,
            default_value = "30",
            value_parser = clap::value_parser!(u32).range(..=MAX_RETENTION_DAYS)
        )]
        older_than_days: u32,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Show log statistics and database path
    Stats,
}

#[derive(Debug, Serialize)]
struct LogStats {
    total_entries: u64,
    error_count: u64,
    database_path: String,
    database_size_bytes: u64,
}

pub fn run(command: LogsCommands, json: bool) -> Result<()> {
    let tally_dir = get_tally_dir()?;
    std::fs::create_dir_all(&tally_dir)?;
    let service = LoggingService::new(&tally_dir, env!("CARGO_PKG_VERSION"))?;

    match command {
        LogsCommands::List { limit, errors } => run_list(&service, limit, errors, json),
        LogsCommands::Clear {
            older_than_days,
            force,
        } => run_clear(&service, older_than_days, force, json),
        LogsCommands::Stats => run_stats(&service, json),
    }
}

fn run_list(service: &LoggingService, limit: usize, errors_only: bool, json: bool) -> Result<()> {
    let entries = if errors_only {
        service.get_errors(limit)?
    } else {
        service.get_recent(limit)?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        output::info("No log entries found.");
    } else {
        println!("{}", entries_table(entries));
    }
    Ok(())
}

fn run_clear(service: &LoggingService, older_than_days: u32, force: bool, json: bool) -> Result<()> {
    let cutoff = retention_cutoff(Utc::now(), older_than_days)?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete log entries recorded before {}?",
                output::format_time(&cutoff)
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let deleted = service.delete_before(cutoff.timestamp_millis())?;
    tracing::debug!(deleted, older_than_days, "Pruned command log");

    if json {
        println!("{}", serde_json::json!({ "deleted": deleted }));
    } else {
        output::success(&format!("Deleted {} log entries", deleted));
    }
    Ok(())
}

fn run_stats(service: &LoggingService, json: bool) -> Result<()> {
    let db_path = service.db_path();
    let stats = LogStats {
        total_entries: service.count()?,
        error_count: service.count_errors()?,
        database_path: db_path.to_string_lossy().into_owned(),
        database_size_bytes: std::fs::metadata(db_path).map(|m| m.len()).unwrap_or(0),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let mut table = output::create_table();
    table.add_row(vec!["Total entries".to_string(), stats.total_entries.to_string()]);
    table.add_row(vec!["Errors".to_string(), stats.error_count.to_string()]);
    table.add_row(vec!["Database".to_string(), stats.database_path]);
    table.add_row(vec![
        "Size".to_string(),
        output::format_size(stats.database_size_bytes),
    ]);
    println!("{}", "Log Statistics".bold());
    println!("{}", table);
    Ok(())
}

/// Instant before which entries are pruned, `days` before `now`
fn retention_cutoff(now: DateTime<Utc>, days: u32) -> Result<DateTime<Utc>> {
    Duration::try_days(i64::from(days))
        .and_then(|age| now.checked_sub_signed(age))
        .with_context(|| format!("Retention of {} days is out of range", days))
}

fn entries_table(entries: Vec<LogEntry>) -> comfy_table::Table {
    let mut table = output::create_table();
    table.set_header(vec!["Time", "Command", "Outcome", "Error", "Duration"]);

    for entry in entries {
        let time = Utc
            .timestamp_millis_opt(entry.timestamp)
            .single()
            .map(|dt| output::format_time(&dt))
            .unwrap_or_else(|| entry.timestamp.to_string());
        let outcome = match entry.outcome.as_str() {
            "error" => entry.outcome.red().to_string(),
            _ => entry.outcome.green().to_string(),
        };

        table.add_row(vec![
            time,
            entry.command.unwrap_or(entry.event),
            outcome,
            entry.error_kind.unwrap_or_default(),
            entry
                .duration_ms
                .map(|ms| format!("{} ms", ms))
                .unwrap_or_default(),
        ]);
    }
    table
}
