//! # Cable Sizing CLI
//!
//! Sizes every cable in a JSON schedule and prints a summary table.
//!
//! ```text
//! cable_cli size plant.cbs --catalog vendor.json --conductor cu --top-n 3
//! cable_cli size cables.json --json > results.json
//! cable_cli new plant.cbs --engineer "Jane Engineer" --job-id 25-042
//! ```
//!
//! The input file is either a full schedule (metadata, settings, cables) or
//! a bare JSON array of cable records sized with default settings.
//! Logs go to stderr; set `CABLE_LOG` (or `RUST_LOG`) to change the filter.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use cable_core::catalog::{match_rows, Catalog, RowMatch};
use cable_core::file_io::{save_schedule, validate_version};
use cable_core::schedule::CableSchedule;
use cable_core::sizing::{size_cable, BulkOutcome, CableInput, SizingResult};
use cable_core::{CalcError, CalcResult};

const LOG_ENV: &str = "CABLE_LOG";

#[derive(Debug, Parser)]
#[command(author, version, about = "Cable sizing and compliance checks", long_about = None)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Size every cable in a schedule
    Size(SizeArgs),
    /// Write an empty schedule file
    New(NewArgs),
}

#[derive(Debug, clap::Args)]
struct SizeArgs {
    /// Schedule file, or a JSON array of cable records
    schedule: PathBuf,

    /// Vendor catalog (JSON array of entries) to match sized cables against
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Suggestions per cable
    #[arg(long, default_value_t = 3)]
    top_n: usize,

    /// Only suggest entries whose conductor contains this text (e.g. "cu")
    #[arg(long)]
    conductor: Option<String>,

    /// Override the schedule's grouping threshold
    #[arg(long)]
    grouping_threshold: Option<f64>,

    /// Re-size each cable with the R/X and ratings of its best catalog match
    #[arg(long, requires = "catalog")]
    apply_best: bool,

    /// Print the full report as JSON on stdout instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, clap::Args)]
struct NewArgs {
    path: PathBuf,

    #[arg(long, default_value = "")]
    engineer: String,

    #[arg(long, default_value = "")]
    job_id: String,

    #[arg(long, default_value = "")]
    client: String,
}

fn init_tracing(json: bool) {
    let filter = match std::env::var(LOG_ENV) {
        Ok(directive) => EnvFilter::try_new(directive).unwrap_or_else(|err| {
            eprintln!("invalid {} directive ({}); defaulting to info", LOG_ENV, err);
            EnvFilter::new("info")
        }),
        Err(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let outcome = match cli.command {
        Commands::Size(args) => run_size(&args),
        Commands::New(args) => run_new(&args).map(|()| true),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}

fn run_new(args: &NewArgs) -> CalcResult<()> {
    let schedule = CableSchedule::new(&args.engineer, &args.job_id, &args.client);
    save_schedule(&schedule, &args.path)?;
    info!(path = %args.path.display(), "empty schedule written");
    Ok(())
}

fn read_json(path: &Path) -> CalcResult<serde_json::Value> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })
}

/// Accept either a full schedule or a bare array of cable records.
fn read_schedule(path: &Path) -> CalcResult<CableSchedule> {
    let value = read_json(path)?;
    if value.is_array() {
        let cables: Vec<CableInput> = serde_json::from_value(value)?;
        return Ok(CableSchedule::from_cables(cables));
    }
    let schedule: CableSchedule = serde_json::from_value(value)?;
    validate_version(&schedule.meta.version)?;
    Ok(schedule)
}

fn read_catalog(path: &Path) -> CalcResult<Catalog> {
    let catalog: Catalog = serde_json::from_value(read_json(path)?)?;
    if catalog.is_empty() {
        warn!(path = %path.display(), "catalog has no entries");
    }
    Ok(catalog)
}

#[derive(Serialize)]
struct ReportEntry<'a> {
    id: Uuid,
    cable_number: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a SizingResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a CalcError>,
}

#[derive(Serialize)]
struct Report<'a> {
    results: Vec<ReportEntry<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    matches: Vec<RowMatch>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    resized: Vec<SizingResult>,
}

/// Returns Ok(false) when any cable failed to size or failed a check.
fn run_size(args: &SizeArgs) -> CalcResult<bool> {
    let mut schedule = read_schedule(&args.schedule)?;
    if let Some(threshold) = args.grouping_threshold {
        schedule.settings.grouping_threshold = threshold;
    }
    schedule.settings.validate()?;

    let outcomes = schedule.size_all();
    let sized: Vec<(Uuid, &SizingResult)> = outcomes
        .iter()
        .filter_map(|(id, outcome)| outcome.as_ref().ok().map(|r| (*id, r)))
        .collect();

    let matches = match &args.catalog {
        Some(path) => {
            let catalog = read_catalog(path)?;
            let rows = sized
                .iter()
                .map(|(_, r)| (r.cable_number.as_str(), r.derated_current_a));
            match_rows(&catalog, rows, args.conductor.as_deref(), args.top_n)
        }
        None => Vec::new(),
    };

    let mut resized = Vec::new();
    if args.apply_best {
        for row in &matches {
            let (Some(entry), Some((id, _))) = (row.best(), sized.get(row.row_index)) else {
                continue;
            };
            let Some(input) = schedule.get_cable(id) else {
                continue;
            };
            let mut input = input.clone();
            input.apply_catalog_entry(entry);
            resized.push(size_cable(&input, &schedule.settings)?);
        }
    }

    let all_pass = outcomes
        .iter()
        .all(|(_, o)| o.as_ref().is_ok_and(|r| r.passes()));

    if args.json {
        let report = Report {
            results: outcomes
                .iter()
                .map(|(id, outcome)| report_entry(&schedule, *id, outcome))
                .collect(),
            matches,
            resized,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(&schedule, &outcomes);
        print_matches(&matches);
        if !resized.is_empty() {
            println!();
            println!("With best catalog match applied:");
            let resized_outcomes: Vec<(Uuid, BulkOutcome)> =
                resized.into_iter().map(|r| (Uuid::nil(), Ok(r))).collect();
            print_table(&schedule, &resized_outcomes);
        }
    }

    Ok(all_pass)
}

fn report_entry<'a>(
    schedule: &'a CableSchedule,
    id: Uuid,
    outcome: &'a BulkOutcome,
) -> ReportEntry<'a> {
    let cable_number = schedule
        .get_cable(&id)
        .map(|c| c.cable_number.as_str())
        .unwrap_or("");
    ReportEntry {
        id,
        cable_number,
        result: outcome.as_ref().ok(),
        error: outcome.as_ref().err(),
    }
}

fn print_table(schedule: &CableSchedule, outcomes: &[(Uuid, BulkOutcome)]) {
    println!(
        "{:<14} {:>9} {:>10} {:>8} {:>8} {:>9} {:>9}  {}",
        "Cable", "FLC A", "Derated A", "CSA mm²", "Vd %", "Start Vd%", "SC mm²", "Result"
    );
    println!("{}", "─".repeat(92));

    for (id, outcome) in outcomes {
        match outcome {
            Ok(result) => {
                let row = result.schedule_row();
                let status = if result.passes() {
                    "PASS".to_string()
                } else {
                    let failed: Vec<String> =
                        result.failing_checks().iter().map(|c| c.to_string()).collect();
                    format!("FAIL ({})", failed.join(", "))
                };
                println!(
                    "{:<14} {:>9.2} {:>10.2} {:>8} {:>8.3} {:>9.2} {:>9.2}  {}{}",
                    row.cable_number,
                    row.flc,
                    row.derated_current,
                    row.selected_csa,
                    row.vdrop_percent,
                    result.starting_vdrop_percent,
                    row.sc_required_area,
                    status,
                    if result.csa_fallback { " [largest CSA]" } else { "" }
                );
            }
            Err(e) => {
                let cable_number = schedule
                    .get_cable(id)
                    .map(|c| c.cable_number.as_str())
                    .unwrap_or("?");
                println!("{:<14} ERROR {}: {}", cable_number, e.error_code(), e);
            }
        }
    }
}

fn print_matches(matches: &[RowMatch]) {
    if matches.is_empty() {
        return;
    }
    println!();
    println!("Catalog suggestions:");
    for row in matches {
        if row.suggestions.is_empty() {
            println!("  {:<14} (none)", row.cable_number);
            continue;
        }
        for (rank, suggestion) in row.suggestions.iter().enumerate() {
            let label = if rank == 0 { row.cable_number.as_str() } else { "" };
            println!(
                "  {:<14} {}. {} (score {:.1})",
                label,
                rank + 1,
                suggestion.entry.describe(),
                suggestion.score
            );
        }
    }
}
