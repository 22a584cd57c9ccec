//! `timeline` CLI: query a storage snapshot for a user's timeline, the now
//! view, and task suggestions.
//!
//! ## Usage
//!
//! ```sh
//! # Today's timeline for user 1
//! timeline timeline -s snapshot.json --user 1
//!
//! # A page of a month view
//! timeline timeline -s snapshot.json --user 1 \
//!   --start 2026-12-01T00:00:00Z --end 2026-12-31T23:59:59Z --skip 20 --limit 20
//!
//! # What is happening now, and what is next
//! timeline now -s snapshot.json --user 1 --now 2026-03-16T09:30:00Z
//!
//! # Top five pending tasks for a tired user
//! timeline suggest -s snapshot.json --user 1 --energy low
//!
//! # Holidays in a range
//! timeline holidays --country ES --from 2026-12-01 --to 2026-12-31
//! ```
//!
//! Results are printed as pretty JSON. Set `TIMELINE_LOG` to override the log
//! filter (logs go to stderr).

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde_json::json;
use timeline_engine::holiday::{holidays_in_range, resolve_region};
use timeline_engine::{
    BuiltinHolidays, EnergyLevel, EngineConfig, MemoryStore, TimelineQuery, TimelineService, Timestamp,
};
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "timeline",
    version,
    about = "Unified timeline, now view and energy-aware task suggestions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file (region, limits, timezone)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the merged timeline for a window
    Timeline {
        /// JSON snapshot of users, events and tasks
        #[arg(short, long)]
        snapshot: String,
        #[arg(short, long)]
        user: i64,
        /// Window start (defaults to the start of today)
        #[arg(long)]
        start: Option<String>,
        /// Window end (defaults to the end of the start's day)
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        skip: Option<usize>,
        #[arg(long)]
        limit: Option<usize>,
        /// Reference "now" (defaults to the system clock)
        #[arg(long)]
        now: Option<String>,
    },
    /// Print the current and next item
    Now {
        #[arg(short, long)]
        snapshot: String,
        #[arg(short, long)]
        user: i64,
        #[arg(long)]
        now: Option<String>,
    },
    /// Print up to five pending tasks ranked for an energy level
    Suggest {
        #[arg(short, long)]
        snapshot: String,
        #[arg(short, long)]
        user: i64,
        /// low, medium or high
        #[arg(short, long)]
        energy: String,
        #[arg(long)]
        now: Option<String>,
    },
    /// List holidays of a country between two dates (inclusive)
    Holidays {
        #[arg(long)]
        country: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let config = match cli.config.as_deref() {
        Some(path) => {
            EngineConfig::load(path).with_context(|| format!("Failed to load config: {}", path))?
        }
        None => EngineConfig::default(),
    };
    debug!(?config, "configuration loaded");

    let output = match cli.command {
        Commands::Timeline {
            snapshot,
            user,
            start,
            end,
            skip,
            limit,
            now,
        } => {
            let service = open_service(&snapshot, config)?;
            let query = TimelineQuery {
                start: parse_instant(start.as_deref())?,
                end: parse_instant(end.as_deref())?,
                skip,
                limit,
            };
            let items = service
                .timeline(user, &query, resolve_now(now.as_deref())?)
                .context("Failed to build timeline")?;
            serde_json::to_value(items)?
        }
        Commands::Now {
            snapshot,
            user,
            now,
        } => {
            let service = open_service(&snapshot, config)?;
            let view = service
                .now_view(user, resolve_now(now.as_deref())?)
                .context("Failed to resolve now view")?;
            serde_json::to_value(view)?
        }
        Commands::Suggest {
            snapshot,
            user,
            energy,
            now,
        } => {
            let energy: EnergyLevel = energy.parse().context("Failed to parse --energy")?;
            let service = open_service(&snapshot, config)?;
            let tasks = service
                .suggestions(user, energy, resolve_now(now.as_deref())?)
                .context("Failed to rank tasks")?;
            serde_json::to_value(tasks)?
        }
        Commands::Holidays { country, from, to } => {
            let from = parse_date(&from)?;
            let to = parse_date(&to)?;
            let region = resolve_region(&BuiltinHolidays, &country, &config.default_region);
            let days: Vec<_> = holidays_in_range(&BuiltinHolidays, &region, from, to)
                .map(|(date, name)| json!({ "date": date.to_string(), "name": name }))
                .collect();
            json!({ "country": region, "holidays": days })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("TIMELINE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("Failed to initialize logging: {error}"))?;

    Ok(())
}

fn open_service(
    snapshot: &str,
    config: EngineConfig,
) -> Result<TimelineService<MemoryStore, BuiltinHolidays>> {
    let store = MemoryStore::load(snapshot)
        .map_err(|e| anyhow::anyhow!(e))
        .with_context(|| format!("Failed to read snapshot: {}", snapshot))?;
    TimelineService::new(store, BuiltinHolidays, config).context("Invalid configuration")
}

fn parse_instant(raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    raw.map(|s| {
        s.parse::<Timestamp>()
            .map(|ts| ts.to_utc())
            .with_context(|| format!("Failed to parse timestamp: {}", s))
    })
    .transpose()
}

fn resolve_now(raw: Option<&str>) -> Result<DateTime<Utc>> {
    Ok(parse_instant(raw)?.unwrap_or_else(Utc::now))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    raw.parse::<NaiveDate>()
        .with_context(|| format!("Failed to parse date: {}", raw))
}
