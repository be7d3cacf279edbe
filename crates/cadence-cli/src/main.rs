//! Cadence CLI
//!
//! Command-line interface for the Cadence spaced repetition scheduler.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

use cadence_core::{
    format_interval, local_day_start, DueSetQuery, Grade, ItemLookup, LeechDetector, Reviewer,
    SchedulerConfig, StatsAggregator, Storage, DEFAULT_CONFIG,
};

/// Cadence - spaced repetition scheduler CLI
#[derive(Parser)]
#[command(name = "cadence")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "CLI for the Cadence spaced repetition scheduler")]
#[command(long_about = "Cadence schedules memorization items with an SM-2 style algorithm.\n\nIt tracks lapses, flags leeches and reports daily review statistics.")]
struct Cli {
    /// Directory holding cadence.db (defaults to CADENCE_DATA_DIR, then the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Scheduler config JSON file (defaults to config.json in the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add an item; it is due immediately
    Add {
        /// Prompt side
        front: String,
        /// Answer side
        back: String,
    },

    /// List items due now
    Due {
        /// Maximum number of items to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Grade an item: again, hard, good, easy (or 1-4)
    Review {
        /// Item id
        item_id: String,
        /// Grade name or key
        grade: String,
        /// Response time in milliseconds
        #[arg(long)]
        duration_ms: Option<u64>,
    },

    /// Show what each grade would schedule, without recording anything
    Preview {
        /// Item id
        item_id: String,
    },

    /// List leeches
    Leeches {
        /// Lapse count at which an item is a leech (defaults to the configured threshold)
        #[arg(long)]
        threshold: Option<u32>,
    },

    /// Show today's review statistics
    Stats,

    /// Delete an item together with its review history
    Delete {
        /// Item id
        item_id: String,
    },

    /// Print the effective scheduler config as JSON
    Config,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(cli.config.as_deref(), |key| std::env::var(key).ok())?;
    let now = Utc::now();

    if let Commands::Config = cli.command {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let storage = open_storage(cli.data_dir)?;

    match cli.command {
        Commands::Add { front, back } => run_add(&storage, &config, &front, &back, now),
        Commands::Due { limit } => run_due(&storage, limit, now),
        Commands::Review {
            item_id,
            grade,
            duration_ms,
        } => run_review(&storage, &config, &item_id, &grade, duration_ms, now),
        Commands::Preview { item_id } => run_preview(&storage, &config, &item_id, now),
        Commands::Leeches { threshold } => {
            run_leeches(&storage, threshold.unwrap_or(config.leech_threshold))
        }
        Commands::Stats => run_stats(&storage, &config, now),
        Commands::Delete { item_id } => run_delete(&storage, &item_id),
        Commands::Config => Ok(()),
    }
}

// ============================================================================
// SETUP
// ============================================================================

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "cadence", "cadence")
}

/// Defaults, then the JSON file, then `CADENCE_*` overrides; validated last
fn resolve_config<F>(explicit: Option<&Path>, lookup: F) -> anyhow::Result<SchedulerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let file = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => project_dirs()
            .map(|dirs| dirs.config_dir().join("config.json"))
            .filter(|path| path.exists()),
    };

    let config = match file {
        Some(path) => {
            let json = std::fs::read_to_string(&path).map_err(|e| {
                anyhow::anyhow!("Failed to read config {}: {}", path.display(), e)
            })?;
            tracing::debug!(path = %path.display(), "Loaded scheduler config");
            SchedulerConfig::from_json_str(&json)?
        }
        None => DEFAULT_CONFIG,
    };

    let config = config.apply_env_with(lookup)?;
    config.validate()?;
    Ok(config)
}

fn open_storage(data_dir: Option<PathBuf>) -> anyhow::Result<Storage> {
    let data_dir = data_dir.or_else(|| std::env::var_os("CADENCE_DATA_DIR").map(PathBuf::from));

    let storage = match data_dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            Storage::new(Some(dir.join("cadence.db")))?
        }
        None => Storage::new(None)?,
    };
    tracing::debug!(path = %storage.path().display(), "Opened database");
    Ok(storage)
}

/// Accepts a grade name or its 1-4 key
fn parse_grade(value: &str) -> anyhow::Result<Grade> {
    if let Ok(key) = value.trim().parse::<i32>() {
        return Grade::from_i32(key)
            .ok_or_else(|| anyhow::anyhow!("Grade key must be 1-4, got {}", key));
    }
    Ok(value.parse::<Grade>()?)
}

fn format_due(due_at: DateTime<Utc>) -> String {
    due_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

// ============================================================================
// COMMANDS
// ============================================================================

fn run_add(
    storage: &Storage,
    config: &SchedulerConfig,
    front: &str,
    back: &str,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    if front.trim().is_empty() || back.trim().is_empty() {
        anyhow::bail!("Front and back cannot be empty");
    }

    let (item, state) = storage.add_item(front, back, config, now)?;

    println!("{}", "=== Cadence Add ===".cyan().bold());
    println!();
    println!("{}: {}", "Item ID".white().bold(), item.id);
    println!("{}: {}", "Front".white().bold(), item.front);
    println!("{}: {}", "Due".white().bold(), format_due(state.due_at));
    Ok(())
}

fn run_due(storage: &Storage, limit: usize, now: DateTime<Utc>) -> anyhow::Result<()> {
    let query = DueSetQuery::new(storage, storage);
    let due = query.due_items(now)?;

    println!("{}", "=== Due Now ===".cyan().bold());
    println!();

    if due.is_empty() {
        println!("{}", "Nothing due. Come back later.".dimmed());
        return Ok(());
    }

    for entry in due.iter().take(limit) {
        let phase = if entry.state.is_learning() {
            "learning".yellow()
        } else {
            "review".green()
        };
        println!(
            "  {}  {:40} {:>8}  lapses {}",
            entry.item.id.dimmed(),
            truncate(&entry.item.front, 40),
            phase,
            entry.state.lapse_count
        );
    }

    if due.len() > limit {
        println!();
        println!("{}", format!("... and {} more", due.len() - limit).dimmed());
    }
    Ok(())
}

fn run_review(
    storage: &Storage,
    config: &SchedulerConfig,
    item_id: &str,
    grade: &str,
    duration_ms: Option<u64>,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let grade = parse_grade(grade)?;
    let reviewer = Reviewer::new(storage, *config)?;
    let outcome = reviewer.apply_grade(item_id, grade, now, duration_ms)?;
    let state = &outcome.result.state;

    println!("{}", "=== Cadence Review ===".cyan().bold());
    println!();
    if let Some(item) = storage.get_item(item_id)? {
        println!("{}: {}", "Item".white().bold(), item.front);
    }
    println!("{}: {}", "Grade".white().bold(), grade);
    println!(
        "{}: {}",
        "Next Review".white().bold(),
        format_interval(state.interval_days)
    );
    println!("{}: {}", "Due".white().bold(), format_due(state.due_at));
    println!("{}: {:.2}", "Ease Factor".white().bold(), state.ease_factor);
    println!("{}: {}", "Lapses".white().bold(), state.lapse_count);

    if outcome.result.is_leech {
        println!();
        println!(
            "{}",
            format!(
                "Leech: this item has lapsed {} times. Consider rewriting it.",
                state.lapse_count
            )
            .yellow()
            .bold()
        );
    }
    Ok(())
}

fn run_preview(
    storage: &Storage,
    config: &SchedulerConfig,
    item_id: &str,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let reviewer = Reviewer::new(storage, *config)?;
    let preview = reviewer.preview(item_id, now)?;

    println!("{}", "=== Cadence Preview ===".cyan().bold());
    println!();
    for grade in Grade::ALL {
        let result = preview.for_grade(grade);
        let label = format!("{} {}", grade.as_i32(), grade);
        let leech = if result.is_leech { " (leech)".red().to_string() } else { String::new() };
        println!(
            "  {:10} {:>6}{}",
            label,
            format_interval(result.state.interval_days),
            leech
        );
    }
    Ok(())
}

fn run_leeches(storage: &Storage, threshold: u32) -> anyhow::Result<()> {
    let detector = LeechDetector::new(storage, storage);
    let leeches = detector.leeches(threshold)?;

    println!("{}", "=== Leeches ===".yellow().bold());
    println!();

    if leeches.is_empty() {
        println!("{}", format!("No items with {} or more lapses.", threshold).dimmed());
        return Ok(());
    }

    for entry in &leeches {
        println!(
            "  {:>3}  {}  {}",
            entry.state.lapse_count.to_string().red().bold(),
            entry.item.id.dimmed(),
            truncate(&entry.item.front, 50)
        );
    }
    Ok(())
}

fn run_stats(storage: &Storage, config: &SchedulerConfig, now: DateTime<Utc>) -> anyhow::Result<()> {
    let stats = StatsAggregator::new(storage, storage)
        .daily_stats(local_day_start(now), config.leech_threshold)?;
    let due = DueSetQuery::new(storage, storage).due_count(now)?;

    println!("{}", "=== Cadence Statistics ===".cyan().bold());
    println!();
    println!("{}: {}", "Total Items".white().bold(), storage.item_count()?);
    println!("{}: {}", "Due Now".white().bold(), due);
    println!("{}: {}", "Reviewed Today".white().bold(), stats.reviewed);
    println!("  {}: {}", "Again".red(), stats.again_count);
    println!("  {}: {}", "Hard".yellow(), stats.hard_count);
    println!("  {}: {}", "Good".green(), stats.good_count);
    println!("  {}: {}", "Easy".cyan(), stats.easy_count);
    match stats.accuracy() {
        Some(accuracy) => println!("{}: {:.1}%", "Accuracy".white().bold(), accuracy * 100.0),
        None => println!("{}: {}", "Accuracy".white().bold(), "-".dimmed()),
    }
    println!("{}: {}", "Leeches".white().bold(), stats.leech_count);
    Ok(())
}

fn run_delete(storage: &Storage, item_id: &str) -> anyhow::Result<()> {
    if storage.delete_item(item_id)? {
        println!("{} {}", "Deleted".green().bold(), item_id);
        Ok(())
    } else {
        anyhow::bail!("Item not found: {}", item_id)
    }
}
