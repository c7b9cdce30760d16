//! Topic-Harvest main entry point
//!
//! This is the command-line interface for the Topic-Harvest batch engine.

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use topic_harvest::config::{load_config_with_hash, Config};
use topic_harvest::harvest::harvest;
use topic_harvest::logging::init_logging;
use topic_harvest::output::{print_summary, summarize, write_reports};
use topic_harvest::trigger::{run_schedule, DailySchedule};

/// Topic-Harvest: a concurrent batch fetch-and-extract engine
///
/// Topic-Harvest fetches a batch of pages concurrently while spacing out
/// requests to the same origin, extracts matching topics and discussion
/// links, and exports the results as JSON, CSV and a markdown summary.
#[derive(Parser, Debug)]
#[command(name = "topic-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A concurrent batch fetch-and-extract engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the targets without fetching anything
    #[arg(long, conflicts_with_all = ["stats", "schedule"])]
    dry_run: bool,

    /// Show the latest stored run from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "schedule"])]
    stats: bool,

    /// Run a batch at each configured time of day until interrupted
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    schedule: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Configuration comes first so the log file path is known
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    let _log_guard = init_logging(
        cli.verbose,
        cli.quiet,
        config.output.log_path.as_deref().map(Path::new),
    )
    .context("Failed to initialize logging")?;
    tracing::info!(
        "Configuration loaded from {} (hash: {})",
        cli.config.display(),
        config_hash
    );

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.schedule {
        handle_schedule(config, config_hash).await?;
    } else {
        let cancel = cancel_on_ctrl_c();
        run_batch(&config, &config_hash, cancel).await?;
    }

    Ok(())
}

/// Returns a token that is cancelled when Ctrl-C is pressed
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight targets");
            token.cancel();
        }
    });
    cancel
}

/// Handles the --dry-run mode: validates config and shows what would be fetched
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let targets = config.targets()?;

    println!("=== Topic-Harvest Dry Run ===\n");

    println!("Batch Configuration:");
    match config.batch.concurrency_limit {
        Some(limit) => println!("  Concurrency limit: {}", limit),
        None => println!("  Concurrency limit: unbounded"),
    }
    println!("  Politeness delay: {}ms", config.batch.politeness_delay);
    println!("  Timeout: {}ms", config.batch.timeout);
    println!("  Connect timeout: {}ms", config.batch.connect_timeout);
    println!("  Retries: {}", config.batch.retries);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.value);

    println!("\nExtraction:");
    println!("  Keywords: {}", config.extract.keywords.join(", "));
    println!("  Discussion marker: {}", config.extract.discussion_marker);
    println!("  Title limit: {}", config.extract.title_limit);

    println!("\nOutput:");
    print_optional_path("JSON", &config.output.json_path);
    print_optional_path("CSV", &config.output.csv_path);
    print_optional_path("Summary", &config.output.summary_path);
    print_optional_path("Database", &config.output.database_path);
    print_optional_path("Log", &config.output.log_path);

    println!("\nSchedule:");
    println!("  Times: {}", config.schedule.times.join(", "));
    println!("  Poll interval: {}s", config.schedule.poll_interval);

    println!("\nTargets ({}):", targets.len());
    for target in &targets {
        println!("  - {} ({})", target.name, target.url);
        for (name, value) in &target.headers {
            println!("    * {}: {}", name, value);
        }
        if let Some(delay) = target.delay {
            println!("    * delay: {}ms", delay.as_millis());
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would fetch {} targets", targets.len());

    Ok(())
}

fn print_optional_path(label: &str, path: &Option<String>) {
    match path {
        Some(path) => println!("  {}: {}", label, path),
        None => println!("  {}: disabled", label),
    }
}

/// Handles the --stats mode: shows the latest stored run
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use topic_harvest::output::{load_statistics, print_statistics};
    use topic_harvest::storage::SqliteStorage;

    let database_path = config
        .output
        .database_path
        .as_deref()
        .context("No database-path configured in [output]")?;

    println!("Database: {}\n", database_path);

    // Open the database
    let storage = SqliteStorage::new(Path::new(database_path))
        .with_context(|| format!("Failed to open database {}", database_path))?;

    match load_statistics(&storage)? {
        Some(stats) => print_statistics(&stats),
        None => println!("No runs recorded yet"),
    }

    Ok(())
}

/// Handles the --schedule mode: runs a batch at each configured time
async fn handle_schedule(config: Config, config_hash: String) -> anyhow::Result<()> {
    let schedule = DailySchedule::from_config(&config.schedule, Local::now().naive_local())?;
    let poll_interval = config.schedule.poll_interval();
    let cancel = cancel_on_ctrl_c();

    tracing::info!(
        "Scheduling {} targets daily at {}",
        config.targets.len(),
        config.schedule.times.join(", ")
    );

    let batch_cancel = cancel.clone();
    let runs = run_schedule(schedule, poll_interval, cancel, || {
        let config = config.clone();
        let config_hash = config_hash.clone();
        let cancel = batch_cancel.clone();
        async move { run_batch(&config, &config_hash, cancel).await }
    })
    .await;

    tracing::info!("Completed {} scheduled runs", runs);
    Ok(())
}

/// Runs one batch and persists the report
///
/// An interrupted batch is still exported and stored.
async fn run_batch(
    config: &Config,
    config_hash: &str,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    use topic_harvest::storage::{record_report, SqliteStorage};

    tracing::info!("Starting batch of {} targets", config.targets.len());

    let report = match harvest(config, cancel).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Batch failed: {}", e);
            return Err(e.into());
        }
    };

    if report.incomplete {
        tracing::warn!(
            "Batch interrupted: {} of {} targets completed",
            report.outcomes.len(),
            report.total_targets
        );
    }

    write_reports(&report, &config.output).context("Failed to write exports")?;

    if let Some(database_path) = &config.output.database_path {
        let mut storage = SqliteStorage::new(Path::new(database_path))
            .with_context(|| format!("Failed to open database {}", database_path))?;
        record_report(&mut storage, config_hash, &report).context("Failed to store run")?;
    }

    print_summary(&summarize(&report));

    Ok(())
}
