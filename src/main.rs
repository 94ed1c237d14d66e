//! CLI entry point for the weather series tool.
//!
//! Provides subcommands for whole-file and date-range statistics, dumping the
//! dataset, and running the simulated daily update against the loaded series.

use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use weather_series::config::SimulationConfig;
use weather_series::daemon::{DailyUpdate, StdRandom, UpdateDaemon, UpdateSink};
use weather_series::loader::{LoadOptions, load_csv};
use weather_series::output::{
    render_overall, render_range, render_record, render_update, update_json,
};

#[derive(Parser)]
#[command(name = "weather_series")]
#[command(about = "Daily weather statistics with a simulated next-day feed", long_about = None)]
struct Cli {
    /// Weather CSV to load (defaults to $WEATHER_CSV or weather_dataset.csv)
    #[arg(short, long, global = true)]
    input: Option<String>,

    /// Accept rows that repeat the previous row's date
    #[arg(long, global = true, default_value_t = false)]
    allow_duplicate_dates: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print statistics for the entire file
    Stats,
    /// Print statistics for an inclusive date range
    Range {
        /// Start date (YYYY-MM-DD)
        start: String,
        /// End date (YYYY-MM-DD)
        end: String,
    },
    /// Print every record
    Dump {
        /// Order by ascending maximum temperature instead of by date
        #[arg(long, default_value_t = false)]
        sorted: bool,
    },
    /// Report statistics, then append a simulated day every tick until stopped
    Simulate {
        /// Optional range to report before the simulation starts
        #[arg(long, requires = "end")]
        start: Option<String>,
        #[arg(long, requires = "start")]
        end: Option<String>,

        /// JSON file with simulation settings
        #[arg(short, long)]
        config: Option<String>,

        /// Milliseconds between updates (overrides the config file)
        #[arg(long)]
        tick_ms: Option<u64>,

        /// Stop after this many seconds (0 = wait for Enter or Ctrl+C)
        #[arg(short, long, default_value_t = 0)]
        duration_secs: u64,

        /// Seed for reproducible simulations
        #[arg(long)]
        seed: Option<u64>,

        /// Print updates as JSON lines
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

/// Prints each update to stdout.
struct ConsoleSink {
    json: bool,
}

#[async_trait]
impl UpdateSink for ConsoleSink {
    async fn publish(&self, update: &DailyUpdate) -> Result<()> {
        if self.json {
            println!("{}", update_json(update)?);
        } else {
            println!("\n{}", render_update(update));
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/weather_series.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("weather_series.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter("RUST_LOG", "info"));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(env_filter("RUST_LOG_JSON", "debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let input = cli
        .input
        .or_else(|| std::env::var("WEATHER_CSV").ok())
        .unwrap_or_else(|| "weather_dataset.csv".to_string());
    let options = LoadOptions {
        allow_duplicate_dates: cli.allow_duplicate_dates,
    };
    let store = Arc::new(load_csv(&input, options)?);

    match cli.command {
        Commands::Stats => {
            println!("\n{}", render_overall(&input, &store.summary()));
        }
        Commands::Range { start, end } => {
            let summary = store.range_summary(&start, &end)?;
            println!("\n{}", render_range(&start, &end, &summary));
        }
        Commands::Dump { sorted } => {
            let records = if sorted {
                store.sorted_by_max_temp()
            } else {
                store.snapshot()
            };
            for record in &records {
                println!("\n{}", render_record(record));
            }
        }
        Commands::Simulate {
            start,
            end,
            config,
            tick_ms,
            duration_secs,
            seed,
            json,
        } => {
            println!("\n{}", render_overall(&input, &store.summary()));
            if let (Some(start), Some(end)) = (start, end) {
                let summary = store.range_summary(&start, &end)?;
                println!("\n{}", render_range(&start, &end, &summary));
            }

            let mut config = match config {
                Some(path) => SimulationConfig::load(&path)?,
                None => SimulationConfig::default(),
            };
            if let Some(tick_ms) = tick_ms {
                config.tick_ms = tick_ms;
            }
            let random = seed.map_or_else(StdRandom::new, StdRandom::seeded);

            let mut daemon = UpdateDaemon::new(Arc::clone(&store), config, random, ConsoleSink { json });
            daemon.start()?;

            if duration_secs > 0 {
                info!(duration_secs, "Simulating for a fixed duration");
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_secs(duration_secs)) => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            } else {
                println!("Press Enter to stop the weather simulation...");
                let mut line = String::new();
                let mut stdin = BufReader::new(tokio::io::stdin());
                tokio::select! {
                    _ = stdin.read_line(&mut line) => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }

            daemon.stop().await;
            info!(records = store.len(), "Simulation finished");
        }
    }

    Ok(())
}

fn env_filter(var: &str, default: &str) -> EnvFilter {
    EnvFilter::try_from_env(var).unwrap_or_else(|_| EnvFilter::new(default))
}
