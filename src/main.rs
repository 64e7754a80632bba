//! Sensorstream CLI
//!
//! Runs the simulated sensor stream and prints analytics and alerts.

use anyhow::{bail, Context};
use chrono::{Duration as ChronoDuration, Utc};
use clap::{Parser, Subcommand};
use sensorstream::{
    config::Config,
    core::{SnapshotBuilder, StreamProcessor, TimeRange},
    driver::{StreamDriver, TickOutcome},
    VERSION,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sensorstream")]
#[command(version = VERSION)]
#[command(about = "Simulated environmental sensor stream with rolling analytics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start streaming until interrupted
    Start {
        #[command(flatten)]
        stream: StreamArgs,

        /// Stop after this many ticks
        #[arg(long)]
        ticks: Option<u64>,
    },

    /// Run a fixed number of ticks on a simulated clock without waiting
    Simulate {
        #[command(flatten)]
        stream: StreamArgs,

        /// Number of ticks to simulate
        #[arg(long, default_value = "60")]
        ticks: u64,
    },

    /// Pause a running stream
    Pause,

    /// Resume a paused stream
    Resume,

    /// Show current stream status
    Status,

    /// Show configuration
    Config,
}

#[derive(clap::Args)]
struct StreamArgs {
    /// Window retention range (1m, 5m, 10m or 30m)
    #[arg(long)]
    range: Option<TimeRange>,

    /// Readings generated per tick
    #[arg(long)]
    batch_size: Option<usize>,

    /// Seed for reproducible readings
    #[arg(long)]
    seed: Option<u64>,

    /// IANA timezone used for alert times (defaults to local time)
    #[arg(long)]
    timezone: Option<String>,

    /// Print one JSON snapshot per tick instead of text
    #[arg(long)]
    json: bool,
}

impl StreamArgs {
    /// Overlay command-line values on the stored configuration.
    fn apply(&self, mut config: Config) -> Config {
        if let Some(range) = self.range {
            config.time_range = range;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.timezone.is_some() {
            config.timezone = self.timezone.clone();
        }
        config
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Start { stream, ticks } => cmd_start(&stream, ticks),
        Commands::Simulate { stream, ticks } => cmd_simulate(&stream, ticks),
        Commands::Pause => cmd_set_paused(true),
        Commands::Resume => cmd_set_paused(false),
        Commands::Status => cmd_status(),
        Commands::Config => cmd_config(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        tracing::warn!("Could not load configuration, using defaults: {e}");
        Config::default()
    })
}

fn build_driver(config: &Config) -> anyhow::Result<StreamDriver> {
    if config.batch_size == 0 {
        bail!("batch size must be at least 1");
    }

    let timezone = config.alert_timezone()?;
    let processor = StreamProcessor::new().with_timezone(timezone);
    Ok(StreamDriver::from_config(config, processor))
}

fn cmd_start(args: &StreamArgs, max_ticks: Option<u64>) -> anyhow::Result<()> {
    let config = args.apply(load_config());
    let mut driver = build_driver(&config)?;

    let session_id = format!("SESS-{}", Utc::now().timestamp_millis());
    let snapshot_builder = SnapshotBuilder::new().with_session_id(session_id);

    if !args.json {
        println!("Sensorstream v{VERSION}");
        println!();
        println!("  Time range: {}", config.time_range);
        println!("  Batch size: {}", config.batch_size);
        println!("  Tick interval: {}s", config.tick_interval.as_secs());
        println!("  Instance ID: {}", snapshot_builder.instance_id());
        println!();
        println!("Press Ctrl+C to stop");
        println!();
    }

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Error setting Ctrl+C handler")?;

    // `sensorstream pause/resume` toggles the paused flag in the config file;
    // poll it so a running stream follows along.
    let mut paused = config.paused;
    if paused {
        println!("Streaming is currently paused.");
        println!("Run `sensorstream resume` to start streaming.");
    } else {
        driver.start();
    }

    let mut last_config_check = Instant::now();
    let mut last_tick: Option<Instant> = None;
    let mut ticks = 0u64;

    while running.load(Ordering::SeqCst) {
        if last_config_check.elapsed() >= Duration::from_secs(1) {
            if let Ok(cfg) = Config::load() {
                if cfg.paused != paused {
                    paused = cfg.paused;
                    if paused {
                        println!("Pausing stream...");
                        driver.stop();
                    } else {
                        println!("Resuming stream...");
                        driver.start();
                    }
                }
            }
            last_config_check = Instant::now();
        }

        let due = last_tick.map_or(true, |t| t.elapsed() >= config.tick_interval);
        if !paused && due {
            if let Some(outcome) = driver.tick() {
                report(&outcome, &driver, &snapshot_builder, config.time_range, args.json);
                ticks += 1;
            }
            last_tick = Some(Instant::now());

            if max_ticks.is_some_and(|max| ticks >= max) {
                break;
            }
        }

        thread::sleep(Duration::from_millis(50));
    }

    driver.stop();
    if !args.json {
        println!();
        println!("{}", driver.stats().summary());
    }

    Ok(())
}

fn cmd_simulate(args: &StreamArgs, ticks: u64) -> anyhow::Result<()> {
    let config = args.apply(load_config());
    let mut driver = build_driver(&config)?;
    let snapshot_builder = SnapshotBuilder::new();

    let step = ChronoDuration::from_std(config.tick_interval)
        .context("Tick interval out of range")?;
    let mut now = Utc::now();
    let mut last = None;

    driver.start();
    for _ in 0..ticks {
        let outcome = driver.tick_at(now);
        if args.json {
            if let Some(ref outcome) = outcome {
                report(outcome, &driver, &snapshot_builder, config.time_range, true);
            }
        }
        last = outcome;
        now += step;
    }
    driver.stop();

    if !args.json {
        match last {
            Some(outcome) => {
                report(&outcome, &driver, &snapshot_builder, config.time_range, false)
            }
            None => println!("No ticks simulated."),
        }
        println!();
        println!("{}", driver.stats().summary());
    }

    Ok(())
}

fn report(
    outcome: &TickOutcome,
    driver: &StreamDriver,
    snapshot_builder: &SnapshotBuilder,
    time_range: TimeRange,
    json: bool,
) {
    if json {
        println!(
            "{}",
            snapshot_builder.build_json(driver.window().readings(), time_range, &outcome.result)
        );
        return;
    }

    let analytics = &outcome.result.analytics;
    let time = outcome
        .latest
        .as_ref()
        .map(|r| driver.processor().timezone().time_of_day(r.timestamp))
        .unwrap_or_else(|| "-".to_string());

    println!(
        "[{}] {} points | avg {:.1}°C {:.1}% {:.0} hPa | {} anomalies",
        time,
        analytics.data_point_count,
        analytics.avg_temperature,
        analytics.avg_humidity,
        analytics.avg_pressure,
        analytics.anomaly_count
    );
    for alert in &outcome.result.alerts {
        println!("  ! {alert}");
    }
}

fn cmd_set_paused(paused: bool) -> anyhow::Result<()> {
    let mut config = load_config();
    config.paused = paused;
    config.save().context("Error saving config")?;

    if paused {
        println!("Streaming paused. Use 'sensorstream resume' to continue.");
    } else {
        println!("Streaming resumed.");
    }
    Ok(())
}

fn cmd_status() -> anyhow::Result<()> {
    let config = load_config();

    println!("Sensorstream Status");
    println!("===================");
    println!();
    println!("  Streaming: {}", if config.paused { "paused" } else { "enabled" });
    println!("  Time range: {}", config.time_range);
    println!("  Batch size: {}", config.batch_size);
    println!("  Window cap: {} readings", config.max_window_len);
    println!("  Alert lookback: {} readings", config.alert_lookback);
    println!(
        "  Alert timezone: {}",
        config.timezone.as_deref().unwrap_or("local")
    );

    Ok(())
}

fn cmd_config() -> anyhow::Result<()> {
    let config = load_config();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).context("Error serializing config")?
    );

    Ok(())
}
