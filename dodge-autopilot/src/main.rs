use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dodge_autopilot::cursors::{create_cursor, describe_cursors};
use dodge_autopilot::dataset::{append_rows, write_telemetry};
use dodge_autopilot::runner::{run_session, RunConfig};
use dodge_autopilot::strategies::describe_strategies;
use dodge_autopilot::sweep::{run_sweep, SweepConfig};

#[derive(Parser)]
#[command(name = "dodge-autopilot", about = "Headless driver for the dot evasion engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one session and optionally write the dataset rows and telemetry.
    Run {
        #[arg(long, default_value = "heuristic")]
        strategy: String,
        #[arg(long, default_value = "chaser")]
        cursor: String,
        #[arg(long, default_value_t = 1)]
        level: u32,
        #[arg(long, default_value_t = 0xDEAD_BEEF)]
        seed: u32,
        #[arg(long, default_value_t = 1_800)]
        max_ticks: u32,
        #[arg(long, default_value_t = 16)]
        tick_ms: u64,
        #[arg(long, default_value_t = 8)]
        deadline_ms: u64,
        #[arg(long, default_value_t = 0.15)]
        noise_sigma: f64,
        /// JSONL file to append dataset rows to.
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// JSON file to write the session telemetry to.
        #[arg(long)]
        telemetry: Option<PathBuf>,
    },
    /// Run seeds x levels in parallel and print an aggregate report.
    Sweep {
        #[arg(long, default_value = "model")]
        strategy: String,
        #[arg(long, default_value = "chaser")]
        cursor: String,
        #[arg(long, value_delimiter = ',', default_value = "1,2,3")]
        levels: Vec<u32>,
        #[arg(long, default_value_t = 16)]
        seeds: u32,
        #[arg(long, default_value_t = 1_800)]
        max_ticks: u32,
        #[arg(long, default_value_t = 16)]
        tick_ms: u64,
        #[arg(long, default_value_t = 8)]
        deadline_ms: u64,
        #[arg(long, default_value_t = 0.15)]
        noise_sigma: f64,
        /// 0 uses rayon's default thread count.
        #[arg(long, default_value_t = 0)]
        threads: usize,
    },
    /// List the available strategies and cursor bots.
    Roster,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match Cli::parse().command {
        Command::Run {
            strategy,
            cursor,
            level,
            seed,
            max_ticks,
            tick_ms,
            deadline_ms,
            noise_sigma,
            dataset,
            telemetry,
        } => {
            let mut config = RunConfig::new(&strategy, &cursor, level, seed);
            config.max_ticks = max_ticks;
            config.tick_ms = tick_ms;
            config.deadline_ms = deadline_ms;
            config.noise_sigma = noise_sigma;

            let mut bot =
                create_cursor(&cursor).ok_or_else(|| anyhow!("unknown cursor '{cursor}'"))?;
            let artifact = run_session(&config, bot.as_mut())?;

            if let Some(path) = dataset {
                append_rows(&path, &artifact.rows)?;
            }
            if let Some(path) = telemetry {
                write_telemetry(&path, &artifact.telemetry)?;
            }
            println!("{}", serde_json::to_string_pretty(&artifact.metrics)?);
        }
        Command::Sweep {
            strategy,
            cursor,
            levels,
            seeds,
            max_ticks,
            tick_ms,
            deadline_ms,
            noise_sigma,
            threads,
        } => {
            let config = SweepConfig {
                strategy_id: strategy,
                cursor_id: cursor,
                levels,
                seeds: (1..=seeds).collect(),
                max_ticks,
                tick_ms,
                deadline_ms,
                noise_sigma,
                threads,
            };
            let report = run_sweep(&config)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Roster => {
            println!("strategies:");
            for (id, description) in describe_strategies() {
                println!("  {id:<16} {description}");
            }
            println!("cursors:");
            for (id, description) in describe_cursors() {
                println!("  {id:<16} {description}");
            }
        }
    }

    Ok(())
}
