//! Parallel sweep across seeds and levels, aggregating per-run metrics into
//! one report. Each run owns its session and cursor, so runs parallelize
//! cleanly with rayon.

use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cursors::create_cursor;
use crate::runner::{run_session, RunConfig, RunMetrics};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SweepConfig {
    pub strategy_id: String,
    pub cursor_id: String,
    pub levels: Vec<u32>,
    pub seeds: Vec<u32>,
    pub max_ticks: u32,
    pub tick_ms: u64,
    pub deadline_ms: u64,
    pub noise_sigma: f64,
    pub threads: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SweepReport {
    pub strategy_id: String,
    pub cursor_id: String,
    pub runs: Vec<RunMetrics>,
    pub mean_distance_px: f64,
    pub catch_rate: f64,
    pub total_fallback_ticks: u64,
}

pub fn run_sweep(config: &SweepConfig) -> Result<SweepReport> {
    if config.levels.is_empty() || config.seeds.is_empty() {
        return Err(anyhow!("sweep needs at least one level and one seed"));
    }

    let mut cases = Vec::with_capacity(config.levels.len() * config.seeds.len());
    for &level in &config.levels {
        for &seed in &config.seeds {
            let mut run = RunConfig::new(&config.strategy_id, &config.cursor_id, level, seed);
            run.max_ticks = config.max_ticks;
            run.tick_ms = config.tick_ms;
            run.deadline_ms = config.deadline_ms;
            run.noise_sigma = config.noise_sigma;
            cases.push(run);
        }
    }

    let run_one = |run: &RunConfig| -> Result<RunMetrics> {
        let mut cursor = create_cursor(&run.cursor_id)
            .ok_or_else(|| anyhow!("unknown cursor '{}'", run.cursor_id))?;
        Ok(run_session(run, cursor.as_mut())?.metrics)
    };

    let runs: Result<Vec<RunMetrics>> = if config.threads > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| cases.par_iter().map(run_one).collect())
    } else {
        cases.par_iter().map(run_one).collect()
    };
    let runs = runs?;

    let total = runs.len().max(1) as f64;
    let mean_distance_px = runs.iter().map(|r| r.mean_distance_px).sum::<f64>() / total;
    let catch_rate = runs.iter().filter(|r| r.caught).count() as f64 / total;
    let total_fallback_ticks = runs.iter().map(|r| r.fallback_ticks).sum();

    Ok(SweepReport {
        strategy_id: config.strategy_id.clone(),
        cursor_id: config.cursor_id.clone(),
        runs,
        mean_distance_px,
        catch_rate,
        total_fallback_ticks,
    })
}
