//! Drives one headless session: a cursor bot hunts the engine's dot at a
//! fixed tick cadence while every observation is recorded as a dataset row.

use anyhow::{anyhow, Result};
use dodge_core::constants::{ARENA_MAX, ARENA_MIN};
use dodge_core::{
    GameSession, LevelConfig, MotionParams, SessionMeta, SessionTelemetry, TickInput,
    VelocityStrategy,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cursors::CursorBot;
use crate::strategies::create_strategy;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    pub strategy_id: String,
    pub cursor_id: String,
    pub level: u32,
    pub seed: u32,
    pub max_ticks: u32,
    pub tick_ms: u64,
    pub deadline_ms: u64,
    pub noise_sigma: f64,
}

impl RunConfig {
    pub fn new(strategy_id: &str, cursor_id: &str, level: u32, seed: u32) -> Self {
        Self {
            strategy_id: strategy_id.to_string(),
            cursor_id: cursor_id.to_string(),
            level,
            seed,
            max_ticks: 1_800,
            tick_ms: 16,
            deadline_ms: 8,
            noise_sigma: 0.15,
        }
    }
}

/// One exported training-data row, with the sink's column names.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DatasetRow {
    #[serde(rename = "sessionUid")]
    pub session_uid: u32,
    pub timestamp: u64,
    #[serde(rename = "dotX")]
    pub dot_x: f64,
    #[serde(rename = "dotY")]
    pub dot_y: f64,
    #[serde(rename = "mouseX")]
    pub mouse_x: f64,
    #[serde(rename = "mouseY")]
    pub mouse_y: f64,
    #[serde(rename = "maxSpeed")]
    pub max_speed: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunMetrics {
    pub strategy_id: String,
    pub cursor_id: String,
    pub level: u32,
    pub max_speed: f64,
    pub seed: u32,
    pub ticks: u64,
    pub dropped_samples: u64,
    pub fallback_ticks: u64,
    pub mean_distance_px: f64,
    pub min_distance_px: f64,
    pub caught: bool,
}

#[derive(Debug)]
pub struct RunArtifact {
    pub metrics: RunMetrics,
    pub rows: Vec<DatasetRow>,
    pub telemetry: SessionTelemetry,
}

/// Distance below which the cursor counts as having caught the dot.
const CATCH_RADIUS_PX: f64 = 12.0;

pub fn run_session(config: &RunConfig, cursor: &mut dyn CursorBot) -> Result<RunArtifact> {
    if config.max_ticks == 0 {
        return Err(anyhow!("max_ticks must be > 0"));
    }
    let strategy: Box<dyn VelocityStrategy> =
        create_strategy(&config.strategy_id, config.deadline_ms)
            .ok_or_else(|| anyhow!("unknown strategy '{}'", config.strategy_id))?;

    let level_config = LevelConfig::for_level(config.level);
    let params = MotionParams {
        noise_sigma: config.noise_sigma,
        ..MotionParams::default()
    };
    let meta = SessionMeta {
        session_id: format!("run-{:08x}", config.seed),
        user_id: format!("cursor-{}", config.cursor_id),
        level: config.level,
    };
    let mut session = GameSession::new(
        meta,
        level_config,
        strategy,
        params,
        dodge_core::constants::DEFAULT_HISTORY_CAPACITY,
        config.seed,
    )?;

    cursor.reset(config.seed);
    session.start(0);

    let mut rows = Vec::with_capacity(config.max_ticks as usize);
    let mut distance_sum = 0.0;
    let mut min_distance = f64::MAX;
    let mut caught = false;

    let mut now_ms = 0u64;
    for _ in 0..config.max_ticks {
        now_ms += config.tick_ms;
        let dot_before = *session.state();
        let (mouse_x, mouse_y) = cursor.next_position(&dot_before, config.tick_ms as f64);
        let state = session.tick(TickInput {
            timestamp_ms: now_ms,
            mouse_x,
            mouse_y,
        });

        debug_assert!((ARENA_MIN..=ARENA_MAX).contains(&state.x));
        debug_assert!((ARENA_MIN..=ARENA_MAX).contains(&state.y));

        rows.push(DatasetRow {
            session_uid: config.seed,
            timestamp: now_ms,
            dot_x: state.x,
            dot_y: state.y,
            mouse_x,
            mouse_y,
            max_speed: level_config.max_speed,
        });

        let distance = (state.x - mouse_x).hypot(state.y - mouse_y);
        distance_sum += distance;
        min_distance = min_distance.min(distance);
        if distance <= CATCH_RADIUS_PX {
            debug!(seed = config.seed, tick = rows.len(), "cursor caught the dot");
            caught = true;
            break;
        }
    }

    let telemetry = session.end(now_ms);
    let counters = telemetry.counters;

    Ok(RunArtifact {
        metrics: RunMetrics {
            strategy_id: config.strategy_id.clone(),
            cursor_id: config.cursor_id.clone(),
            level: config.level,
            max_speed: level_config.max_speed,
            seed: config.seed,
            ticks: counters.ticks,
            dropped_samples: counters.dropped_samples,
            fallback_ticks: counters.fallback_ticks,
            mean_distance_px: distance_sum / rows.len().max(1) as f64,
            min_distance_px: if min_distance == f64::MAX { 0.0 } else { min_distance },
            caught,
        },
        rows,
        telemetry,
    })
}
