//! The control loop: one session of the evasion game.
//!
//! Per tick, in fixed order: record the observation, let the active strategy
//! decide, govern the command, integrate motion, expose the new state. All
//! per-tick failures are absorbed; only an invalid config at construction
//! propagates to the caller.

use core::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::LevelConfig;
use crate::constants::{ARENA_MAX, ARENA_MIN};
use crate::error::ConfigError;
use crate::govern::govern;
use crate::history::{History, Sample};
use crate::motion::{DotState, MotionIntegrator, MotionParams};
use crate::strategy::VelocityStrategy;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Running,
    Paused,
    Ended,
}

/// Identity of a session, carried into the telemetry payload unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionMeta {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub level: u32,
}

/// Cursor input for one tick. The session clamps coordinates into the arena
/// before recording them.
#[derive(Clone, Copy, Debug)]
pub struct TickInput {
    pub timestamp_ms: u64,
    pub mouse_x: f64,
    pub mouse_y: f64,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct SessionCounters {
    pub ticks: u64,
    pub dropped_samples: u64,
    pub fallback_ticks: u64,
}

/// What the host hands to the telemetry sink when a session ends: the
/// ordered observation window plus session metadata.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionTelemetry {
    #[serde(flatten)]
    pub meta: SessionMeta,
    #[serde(rename = "maxSpeed")]
    pub max_speed: f64,
    #[serde(rename = "startedAtMs")]
    pub started_at_ms: u64,
    #[serde(rename = "endedAtMs")]
    pub ended_at_ms: u64,
    pub counters: SessionCounters,
    pub samples: Vec<Sample>,
}

pub struct GameSession {
    meta: SessionMeta,
    config: LevelConfig,
    history: History,
    state: DotState,
    integrator: MotionIntegrator,
    strategy: Box<dyn VelocityStrategy>,
    phase: SessionPhase,
    last_tick_ms: Option<u64>,
    started_at_ms: u64,
    ticks: u64,
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("meta", &self.meta)
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("strategy", &self.strategy.id())
            .field("state", &self.state)
            .field("ticks", &self.ticks)
            .finish_non_exhaustive()
    }
}

impl GameSession {
    /// Refuses to build a session around a config the governor cannot clamp
    /// against; this is the only fatal error in the engine.
    pub fn new(
        meta: SessionMeta,
        config: LevelConfig,
        strategy: Box<dyn VelocityStrategy>,
        params: MotionParams,
        history_capacity: usize,
        seed: u32,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if history_capacity == 0 {
            return Err(ConfigError::ZeroHistoryCapacity);
        }
        Ok(Self {
            meta,
            config,
            history: History::new(history_capacity),
            state: DotState::centered(),
            integrator: MotionIntegrator::new(params, seed),
            strategy,
            phase: SessionPhase::Idle,
            last_tick_ms: None,
            started_at_ms: 0,
            ticks: 0,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn state(&self) -> &DotState {
        &self.state
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn strategy_id(&self) -> &'static str {
        self.strategy.id()
    }

    pub fn counters(&self) -> SessionCounters {
        SessionCounters {
            ticks: self.ticks,
            dropped_samples: self.history.dropped(),
            fallback_ticks: self.strategy.fallback_ticks(),
        }
    }

    pub fn start(&mut self, now_ms: u64) {
        if self.phase != SessionPhase::Idle {
            warn!(phase = ?self.phase, "start ignored outside Idle");
            return;
        }
        self.started_at_ms = now_ms;
        self.phase = SessionPhase::Running;
    }

    pub fn pause(&mut self) {
        if self.phase == SessionPhase::Running {
            self.phase = SessionPhase::Paused;
        }
    }

    /// Resuming forgets the previous tick time so the pause gap is not
    /// integrated as one giant dt.
    pub fn resume(&mut self) {
        if self.phase == SessionPhase::Paused {
            self.last_tick_ms = None;
            self.phase = SessionPhase::Running;
        }
    }

    /// Swaps the active strategy between ticks. History and dot state are
    /// untouched; the next decision simply comes from the new strategy.
    pub fn set_strategy(&mut self, strategy: Box<dyn VelocityStrategy>) {
        self.strategy = strategy;
    }

    /// One step of the control loop. Outside `Running` the input is ignored
    /// and the current state returned unchanged.
    pub fn tick(&mut self, input: TickInput) -> DotState {
        if self.phase != SessionPhase::Running {
            warn!(phase = ?self.phase, "tick ignored outside Running");
            return self.state;
        }

        // A stale timestamp keeps the previous clock anchor: the buffer drops
        // the sample below, and the next well-ordered tick must not integrate
        // an inflated dt.
        let dt_ms = match self.last_tick_ms {
            Some(last) if input.timestamp_ms < last => 0.0,
            Some(last) => {
                self.last_tick_ms = Some(input.timestamp_ms);
                (input.timestamp_ms - last) as f64
            }
            None => {
                self.last_tick_ms = Some(input.timestamp_ms);
                0.0
            }
        };

        // Producer duty: observations enter the buffer already inside the arena.
        self.history.append(Sample {
            timestamp_ms: input.timestamp_ms,
            dot_x: self.state.x,
            dot_y: self.state.y,
            mouse_x: input.mouse_x.clamp(ARENA_MIN, ARENA_MAX),
            mouse_y: input.mouse_y.clamp(ARENA_MIN, ARENA_MAX),
        });

        let raw = self.strategy.decide(&self.history, &self.config);
        let governed = govern(raw, &self.config);
        self.integrator
            .step(&mut self.state, governed, dt_ms, &self.config);
        self.ticks += 1;

        self.state
    }

    /// Ends the session and emits the telemetry payload. Further ticks are
    /// ignored; any in-flight model call is abandoned along with the strategy
    /// when the session is dropped.
    pub fn end(&mut self, now_ms: u64) -> SessionTelemetry {
        self.phase = SessionPhase::Ended;
        SessionTelemetry {
            meta: self.meta.clone(),
            max_speed: self.config.max_speed,
            started_at_ms: self.started_at_ms,
            ended_at_ms: now_ms,
            counters: self.counters(),
            samples: self.history.snapshot(),
        }
    }
}
