//! Velocity decision strategies.
//!
//! A strategy maps the observation window plus the level config to a raw
//! velocity candidate. Strategies are swappable mid-session behind the trait;
//! the governor downstream is what makes their output safe.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::LevelConfig;
use crate::error::InferenceError;
use crate::history::{History, Sample};
use crate::infer::{encode_history, InferenceBackend};

/// Raw strategy output before governance. May be non-finite or out of range;
/// downstream code must treat that as expected input.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VelocityCommand {
    pub vx: f64,
    pub vy: f64,
}

impl VelocityCommand {
    pub const ZERO: Self = Self { vx: 0.0, vy: 0.0 };

    pub fn magnitude(&self) -> f64 {
        self.vx.hypot(self.vy)
    }
}

pub trait VelocityStrategy {
    fn id(&self) -> &'static str;

    fn decide(&mut self, history: &History, config: &LevelConfig) -> VelocityCommand;

    /// Ticks on which this strategy had to substitute a fallback decision.
    fn fallback_ticks(&self) -> u64 {
        0
    }
}

/// Closed-form escape vector away from the most recent cursor position,
/// scaled to exactly `max_speed`.
pub fn escape_command(latest: &Sample, config: &LevelConfig) -> VelocityCommand {
    let dx = latest.dot_x - latest.mouse_x;
    let dy = latest.dot_y - latest.mouse_y;
    // Guards division by zero when the cursor sits exactly on the dot.
    let dist = dx.hypot(dy).max(1.0);
    VelocityCommand {
        vx: dx / dist * config.max_speed,
        vy: dy / dist * config.max_speed,
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicStrategy;

impl HeuristicStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl VelocityStrategy for HeuristicStrategy {
    fn id(&self) -> &'static str {
        "heuristic"
    }

    fn decide(&mut self, history: &History, config: &LevelConfig) -> VelocityCommand {
        match history.latest() {
            Some(latest) => escape_command(latest, config),
            None => VelocityCommand::ZERO,
        }
    }
}

/// Delegates the decision to an inference backend, falling back to the
/// heuristic's answer for any tick on which the backend fails. The loop never
/// stalls or surfaces a model failure; it just steers heuristically until the
/// backend recovers.
pub struct ModelStrategy {
    backend: Box<dyn InferenceBackend>,
    fallback: HeuristicStrategy,
    fallback_ticks: u64,
}

impl ModelStrategy {
    pub fn new(backend: Box<dyn InferenceBackend>) -> Self {
        Self {
            backend,
            fallback: HeuristicStrategy::new(),
            fallback_ticks: 0,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }
}

impl VelocityStrategy for ModelStrategy {
    fn id(&self) -> &'static str {
        "model"
    }

    fn decide(&mut self, history: &History, config: &LevelConfig) -> VelocityCommand {
        let rows = encode_history(history);
        let decision = self
            .backend
            .infer(&rows, config.max_speed as f32)
            .and_then(|(vx, vy)| {
                // Malformed output is a backend failure like any other; the
                // governor would only zero it, which is a freeze, not an escape.
                if vx.is_finite() && vy.is_finite() {
                    Ok((vx, vy))
                } else {
                    Err(InferenceError::NonFiniteOutput)
                }
            });
        match decision {
            Ok((vx, vy)) => VelocityCommand {
                vx: f64::from(vx),
                vy: f64::from(vy),
            },
            Err(err) => {
                self.fallback_ticks += 1;
                warn!(backend = self.backend.name(), %err, "model decision failed, using heuristic");
                self.fallback.decide(history, config)
            }
        }
    }

    fn fallback_ticks(&self) -> u64 {
        self.fallback_ticks
    }
}
