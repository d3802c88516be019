//! Motion integrator: the only component that mutates `DotState`.
//!
//! Velocity eases toward the governed target instead of snapping, positions
//! integrate over measured elapsed time, and the arena boundary answers with
//! an inelastic bounce. A slowly varying noise term can be blended in to keep
//! trajectories from looking mechanical; it is re-clamped against the speed
//! ceiling so it can never break governance.

use serde::{Deserialize, Serialize};

use crate::config::LevelConfig;
use crate::constants::{ARENA_MAX, ARENA_MIN};
use crate::rng::SeededRng;
use crate::strategy::VelocityCommand;

/// Authoritative simulation state. Positions in arena pixels, velocities in
/// pixels per second.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DotState {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

impl DotState {
    /// At rest in the arena centre, the spawn point for a new session.
    pub fn centered() -> Self {
        Self {
            x: (ARENA_MIN + ARENA_MAX) / 2.0,
            y: (ARENA_MIN + ARENA_MAX) / 2.0,
            vx: 0.0,
            vy: 0.0,
        }
    }
}

/// Integration tunables. None of these are load-bearing invariants; the
/// defaults are validated against the end-to-end scenarios in the tests.
#[derive(Clone, Copy, Debug)]
pub struct MotionParams {
    /// Exponential smoothing rate toward the target velocity, 1/s.
    pub blend_rate: f64,
    /// Velocity retained (and reversed) by a wall bounce.
    pub bounce_damping: f64,
    /// Noise amplitude as a fraction of the level's speed ceiling. Zero
    /// disables the noise process entirely.
    pub noise_sigma: f64,
    /// Correlation time of the noise process, seconds.
    pub noise_tau: f64,
    /// Upper bound on a single integration step, ms. A stalled tick source
    /// resumes without the dot tunneling across the arena.
    pub max_dt_ms: f64,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            blend_rate: 8.0,
            bounce_damping: 0.7,
            noise_sigma: 0.0,
            noise_tau: 0.4,
            max_dt_ms: 100.0,
        }
    }
}

pub struct MotionIntegrator {
    params: MotionParams,
    rng: SeededRng,
    noise_x: f64,
    noise_y: f64,
}

impl MotionIntegrator {
    pub fn new(params: MotionParams, seed: u32) -> Self {
        Self {
            params,
            rng: SeededRng::new(seed),
            noise_x: 0.0,
            noise_y: 0.0,
        }
    }

    pub fn params(&self) -> &MotionParams {
        &self.params
    }

    /// Advances the dot by one tick. `target` must already be governed; the
    /// only re-check here covers the noise contribution.
    pub fn step(
        &mut self,
        state: &mut DotState,
        target: VelocityCommand,
        dt_ms: f64,
        config: &LevelConfig,
    ) {
        let dt = dt_ms.clamp(0.0, self.params.max_dt_ms) / 1_000.0;
        if dt == 0.0 {
            return;
        }

        // Ease current velocity toward the governed target, dt-corrected so
        // variable tick cadence does not change the feel.
        let alpha = 1.0 - (-self.params.blend_rate * dt).exp();
        state.vx += (target.vx - state.vx) * alpha;
        state.vy += (target.vy - state.vy) * alpha;

        if self.params.noise_sigma > 0.0 {
            self.advance_noise(dt, config);
            state.vx += self.noise_x;
            state.vy += self.noise_y;

            // Noise must not push past the speed contract.
            let limit = config.max_speed_px_per_sec();
            let speed = state.vx.hypot(state.vy);
            if speed > limit {
                let scale = limit / speed;
                state.vx *= scale;
                state.vy *= scale;
            }
        }

        state.x += state.vx * dt;
        state.y += state.vy * dt;

        let damping = self.params.bounce_damping;
        if state.x < ARENA_MIN {
            state.x = ARENA_MIN;
            state.vx = -state.vx * damping;
        } else if state.x > ARENA_MAX {
            state.x = ARENA_MAX;
            state.vx = -state.vx * damping;
        }
        if state.y < ARENA_MIN {
            state.y = ARENA_MIN;
            state.vy = -state.vy * damping;
        } else if state.y > ARENA_MAX {
            state.y = ARENA_MAX;
            state.vy = -state.vy * damping;
        }
    }

    /// First-order low-pass over uniform perturbations: the noise drifts
    /// rather than flickering per tick.
    fn advance_noise(&mut self, dt: f64, config: &LevelConfig) {
        let retain = (-dt / self.params.noise_tau).exp();
        let amplitude = self.params.noise_sigma * config.max_speed_px_per_sec();
        self.noise_x = self.noise_x * retain + self.rng.next_signed() * amplitude * (1.0 - retain);
        self.noise_y = self.noise_y * retain + self.rng.next_signed() * amplitude * (1.0 - retain);
    }
}
