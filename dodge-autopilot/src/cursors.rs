//! Synthetic cursor bots that hunt the dot.
//!
//! Each bot stands in for a human player so sessions can be driven headless
//! and the engine's evasion behavior exercised and recorded.

use dodge_core::constants::{ARENA_MAX, ARENA_MIN};
use dodge_core::motion::DotState;
use dodge_core::rng::SeededRng;

pub trait CursorBot {
    fn id(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn reset(&mut self, seed: u32);
    /// Next cursor position given the dot it is hunting and elapsed time.
    fn next_position(&mut self, dot: &DotState, dt_ms: f64) -> (f64, f64);
}

pub fn cursor_ids() -> Vec<&'static str> {
    vec!["chaser", "interceptor", "wanderer"]
}

pub fn describe_cursors() -> Vec<(&'static str, &'static str)> {
    vec![
        ("chaser", "Pure pursuit: heads straight at the dot at a capped speed."),
        ("interceptor", "Leads the dot by its current velocity before pursuing."),
        ("wanderer", "Seeded random walk; barely hunts, good for baseline data."),
    ]
}

pub fn create_cursor(id: &str) -> Option<Box<dyn CursorBot>> {
    match id {
        "chaser" => Some(Box::new(ChaserBot::new(420.0))),
        "interceptor" => Some(Box::new(InterceptorBot::new(380.0, 0.35))),
        "wanderer" => Some(Box::new(WandererBot::new(260.0))),
        _ => None,
    }
}

fn clamp_arena(x: f64, y: f64) -> (f64, f64) {
    (x.clamp(ARENA_MIN, ARENA_MAX), y.clamp(ARENA_MIN, ARENA_MAX))
}

fn advance_toward(from: (f64, f64), to: (f64, f64), max_step: f64) -> (f64, f64) {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    let dist = dx.hypot(dy);
    if dist <= max_step || dist == 0.0 {
        to
    } else {
        (from.0 + dx / dist * max_step, from.1 + dy / dist * max_step)
    }
}

pub struct ChaserBot {
    speed_px_per_sec: f64,
    position: (f64, f64),
}

impl ChaserBot {
    pub fn new(speed_px_per_sec: f64) -> Self {
        Self {
            speed_px_per_sec,
            position: (ARENA_MIN, ARENA_MIN),
        }
    }
}

impl CursorBot for ChaserBot {
    fn id(&self) -> &'static str {
        "chaser"
    }

    fn description(&self) -> &'static str {
        "Pure pursuit at a capped cursor speed."
    }

    fn reset(&mut self, _seed: u32) {
        self.position = (ARENA_MIN, ARENA_MIN);
    }

    fn next_position(&mut self, dot: &DotState, dt_ms: f64) -> (f64, f64) {
        let step = self.speed_px_per_sec * dt_ms / 1_000.0;
        let next = advance_toward(self.position, (dot.x, dot.y), step);
        self.position = clamp_arena(next.0, next.1);
        self.position
    }
}

pub struct InterceptorBot {
    speed_px_per_sec: f64,
    /// Seconds of dot velocity to lead by.
    lead_secs: f64,
    position: (f64, f64),
}

impl InterceptorBot {
    pub fn new(speed_px_per_sec: f64, lead_secs: f64) -> Self {
        Self {
            speed_px_per_sec,
            lead_secs,
            position: (ARENA_MAX, ARENA_MIN),
        }
    }
}

impl CursorBot for InterceptorBot {
    fn id(&self) -> &'static str {
        "interceptor"
    }

    fn description(&self) -> &'static str {
        "Leads the dot by its velocity before pursuing."
    }

    fn reset(&mut self, _seed: u32) {
        self.position = (ARENA_MAX, ARENA_MIN);
    }

    fn next_position(&mut self, dot: &DotState, dt_ms: f64) -> (f64, f64) {
        let aim = clamp_arena(
            dot.x + dot.vx * self.lead_secs,
            dot.y + dot.vy * self.lead_secs,
        );
        let step = self.speed_px_per_sec * dt_ms / 1_000.0;
        let next = advance_toward(self.position, aim, step);
        self.position = clamp_arena(next.0, next.1);
        self.position
    }
}

pub struct WandererBot {
    speed_px_per_sec: f64,
    position: (f64, f64),
    heading: (f64, f64),
    rng: SeededRng,
}

impl WandererBot {
    pub fn new(speed_px_per_sec: f64) -> Self {
        Self {
            speed_px_per_sec,
            position: ((ARENA_MIN + ARENA_MAX) / 2.0, ARENA_MIN),
            heading: (1.0, 0.0),
            rng: SeededRng::new(1),
        }
    }
}

impl CursorBot for WandererBot {
    fn id(&self) -> &'static str {
        "wanderer"
    }

    fn description(&self) -> &'static str {
        "Seeded random walk across the arena."
    }

    fn reset(&mut self, seed: u32) {
        self.position = ((ARENA_MIN + ARENA_MAX) / 2.0, ARENA_MIN);
        self.heading = (1.0, 0.0);
        self.rng = SeededRng::new(seed);
    }

    fn next_position(&mut self, _dot: &DotState, dt_ms: f64) -> (f64, f64) {
        // Small heading perturbation per tick keeps the walk smooth.
        let turn = self.rng.next_signed() * 0.6;
        let (hx, hy) = self.heading;
        let (sin, cos) = turn.sin_cos();
        self.heading = (hx * cos - hy * sin, hx * sin + hy * cos);

        let step = self.speed_px_per_sec * dt_ms / 1_000.0;
        let raw = (
            self.position.0 + self.heading.0 * step,
            self.position.1 + self.heading.1 * step,
        );
        let clamped = clamp_arena(raw.0, raw.1);
        // Bounce the heading off the walls instead of sticking to them.
        if clamped.0 != raw.0 {
            self.heading.0 = -self.heading.0;
        }
        if clamped.1 != raw.1 {
            self.heading.1 = -self.heading.1;
        }
        self.position = clamped;
        self.position
    }
}
