//! Dot Control Engine: the real-time decision loop behind the evasion game.
//!
//! A rolling history of (time, dot, cursor) samples feeds a pluggable
//! velocity strategy; the safety governor bounds whatever the strategy says;
//! the motion integrator turns the governed command into smooth, contained
//! movement inside the fixed 800x800 arena.

pub mod config;
pub mod constants;
pub mod error;
pub mod govern;
pub mod history;
pub mod infer;
pub mod motion;
pub mod rng;
pub mod session;
pub mod strategy;

pub use config::LevelConfig;
pub use error::{ConfigError, InferenceError};
pub use govern::govern;
pub use history::{History, Sample};
pub use infer::{DeadlineBackend, InferenceBackend, LinearBackend};
pub use motion::{DotState, MotionIntegrator, MotionParams};
pub use session::{GameSession, SessionMeta, SessionPhase, SessionTelemetry, TickInput};
pub use strategy::{HeuristicStrategy, ModelStrategy, VelocityCommand, VelocityStrategy};
