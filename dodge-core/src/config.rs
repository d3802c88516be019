use serde::{Deserialize, Serialize};

use crate::constants::{BASE_LEVEL_SPEED, LEVEL_SPEED_INCREMENT, SPEED_UNIT_PX_PER_SEC};
use crate::error::ConfigError;

/// The only tunable a strategy may read besides history. `max_speed` is in
/// abstract level units; the engine treats it as opaque external input.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    #[serde(rename = "maxSpeed")]
    pub max_speed: f64,
}

impl LevelConfig {
    pub fn new(max_speed: f64) -> Self {
        Self { max_speed }
    }

    /// Speed for a 1-based level number: base plus a fixed per-level increment.
    pub fn for_level(level: u32) -> Self {
        let step = f64::from(level.saturating_sub(1));
        Self {
            max_speed: BASE_LEVEL_SPEED + step * LEVEL_SPEED_INCREMENT,
        }
    }

    /// Rejects configs the governor and integrator cannot clamp against.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.max_speed.is_finite() || self.max_speed <= 0.0 {
            return Err(ConfigError::NonPositiveMaxSpeed {
                value: self.max_speed,
            });
        }
        Ok(())
    }

    /// The concrete speed ceiling in pixels per second.
    pub fn max_speed_px_per_sec(&self) -> f64 {
        self.max_speed * SPEED_UNIT_PX_PER_SEC
    }
}
