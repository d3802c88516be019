//! Safety governor: the single chokepoint between strategies and the
//! integrator. Whatever a strategy emits, what comes out of here is finite
//! and within the level's speed contract.

use crate::config::LevelConfig;
use crate::strategy::VelocityCommand;

/// Replaces non-finite commands with zero and scales over-speed commands down
/// to the pixel-per-second ceiling. Idempotent.
pub fn govern(cmd: VelocityCommand, config: &LevelConfig) -> VelocityCommand {
    if !cmd.vx.is_finite() || !cmd.vy.is_finite() {
        return VelocityCommand::ZERO;
    }

    let limit = config.max_speed_px_per_sec();
    let magnitude = cmd.magnitude();
    if magnitude > limit {
        let scale = limit / magnitude;
        return VelocityCommand {
            vx: cmd.vx * scale,
            vy: cmd.vy * scale,
        };
    }

    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn non_finite_components_govern_to_zero() {
        let config = LevelConfig::new(1.0);
        for cmd in [
            VelocityCommand { vx: f64::NAN, vy: 0.0 },
            VelocityCommand { vx: 0.0, vy: f64::NAN },
            VelocityCommand { vx: f64::INFINITY, vy: 1.0 },
            VelocityCommand { vx: 1.0, vy: f64::NEG_INFINITY },
        ] {
            assert_eq!(govern(cmd, &config), VelocityCommand::ZERO);
        }
    }

    #[test]
    fn over_speed_commands_are_scaled_to_the_ceiling() {
        let config = LevelConfig::new(2.0);
        let cmd = VelocityCommand { vx: 3_000.0, vy: -4_000.0 };
        let governed = govern(cmd, &config);
        assert!((governed.magnitude() - 200.0).abs() < EPS);
        // Direction is preserved.
        assert!(governed.vx > 0.0 && governed.vy < 0.0);
        assert!((governed.vx / governed.vy - cmd.vx / cmd.vy).abs() < EPS);
    }

    #[test]
    fn in_bounds_commands_pass_through_unchanged() {
        let config = LevelConfig::new(2.0);
        let cmd = VelocityCommand { vx: 0.0, vy: 2.0 };
        assert_eq!(govern(cmd, &config), cmd);
    }

    #[test]
    fn governing_twice_is_a_fixed_point() {
        let config = LevelConfig::new(1.5);
        for cmd in [
            VelocityCommand { vx: 900.0, vy: 1_200.0 },
            VelocityCommand { vx: -20.0, vy: 5.0 },
            VelocityCommand { vx: f64::NAN, vy: 3.0 },
            VelocityCommand::ZERO,
        ] {
            let once = govern(cmd, &config);
            let twice = govern(once, &config);
            assert!((once.vx - twice.vx).abs() < EPS);
            assert!((once.vy - twice.vy).abs() < EPS);
        }
    }

    #[test]
    fn governed_magnitude_never_exceeds_the_ceiling() {
        let config = LevelConfig::new(3.0);
        let limit = config.max_speed_px_per_sec();
        for i in 0..100 {
            let cmd = VelocityCommand {
                vx: (i as f64) * 37.5 - 1_000.0,
                vy: (i as f64) * -91.25 + 2_000.0,
            };
            assert!(govern(cmd, &config).magnitude() <= limit + EPS);
        }
    }
}
