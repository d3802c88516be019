//! Fixed contracts shared with rendering and telemetry collaborators.

/// Arena lower bound on both axes, pixels.
pub const ARENA_MIN: f64 = 0.0;
/// Arena upper bound on both axes, pixels. The coordinate space is a fixed
/// 800x800 square, origin top-left.
pub const ARENA_MAX: f64 = 800.0;

/// Conversion between configured "level units" of speed and pixels per
/// second. Part of the external contract; must not silently change.
pub const SPEED_UNIT_PX_PER_SEC: f64 = 100.0;

/// Speed of level 1 in level units.
pub const BASE_LEVEL_SPEED: f64 = 1.0;
/// Fixed per-level speed increment in level units.
pub const LEVEL_SPEED_INCREMENT: f64 = 0.5;

/// Default observation-buffer capacity in samples.
pub const DEFAULT_HISTORY_CAPACITY: usize = 64;

/// Number of features per encoded history row: (t, dot_x, dot_y, mouse_x, mouse_y).
pub const FEATURE_DIM: usize = 5;
