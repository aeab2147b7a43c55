//! Model constants and tuning parameters.

/// Seconds of simulated time per tick (the simulation runs in minutes).
pub const TICK_SECS: f64 = 60.0;

// --- Squad composition ---

/// Mean soldier body mass (kg).
pub const SOLDIER_MASS_MEAN_KG: f64 = 76.6571;

/// Standard deviation of soldier body mass (kg).
pub const SOLDIER_MASS_SD_KG: f64 = 11.06765;

/// Base combat load carried before armour (kg).
pub const BASE_COMBAT_LOAD_KG: f64 = 20.6497926;

// --- Movement ---

/// Lower bound of the per-tick walking speed draw (m/s).
pub const WALK_SPEED_MIN_MPS: f64 = 0.8;

/// Upper bound of the per-tick walking speed draw (m/s).
pub const WALK_SPEED_MAX_MPS: f64 = 1.4;

/// Standard deviation of the per-tick slope redraw (degrees).
pub const GRADE_SD_DEG: f64 = 3.0;

/// Exclusive upper bound for the terrain regime interval draw (ticks).
pub const TERRAIN_INTERVAL_MAX: u32 = 10;

// --- Combat ---

/// Maximum effective engagement range (m).
pub const MAX_ENGAGE_RANGE_M: f64 = 1000.0;

/// Exponential decay constant for per-shot hit probability over range (1/m).
pub const HIT_DECAY_PER_M: f64 = 0.002;

/// Standard deviation of the per-hit lethality draw.
pub const LETHALITY_SD: f64 = 0.05;

// --- Exhaustion ---

/// Coefficient of the time-decaying metabolic power threshold (kcal/h).
pub const PMAX_COEFF: f64 = 715.0154;

/// Exponent of the threshold decay over patrol time in hours.
pub const PMAX_EXPONENT: f64 = -0.3869002;

/// Joules per kilocalorie.
pub const JOULES_PER_KCAL: f64 = 4184.0;

/// Squad exhaustion ratio at which the patrol is pulled from the field.
/// Exhaustion levels are already normalised against the power threshold,
/// so the limit is the ratio crossing 1.
pub const EXHAUSTION_RATIO_LIMIT: f64 = 1.0;
