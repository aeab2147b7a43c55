//! Transport-safe result views — the values a finished run projects to.
//!
//! Everything here serialises cleanly to the wire shape: positions become
//! `[x, y]` pairs, `(stock, tick)` entries become two-element arrays,
//! removal times are `null` while a patrol is still in the field, and
//! serde_json renders any non-finite float (the exhaustion threshold is
//! infinite at spawn) as `null`.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Blue patrol at end of run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BluePatrolView {
    pub stock: u32,
    pub current_position: DVec2,
    /// Final heading (degrees).
    pub direction: f64,
    pub spawn_time: u64,
    pub removal_time: Option<u64>,
    /// Ticks since spawn.
    pub patrol_time: u64,
    /// Total ground covered (m).
    pub patrol_distance: f64,
    pub shots: u64,
    pub kills: u32,
    /// Squad exhaustion ratio at the last non-combat tick.
    pub exhaustion: f64,
    /// Full path when full-log is on; start and end otherwise.
    pub position_history: Vec<DVec2>,
    /// `(stock, tick)` entries, appended whenever stock changes.
    pub stock_history: Vec<(u32, u64)>,
    /// Per-tick `[threshold, e1, e2, ...]` rows; empty unless full-log.
    pub exhaustion_data: Vec<Vec<f64>>,
}

/// A red patrol at end of run (or at removal, for respawned ones).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedPatrolView {
    pub stock: u32,
    pub current_position: DVec2,
    pub spawn_time: u64,
    pub removal_time: Option<u64>,
    pub shots: u64,
    pub kills: u32,
    pub stock_history: Vec<(u32, u64)>,
}

/// One engagement, recorded when full-log is on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatEvent {
    pub combat_time: u64,
    pub blue_shots: u64,
    pub red_shots: u64,
    pub blue_kills: u32,
    pub red_kills: u32,
    pub blue_position: DVec2,
    pub red_position: DVec2,
    pub distance: f64,
}

/// The complete trace of one simulation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunResult {
    pub blue: BluePatrolView,
    /// The red patrol active when the run ended.
    pub red: RedPatrolView,
    /// Every red patrol spawned during the run, active first.
    pub red_patrols: Vec<RedPatrolView>,
    /// Empty when full-log is off.
    pub combat_log: Vec<CombatEvent>,
}

/// Aggregates over a batch of independent runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonteCarloResult {
    pub patrol_distance: Vec<f64>,
    pub blue_kills: Vec<u32>,
    pub red_kills: Vec<u32>,
    pub squad_exhaustion: Vec<f64>,
    pub runs: Vec<RunResult>,
}
