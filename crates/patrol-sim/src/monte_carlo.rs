//! Monte Carlo batch runner.
//!
//! Runs are fully independent: run `i` gets its own RNG seeded with
//! `seed + i` and its own patrol state, so the batch parallelises across
//! worker threads without any synchronisation. Full logging is forced off
//! to keep per-run results O(1).

use log::info;
use rayon::prelude::*;

use patrol_core::catalog::Catalogue;
use patrol_core::error::SimError;
use patrol_core::params::SimParams;
use patrol_core::state::{MonteCarloResult, RunResult};

use crate::engine::{run_simulation, RunConfig};

#[derive(Debug, Clone, Copy)]
pub struct MonteCarloConfig {
    /// Number of independent runs.
    pub runs: u32,
    /// Master seed; run `i` uses `seed + i`.
    pub seed: u64,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self { runs: 100, seed: 42 }
    }
}

/// Run `config.runs` independent simulations and collect the aggregate
/// arrays alongside the raw results.
pub fn run_monte_carlo(
    catalogue: &Catalogue,
    params: &SimParams,
    config: MonteCarloConfig,
) -> Result<MonteCarloResult, SimError> {
    // Validate once up front so worker failures are impossible.
    catalogue.validate()?;
    params.validate(catalogue)?;

    info!(
        "monte carlo: {} runs, blue {} vs red {}",
        config.runs, params.blue_stock, params.red_stock
    );

    let runs: Vec<RunResult> = (0..u64::from(config.runs))
        .into_par_iter()
        .map(|i| {
            run_simulation(
                catalogue,
                params,
                RunConfig {
                    seed: config.seed.wrapping_add(i),
                    full_log: false,
                },
            )
        })
        .collect::<Result<_, _>>()?;

    let result = MonteCarloResult {
        patrol_distance: runs.iter().map(|r| r.blue.patrol_distance).collect(),
        blue_kills: runs.iter().map(|r| r.blue.kills).collect(),
        red_kills: runs
            .iter()
            .map(|r| r.red_patrols.iter().map(|p| p.kills).sum())
            .collect(),
        squad_exhaustion: runs.iter().map(|r| r.blue.exhaustion).collect(),
        runs,
    };

    info!("monte carlo: {} runs complete", result.runs.len());
    Ok(result)
}
