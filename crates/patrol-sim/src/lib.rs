//! Simulation engine for the patrol simulator.
//!
//! Owns the blue and red actors, runs the one-minute tick loop, and
//! produces serialisable run results. Completely headless (no transport
//! dependency), enabling deterministic testing and trivial Monte Carlo
//! parallelism.

pub mod blue;
pub mod combat;
pub mod engine;
pub mod monte_carlo;
pub mod red;
pub mod rng;

pub use patrol_core as core;

pub use engine::{run_simulation, RunConfig, Simulation};
pub use monte_carlo::{run_monte_carlo, MonteCarloConfig};

#[cfg(test)]
mod tests;
