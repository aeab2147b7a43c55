//! The red patrol: a static adversary record. Red does not move, carry
//! terrain state, or fatigue; it holds stock, a fixed position, and its
//! combat bookkeeping.

use glam::DVec2;

use patrol_core::state::RedPatrolView;

use crate::rng::SimRng;

#[derive(Debug, Clone)]
pub struct RedPatrol {
    pub stock: u32,
    pub position: DVec2,
    pub spawn_time: u64,
    pub removal_time: Option<u64>,
    pub shots: u64,
    pub kills: u32,
    pub stock_history: Vec<(u32, u64)>,
}

impl RedPatrol {
    /// Spawn with `stock` fighters at a fresh random position.
    pub fn spawn(map_size: f64, stock: u32, sim_time: u64, rng: &mut SimRng) -> Self {
        let position = DVec2::new(rng.uniform(0.0, map_size), rng.uniform(0.0, map_size));
        Self {
            stock,
            position,
            spawn_time: sim_time,
            removal_time: None,
            shots: 0,
            kills: 0,
            stock_history: vec![(stock, sim_time)],
        }
    }

    /// Remove `count` fighters and record the stock change.
    pub fn take_casualties(&mut self, count: u32, sim_time: u64) {
        self.stock = self.stock.saturating_sub(count);
        self.stock_history.push((self.stock, sim_time));
    }

    pub fn view(&self) -> RedPatrolView {
        RedPatrolView {
            stock: self.stock,
            current_position: self.position,
            spawn_time: self.spawn_time,
            removal_time: self.removal_time,
            shots: self.shots,
            kills: self.kills,
            stock_history: self.stock_history.clone(),
        }
    }
}
