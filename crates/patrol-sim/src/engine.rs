//! The simulation driver — the core of the engine.
//!
//! `Simulation` owns the blue patrol, the roster of red patrols (active
//! first), and the run's RNG stream. One `tick()` is one simulated minute:
//! movement, then either an engagement or an exhaustion update. Completely
//! headless and deterministic for a given `(params, seed)` pair.

use patrol_core::catalog::Catalogue;
use patrol_core::constants::MAX_ENGAGE_RANGE_M;
use patrol_core::error::{ParamError, SimError};
use patrol_core::params::SimParams;
use patrol_core::state::{CombatEvent, RunResult};

use crate::blue::BluePatrol;
use crate::combat;
use crate::red::RedPatrol;
use crate::rng::SimRng;

/// Per-run switches, orthogonal to the model parameters.
#[derive(Debug, Clone, Copy)]
pub struct RunConfig {
    /// RNG seed. Same `(params, seed)` = same run, byte for byte.
    pub seed: u64,
    /// Record per-tick history buffers (path, terrain, exhaustion rows,
    /// combat log) for replay; off keeps the result compact.
    pub full_log: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            full_log: true,
        }
    }
}

/// The driver. Owns all run state; mutates it only inside `tick()`.
pub struct Simulation<'a> {
    catalogue: &'a Catalogue,
    params: SimParams,
    rng: SimRng,
    full_log: bool,
    sim_time: u64,
    pub blue: BluePatrol,
    /// Every red patrol spawned so far; the active one is first.
    pub reds: Vec<RedPatrol>,
    combat_log: Vec<CombatEvent>,
}

impl<'a> Simulation<'a> {
    /// Validate the catalogue and parameters, then spawn both sides.
    pub fn new(
        catalogue: &'a Catalogue,
        params: &SimParams,
        config: RunConfig,
    ) -> Result<Self, SimError> {
        catalogue.validate()?;
        params.validate(catalogue)?;
        if !catalogue.threat_probs.contains_key(&params.environment) {
            log::warn!(
                "environment '{}' not in the catalogue; treating every blue hit as fatal",
                params.environment
            );
        }

        let Some(armor) = catalogue.armor(&params.armor_type) else {
            return Err(ParamError::UnknownArmor(params.armor_type.clone()).into());
        };

        let mut rng = SimRng::seed_from_u64(config.seed);
        let blue = BluePatrol::spawn(
            catalogue,
            armor.mass,
            params.blue_stock,
            config.full_log,
            &mut rng,
        );
        let red = RedPatrol::spawn(catalogue.map_size_m(), params.red_stock, 0, &mut rng);

        Ok(Self {
            catalogue,
            params: params.clone(),
            rng,
            full_log: config.full_log,
            sim_time: 0,
            blue,
            reds: vec![red],
            combat_log: Vec::new(),
        })
    }

    /// The red patrol currently in the field.
    pub fn red(&self) -> &RedPatrol {
        &self.reds[0]
    }

    pub fn sim_time(&self) -> u64 {
        self.sim_time
    }

    /// Whether the run has reached a termination state: time expired,
    /// blue wiped out, or blue pulled for exhaustion. (A defeated red is
    /// replaced in the same tick, so it never terminates the run.)
    pub fn finished(&self) -> bool {
        self.sim_time >= self.catalogue.stop_time
            || self.blue.stock() == 0
            || self.blue.removal_time.is_some()
            || self.red().stock == 0
    }

    /// Advance one minute.
    pub fn tick(&mut self) {
        self.sim_time += 1;
        self.blue.patrol_time = self.sim_time - self.blue.spawn_time;

        self.blue
            .step(self.catalogue, self.params.direction_deviation, &mut self.rng);

        // Engagement gate: in range, and closer is likelier.
        let distance = self.blue.position.distance(self.red().position);
        let p_attack = if distance > 0.0 {
            1.0 / distance.sqrt()
        } else {
            1.0
        };
        let engaged = distance <= MAX_ENGAGE_RANGE_M && self.rng.chance(p_attack);

        if engaged {
            self.resolve_engagement(distance);
        } else {
            // Fatigue only accrues outside contact.
            self.blue.set_exhaustion(self.catalogue);
            if self.blue.is_exhausted() {
                self.blue.removal_time = Some(self.sim_time);
            }
        }
    }

    fn resolve_engagement(&mut self, distance: f64) {
        let outcome = combat::attack(
            self.catalogue,
            &self.blue,
            &self.reds[0],
            &self.params.environment,
            &self.params.armor_type,
            distance,
            &mut self.rng,
        );

        if self.full_log {
            self.combat_log.push(CombatEvent {
                combat_time: self.sim_time,
                blue_shots: outcome.blue_shots,
                red_shots: outcome.red_shots,
                blue_kills: outcome.blue_kills,
                red_kills: outcome.red_kills,
                blue_position: self.blue.position,
                red_position: self.red().position,
                distance,
            });
        }

        // Both volleys are resolved; now the losses land.
        let sim_time = self.sim_time;
        self.blue.shots += outcome.blue_shots;
        self.blue.kills += outcome.red_kills;
        if outcome.blue_kills > 0 {
            self.blue.take_casualties(outcome.blue_kills, sim_time);
        }

        let red = &mut self.reds[0];
        red.shots += outcome.red_shots;
        red.kills += outcome.blue_kills;
        if outcome.red_kills > 0 {
            red.take_casualties(outcome.red_kills, sim_time);
        }

        if self.blue.stock() == 0 {
            self.blue.removal_time = Some(sim_time);
        }
        if self.red().stock == 0 {
            self.reds[0].removal_time = Some(sim_time);
            let replacement = RedPatrol::spawn(
                self.catalogue.map_size_m(),
                self.params.red_stock,
                sim_time,
                &mut self.rng,
            );
            self.reds.insert(0, replacement);
        }
    }

    /// Run to termination and project the trace.
    pub fn run(mut self) -> RunResult {
        while !self.finished() {
            self.tick();
        }
        self.into_result()
    }

    /// Freeze the state into a transport-safe value.
    pub fn into_result(self) -> RunResult {
        RunResult {
            blue: self.blue.view(),
            red: self.reds[0].view(),
            red_patrols: self.reds.iter().map(RedPatrol::view).collect(),
            combat_log: self.combat_log,
        }
    }
}

/// Run one simulation start to finish.
pub fn run_simulation(
    catalogue: &Catalogue,
    params: &SimParams,
    config: RunConfig,
) -> Result<RunResult, SimError> {
    Ok(Simulation::new(catalogue, params, config)?.run())
}
