//! The blue patrol: squad roster, bounded random-walk movement, terrain
//! regime, and per-soldier energetics.
//!
//! The patrol mutates only through the driver. Movement clamps to the map
//! and bounces off its edges; the terrain regime switches on a randomised
//! interval; energetics follow the Pandolf–Santee load-carriage equation
//! and roll up into a squad exhaustion ratio against a time-decaying
//! power threshold.

use glam::DVec2;
use log::debug;

use patrol_core::catalog::Catalogue;
use patrol_core::constants::{
    BASE_COMBAT_LOAD_KG, EXHAUSTION_RATIO_LIMIT, GRADE_SD_DEG, JOULES_PER_KCAL, PMAX_COEFF,
    PMAX_EXPONENT, SOLDIER_MASS_MEAN_KG, SOLDIER_MASS_SD_KG, TERRAIN_INTERVAL_MAX, TICK_SECS,
    WALK_SPEED_MAX_MPS, WALK_SPEED_MIN_MPS,
};
use patrol_core::state::BluePatrolView;

use crate::rng::SimRng;

/// One member of the patrol. Mass is drawn once at spawn; load is the
/// base combat load plus the armour plate.
#[derive(Debug, Clone)]
pub struct Soldier {
    /// Body mass (kg).
    pub mass: f64,
    /// Carried load (kg).
    pub load: f64,
    /// Cumulative metabolic work (J).
    pub joules_expended: f64,
    /// Rolling average power over the current threshold.
    pub exhaustion_level: f64,
    pub removal_time: Option<u64>,
    pub killed: bool,
    pub exhausted: bool,
}

pub struct BluePatrol {
    pub full_log: bool,
    map_size: f64,
    pub position: DVec2,
    /// Heading (degrees, [0, 360)).
    pub direction: f64,
    /// Metres travelled in the last tick.
    pub move_speed: f64,
    pub spawn_time: u64,
    /// Ticks since spawn.
    pub patrol_time: u64,
    pub removal_time: Option<u64>,
    /// Total ground covered (m).
    pub patrol_distance: f64,
    pub shots: u64,
    pub kills: u32,
    pub squad: Vec<Soldier>,
    pub casualties: Vec<Soldier>,
    pub current_terrain: String,
    pub terrain_change_interval: u32,
    pub terrain_change_counter: u32,
    /// Local slope (degrees, signed), redrawn every tick.
    pub grade: f64,
    /// Mean exhaustion level over live soldiers.
    pub squad_exhaustion: f64,
    pub position_history: Vec<DVec2>,
    pub stock_history: Vec<(u32, u64)>,
    pub terrain_history: Vec<String>,
    pub exhaustion_data: Vec<Vec<f64>>,
}

impl BluePatrol {
    /// Spawn the patrol at tick 0: random position and heading, a fresh
    /// squad of `stock` soldiers, and an initial terrain regime.
    pub fn spawn(
        catalogue: &Catalogue,
        armor_mass: f64,
        stock: u32,
        full_log: bool,
        rng: &mut SimRng,
    ) -> Self {
        let map_size = catalogue.map_size_m();
        let position = DVec2::new(rng.uniform(0.0, map_size), rng.uniform(0.0, map_size));
        let direction = rng.uniform(0.0, 360.0);

        let terrain_names: Vec<&String> = catalogue.terrain_library.keys().collect();
        let pick = rng.int_inclusive(0, terrain_names.len() as u32 - 1) as usize;
        let current_terrain = terrain_names[pick].clone();

        let squad: Vec<Soldier> = (0..stock)
            .map(|_| Soldier {
                mass: rng.normal(SOLDIER_MASS_MEAN_KG, SOLDIER_MASS_SD_KG),
                load: BASE_COMBAT_LOAD_KG + armor_mass,
                joules_expended: 0.0,
                exhaustion_level: 0.0,
                removal_time: None,
                killed: false,
                exhausted: false,
            })
            .collect();

        let reserve = if full_log {
            catalogue.stop_time as usize + 1
        } else {
            1
        };
        let mut position_history = Vec::with_capacity(reserve);
        position_history.push(position);
        let mut terrain_history = Vec::with_capacity(reserve);
        terrain_history.push(current_terrain.clone());

        Self {
            full_log,
            map_size,
            position,
            direction,
            move_speed: 0.0,
            spawn_time: 0,
            patrol_time: 0,
            removal_time: None,
            patrol_distance: 0.0,
            shots: 0,
            kills: 0,
            stock_history: vec![(squad.len() as u32, 0)],
            squad,
            casualties: Vec::new(),
            current_terrain,
            terrain_change_interval: rng.int_inclusive(0, TERRAIN_INTERVAL_MAX - 1),
            terrain_change_counter: 0,
            grade: rng.normal(0.0, GRADE_SD_DEG),
            squad_exhaustion: 0.0,
            position_history,
            terrain_history,
            exhaustion_data: if full_log {
                Vec::with_capacity(reserve)
            } else {
                Vec::new()
            },
        }
    }

    /// Live members.
    pub fn stock(&self) -> u32 {
        self.squad.len() as u32
    }

    /// One tick of patrolling: jitter the heading, draw a walking speed
    /// adjusted for terrain and fatigue, and cover the ground.
    pub fn step(&mut self, catalogue: &Catalogue, deviation: f64, rng: &mut SimRng) {
        self.direction = (self.direction + rng.uniform(-deviation, deviation)).rem_euclid(360.0);
        let terrain_factor = catalogue.terrain_factor(&self.current_terrain);
        let mut speed = rng.uniform(WALK_SPEED_MIN_MPS, WALK_SPEED_MAX_MPS) / terrain_factor;
        // Fatigue drag on pace.
        speed *= 1.0 - self.squad_exhaustion / (2.0 * self.exhaustion_threshold());
        let move_distance = speed * TICK_SECS;
        self.advance(catalogue, move_distance, deviation, rng);
    }

    /// Move `move_distance` metres along the current heading, bouncing
    /// off map edges at most once, then update the terrain regime.
    pub fn advance(
        &mut self,
        catalogue: &Catalogue,
        move_distance: f64,
        deviation: f64,
        rng: &mut SimRng,
    ) {
        self.direction = (self.direction + rng.uniform(-deviation, deviation)).rem_euclid(360.0);
        let mut next = self.clipped_step(self.position, move_distance);
        let mut traveled = self.position.distance(next);

        // Redirect away from whichever wall was struck; a wall hit that
        // also lands on the south or north edge takes the corner heading.
        let mut bounced = false;
        if next.x <= 0.0 {
            debug!("bounce off west wall at {next}");
            self.direction = rng.uniform(-deviation, deviation).rem_euclid(360.0);
            bounced = true;
        } else if next.x >= self.map_size {
            debug!("bounce off east wall at {next}");
            self.direction = (180.0 + rng.uniform(-deviation, deviation)).rem_euclid(360.0);
            bounced = true;
        }
        if bounced {
            if next.y <= 0.0 {
                debug!("bounce off south-west corner at {next}");
                self.direction = (45.0 + rng.uniform(-deviation, deviation)).rem_euclid(360.0);
            } else if next.y >= self.map_size {
                debug!("bounce off north-east corner at {next}");
                self.direction = (225.0 + rng.uniform(-deviation, deviation)).rem_euclid(360.0);
            }
        } else if next.y <= 0.0 {
            debug!("bounce off south wall at {next}");
            self.direction = (90.0 + rng.uniform(-deviation, deviation)).rem_euclid(360.0);
            bounced = true;
        } else if next.y >= self.map_size {
            debug!("bounce off north wall at {next}");
            self.direction = (270.0 + rng.uniform(-deviation, deviation)).rem_euclid(360.0);
            bounced = true;
        }

        if bounced {
            // Spend the remaining distance along the new heading.
            let second = self.clipped_step(next, move_distance - traveled);
            traveled += next.distance(second);
            next = second;
        }

        self.position = next;
        self.patrol_distance += traveled;
        self.move_speed = traveled;
        if self.full_log {
            self.position_history.push(next);
        }
        self.update_terrain(catalogue, rng);
    }

    fn clipped_step(&self, from: DVec2, distance: f64) -> DVec2 {
        let heading = self.direction.to_radians();
        let raw = from + distance * DVec2::new(heading.cos(), heading.sin());
        raw.clamp(DVec2::ZERO, DVec2::splat(self.map_size))
    }

    /// Redraw the local slope and, when the change counter expires, roll
    /// a new terrain from the catalogue's prevalence weights.
    pub fn update_terrain(&mut self, catalogue: &Catalogue, rng: &mut SimRng) {
        self.grade = rng.normal(0.0, GRADE_SD_DEG);
        if self.terrain_change_counter >= self.terrain_change_interval {
            let mut roll = i64::from(rng.int_inclusive(1, 100));
            for (name, terrain) in &catalogue.terrain_library {
                let bucket = (terrain.prevalence() * 100.0) as i64;
                if roll <= bucket {
                    debug!("terrain change to {name} on roll {roll}");
                    self.current_terrain = name.clone();
                    break;
                }
                roll -= bucket;
            }
            self.terrain_change_counter = 0;
            self.terrain_change_interval = rng.int_inclusive(0, TERRAIN_INTERVAL_MAX - 1);
        } else {
            self.terrain_change_counter += 1;
        }
        if self.full_log {
            self.terrain_history.push(self.current_terrain.clone());
        }
    }

    /// Accrue one tick of Pandolf–Santee work per live soldier and refresh
    /// the squad exhaustion ratio. Called on non-combat ticks only.
    pub fn set_exhaustion(&mut self, catalogue: &Catalogue) {
        let speed = self.move_speed / TICK_SECS;
        let terrain_factor = catalogue.terrain_factor(&self.current_terrain);
        let grade = self.grade;
        let downhill = if grade < 0.0 { 1.0 } else { 0.0 };
        let threshold = self.exhaustion_threshold();

        for soldier in &mut self.squad {
            let mass = soldier.mass;
            let load = soldier.load;
            let total = mass + load;
            let power = 1.5 * mass
                + 2.0 * total * (load / mass).powi(2)
                + terrain_factor * total * (1.5 * speed * speed + 0.35 * speed * grade)
                - downhill
                    * terrain_factor
                    * (grade * speed * total / 3.5 - total * (grade + 6.0).powi(2) / mass
                        + (25.0 - speed * speed));
            soldier.joules_expended += power * TICK_SECS;

            // Rolling output in kcal/h; zero until the clock starts.
            let avg_power = if self.patrol_time > 0 {
                soldier.joules_expended * 60.0 / self.patrol_time as f64 / JOULES_PER_KCAL
            } else {
                0.0
            };
            soldier.exhaustion_level = if threshold > 0.0 {
                avg_power / threshold
            } else {
                0.0
            };
            soldier.exhausted = soldier.exhaustion_level >= EXHAUSTION_RATIO_LIMIT;
        }

        self.squad_exhaustion = if self.squad.is_empty() {
            0.0
        } else {
            let sum: f64 = self.squad.iter().map(|s| s.exhaustion_level).sum();
            sum / self.squad.len() as f64
        };

        if self.full_log {
            let mut row = Vec::with_capacity(self.squad.len() + 1);
            row.push(threshold);
            row.extend(self.squad.iter().map(|s| s.exhaustion_level));
            self.exhaustion_data.push(row);
        }
    }

    /// The sustainable power ceiling (kcal/h) after `patrol_time` minutes.
    /// Decays with time on patrol; infinite at spawn.
    pub fn exhaustion_threshold(&self) -> f64 {
        let hours = self.patrol_time as f64 / 60.0;
        PMAX_COEFF * hours.powf(PMAX_EXPONENT)
    }

    /// Whether the squad's mean exhaustion ratio has crossed its limit.
    pub fn is_exhausted(&self) -> bool {
        self.squad_exhaustion >= EXHAUSTION_RATIO_LIMIT
    }

    /// Remove `count` soldiers from the head of the squad and record the
    /// stock change.
    pub fn take_casualties(&mut self, count: u32, sim_time: u64) {
        let count = (count as usize).min(self.squad.len());
        let mut removed: Vec<Soldier> = self.squad.drain(..count).collect();
        for soldier in &mut removed {
            soldier.removal_time = Some(sim_time);
            soldier.killed = true;
        }
        self.casualties.extend(removed);
        self.stock_history.push((self.stock(), sim_time));
    }

    /// Project to the transport view. With full-log off the path reduces
    /// to its endpoints.
    pub fn view(&self) -> BluePatrolView {
        let position_history = if self.full_log {
            self.position_history.clone()
        } else {
            let start = self.position_history.first().copied().unwrap_or(self.position);
            vec![start, self.position]
        };
        BluePatrolView {
            stock: self.stock(),
            current_position: self.position,
            direction: self.direction,
            spawn_time: self.spawn_time,
            removal_time: self.removal_time,
            patrol_time: self.patrol_time,
            patrol_distance: self.patrol_distance,
            shots: self.shots,
            kills: self.kills,
            exhaustion: self.squad_exhaustion,
            position_history,
            stock_history: self.stock_history.clone(),
            exhaustion_data: self.exhaustion_data.clone(),
        }
    }
}
