//! Tests for the simulation driver, movement, terrain regime, energetics,
//! and the combat resolver.

use glam::DVec2;

use patrol_core::catalog::Catalogue;
use patrol_core::error::{ParamError, SimError};
use patrol_core::params::SimParams;

use crate::blue::BluePatrol;
use crate::combat::{self, Lethality};
use crate::engine::{run_simulation, RunConfig, Simulation};
use crate::monte_carlo::{run_monte_carlo, MonteCarloConfig};
use crate::red::RedPatrol;
use crate::rng::SimRng;

fn default_params() -> SimParams {
    SimParams {
        blue_stock: 10,
        red_stock: 20,
        direction_deviation: 10.0,
        armor_type: "Basilone Ballistic Insert".to_string(),
        environment: "Krulak's Three Block War".to_string(),
    }
}

/// A 20-soldier patrol with a fixed armour mass, for direct prodding.
fn test_patrol(catalogue: &Catalogue, rng: &mut SimRng) -> BluePatrol {
    BluePatrol::spawn(catalogue, 11.3, 20, true, rng)
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let catalogue = Catalogue::default();
    let params = default_params();
    let config = RunConfig {
        seed: 12345,
        full_log: true,
    };

    let a = run_simulation(&catalogue, &params, config).unwrap();
    let b = run_simulation(&catalogue, &params, config).unwrap();

    let json_a = serde_json::to_string(&a).unwrap();
    let json_b = serde_json::to_string(&b).unwrap();
    assert_eq!(json_a, json_b, "same (params, seed) must replay identically");
}

#[test]
fn test_determinism_different_seeds() {
    let catalogue = Catalogue::default();
    let params = default_params();

    let a = run_simulation(
        &catalogue,
        &params,
        RunConfig {
            seed: 111,
            full_log: false,
        },
    )
    .unwrap();
    let b = run_simulation(
        &catalogue,
        &params,
        RunConfig {
            seed: 222,
            full_log: false,
        },
    )
    .unwrap();

    assert_ne!(
        a.blue.patrol_distance, b.blue.patrol_distance,
        "different seeds should walk different paths"
    );
}

// ---- Movement ----

#[test]
fn test_deterministic_move() {
    let catalogue = Catalogue::default();
    let mut rng = SimRng::seed_from_u64(7);
    let mut patrol = test_patrol(&catalogue, &mut rng);

    patrol.position = DVec2::ZERO;
    patrol.direction = 45.0;
    patrol.advance(&catalogue, 10.0, 0.0, &mut rng);

    assert!((patrol.position.x - 7.0711).abs() < 0.02);
    assert!((patrol.position.y - 7.0711).abs() < 0.02);
    assert!(patrol.move_speed > 9.9 && patrol.move_speed < 10.1);
}

#[test]
fn test_sw_corner_bounce() {
    let catalogue = Catalogue::default();
    let mut rng = SimRng::seed_from_u64(7);
    let mut patrol = test_patrol(&catalogue, &mut rng);

    // Heading into the south-west corner redirects to 45 degrees.
    patrol.position = DVec2::ZERO;
    patrol.direction = 225.0;
    patrol.advance(&catalogue, 10.0, 0.0, &mut rng);

    assert!((patrol.position.x - 7.0711).abs() < 0.02);
    assert!((patrol.position.y - 7.0711).abs() < 0.02);
    assert!(patrol.move_speed > 9.9 && patrol.move_speed < 10.1);
}

#[test]
fn test_west_wall_bounce() {
    let catalogue = Catalogue::default();
    let mut rng = SimRng::seed_from_u64(7);
    let mut patrol = test_patrol(&catalogue, &mut rng);

    patrol.position = DVec2::new(0.0, 100.0);
    patrol.direction = 180.0;
    patrol.advance(&catalogue, 10.0, 0.0, &mut rng);

    assert!((patrol.position.x - 10.0).abs() < 0.1);
    assert!((patrol.position.y - 100.0).abs() < 0.1);
    assert!(patrol.move_speed > 9.9 && patrol.move_speed < 10.1);
}

#[test]
fn test_south_wall_bounce() {
    let catalogue = Catalogue::default();
    let mut rng = SimRng::seed_from_u64(7);
    let mut patrol = test_patrol(&catalogue, &mut rng);

    patrol.position = DVec2::new(100.0, 0.0);
    patrol.direction = 270.0;
    patrol.advance(&catalogue, 10.0, 0.0, &mut rng);

    assert!((patrol.position.x - 100.0).abs() < 0.1);
    assert!((patrol.position.y - 10.0).abs() < 0.1);
    assert!(patrol.move_speed > 9.9 && patrol.move_speed < 10.1);
}

#[test]
fn test_east_wall_bounce() {
    let catalogue = Catalogue::default();
    let map = catalogue.map_size_m();
    let mut rng = SimRng::seed_from_u64(7);
    let mut patrol = test_patrol(&catalogue, &mut rng);

    patrol.position = DVec2::new(map, 100.0);
    patrol.direction = 0.0;
    patrol.advance(&catalogue, 10.0, 0.0, &mut rng);

    assert!((patrol.position.x - (map - 10.0)).abs() < 0.1);
    assert!((patrol.position.y - 100.0).abs() < 0.1);
    assert!(patrol.move_speed > 9.9 && patrol.move_speed < 10.1);
}

#[test]
fn test_north_wall_bounce() {
    let catalogue = Catalogue::default();
    let map = catalogue.map_size_m();
    let mut rng = SimRng::seed_from_u64(7);
    let mut patrol = test_patrol(&catalogue, &mut rng);

    patrol.position = DVec2::new(100.0, map);
    patrol.direction = 90.0;
    patrol.advance(&catalogue, 10.0, 0.0, &mut rng);

    assert!((patrol.position.x - 100.0).abs() < 0.1);
    assert!((patrol.position.y - (map - 10.0)).abs() < 0.1);
    assert!(patrol.move_speed > 9.9 && patrol.move_speed < 10.1);
}

#[test]
fn test_bounce_never_exceeds_move_distance() {
    // A wall hit mid-stride spends the remainder from the bounce point.
    let catalogue = Catalogue::default();
    let mut rng = SimRng::seed_from_u64(7);
    let mut patrol = test_patrol(&catalogue, &mut rng);

    patrol.position = DVec2::new(5.0, 100.0);
    patrol.direction = 180.0;
    patrol.advance(&catalogue, 10.0, 0.0, &mut rng);

    assert!((patrol.move_speed - 10.0).abs() < 1e-9);
    assert!((patrol.position.x - 5.0).abs() < 1e-9);
    assert!((patrol.position.y - 100.0).abs() < 1e-9);
}

#[test]
fn test_position_stays_in_bounds() {
    let catalogue = Catalogue::default();
    let map = catalogue.map_size_m();
    let params = default_params();
    let mut sim = Simulation::new(
        &catalogue,
        &params,
        RunConfig {
            seed: 9,
            full_log: false,
        },
    )
    .unwrap();

    while !sim.finished() {
        sim.tick();
        let pos = sim.blue.position;
        assert!(
            (0.0..=map).contains(&pos.x) && (0.0..=map).contains(&pos.y),
            "patrol left the map at {pos}"
        );
    }
}

// ---- Terrain regime ----

#[test]
fn test_terrain_counter_waits_for_interval() {
    let catalogue = Catalogue::default();
    let mut rng = SimRng::seed_from_u64(11);
    let mut patrol = test_patrol(&catalogue, &mut rng);

    patrol.terrain_change_interval = 1;
    patrol.terrain_change_counter = 0;
    patrol.current_terrain = "light_brush".to_string();
    patrol.update_terrain(&catalogue, &mut rng);

    assert_eq!(patrol.current_terrain, "light_brush");
    assert_eq!(patrol.terrain_change_counter, 1);
    assert_eq!(patrol.terrain_change_interval, 1);
}

#[test]
fn test_forced_terrain_rolls_cover_the_library() {
    let catalogue = Catalogue::default();
    let mut rng = SimRng::seed_from_u64(13);
    let mut patrol = test_patrol(&catalogue, &mut rng);

    for _ in 0..1000 {
        patrol.terrain_change_interval = 0;
        patrol.update_terrain(&catalogue, &mut rng);
    }

    let seen: std::collections::BTreeSet<&str> =
        patrol.terrain_history.iter().map(String::as_str).collect();
    let all: std::collections::BTreeSet<&str> = catalogue
        .terrain_library
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(seen, all, "1000 forced rolls should visit every terrain");
}

// ---- Exhaustion ----

#[test]
fn test_exhaustion_threshold_values() {
    let catalogue = Catalogue::default();
    let mut rng = SimRng::seed_from_u64(17);
    let mut patrol = test_patrol(&catalogue, &mut rng);

    patrol.patrol_time = 120;
    let two_hours = patrol.exhaustion_threshold();
    assert!(two_hours > 546.8 && two_hours < 546.9, "got {two_hours}");

    patrol.patrol_time = 1;
    let one_minute = patrol.exhaustion_threshold();
    assert!(one_minute > 3485.0 && one_minute < 3486.0, "got {one_minute}");
}

#[test]
fn test_exhaustion_comparator_is_the_unit_ratio() {
    // The squad ratio is already normalised against the threshold, so the
    // pull-out test is the ratio crossing 1.
    let catalogue = Catalogue::default();
    let mut rng = SimRng::seed_from_u64(17);
    let mut patrol = test_patrol(&catalogue, &mut rng);

    patrol.patrol_time = 120;
    patrol.squad_exhaustion = 0.999;
    assert!(!patrol.is_exhausted());
    patrol.squad_exhaustion = 1.0;
    assert!(patrol.is_exhausted());
}

#[test]
fn test_exhaustion_is_monotone_on_a_steady_segment() {
    let catalogue = Catalogue::default();
    let mut rng = SimRng::seed_from_u64(19);
    let mut patrol = test_patrol(&catalogue, &mut rng);

    patrol.grade = 0.0;
    patrol.current_terrain = "light_brush".to_string();
    patrol.move_speed = 66.0; // 1.1 m/s held constant

    let mut last = 0.0;
    for minute in 1..=180 {
        patrol.patrol_time = minute;
        patrol.set_exhaustion(&catalogue);
        assert!(
            patrol.squad_exhaustion >= last,
            "exhaustion fell at minute {minute}"
        );
        last = patrol.squad_exhaustion;
    }
    assert!(last > 0.0);
}

#[test]
fn test_exhaustion_zero_before_clock_starts() {
    let catalogue = Catalogue::default();
    let mut rng = SimRng::seed_from_u64(19);
    let mut patrol = test_patrol(&catalogue, &mut rng);

    patrol.move_speed = 66.0;
    patrol.set_exhaustion(&catalogue);

    assert_eq!(patrol.squad_exhaustion, 0.0);
    assert!(patrol.exhaustion_threshold().is_infinite());
    // Work is still banked even though the average is gated.
    assert!(patrol.squad.iter().all(|s| s.joules_expended > 0.0));
}

#[test]
fn test_exhaustion_of_an_empty_squad_is_zero() {
    let catalogue = Catalogue::default();
    let mut rng = SimRng::seed_from_u64(19);
    let mut patrol = test_patrol(&catalogue, &mut rng);

    patrol.take_casualties(20, 5);
    patrol.patrol_time = 6;
    patrol.set_exhaustion(&catalogue);
    assert_eq!(patrol.squad_exhaustion, 0.0);
}

// ---- Squad bookkeeping ----

#[test]
fn test_take_casualties_moves_soldiers_to_the_roll() {
    let catalogue = Catalogue::default();
    let mut rng = SimRng::seed_from_u64(23);
    let mut patrol = test_patrol(&catalogue, &mut rng);

    assert_eq!(patrol.stock(), 20);
    patrol.take_casualties(5, 1);

    assert_eq!(patrol.stock(), 15);
    assert_eq!(patrol.casualties.len(), 5);
    assert!(patrol
        .casualties
        .iter()
        .all(|s| s.killed && s.removal_time == Some(1)));
    assert!(patrol.squad.iter().all(|s| s.removal_time.is_none()));
    assert_eq!(patrol.stock_history.last(), Some(&(15, 1)));
}

// ---- Combat resolver ----

#[test]
fn test_lethality_rules_by_environment() {
    assert_eq!(
        Lethality::for_environment("Krulak's Three Block War"),
        Lethality::AlwaysFatal
    );
    assert_eq!(
        Lethality::for_environment("Pershing's Ghost"),
        Lethality::Gated { mean: 0.75 }
    );
    assert_eq!(
        Lethality::for_environment("Nightmare from Mattis Street"),
        Lethality::Gated { mean: 0.25 }
    );
    // Unknown environments are the easy case.
    assert_eq!(
        Lethality::for_environment("Fort Nowhere"),
        Lethality::AlwaysFatal
    );
}

#[test]
fn test_attack_outcome_is_bounded_by_stock() {
    let catalogue = Catalogue::default();
    let mut rng = SimRng::seed_from_u64(29);
    let blue = test_patrol(&catalogue, &mut rng);
    let red = RedPatrol::spawn(catalogue.map_size_m(), 12, 0, &mut rng);
    let rates = catalogue.fire_rates;

    for distance in [0.0, 250.0, 600.0, 1000.0] {
        let outcome = combat::attack(
            &catalogue,
            &blue,
            &red,
            "Pershing's Ghost",
            "Basilone Ballistic Insert",
            distance,
            &mut rng,
        );
        assert!(outcome.red_kills <= red.stock);
        assert!(outcome.blue_kills <= blue.stock());
        let shots_per_man = outcome.blue_shots / u64::from(blue.stock());
        assert!(
            (u64::from(rates.blue_min)..=u64::from(rates.blue_max)).contains(&shots_per_man)
        );
        assert_eq!(outcome.blue_shots % u64::from(blue.stock()), 0);
    }
}

#[test]
fn test_point_blank_krulak_volley_wipes_red() {
    // At zero range every shot hits, and in Krulak's environment every
    // hit is fatal; with at least one round per soldier the volley covers
    // the whole red patrol.
    let catalogue = Catalogue::default();
    let mut rng = SimRng::seed_from_u64(31);
    let blue = test_patrol(&catalogue, &mut rng);
    let red = RedPatrol::spawn(catalogue.map_size_m(), 20, 0, &mut rng);

    let outcome = combat::attack(
        &catalogue,
        &blue,
        &red,
        "Krulak's Three Block War",
        "Basilone Ballistic Insert",
        0.0,
        &mut rng,
    );
    assert_eq!(outcome.red_kills, red.stock);
}

// ---- Driver ----

#[test]
fn test_zero_stop_time_returns_immediately() {
    let mut catalogue = Catalogue::default();
    catalogue.stop_time = 0;
    let result = run_simulation(&catalogue, &default_params(), RunConfig::default()).unwrap();

    assert_eq!(result.blue.patrol_time, 0);
    assert!(result.combat_log.is_empty());
    assert_eq!(result.blue.stock, 10);
    assert_eq!(result.blue.stock_history, vec![(10, 0)]);
}

#[test]
fn test_squad_plus_casualties_is_conserved() {
    let catalogue = Catalogue::default();
    let params = default_params();
    let mut sim = Simulation::new(
        &catalogue,
        &params,
        RunConfig {
            seed: 37,
            full_log: false,
        },
    )
    .unwrap();

    while !sim.finished() {
        sim.tick();
        assert_eq!(
            sim.blue.squad.len() + sim.blue.casualties.len(),
            10,
            "soldiers must only move between the squad and the casualty roll"
        );
        let (stock, _) = *sim.blue.stock_history.last().unwrap();
        assert_eq!(stock, sim.blue.stock());
    }
}

#[test]
fn test_minimal_engagement_terminates() {
    let catalogue = Catalogue::default();
    let params = SimParams {
        blue_stock: 1,
        red_stock: 1,
        direction_deviation: 0.0,
        armor_type: "Basilone Ballistic Insert".to_string(),
        environment: "Krulak's Three Block War".to_string(),
    };

    let result = run_simulation(
        &catalogue,
        &params,
        RunConfig {
            seed: 41,
            full_log: true,
        },
    )
    .unwrap();

    assert!(result.blue.patrol_time <= catalogue.stop_time);
    let red_defeated = result.red_patrols.iter().any(|r| r.stock == 0);
    let terminated = result.blue.stock == 0
        || red_defeated
        || result.blue.removal_time.is_some()
        || result.blue.patrol_time == catalogue.stop_time;
    assert!(terminated, "run must land in a termination state");
}

#[test]
fn test_red_respawn_keeps_roster_ordered() {
    let catalogue = Catalogue::default();
    let params = SimParams {
        blue_stock: 8,
        red_stock: 1,
        direction_deviation: 5.0,
        armor_type: "Chesty Ballistic Insert".to_string(),
        environment: "Krulak's Three Block War".to_string(),
    };

    let mut saw_respawn = false;
    for seed in 0..50 {
        let result = run_simulation(
            &catalogue,
            &params,
            RunConfig {
                seed,
                full_log: false,
            },
        )
        .unwrap();

        assert_eq!(result.red.stock, result.red_patrols[0].stock);
        for retired in result.red_patrols.iter().skip(1) {
            assert_eq!(retired.stock, 0, "only defeated red patrols retire");
            assert!(retired.removal_time.is_some());
        }
        if result.red_patrols.len() > 1 {
            saw_respawn = true;
        }
    }
    assert!(
        saw_respawn,
        "an 8-on-1 patrol should defeat at least one red across 50 seeds"
    );
}

#[test]
fn test_compact_result_reduces_histories() {
    let catalogue = Catalogue::default();
    let result = run_simulation(
        &catalogue,
        &default_params(),
        RunConfig {
            seed: 43,
            full_log: false,
        },
    )
    .unwrap();

    assert_eq!(result.blue.position_history.len(), 2);
    assert!(result.blue.exhaustion_data.is_empty());
    assert!(result.combat_log.is_empty());
}

#[test]
fn test_full_log_records_every_tick() {
    let catalogue = Catalogue::default();
    let result = run_simulation(
        &catalogue,
        &default_params(),
        RunConfig {
            seed: 43,
            full_log: true,
        },
    )
    .unwrap();

    let ticks = result.blue.patrol_time as usize;
    assert_eq!(result.blue.position_history.len(), ticks + 1);
    // Exhaustion rows carry the threshold sentinel plus one entry per
    // live soldier at that tick.
    for row in &result.blue.exhaustion_data {
        assert!(row.len() >= 2);
    }
}

#[test]
fn test_unknown_environment_falls_back() {
    let catalogue = Catalogue::default();
    let mut params = default_params();
    params.environment = "Fort Nowhere".to_string();

    let result = run_simulation(&catalogue, &params, RunConfig::default());
    assert!(result.is_ok(), "unknown environment must not be fatal");
}

#[test]
fn test_unknown_armor_is_fatal() {
    let catalogue = Catalogue::default();
    let mut params = default_params();
    params.armor_type = "Cardboard Insert".to_string();

    let result = run_simulation(&catalogue, &params, RunConfig::default());
    assert!(matches!(
        result,
        Err(SimError::Param(ParamError::UnknownArmor(_)))
    ));
}

// ---- Monte Carlo ----

#[test]
fn test_monte_carlo_is_deterministic() {
    let catalogue = Catalogue::default();
    let params = default_params();
    let config = MonteCarloConfig { runs: 8, seed: 100 };

    let a = run_monte_carlo(&catalogue, &params, config).unwrap();
    let b = run_monte_carlo(&catalogue, &params, config).unwrap();

    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn test_monte_carlo_seeds_diverge() {
    let catalogue = Catalogue::default();
    let params = default_params();

    let a = run_monte_carlo(&catalogue, &params, MonteCarloConfig { runs: 5, seed: 1 }).unwrap();
    let b = run_monte_carlo(&catalogue, &params, MonteCarloConfig { runs: 5, seed: 1000 }).unwrap();

    assert_ne!(a.patrol_distance, b.patrol_distance);
}

#[test]
fn test_monte_carlo_aggregates_line_up() {
    let catalogue = Catalogue::default();
    let params = default_params();
    let result =
        run_monte_carlo(&catalogue, &params, MonteCarloConfig { runs: 12, seed: 7 }).unwrap();

    assert_eq!(result.runs.len(), 12);
    assert_eq!(result.patrol_distance.len(), 12);
    assert_eq!(result.blue_kills.len(), 12);
    assert_eq!(result.red_kills.len(), 12);
    assert_eq!(result.squad_exhaustion.len(), 12);

    for (i, run) in result.runs.iter().enumerate() {
        assert!(run.combat_log.is_empty(), "batch runs are compact");
        assert_eq!(result.blue_kills[i], run.blue.kills);
    }
}
