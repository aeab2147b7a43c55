//! The configuration catalogue: every table the engine reads.
//!
//! The catalogue is loaded (or defaulted) once, validated once, and then
//! passed by shared reference into every entry point. Tables are
//! `BTreeMap`s so that iteration order — which feeds the categorical
//! draws for threats and terrain — is deterministic across processes.
//!
//! The serde shape mirrors the external configuration file: threat and
//! terrain entries are coefficient arrays, and an armour profile is a
//! mapping of `Mass` plus one defeat curve per threat.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ballistics;
use crate::constants::MAX_ENGAGE_RANGE_M;
use crate::error::ConfigError;

/// Quadratic velocity-over-range fit `[c1, c2, c3]`; `c3` is muzzle velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThreatCoeffs(pub f64, pub f64, pub f64);

/// Logistic armour-defeat fit `[beta0, beta1]` over impact velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefeatCurve(pub f64, pub f64);

/// Terrain entry `[factor, prevalence]`: the Pandolf–Santee terrain factor
/// and the weight of this terrain in the regime-change draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainKind(pub f64, pub f64);

impl TerrainKind {
    pub fn factor(&self) -> f64 {
        self.0
    }

    pub fn prevalence(&self) -> f64 {
        self.1
    }
}

/// One armour type: plate mass plus a defeat curve per threat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmorProfile {
    #[serde(rename = "Mass")]
    pub mass: f64,
    #[serde(flatten)]
    pub curves: BTreeMap<String, DefeatCurve>,
}

/// Rounds fired per engaged member per tick, sampled inclusively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireRates {
    pub blue_min: u32,
    pub blue_max: u32,
    pub red_min: u32,
    pub red_max: u32,
}

/// The full immutable configuration catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalogue {
    pub armor_profiles: BTreeMap<String, ArmorProfile>,
    pub threat_library: BTreeMap<String, ThreatCoeffs>,
    pub threat_probs: BTreeMap<String, BTreeMap<String, f64>>,
    pub terrain_library: BTreeMap<String, TerrainKind>,
    pub fire_rates: FireRates,
    /// Side length of the square patrol area (m).
    pub map_size: u32,
    /// Simulation horizon (ticks, i.e. minutes).
    pub stop_time: u64,
}

impl Catalogue {
    /// Run the configuration self-test. Fatal at load: a catalogue that
    /// fails here must never reach the engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        const TOL: f64 = 1e-9;

        for (table, empty) in [
            ("armor_profiles", self.armor_profiles.is_empty()),
            ("threat_library", self.threat_library.is_empty()),
            ("threat_probs", self.threat_probs.is_empty()),
            ("terrain_library", self.terrain_library.is_empty()),
        ] {
            if empty {
                return Err(ConfigError::EmptyTable { table });
            }
        }

        for (env, probs) in &self.threat_probs {
            let sum: f64 = probs.values().sum();
            if (sum - 1.0).abs() > TOL {
                return Err(ConfigError::ThreatProbSum {
                    environment: env.clone(),
                    sum,
                });
            }
            for threat in probs.keys() {
                if !self.threat_library.contains_key(threat) {
                    return Err(ConfigError::UnknownThreat {
                        environment: env.clone(),
                        threat: threat.clone(),
                    });
                }
            }
        }

        let prevalence_sum: f64 = self
            .terrain_library
            .values()
            .map(TerrainKind::prevalence)
            .sum();
        if (prevalence_sum - 1.0).abs() > TOL {
            return Err(ConfigError::TerrainPrevalenceSum {
                sum: prevalence_sum,
            });
        }

        // Every armour must answer for every threat it can meet.
        for (armor, profile) in &self.armor_profiles {
            for threat in self.threat_library.keys() {
                if !profile.curves.contains_key(threat) {
                    return Err(ConfigError::MissingDefeatCurve {
                        armor: armor.clone(),
                        threat: threat.clone(),
                    });
                }
            }
        }

        // The drag fit must stay physical across the engagement envelope:
        // still moving at maximum range, never faster than at the muzzle.
        for (threat, coeffs) in &self.threat_library {
            let velocity = ballistics::projectile_velocity(coeffs, MAX_ENGAGE_RANGE_M);
            let muzzle = coeffs.2;
            if velocity <= 0.0 || velocity >= muzzle {
                return Err(ConfigError::VelocityOrder {
                    threat: threat.clone(),
                    distance: MAX_ENGAGE_RANGE_M,
                    velocity,
                    muzzle,
                });
            }
        }

        let FireRates {
            blue_min,
            blue_max,
            red_min,
            red_max,
        } = self.fire_rates;
        if blue_min > blue_max {
            return Err(ConfigError::FireRateOrder {
                side: "blue",
                min: blue_min,
                max: blue_max,
            });
        }
        if red_min > red_max {
            return Err(ConfigError::FireRateOrder {
                side: "red",
                min: red_min,
                max: red_max,
            });
        }

        if self.map_size == 0 {
            return Err(ConfigError::NonPositiveMapSize);
        }

        Ok(())
    }

    pub fn armor(&self, name: &str) -> Option<&ArmorProfile> {
        self.armor_profiles.get(name)
    }

    pub fn threat(&self, name: &str) -> Option<&ThreatCoeffs> {
        self.threat_library.get(name)
    }

    pub fn terrain_factor(&self, name: &str) -> f64 {
        self.terrain_library
            .get(name)
            .map_or(1.0, TerrainKind::factor)
    }

    /// The threat distribution for an environment, falling back to the
    /// catalogue's first environment when the key is unknown.
    pub fn threat_probs_for(&self, environment: &str) -> &BTreeMap<String, f64> {
        self.threat_probs
            .get(environment)
            .or_else(|| self.threat_probs.values().next())
            .expect("validated catalogue has at least one environment")
    }

    pub fn map_size_m(&self) -> f64 {
        f64::from(self.map_size)
    }
}

impl Default for Catalogue {
    /// The built-in table set: two armour inserts, three small-arms
    /// threats, three operating environments, six terrain types.
    fn default() -> Self {
        let mut threat_library = BTreeMap::new();
        threat_library.insert(
            "5.45x39mm FMJ".to_string(),
            ThreatCoeffs(2.8e-4, -0.71, 880.0),
        );
        threat_library.insert(
            "7.62x39mm FMJ".to_string(),
            ThreatCoeffs(2.5e-4, -0.625, 730.0),
        );
        threat_library.insert(
            "7.62x54mmR API".to_string(),
            ThreatCoeffs(2.0e-4, -0.55, 828.0),
        );

        let mut armor_profiles = BTreeMap::new();
        armor_profiles.insert(
            "Basilone Ballistic Insert".to_string(),
            ArmorProfile {
                mass: 11.3,
                curves: BTreeMap::from([
                    ("5.45x39mm FMJ".to_string(), DefeatCurve(-11.0, 0.0145)),
                    ("7.62x39mm FMJ".to_string(), DefeatCurve(-9.5, 0.018)),
                    ("7.62x54mmR API".to_string(), DefeatCurve(-8.0, 0.016)),
                ]),
            },
        );
        armor_profiles.insert(
            "Chesty Ballistic Insert".to_string(),
            ArmorProfile {
                mass: 13.6,
                curves: BTreeMap::from([
                    ("5.45x39mm FMJ".to_string(), DefeatCurve(-13.5, 0.0145)),
                    ("7.62x39mm FMJ".to_string(), DefeatCurve(-12.0, 0.018)),
                    ("7.62x54mmR API".to_string(), DefeatCurve(-10.0, 0.016)),
                ]),
            },
        );

        let mut threat_probs = BTreeMap::new();
        threat_probs.insert(
            "Krulak's Three Block War".to_string(),
            BTreeMap::from([
                ("5.45x39mm FMJ".to_string(), 0.3),
                ("7.62x39mm FMJ".to_string(), 0.6),
                ("7.62x54mmR API".to_string(), 0.1),
            ]),
        );
        threat_probs.insert(
            "Pershing's Ghost".to_string(),
            BTreeMap::from([
                ("5.45x39mm FMJ".to_string(), 0.4),
                ("7.62x39mm FMJ".to_string(), 0.4),
                ("7.62x54mmR API".to_string(), 0.2),
            ]),
        );
        threat_probs.insert(
            "Nightmare from Mattis Street".to_string(),
            BTreeMap::from([
                ("5.45x39mm FMJ".to_string(), 0.4),
                ("7.62x39mm FMJ".to_string(), 0.2),
                ("7.62x54mmR API".to_string(), 0.4),
            ]),
        );

        let mut terrain_library = BTreeMap::new();
        terrain_library.insert("paved_road".to_string(), TerrainKind(1.0, 0.10));
        terrain_library.insert("dirt_road".to_string(), TerrainKind(1.1, 0.15));
        terrain_library.insert("light_brush".to_string(), TerrainKind(1.2, 0.35));
        terrain_library.insert("heavy_brush".to_string(), TerrainKind(1.5, 0.25));
        terrain_library.insert("swamp".to_string(), TerrainKind(1.8, 0.05));
        terrain_library.insert("loose_sand".to_string(), TerrainKind(2.1, 0.10));

        Self {
            armor_profiles,
            threat_library,
            threat_probs,
            terrain_library,
            fire_rates: FireRates {
                blue_min: 1,
                blue_max: 5,
                red_min: 1,
                red_max: 3,
            },
            map_size: 1000,
            stop_time: 480,
        }
    }
}
