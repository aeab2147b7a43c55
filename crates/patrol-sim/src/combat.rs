//! The attack resolver: one engagement, both volleys, no mutation.
//!
//! The driver decides *whether* an engagement happens (range gate plus
//! Bernoulli draw); this module decides what it costs. Blue fires first,
//! but both sides fire with their pre-engagement stock — the driver
//! applies the losses afterwards.

use patrol_core::ballistics;
use patrol_core::catalog::Catalogue;
use patrol_core::constants::{HIT_DECAY_PER_M, LETHALITY_SD};

use crate::blue::BluePatrol;
use crate::red::RedPatrol;
use crate::rng::SimRng;

/// What one engagement cost each side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttackOutcome {
    /// Blue soldiers lost.
    pub blue_kills: u32,
    /// Red fighters lost.
    pub red_kills: u32,
    pub blue_shots: u64,
    pub red_shots: u64,
}

/// Per-environment rule turning a blue hit into a fatality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lethality {
    /// Every hit is fatal.
    AlwaysFatal,
    /// A hit is fatal iff a fresh N(mean, 0.05) draw beats a fresh U(0, 1).
    Gated { mean: f64 },
}

impl Lethality {
    /// The rule for a named environment. Unrecognised environments get
    /// the most permissive rule.
    pub fn for_environment(environment: &str) -> Self {
        match environment {
            "Krulak's Three Block War" => Self::AlwaysFatal,
            "Pershing's Ghost" => Self::Gated { mean: 0.75 },
            "Nightmare from Mattis Street" => Self::Gated { mean: 0.25 },
            _ => Self::AlwaysFatal,
        }
    }

    fn roll(self, rng: &mut SimRng) -> bool {
        match self {
            Self::AlwaysFatal => true,
            Self::Gated { mean } => rng.normal(mean, LETHALITY_SD) > rng.unit(),
        }
    }
}

/// Resolve one engagement at `distance` metres.
pub fn attack(
    catalogue: &Catalogue,
    blue: &BluePatrol,
    red: &RedPatrol,
    environment: &str,
    armor: &str,
    distance: f64,
    rng: &mut SimRng,
) -> AttackOutcome {
    let rates = catalogue.fire_rates;
    let p_hit = (-HIT_DECAY_PER_M * distance).exp();
    let lethality = Lethality::for_environment(environment);

    // Blue volley: every engaged soldier empties a sampled burst.
    let blue_shots =
        u64::from(rng.int_inclusive(rates.blue_min, rates.blue_max)) * u64::from(blue.stock());
    let mut fatal_hits = 0;
    for _ in 0..blue_shots {
        if rng.unit() < p_hit && lethality.roll(rng) {
            fatal_hits += 1;
        }
    }
    let red_kills = fatal_hits.min(red.stock);

    // Red volley: one threat draw per engagement, shared by every shot.
    let red_shots =
        u64::from(rng.int_inclusive(rates.red_min, rates.red_max)) * u64::from(red.stock);
    let threat = rng.weighted_key(catalogue.threat_probs_for(environment));
    let coeffs = catalogue
        .threat(threat)
        .expect("validated catalogue lists every threat it samples");
    let curve = catalogue
        .armor(armor)
        .and_then(|profile| profile.curves.get(threat))
        .expect("validated catalogue covers every armor/threat pair");
    let velocity = ballistics::projectile_velocity(coeffs, distance);
    let p_defeat = ballistics::defeat_probability(curve, velocity);

    let mut defeats = 0;
    for _ in 0..red_shots {
        if rng.unit() < p_hit && rng.unit() < p_defeat {
            defeats += 1;
        }
    }
    let blue_kills = defeats.min(blue.stock());

    AttackOutcome {
        blue_kills,
        red_kills,
        blue_shots,
        red_shots,
    }
}
