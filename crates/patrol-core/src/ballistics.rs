//! Terminal ballistics: projectile velocity over range and armour defeat.
//!
//! Pure functions over catalogue coefficients; no state, no randomness.
//! The hit/miss and defeat draws that consume these numbers live in the
//! engine crate's combat resolver.

use crate::catalog::{DefeatCurve, ThreatCoeffs};

/// Projectile velocity (m/s) at `distance` metres, from the threat's
/// quadratic drag fit `c1*d^2 + c2*d + c3`. `c3` is the muzzle velocity.
///
/// Valid over the engagement envelope `0..=1000` m; the catalogue self-test
/// guarantees the fit stays positive and below muzzle velocity there.
pub fn projectile_velocity(coeffs: &ThreatCoeffs, distance: f64) -> f64 {
    let ThreatCoeffs(c1, c2, c3) = *coeffs;
    c1 * distance * distance + c2 * distance + c3
}

/// Probability that an impact at `velocity` m/s defeats the armour,
/// from the logistic fit `exp(b0 + b1*v) / (1 + exp(b0 + b1*v))`.
pub fn defeat_probability(curve: &DefeatCurve, velocity: f64) -> f64 {
    let DefeatCurve(beta0, beta1) = *curve;
    let odds = (beta0 + beta1 * velocity).exp();
    odds / (1.0 + odds)
}
