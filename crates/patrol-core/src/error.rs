//! Typed errors for catalogue validation and run parameters.

use thiserror::Error;

/// A defect in the configuration catalogue, fatal at load time.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("catalogue has no {table} entries")]
    EmptyTable { table: &'static str },

    #[error("threat probabilities for environment '{environment}' sum to {sum}, expected 1")]
    ThreatProbSum { environment: String, sum: f64 },

    #[error("terrain prevalence weights sum to {sum}, expected 1")]
    TerrainPrevalenceSum { sum: f64 },

    #[error("environment '{environment}' references threat '{threat}' which is not in the threat library")]
    UnknownThreat {
        environment: String,
        threat: String,
    },

    #[error("armor '{armor}' has no defeat curve for threat '{threat}'")]
    MissingDefeatCurve { armor: String, threat: String },

    #[error(
        "threat '{threat}' velocity at {distance} m is {velocity}; \
         must be positive and below the muzzle velocity {muzzle}"
    )]
    VelocityOrder {
        threat: String,
        distance: f64,
        velocity: f64,
        muzzle: f64,
    },

    #[error("{side} fire rate minimum {min} exceeds maximum {max}")]
    FireRateOrder {
        side: &'static str,
        min: u32,
        max: u32,
    },

    #[error("map size must be positive")]
    NonPositiveMapSize,
}

/// A defect in the run parameters, rejected before the run starts.
#[derive(Debug, Error)]
pub enum ParamError {
    #[error("armor type '{0}' not found in armor profiles")]
    UnknownArmor(String),

    #[error("blue stock must be at least 1")]
    EmptyBlueStock,

    #[error("red stock must be at least 1")]
    EmptyRedStock,

    #[error("direction deviation {0} is outside [0, 360] degrees")]
    DeviationOutOfRange(f64),
}

/// Anything that can stop a simulation from starting.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Param(#[from] ParamError),
}
