//! Run parameters, checked against a catalogue before the run starts.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalogue;
use crate::error::ParamError;

/// Parameters of a single simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    /// Initial number of blue soldiers.
    pub blue_stock: u32,
    /// Initial number of red fighters.
    pub red_stock: u32,
    /// Magnitude of the uniform heading jitter per tick (degrees).
    pub direction_deviation: f64,
    /// Key into `armor_profiles`. Unknown armour is a fatal error.
    pub armor_type: String,
    /// Key into `threat_probs`. An unknown environment falls back to the
    /// catalogue's first environment (with every hit fatal for blue fire).
    pub environment: String,
}

impl SimParams {
    pub fn validate(&self, catalogue: &Catalogue) -> Result<(), ParamError> {
        if self.blue_stock == 0 {
            return Err(ParamError::EmptyBlueStock);
        }
        if self.red_stock == 0 {
            return Err(ParamError::EmptyRedStock);
        }
        if !self.direction_deviation.is_finite()
            || !(0.0..=360.0).contains(&self.direction_deviation)
        {
            return Err(ParamError::DeviationOutOfRange(self.direction_deviation));
        }
        if catalogue.armor(&self.armor_type).is_none() {
            return Err(ParamError::UnknownArmor(self.armor_type.clone()));
        }
        Ok(())
    }
}
