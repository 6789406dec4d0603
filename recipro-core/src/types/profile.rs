//! Device profile parameters.
//!
//! A [`DeviceProfile`] is the plain numeric summary an external profile table
//! hands to the pipeline. How the numbers were derived (device archetype,
//! mobility, carrier frequency) is not known here.

use serde::{Deserialize, Serialize};

use crate::error::{ReciproError, Result};

/// Channel and receiver parameters supplied by a device profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Per-component standard deviation σ of the complex Gaussian channel.
    pub sigma: f64,
    /// Reciprocity correlation ρ between Alice's and Bob's observations.
    pub correlation: f64,
    /// Relative CSI estimation error (0 = perfect estimation).
    pub relative_error: f64,
    /// Guard-band half-width in standard deviations.
    pub guard_band_sigma: f64,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            sigma: 1.0,
            correlation: 0.95,
            relative_error: 0.0,
            guard_band_sigma: 0.0,
        }
    }
}

impl DeviceProfile {
    /// Checks every field against its domain.
    pub fn validate(&self) -> Result<()> {
        if !(self.sigma > 0.0) || !self.sigma.is_finite() {
            return Err(ReciproError::invalid(format!("sigma must be > 0, got {}", self.sigma)));
        }
        if !(-1.0..=1.0).contains(&self.correlation) {
            return Err(ReciproError::invalid(format!(
                "correlation must lie in [-1, 1], got {}",
                self.correlation
            )));
        }
        if !(self.relative_error >= 0.0) {
            return Err(ReciproError::invalid(format!(
                "relative_error must be >= 0, got {}",
                self.relative_error
            )));
        }
        if !(self.guard_band_sigma >= 0.0) {
            return Err(ReciproError::invalid(format!(
                "guard_band_sigma must be >= 0, got {}",
                self.guard_band_sigma
            )));
        }
        Ok(())
    }
}
