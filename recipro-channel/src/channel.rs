//! Correlated complex Rayleigh channel model.
//!
//! Every coefficient is h = I + jQ with I, Q ~ N(0, σ²) i.i.d., so |h| is
//! Rayleigh(σ) and E[|h|²] = 2σ². A correlated observation is derived
//! componentwise:
//!
//! ```text
//! h' = ρ·h + √(1 − ρ²)·w        w fresh, same σ
//! ```
//!
//! which keeps the marginal distribution and gives Pearson correlation ρ.
//!
//! ## Example
//!
//! ```rust
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//! use recipro_channel::ChannelModel;
//!
//! let mut model = ChannelModel::new(ChaCha20Rng::seed_from_u64(1));
//! let alice = model.generate_base(1.0, 64).unwrap();
//! let bob = model.correlate(&alice, 1.0, 1.0).unwrap();
//! assert_eq!(alice, bob);
//! ```

use num_complex::Complex64;
use rand::Rng;
use rand_distr::{Distribution, Normal, StandardNormal};
use serde::{Deserialize, Serialize};
use tracing::trace;

use recipro_core::error::{ReciproError, Result};
use recipro_core::types::{ChannelSeq, DeviceProfile};

/// Channel generator driven by an injected random source.
#[derive(Debug)]
pub struct ChannelModel<R> {
    rng: R,
}

impl<R: Rng> ChannelModel<R> {
    /// Wraps a random source.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Mutable access to the random source.
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Releases the random source.
    pub fn into_rng(self) -> R {
        self.rng
    }

    /// Draws `len` independent coefficients with per-component std `sigma`.
    ///
    /// # Errors
    /// `InvalidParameter` if `sigma ≤ 0` or `len == 0`.
    pub fn generate_base(&mut self, sigma: f64, len: usize) -> Result<ChannelSeq> {
        let normal = component_distribution(sigma)?;
        if len == 0 {
            return Err(ReciproError::invalid("channel length must be > 0"));
        }
        Ok((0..len)
            .map(|_| Complex64::new(normal.sample(&mut self.rng), normal.sample(&mut self.rng)))
            .collect())
    }

    /// Derives an observation with correlation `rho` to `base`.
    ///
    /// `rho = 1` returns an exact replica without consuming randomness.
    ///
    /// # Errors
    /// `InvalidParameter` for `sigma ≤ 0`, `rho ∉ [−1, 1]` or an empty base.
    pub fn correlate(&mut self, base: &ChannelSeq, sigma: f64, rho: f64) -> Result<ChannelSeq> {
        let normal = component_distribution(sigma)?;
        if !(-1.0..=1.0).contains(&rho) {
            return Err(ReciproError::invalid(format!(
                "correlation must lie in [-1, 1], got {}",
                rho
            )));
        }
        if base.is_empty() {
            return Err(ReciproError::invalid("cannot correlate an empty channel"));
        }
        if rho == 1.0 {
            return Ok(base.clone());
        }

        let innovation = (1.0 - rho * rho).sqrt();
        Ok(base
            .iter()
            .map(|h| {
                let w = Complex64::new(normal.sample(&mut self.rng), normal.sample(&mut self.rng));
                *h * rho + w * innovation
            })
            .collect())
    }

    /// Adds estimation noise with per-component std `relative_error · |hᵢ|`.
    ///
    /// `relative_error = 0` is the identity.
    pub fn add_estimation_error(&mut self, h: &ChannelSeq, relative_error: f64) -> Result<ChannelSeq> {
        self.add_scaled_estimation_error(h, h, relative_error)
    }

    /// Adds estimation noise to `h` whose per-sample std follows `|referenceᵢ|`.
    ///
    /// # Errors
    /// `InvalidParameter` for a negative error, `LengthMismatch` if the
    /// sequences differ in length.
    pub fn add_scaled_estimation_error(
        &mut self,
        h: &ChannelSeq,
        reference: &ChannelSeq,
        relative_error: f64,
    ) -> Result<ChannelSeq> {
        if !(relative_error >= 0.0) || !relative_error.is_finite() {
            return Err(ReciproError::invalid(format!(
                "relative_error must be >= 0, got {}",
                relative_error
            )));
        }
        if h.len() != reference.len() {
            return Err(ReciproError::LengthMismatch {
                expected: h.len(),
                actual: reference.len(),
            });
        }
        if relative_error == 0.0 {
            return Ok(h.clone());
        }

        Ok(h.iter()
            .zip(reference.iter())
            .map(|(hi, ri)| {
                let std = relative_error * ri.norm();
                let ei: f64 = self.rng.sample(StandardNormal);
                let eq: f64 = self.rng.sample(StandardNormal);
                *hi + Complex64::new(ei * std, eq * std)
            })
            .collect())
    }

    /// Realizes Alice's, Bob's and Eve's channels for one trial.
    pub fn realize_link(&mut self, params: &LinkParams, len: usize) -> Result<LinkTriad> {
        params.validate()?;

        let alice = self.generate_base(params.sigma, len)?;
        let bob = self.correlate(&alice, params.sigma, params.rho_ab)?;
        let eve = self.correlate(&alice, params.sigma, params.rho_ae)?;

        let alice_est = self.add_estimation_error(&alice, params.relative_error)?;
        let (bob_est, eve_est) = match params.error_scale {
            ErrorScale::OwnGain => (
                self.add_estimation_error(&bob, params.relative_error)?,
                self.add_estimation_error(&eve, params.relative_error)?,
            ),
            ErrorScale::ReferenceGain => (
                self.add_scaled_estimation_error(&bob, &alice, params.relative_error)?,
                self.add_scaled_estimation_error(&eve, &alice, params.relative_error)?,
            ),
        };
        trace!(len, rho_ab = params.rho_ab, rho_ae = params.rho_ae, "realized link");

        Ok(LinkTriad {
            alice,
            bob,
            eve,
            alice_est,
            bob_est,
            eve_est,
        })
    }
}

fn component_distribution(sigma: f64) -> Result<Normal<f64>> {
    if !(sigma > 0.0) || !sigma.is_finite() {
        return Err(ReciproError::invalid(format!("sigma must be > 0, got {}", sigma)));
    }
    Normal::new(0.0, sigma).map_err(|e| ReciproError::invalid(e.to_string()))
}

// ═══════════════════════════════════════════════════════════════════════════════
// LINK REALIZATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Whose instantaneous gain scales Bob's and Eve's estimation error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorScale {
    /// Each party's error follows its own channel gain.
    #[default]
    OwnGain,
    /// Every party's error follows Alice's channel gain.
    ReferenceGain,
}

/// Parameters of one three-party link.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkParams {
    /// Per-component channel std σ.
    pub sigma: f64,
    /// Alice–Bob reciprocity correlation.
    pub rho_ab: f64,
    /// Alice–Eve correlation.
    pub rho_ae: f64,
    /// Relative CSI estimation error.
    pub relative_error: f64,
    /// Error scaling for Bob and Eve.
    #[serde(default)]
    pub error_scale: ErrorScale,
}

impl Default for LinkParams {
    fn default() -> Self {
        Self {
            sigma: 1.0,
            rho_ab: 0.95,
            rho_ae: 0.0,
            relative_error: 0.0,
            error_scale: ErrorScale::OwnGain,
        }
    }
}

impl LinkParams {
    /// Link parameters from a device profile and an eavesdropper correlation.
    pub fn from_profile(profile: &DeviceProfile, rho_ae: f64) -> Self {
        Self {
            sigma: profile.sigma,
            rho_ab: profile.correlation,
            rho_ae,
            relative_error: profile.relative_error,
            error_scale: ErrorScale::OwnGain,
        }
    }

    /// Checks all fields.
    pub fn validate(&self) -> Result<()> {
        component_distribution(self.sigma)?;
        for (name, rho) in [("rho_ab", self.rho_ab), ("rho_ae", self.rho_ae)] {
            if !(-1.0..=1.0).contains(&rho) {
                return Err(ReciproError::invalid(format!("{} must lie in [-1, 1], got {}", name, rho)));
            }
        }
        if !(self.relative_error >= 0.0) {
            return Err(ReciproError::invalid(format!(
                "relative_error must be >= 0, got {}",
                self.relative_error
            )));
        }
        Ok(())
    }
}

/// True and estimated channels of Alice, Bob and Eve for one trial.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkTriad {
    /// Alice's true channel.
    pub alice: ChannelSeq,
    /// Bob's true channel.
    pub bob: ChannelSeq,
    /// Eve's true channel.
    pub eve: ChannelSeq,
    /// Alice's estimate.
    pub alice_est: ChannelSeq,
    /// Bob's estimate.
    pub bob_est: ChannelSeq,
    /// Eve's estimate.
    pub eve_est: ChannelSeq,
}
