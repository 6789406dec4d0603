//! Evaluation configuration.
//!
//! A config can be built in code with the builder-style setters or loaded from
//! JSON. Every field has a default, so a JSON document only needs the fields
//! it changes:
//!
//! ```json
//! { "trials": 500, "rho_ab": 0.9, "guard_band_sigma": 0.5, "code": { "n": 31, "k": 16 } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use recipro_channel::{ErrorScale, LinkParams, Modulation};
use recipro_codec::{bch_t_for, CodeSpec};
use recipro_core::constants::{
    DEFAULT_EXTREMA_WINDOW, DEFAULT_MIN_EXTREMA_SEPARATION, DEFAULT_OVER_PROVISIONING, DEFAULT_TRIALS,
};
use recipro_core::error::{ReciproError, Result};
use recipro_core::types::DeviceProfile;
use recipro_crypto::HashAlgorithm;
use recipro_keygen::ErasurePolicy;

/// How raw key bits are pulled out of the channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Extraction {
    /// Median threshold with optional guard band.
    #[default]
    Threshold,
    /// Local extrema of Alice's trace; partners decode from the public indices.
    ListEncoding {
        /// Minimum distance between extrema, in samples.
        min_separation: usize,
        /// Partner search half-width, in samples.
        window: usize,
    },
}

impl Extraction {
    /// List-Encoding with the default separation and window.
    pub fn list_encoding() -> Self {
        Extraction::ListEncoding {
            min_separation: DEFAULT_MIN_EXTREMA_SEPARATION,
            window: DEFAULT_EXTREMA_WINDOW,
        }
    }
}

/// Evaluator configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Independent trials per run.
    pub trials: usize,
    /// Channel samples per trial before over-provisioning; word length in data-link mode.
    pub samples: usize,
    /// Per-component channel std σ.
    pub sigma: f64,
    /// Alice–Bob correlation.
    pub rho_ab: f64,
    /// Alice–Eve correlation.
    pub rho_ae: f64,
    /// Relative CSI estimation error.
    pub relative_error: f64,
    /// Whose gain scales Bob's and Eve's estimation error.
    pub error_scale: ErrorScale,
    /// AWGN variance (data-link mode).
    pub noise_variance: f64,
    /// Symbol mapping (data-link mode).
    pub modulation: Modulation,
    /// Guard-band half-width in standard deviations.
    pub guard_band_sigma: f64,
    /// Sample multiplier applied while a guard band is active.
    pub over_provisioning: usize,
    /// How guard-band erasures are shared.
    pub erasure_policy: ErasurePolicy,
    /// Reconciliation code.
    pub code: CodeSpec,
    /// Raw key extraction method.
    pub extraction: Extraction,
    /// Whether to privacy-amplify reconciled keys and report final-key agreement.
    pub amplify: bool,
    /// Hash used for amplification.
    pub hash: HashAlgorithm,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            samples: 256,
            sigma: 1.0,
            rho_ab: 0.95,
            rho_ae: 0.0,
            relative_error: 0.0,
            error_scale: ErrorScale::OwnGain,
            noise_variance: 0.01,
            modulation: Modulation::Bpsk,
            guard_band_sigma: 0.0,
            over_provisioning: DEFAULT_OVER_PROVISIONING,
            erasure_policy: ErasurePolicy::Joint,
            code: CodeSpec::default(),
            extraction: Extraction::Threshold,
            amplify: false,
            hash: HashAlgorithm::Sha256,
        }
    }
}

impl EvaluatorConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of trials.
    pub fn trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    /// Sets the samples per trial.
    pub fn samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    /// Sets the channel std.
    pub fn sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    /// Sets the Alice–Bob correlation.
    pub fn rho_ab(mut self, rho: f64) -> Self {
        self.rho_ab = rho;
        self
    }

    /// Sets the Alice–Eve correlation.
    pub fn rho_ae(mut self, rho: f64) -> Self {
        self.rho_ae = rho;
        self
    }

    /// Sets the relative estimation error and how it scales.
    pub fn estimation_error(mut self, relative_error: f64, scale: ErrorScale) -> Self {
        self.relative_error = relative_error;
        self.error_scale = scale;
        self
    }

    /// Sets the AWGN variance.
    pub fn noise_variance(mut self, variance: f64) -> Self {
        self.noise_variance = variance;
        self
    }

    /// Sets the modulation.
    pub fn modulation(mut self, modulation: Modulation) -> Self {
        self.modulation = modulation;
        self
    }

    /// Sets the guard band.
    pub fn guard_band(mut self, sigma: f64) -> Self {
        self.guard_band_sigma = sigma;
        self
    }

    /// Sets the over-provisioning factor.
    pub fn over_provisioning(mut self, factor: usize) -> Self {
        self.over_provisioning = factor;
        self
    }

    /// Sets the erasure policy.
    pub fn erasure_policy(mut self, policy: ErasurePolicy) -> Self {
        self.erasure_policy = policy;
        self
    }

    /// Sets the reconciliation code.
    pub fn code(mut self, code: CodeSpec) -> Self {
        self.code = code;
        self
    }

    /// Sets the extraction method.
    pub fn extraction(mut self, extraction: Extraction) -> Self {
        self.extraction = extraction;
        self
    }

    /// Enables privacy amplification with `hash`.
    pub fn amplify_with(mut self, hash: HashAlgorithm) -> Self {
        self.amplify = true;
        self.hash = hash;
        self
    }

    /// Copies σ, ρ_AB, estimation error and guard band from a device profile.
    pub fn with_profile(mut self, profile: &DeviceProfile) -> Self {
        self.sigma = profile.sigma;
        self.rho_ab = profile.correlation;
        self.relative_error = profile.relative_error;
        self.guard_band_sigma = profile.guard_band_sigma;
        self
    }

    /// Channel parameters for [`recipro_channel::ChannelModel::realize_link`].
    pub fn link_params(&self) -> LinkParams {
        LinkParams {
            sigma: self.sigma,
            rho_ab: self.rho_ab,
            rho_ae: self.rho_ae,
            relative_error: self.relative_error,
            error_scale: self.error_scale,
        }
    }

    /// Channel samples drawn per party per trial.
    pub fn samples_per_trial(&self) -> usize {
        if self.guard_band_sigma > 0.0 {
            self.samples * self.over_provisioning
        } else {
            self.samples
        }
    }

    /// Checks the configuration before any trial runs.
    ///
    /// # Errors
    /// `ConfigError` for structural problems (zero trials or samples),
    /// `InvalidParameter` for out-of-domain numbers and `UnsupportedCode` for
    /// an unknown code.
    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            return Err(ReciproError::ConfigError("trials must be >= 1".into()));
        }
        if self.samples == 0 {
            return Err(ReciproError::ConfigError("samples must be >= 1".into()));
        }
        if self.over_provisioning == 0 {
            return Err(ReciproError::ConfigError("over_provisioning must be >= 1".into()));
        }
        self.link_params().validate()?;
        if !(self.noise_variance >= 0.0) || !self.noise_variance.is_finite() {
            return Err(ReciproError::invalid(format!(
                "noise_variance must be >= 0, got {}",
                self.noise_variance
            )));
        }
        if !(self.guard_band_sigma >= 0.0) || !self.guard_band_sigma.is_finite() {
            return Err(ReciproError::invalid(format!(
                "guard_band_sigma must be >= 0, got {}",
                self.guard_band_sigma
            )));
        }
        if let Extraction::ListEncoding { min_separation: 0, .. } = self.extraction {
            return Err(ReciproError::invalid("min_separation must be >= 1"));
        }
        bch_t_for(self.code.n, self.code.k)?;
        Ok(())
    }

    /// Parses a JSON document and validates it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipro_codec::CodecKind;

    #[test]
    fn test_default_is_valid() {
        let config = EvaluatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.samples_per_trial(), 256);
        assert_eq!(config.code, CodeSpec::new(15, 7));
    }

    #[test]
    fn test_builder() {
        let config = EvaluatorConfig::new()
            .trials(10)
            .samples(64)
            .rho_ab(0.8)
            .guard_band(0.5)
            .over_provisioning(3)
            .code(CodeSpec::new(31, 16).with_kind(CodecKind::Algebraic))
            .amplify_with(HashAlgorithm::Sha3_256);

        assert_eq!(config.trials, 10);
        assert_eq!(config.samples_per_trial(), 192);
        assert!(config.amplify);
        assert_eq!(config.hash, HashAlgorithm::Sha3_256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_profile() {
        let profile = DeviceProfile {
            sigma: 2.0,
            correlation: 0.7,
            relative_error: 0.1,
            guard_band_sigma: 0.3,
        };
        let config = EvaluatorConfig::new().with_profile(&profile);
        assert_eq!(config.sigma, 2.0);
        assert_eq!(config.rho_ab, 0.7);
        assert_eq!(config.relative_error, 0.1);
        assert_eq!(config.guard_band_sigma, 0.3);
    }

    #[test]
    fn test_structural_errors_are_config_errors() {
        assert!(EvaluatorConfig::new().trials(0).validate().unwrap_err().is_config_error());
        assert!(EvaluatorConfig::new().samples(0).validate().unwrap_err().is_config_error());
        assert!(EvaluatorConfig::new()
            .over_provisioning(0)
            .validate()
            .unwrap_err()
            .is_config_error());
    }

    #[test]
    fn test_parameter_errors() {
        assert!(EvaluatorConfig::new().rho_ab(1.2).validate().unwrap_err().is_validation_error());
        assert!(EvaluatorConfig::new().sigma(0.0).validate().is_err());
        assert!(EvaluatorConfig::new().guard_band(-0.5).validate().is_err());
        assert!(EvaluatorConfig::new().noise_variance(-1.0).validate().is_err());
        assert!(matches!(
            EvaluatorConfig::new().code(CodeSpec::new(15, 8)).validate(),
            Err(ReciproError::UnsupportedCode { n: 15, k: 8 })
        ));
        let bad_list = Extraction::ListEncoding {
            min_separation: 0,
            window: 3,
        };
        assert!(EvaluatorConfig::new().extraction(bad_list).validate().is_err());
    }

    #[test]
    fn test_partial_json() {
        let config = EvaluatorConfig::from_json_str(
            r#"{ "trials": 20, "guard_band_sigma": 0.5,
                 "code": { "n": 31, "k": 16 },
                 "extraction": { "method": "list_encoding", "min_separation": 8, "window": 4 },
                 "erasure_policy": "per_party", "modulation": "qpsk" }"#,
        )
        .unwrap();
        assert_eq!(config.trials, 20);
        assert_eq!(config.rho_ab, 0.95);
        assert_eq!(config.code.kind, CodecKind::Auto);
        assert_eq!(config.erasure_policy, ErasurePolicy::PerParty);
        assert_eq!(config.modulation, Modulation::Qpsk);
        assert_eq!(
            config.extraction,
            Extraction::ListEncoding {
                min_separation: 8,
                window: 4
            }
        );
    }

    #[test]
    fn test_json_errors() {
        assert!(matches!(
            EvaluatorConfig::from_json_str("{ not json"),
            Err(ReciproError::JsonError(_))
        ));
        assert!(EvaluatorConfig::from_json_str(r#"{ "rho_ae": -3.0 }"#).is_err());
        assert!(matches!(
            EvaluatorConfig::from_json_file("/nonexistent/recipro.json"),
            Err(ReciproError::IoError(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let config = EvaluatorConfig::new().trials(7).extraction(Extraction::list_encoding());
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(EvaluatorConfig::from_json_str(&json).unwrap(), config);
    }
}
