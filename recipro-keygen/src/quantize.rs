//! Threshold quantization of channel amplitudes with guard-band erasure.
//!
//! ```text
//! τ       = median(|h_alice_est|)          shared by Alice and Bob
//! bitᵢ    = |hᵢ| > τ
//! erasedᵢ = | |hᵢ| − τ | ≤ g · std(|h|)    only when g > 0
//! ```
//!
//! Eve never learns τ and quantizes against the median of her own channel.

use serde::{Deserialize, Serialize};
use tracing::trace;

use recipro_channel::stats::{median, std_dev};
use recipro_core::error::{ReciproError, Result};
use recipro_core::types::BitString;

/// Fixed-threshold quantizer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Quantizer {
    guard_band_sigma: f64,
}

impl Quantizer {
    /// Builds a quantizer with guard-band half-width `guard_band_sigma` (in std units).
    ///
    /// # Errors
    /// `InvalidParameter` for a negative or non-finite guard band.
    pub fn new(guard_band_sigma: f64) -> Result<Self> {
        if !(guard_band_sigma >= 0.0) || !guard_band_sigma.is_finite() {
            return Err(ReciproError::invalid(format!(
                "guard_band_sigma must be >= 0, got {}",
                guard_band_sigma
            )));
        }
        Ok(Self { guard_band_sigma })
    }

    /// Guard-band half-width in standard deviations.
    pub fn guard_band_sigma(&self) -> f64 {
        self.guard_band_sigma
    }

    /// Quantization threshold for a batch: its median amplitude.
    pub fn threshold(amplitudes: &[f64]) -> Result<f64> {
        median(amplitudes)
    }

    /// Hard decisions without erasure.
    pub fn quantize(amplitudes: &[f64], threshold: f64) -> BitString {
        amplitudes.iter().map(|&a| a > threshold).collect()
    }

    /// Samples outside the guard band; all true when the band is zero.
    pub fn keep_mask(&self, amplitudes: &[f64], threshold: f64) -> Result<Vec<bool>> {
        if amplitudes.is_empty() {
            return Err(ReciproError::EmptyInput("no amplitudes to quantize".into()));
        }
        if self.guard_band_sigma == 0.0 {
            return Ok(vec![true; amplitudes.len()]);
        }
        let width = self.guard_band_sigma * std_dev(amplitudes)?;
        Ok(amplitudes.iter().map(|&a| (a - threshold).abs() > width).collect())
    }

    /// Quantizes the samples that survive this party's own guard band.
    pub fn extract(&self, amplitudes: &[f64], threshold: f64) -> Result<BitString> {
        let mask = self.keep_mask(amplitudes, threshold)?;
        Ok(select(amplitudes, &mask).map(|a| a > threshold).collect())
    }
}

fn select<'a>(values: &'a [f64], mask: &'a [bool]) -> impl Iterator<Item = f64> + 'a {
    values.iter().zip(mask).filter(|&(_, &keep)| keep).map(|(&v, _)| v)
}

// ═══════════════════════════════════════════════════════════════════════════════
// THREE-PARTY EXTRACTION
// ═══════════════════════════════════════════════════════════════════════════════

/// How guard-band erasures are coordinated between the parties.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErasurePolicy {
    /// Alice and Bob publish erased indices and both drop the union.
    /// Eve drops the same public indices.
    #[default]
    Joint,
    /// Each party drops its own samples; sequences are then truncated to
    /// the shortest one.
    PerParty,
}

/// Raw keys of Alice, Bob and Eve, cut to a common length.
#[derive(Clone, Debug, PartialEq)]
pub struct RawKeys {
    /// Alice's raw key.
    pub alice: BitString,
    /// Bob's raw key.
    pub bob: BitString,
    /// Eve's raw key.
    pub eve: BitString,
    /// Samples each party started with.
    pub samples: usize,
}

impl RawKeys {
    /// Bits kept per party.
    pub fn kept(&self) -> usize {
        self.alice.len()
    }
}

/// Quantizes three amplitude batches with Alice's threshold for Alice and Bob
/// and Eve's own threshold for Eve.
pub fn extract_raw_keys(
    quantizer: &Quantizer,
    policy: ErasurePolicy,
    alice: &[f64],
    bob: &[f64],
    eve: &[f64],
) -> Result<RawKeys> {
    for other in [bob, eve] {
        if other.len() != alice.len() {
            return Err(ReciproError::LengthMismatch {
                expected: alice.len(),
                actual: other.len(),
            });
        }
    }

    let tau = Quantizer::threshold(alice)?;
    let tau_eve = Quantizer::threshold(eve)?;

    let (mut a, mut b, mut e) = match policy {
        ErasurePolicy::Joint => {
            let keep_a = quantizer.keep_mask(alice, tau)?;
            let keep_b = quantizer.keep_mask(bob, tau)?;
            let mask: Vec<bool> = keep_a.iter().zip(&keep_b).map(|(&x, &y)| x && y).collect();
            (
                select(alice, &mask).map(|v| v > tau).collect::<BitString>(),
                select(bob, &mask).map(|v| v > tau).collect::<BitString>(),
                select(eve, &mask).map(|v| v > tau_eve).collect::<BitString>(),
            )
        }
        ErasurePolicy::PerParty => (
            quantizer.extract(alice, tau)?,
            quantizer.extract(bob, tau)?,
            quantizer.extract(eve, tau_eve)?,
        ),
    };

    let common = a.len().min(b.len()).min(e.len());
    a.truncate(common);
    b.truncate(common);
    e.truncate(common);
    trace!(samples = alice.len(), kept = common, ?policy, "extracted raw keys");

    Ok(RawKeys {
        alice: a,
        bob: b,
        eve: e,
        samples: alice.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_quantize_against_median() {
        let amps = [0.1, 0.9, 0.5, 0.3, 0.7];
        let tau = Quantizer::threshold(&amps).unwrap();
        assert_eq!(tau, 0.5);
        assert_eq!(Quantizer::quantize(&amps, tau).to_string(), "01001");
    }

    #[test]
    fn test_zero_guard_keeps_everything() {
        let q = Quantizer::new(0.0).unwrap();
        let amps = [0.5, 0.5, 1.0, 0.0];
        assert_eq!(q.extract(&amps, 0.5).unwrap().len(), 4);
    }

    #[test]
    fn test_guard_band_erases_near_threshold() {
        // std ≈ 0.36, so the band at g = 0.5 is ≈ 0.18 wide
        let q = Quantizer::new(0.5).unwrap();
        let amps = [0.0, 0.4, 0.6, 1.0];
        let mask = q.keep_mask(&amps, 0.5).unwrap();
        assert_eq!(mask, vec![true, false, false, true]);
        assert_eq!(q.extract(&amps, 0.5).unwrap().to_string(), "01");
    }

    #[test]
    fn test_deterministic() {
        let q = Quantizer::new(0.3).unwrap();
        let amps: Vec<f64> = (0..100).map(|i| ((i * 37) % 101) as f64 / 50.0).collect();
        let tau = Quantizer::threshold(&amps).unwrap();
        assert_eq!(q.extract(&amps, tau).unwrap(), q.extract(&amps, tau).unwrap());
    }

    #[test]
    fn test_rejects_negative_guard() {
        assert!(Quantizer::new(-0.1).unwrap_err().is_validation_error());
        assert!(Quantizer::new(f64::NAN).is_err());
    }

    #[test]
    fn test_joint_policy_aligns_keys() {
        let q = Quantizer::new(0.5).unwrap();
        let alice = [0.1, 0.45, 0.9, 0.2, 0.8, 0.55, 1.2, 0.05];
        let bob = [0.1, 0.95, 0.9, 0.2, 0.52, 0.55, 1.2, 0.05];
        let eve = [1.0, 0.2, 0.3, 0.9, 0.1, 0.6, 0.4, 0.8];
        let keys = extract_raw_keys(&q, ErasurePolicy::Joint, &alice, &bob, &eve).unwrap();
        assert_eq!(keys.alice, keys.bob);
        assert_eq!(keys.eve.len(), keys.kept());
        assert_eq!(keys.samples, 8);
    }

    #[test]
    fn test_per_party_truncates_to_shortest() {
        let q = Quantizer::new(0.5).unwrap();
        let alice = [0.1, 0.45, 0.9, 0.2, 0.8, 0.55, 1.2, 0.05];
        let bob = [0.1, 0.95, 0.9, 0.2, 0.52, 0.55, 1.2, 0.05];
        let eve = alice;
        let keys = extract_raw_keys(&q, ErasurePolicy::PerParty, &alice, &bob, &eve).unwrap();
        assert_eq!(keys.alice.len(), keys.bob.len());
        assert_eq!(keys.bob.len(), keys.eve.len());
    }

    #[test]
    fn test_length_mismatch() {
        let q = Quantizer::default();
        let err = extract_raw_keys(&q, ErasurePolicy::Joint, &[1.0, 2.0], &[1.0], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, ReciproError::LengthMismatch { expected: 2, actual: 1 }));
    }

    proptest! {
        #[test]
        fn prop_guard_band_monotone(
            amps in proptest::collection::vec(0.0f64..5.0, 1..200),
            g1 in 0.0f64..2.0,
            dg in 0.0f64..2.0,
        ) {
            let tau = Quantizer::threshold(&amps).unwrap();
            let narrow = Quantizer::new(g1).unwrap().extract(&amps, tau).unwrap();
            let wide = Quantizer::new(g1 + dg).unwrap().extract(&amps, tau).unwrap();
            prop_assert!(wide.len() <= narrow.len());
            prop_assert!(narrow.len() <= amps.len());
        }
    }
}
