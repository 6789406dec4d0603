//! Privacy amplification.
//!
//! Compresses a reconciled bit string into a fixed-width key:
//!
//! ```text
//! bytes  = left_pad_to_byte(bits)            (big-endian integer value)
//! block0 = H(bytes)
//! blockᵢ = H(bytes || i as u32 BE)           (only when more output is needed)
//! key    = (block0 || block1 || ...)[..output_bits / 8]
//! ```

use tracing::trace;

use recipro_core::constants::FINAL_KEY_BITS;
use recipro_core::error::{ReciproError, Result};
use recipro_core::types::BitString;

use crate::hash::HashAlgorithm;
use crate::key::FinalKey;

/// Configurable hash-based amplifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrivacyAmplifier {
    output_bits: usize,
    algorithm: HashAlgorithm,
}

impl Default for PrivacyAmplifier {
    fn default() -> Self {
        Self {
            output_bits: FINAL_KEY_BITS,
            algorithm: HashAlgorithm::Sha256,
        }
    }
}

impl PrivacyAmplifier {
    /// Builds an amplifier with a custom output width and hash.
    ///
    /// # Errors
    /// `InvalidParameter` unless `output_bits` is a positive multiple of 8.
    pub fn new(output_bits: usize, algorithm: HashAlgorithm) -> Result<Self> {
        if output_bits == 0 || output_bits % 8 != 0 {
            return Err(ReciproError::invalid(format!(
                "output width must be a positive multiple of 8, got {}",
                output_bits
            )));
        }
        Ok(Self {
            output_bits,
            algorithm,
        })
    }

    /// Output width in bits.
    pub fn output_bits(&self) -> usize {
        self.output_bits
    }

    /// Underlying hash.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Amplifies `bits` into exactly [`output_bits`](Self::output_bits) bits.
    ///
    /// # Errors
    /// `EmptyInput` when `bits` is empty.
    pub fn amplify(&self, bits: &BitString) -> Result<BitString> {
        Ok(BitString::from_bytes(&self.amplify_bytes(bits)?))
    }

    /// Same as [`amplify`](Self::amplify) but returns packed bytes.
    pub fn amplify_bytes(&self, bits: &BitString) -> Result<Vec<u8>> {
        if bits.is_empty() {
            return Err(ReciproError::EmptyInput(
                "privacy amplification needs at least one bit".into(),
            ));
        }

        let input = bits.to_bytes_left_padded();
        let wanted = self.output_bits / 8;

        let mut out = self.algorithm.digest(&[&input]);
        let mut counter: u32 = 1;
        while out.len() < wanted {
            out.extend(self.algorithm.digest(&[&input, &counter.to_be_bytes()]));
            counter += 1;
        }
        out.truncate(wanted);

        trace!(input_bits = bits.len(), output_bits = self.output_bits, algorithm = %self.algorithm, "amplified");
        Ok(out)
    }

    /// Amplifies into a 256-bit [`FinalKey`].
    ///
    /// # Errors
    /// `InvalidParameter` if this amplifier is not configured for 256 bits.
    pub fn final_key(&self, bits: &BitString) -> Result<FinalKey> {
        if self.output_bits != FINAL_KEY_BITS {
            return Err(ReciproError::invalid(format!(
                "final keys are {} bits, amplifier produces {}",
                FINAL_KEY_BITS, self.output_bits
            )));
        }
        FinalKey::from_bytes(&self.amplify_bytes(bits)?)
    }
}

/// SHA-256 amplification to 256 bits.
pub fn amplify(bits: &BitString) -> Result<BitString> {
    PrivacyAmplifier::default().amplify(bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_empty_input_is_error() {
        let err = amplify(&BitString::new(vec![])).unwrap_err();
        assert!(matches!(err, ReciproError::EmptyInput(_)));
    }

    #[test]
    fn test_fixed_width_for_any_input() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        for len in [1, 8, 64, 127, 256, 512] {
            let out = amplify(&BitString::random(&mut rng, len)).unwrap();
            assert_eq!(out.len(), FINAL_KEY_BITS);
        }
    }

    #[test]
    fn test_deterministic() {
        let bits = BitString::parse("110100111").unwrap();
        assert_eq!(amplify(&bits).unwrap(), amplify(&bits).unwrap());
    }

    #[test]
    fn test_known_vector() {
        // "abc" as bits is byte aligned, so the output is plain SHA-256("abc").
        let bits = BitString::from_bytes(b"abc");
        let out = PrivacyAmplifier::default().amplify_bytes(&bits).unwrap();
        assert_eq!(
            hex::encode(out),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_left_padding_matches_integer_value() {
        // 101 and 00000101 denote the same integer, so they hash alike.
        let short = BitString::parse("101").unwrap();
        let padded = BitString::parse("00000101").unwrap();
        assert_eq!(amplify(&short).unwrap(), amplify(&padded).unwrap());
    }

    #[test]
    fn test_avalanche() {
        let mut rng = ChaCha20Rng::seed_from_u64(2024);
        let trials = 1000;
        let mut total = 0usize;
        for i in 0..trials {
            let input = BitString::random(&mut rng, 128);
            let mut flipped = input.clone();
            flipped.flip(i % 128);
            let a = amplify(&input).unwrap();
            let b = amplify(&flipped).unwrap();
            total += a.hamming_distance(&b).unwrap();
        }
        let mean = total as f64 / trials as f64;
        assert!((118.0..=138.0).contains(&mean), "mean flipped bits {}", mean);
    }

    #[test]
    fn test_custom_widths() {
        let bits = BitString::parse("1011").unwrap();
        let base = amplify(&bits).unwrap();

        let short = PrivacyAmplifier::new(128, HashAlgorithm::Sha256).unwrap();
        assert_eq!(short.amplify(&bits).unwrap(), base.slice(0, 128).unwrap());

        let long = PrivacyAmplifier::new(1024, HashAlgorithm::Sha256).unwrap();
        let out = long.amplify(&bits).unwrap();
        assert_eq!(out.len(), 1024);
        assert_eq!(out.slice(0, 256).unwrap(), base);
        assert_ne!(out.slice(256, 512).unwrap(), base);
    }

    #[test]
    fn test_algorithms_differ() {
        let bits = BitString::parse("1011").unwrap();
        let outputs: Vec<_> = HashAlgorithm::ALL
            .into_iter()
            .map(|alg| PrivacyAmplifier::new(256, alg).unwrap().amplify(&bits).unwrap())
            .collect();
        for i in 0..outputs.len() {
            for j in i + 1..outputs.len() {
                assert_ne!(outputs[i], outputs[j]);
            }
        }
    }

    #[test]
    fn test_invalid_widths() {
        assert!(PrivacyAmplifier::new(0, HashAlgorithm::Sha256).is_err());
        assert!(PrivacyAmplifier::new(100, HashAlgorithm::Sha512).is_err());
    }

    #[test]
    fn test_final_key_requires_256_bits() {
        let bits = BitString::parse("1").unwrap();
        assert!(PrivacyAmplifier::default().final_key(&bits).is_ok());
        let wide = PrivacyAmplifier::new(512, HashAlgorithm::Sha512).unwrap();
        assert!(wide.final_key(&bits).is_err());
    }

    proptest! {
        #[test]
        fn prop_output_width(bits in proptest::collection::vec(any::<bool>(), 1..600)) {
            let out = amplify(&BitString::new(bits)).unwrap();
            prop_assert_eq!(out.len(), FINAL_KEY_BITS);
        }
    }
}
