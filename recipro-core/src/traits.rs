//! Common traits for RECIPRO.
//!
//! The reconciliation protocol only needs a small capability set from an
//! error-correcting code, captured by [`Codec`]. Implementations live in
//! `recipro-codec`.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{ReciproError, Result};
use crate::types::BitString;

// ═══════════════════════════════════════════════════════════════════════════════
// CODE PARAMETERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Block length `n`, message length `k` and correction radius `t`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeParams {
    /// Codeword length in bits.
    pub n: usize,
    /// Message length in bits.
    pub k: usize,
    /// Number of bit errors the code is guaranteed to correct.
    pub t: usize,
}

impl CodeParams {
    /// Code rate k/n.
    pub fn rate(&self) -> f64 {
        self.k as f64 / self.n as f64
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DECODE OUTCOME
// ═══════════════════════════════════════════════════════════════════════════════

/// How a nearest-codeword search ended.
///
/// `Uncorrectable` is a soft failure: the caller still receives a word and the
/// protocol carries on. It becomes visible only through disagreement statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecodeOutcome {
    /// The received word was already a codeword.
    Clean,
    /// The decoder flipped this many bits.
    Corrected(usize),
    /// No codeword within radius `t`; the returned word may be wrong.
    Uncorrectable,
}

impl DecodeOutcome {
    /// Returns true unless the decoder gave up.
    pub fn is_success(&self) -> bool {
        !matches!(self, DecodeOutcome::Uncorrectable)
    }
}

/// A corrected word together with its outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Correction {
    /// Best-effort nearest codeword (or the received word on total failure).
    pub codeword: BitString,
    /// How the search ended.
    pub outcome: DecodeOutcome,
}

// ═══════════════════════════════════════════════════════════════════════════════
// CODEC TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Binary linear block code used by the secure sketch.
///
/// Codecs are built once and shared read-only across trials, hence `Send + Sync`.
/// Decoding never fails on a well-formed word; only a length mismatch is an error.
pub trait Codec: Send + Sync {
    /// Code parameters.
    fn params(&self) -> CodeParams;

    /// Encodes a `k`-bit message into an `n`-bit codeword.
    fn encode(&self, message: &BitString) -> Result<BitString>;

    /// Searches for the codeword nearest to `received`.
    fn correct(&self, received: &BitString) -> Result<Correction>;

    /// Recovers the `k`-bit message carried by a codeword.
    fn message_of(&self, codeword: &BitString) -> Result<BitString>;

    /// Block length.
    fn n(&self) -> usize {
        self.params().n
    }

    /// Message length.
    fn k(&self) -> usize {
        self.params().k
    }

    /// Correction radius.
    fn t(&self) -> usize {
        self.params().t
    }

    /// Best-effort decode of a received word to its message.
    fn decode(&self, received: &BitString) -> Result<BitString> {
        let correction = self.correct(received)?;
        self.message_of(&correction.codeword)
    }

    /// Nearest codeword, or the received word itself if decoding gave up.
    fn nearest_codeword(&self, received: &BitString) -> Result<BitString> {
        Ok(self.correct(received)?.codeword)
    }

    /// Draws a codeword uniformly from the code by encoding a uniform message.
    fn random_codeword(&self, rng: &mut dyn RngCore) -> Result<BitString> {
        let message = BitString::random(rng, self.k());
        self.encode(&message)
    }
}

/// Validates that `bits` has the expected length.
pub fn ensure_len(bits: &BitString, expected: usize) -> Result<()> {
    if bits.len() != expected {
        return Err(ReciproError::LengthMismatch {
            expected,
            actual: bits.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Repetition code of length 3: the smallest useful codec.
    struct Repetition3;

    impl Codec for Repetition3 {
        fn params(&self) -> CodeParams {
            CodeParams { n: 3, k: 1, t: 1 }
        }

        fn encode(&self, message: &BitString) -> Result<BitString> {
            ensure_len(message, 1)?;
            Ok(BitString::new(vec![message[0]; 3]))
        }

        fn correct(&self, received: &BitString) -> Result<Correction> {
            ensure_len(received, 3)?;
            let majority = received.weight() >= 2;
            let codeword = BitString::new(vec![majority; 3]);
            let flips = codeword.hamming_distance(received)?;
            let outcome = if flips == 0 {
                DecodeOutcome::Clean
            } else {
                DecodeOutcome::Corrected(flips)
            };
            Ok(Correction { codeword, outcome })
        }

        fn message_of(&self, codeword: &BitString) -> Result<BitString> {
            ensure_len(codeword, 3)?;
            Ok(BitString::new(vec![codeword[0]]))
        }
    }

    #[test]
    fn test_default_methods() {
        let codec = Repetition3;
        assert_eq!((codec.n(), codec.k(), codec.t()), (3, 1, 1));
        let received = BitString::parse("101").unwrap();
        assert_eq!(codec.decode(&received).unwrap().to_string(), "1");
        assert_eq!(codec.nearest_codeword(&received).unwrap().to_string(), "111");
        assert!(codec.decode(&BitString::zeros(4)).is_err());
    }

    #[test]
    fn test_random_codeword_is_codeword() {
        use rand::SeedableRng;
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(1);
        let codec = Repetition3;
        for _ in 0..20 {
            let c = codec.random_codeword(&mut rng).unwrap();
            assert_eq!(codec.correct(&c).unwrap().outcome, DecodeOutcome::Clean);
        }
    }

    #[test]
    fn test_code_rate() {
        let params = CodeParams { n: 15, k: 7, t: 2 };
        assert!((params.rate() - 7.0 / 15.0).abs() < 1e-12);
        assert!(DecodeOutcome::Corrected(2).is_success());
        assert!(!DecodeOutcome::Uncorrectable.is_success());
    }
}
