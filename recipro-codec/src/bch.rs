//! Algebraic binary BCH codec.
//!
//! Narrow-sense primitive BCH codes of length n = 2^m − 1.
//!
//! ## Layout
//!
//! Bit `i` of a codeword is the coefficient of `x^i`. Encoding is systematic:
//!
//! ```text
//! c(x) = m(x)·x^(n−k) + (m(x)·x^(n−k) mod g(x))
//! [ parity: 0 .. n−k | message: n−k .. n ]
//! ```
//!
//! ## Decoding
//!
//! Syndromes S₁..S₂ₜ, Berlekamp–Massey for the error locator Λ(x), then a
//! Chien search for its roots. When the locator degree exceeds `t` or the root
//! count disagrees with the degree, the received word is returned untouched
//! with [`DecodeOutcome::Uncorrectable`].

use tracing::trace;

use recipro_core::error::{ReciproError, Result};
use recipro_core::traits::{ensure_len, Codec, CodeParams, Correction, DecodeOutcome};
use recipro_core::types::BitString;

use crate::gf::GaloisField;

/// A binary BCH code with algebraic decoding.
#[derive(Clone, Debug)]
pub struct BchCode {
    params: CodeParams,
    field: GaloisField,
    /// Generator polynomial over GF(2), lowest degree first.
    generator: Vec<u8>,
}

impl BchCode {
    /// Builds BCH(n, k) with designed correction radius `t`.
    ///
    /// # Errors
    /// Returns `InvalidParameter` if `n` is not 2^m − 1 or if the generator
    /// built from α¹..α²ᵗ does not have degree `n − k`.
    pub fn new(n: usize, k: usize, t: usize) -> Result<Self> {
        if n < 3 || !(n + 1).is_power_of_two() {
            return Err(ReciproError::invalid(format!("BCH length {} is not 2^m - 1", n)));
        }
        if k == 0 || k >= n || t == 0 || 2 * t >= n {
            return Err(ReciproError::invalid(format!(
                "BCH({}, {}) with t={} is out of range",
                n, k, t
            )));
        }

        let field = GaloisField::new((n + 1).trailing_zeros())?;

        let mut covered = vec![false; n];
        let mut generator: Vec<u8> = vec![1];
        for i in 1..=2 * t {
            if covered[i % n] {
                continue;
            }
            for j in field.cyclotomic_coset(i) {
                covered[j] = true;
            }
            generator = binary_poly_mul(&generator, &field.minimal_polynomial(i));
        }

        let degree = generator.len() - 1;
        if degree != n - k {
            return Err(ReciproError::invalid(format!(
                "BCH({}, {}) with t={} has generator degree {}, expected {}",
                n,
                k,
                t,
                degree,
                n - k
            )));
        }

        Ok(Self {
            params: CodeParams { n, k, t },
            field,
            generator,
        })
    }

    /// Generator polynomial g(x) over GF(2), lowest degree first.
    pub fn generator(&self) -> &[u8] {
        &self.generator
    }

    /// Syndromes S₁..S₂ₜ of a received word.
    fn syndromes(&self, received: &BitString) -> Vec<u16> {
        (1..=2 * self.params.t)
            .map(|j| {
                received
                    .iter()
                    .enumerate()
                    .filter(|(_, bit)| *bit)
                    .fold(0u16, |acc, (i, _)| acc ^ self.field.alpha_pow(i * j))
            })
            .collect()
    }

    /// Berlekamp–Massey over GF(2^m). Returns the error locator Λ(x) and its length L.
    fn error_locator(&self, syndromes: &[u16]) -> (Vec<u16>, usize) {
        let gf = &self.field;
        let mut locator: Vec<u16> = vec![1];
        let mut previous: Vec<u16> = vec![1];
        let mut len = 0usize;
        let mut shift = 1usize;
        let mut last_discrepancy: u16 = 1;

        for r in 0..syndromes.len() {
            let mut discrepancy = syndromes[r];
            for i in 1..=len.min(locator.len() - 1) {
                discrepancy ^= gf.mul(locator[i], syndromes[r - i]);
            }

            if discrepancy == 0 {
                shift += 1;
                continue;
            }

            let coef = gf.div(discrepancy, last_discrepancy);
            let mut next = locator.clone();
            if next.len() < previous.len() + shift {
                next.resize(previous.len() + shift, 0);
            }
            for (i, &p) in previous.iter().enumerate() {
                next[i + shift] ^= gf.mul(coef, p);
            }

            if 2 * len <= r {
                previous = std::mem::replace(&mut locator, next);
                len = r + 1 - len;
                last_discrepancy = discrepancy;
                shift = 1;
            } else {
                locator = next;
                shift += 1;
            }
        }

        while locator.len() > 1 && locator[locator.len() - 1] == 0 {
            locator.pop();
        }
        (locator, len)
    }

    /// Chien search: positions `i` with Λ(α^−i) = 0.
    fn error_positions(&self, locator: &[u16]) -> Vec<usize> {
        let order = self.field.order();
        (0..self.params.n)
            .filter(|&i| self.field.eval(locator, self.field.alpha_pow((order - i % order) % order)) == 0)
            .collect()
    }
}

impl Codec for BchCode {
    fn params(&self) -> CodeParams {
        self.params
    }

    fn encode(&self, message: &BitString) -> Result<BitString> {
        ensure_len(message, self.params.k)?;
        let CodeParams { n, k, .. } = self.params;
        let parity_len = n - k;

        let mut shifted = vec![0u8; n];
        for (i, bit) in message.iter().enumerate() {
            shifted[parity_len + i] = bit as u8;
        }

        let mut remainder = shifted.clone();
        for i in (parity_len..n).rev() {
            if remainder[i] == 1 {
                for (j, &g) in self.generator.iter().enumerate() {
                    remainder[i - parity_len + j] ^= g;
                }
            }
        }

        Ok((0..n)
            .map(|i| {
                if i < parity_len {
                    remainder[i] == 1
                } else {
                    shifted[i] == 1
                }
            })
            .collect())
    }

    fn correct(&self, received: &BitString) -> Result<Correction> {
        ensure_len(received, self.params.n)?;

        let syndromes = self.syndromes(received);
        if syndromes.iter().all(|&s| s == 0) {
            return Ok(Correction {
                codeword: received.clone(),
                outcome: DecodeOutcome::Clean,
            });
        }

        let (locator, len) = self.error_locator(&syndromes);
        let degree = locator.len() - 1;
        if len > self.params.t || degree != len {
            trace!(len, degree, "BCH locator exceeds correction radius");
            return Ok(Correction {
                codeword: received.clone(),
                outcome: DecodeOutcome::Uncorrectable,
            });
        }

        let positions = self.error_positions(&locator);
        if positions.len() != degree {
            trace!(roots = positions.len(), degree, "BCH Chien search root count mismatch");
            return Ok(Correction {
                codeword: received.clone(),
                outcome: DecodeOutcome::Uncorrectable,
            });
        }

        let mut codeword = received.clone();
        for &p in &positions {
            codeword.flip(p);
        }
        Ok(Correction {
            codeword,
            outcome: DecodeOutcome::Corrected(positions.len()),
        })
    }

    fn message_of(&self, codeword: &BitString) -> Result<BitString> {
        ensure_len(codeword, self.params.n)?;
        codeword.slice(self.params.n - self.params.k, self.params.n)
    }
}

fn binary_poly_mul(a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; a.len() + b.len() - 1];
    for (i, &ai) in a.iter().enumerate() {
        if ai == 0 {
            continue;
        }
        for (j, &bj) in b.iter().enumerate() {
            out[i + j] ^= bj;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::index::sample;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use recipro_core::constants::BCH_PARAMETERS;
    use test_case::test_case;

    #[test]
    fn test_all_supported_parameters_build() {
        for &(n, k, t) in BCH_PARAMETERS {
            let code = BchCode::new(n, k, t).unwrap();
            assert_eq!(code.generator().len() - 1, n - k);
        }
    }

    #[test]
    fn test_generator_bch_15_7() {
        // g(x) = x^8 + x^7 + x^6 + x^4 + 1
        let code = BchCode::new(15, 7, 2).unwrap();
        assert_eq!(code.generator(), &[1, 0, 0, 0, 1, 0, 1, 1, 1]);
    }

    #[test]
    fn test_rejects_inconsistent_parameters() {
        assert!(BchCode::new(16, 7, 2).is_err());
        assert!(BchCode::new(15, 8, 2).is_err());
        assert!(BchCode::new(15, 7, 0).is_err());
    }

    #[test]
    fn test_encode_is_systematic() {
        let code = BchCode::new(15, 7, 2).unwrap();
        let message = BitString::parse("1011001").unwrap();
        let codeword = code.encode(&message).unwrap();
        assert_eq!(codeword.len(), 15);
        assert_eq!(code.message_of(&codeword).unwrap(), message);
        assert_eq!(code.correct(&codeword).unwrap().outcome, DecodeOutcome::Clean);
    }

    #[test]
    fn test_exhaustive_single_errors_bch_7_4() {
        let code = BchCode::new(7, 4, 1).unwrap();
        for value in 0u64..16 {
            let message = BitString::from_u64(value, 4);
            let codeword = code.encode(&message).unwrap();
            for pos in 0..7 {
                let mut received = codeword.clone();
                received.flip(pos);
                let correction = code.correct(&received).unwrap();
                assert_eq!(correction.codeword, codeword);
                assert_eq!(correction.outcome, DecodeOutcome::Corrected(1));
                assert_eq!(code.decode(&received).unwrap(), message);
            }
        }
    }

    #[test_case(15, 7, 2)]
    #[test_case(31, 16, 3)]
    #[test_case(63, 36, 5)]
    #[test_case(127, 64, 10)]
    #[test_case(255, 139, 15)]
    fn test_corrects_up_to_t_errors(n: usize, k: usize, t: usize) {
        let code = BchCode::new(n, k, t).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(n as u64);
        for trial in 0..50 {
            let message = BitString::random(&mut rng, k);
            let codeword = code.encode(&message).unwrap();
            let weight = trial % (t + 1);
            let mut received = codeword.clone();
            for pos in sample(&mut rng, n, weight).into_iter() {
                received.flip(pos);
            }
            let correction = code.correct(&received).unwrap();
            assert_eq!(correction.codeword, codeword, "weight {} not corrected", weight);
            assert!(correction.outcome.is_success());
        }
    }

    #[test]
    fn test_beyond_radius_never_panics() {
        let code = BchCode::new(15, 7, 2).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(99);
        let mut uncorrectable = 0;
        for _ in 0..200 {
            let received = BitString::random(&mut rng, 15);
            let correction = code.correct(&received).unwrap();
            match correction.outcome {
                DecodeOutcome::Uncorrectable => {
                    assert_eq!(correction.codeword, received);
                    uncorrectable += 1;
                }
                _ => assert!(code.correct(&correction.codeword).unwrap().outcome == DecodeOutcome::Clean),
            }
        }
        // BCH(15,7) spheres of radius 2 cover 128 * 121 of 32768 words.
        assert!(uncorrectable > 0);
    }

    #[test]
    fn test_length_mismatch() {
        let code = BchCode::new(7, 4, 1).unwrap();
        assert!(code.encode(&BitString::zeros(5)).is_err());
        assert!(code.correct(&BitString::zeros(8)).is_err());
    }
}
