//! BPSK/QPSK baseband modem over a flat fading channel.
//!
//! Transmission uses the true channel amplitude, demodulation the estimated
//! one:
//!
//! ```text
//! y = |h_true|·x + n
//! threshold = g · σ_n · |h_est|          (BPSK, σ_n = √var)
//! threshold = g · σ_n · √2 · |h_est|     (QPSK, σ_n = √(var/2) per component)
//! ```
//!
//! A decision inside ±threshold is flagged uncertain but still resolved by
//! sign. Erasure belongs to key extraction, not to the modem.

use std::f64::consts::FRAC_1_SQRT_2;

use num_complex::Complex64;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use recipro_core::error::{ReciproError, Result};
use recipro_core::types::BitString;

/// Symbol mapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modulation {
    /// One bit per symbol, 0 → +1, 1 → −1.
    #[default]
    Bpsk,
    /// Two bits per symbol on I and Q, unit energy.
    Qpsk,
}

impl Modulation {
    /// Bits carried by one symbol.
    pub fn bits_per_symbol(&self) -> usize {
        match self {
            Modulation::Bpsk => 1,
            Modulation::Qpsk => 2,
        }
    }

    /// Symbols needed for `bits` bits; QPSK pads an odd count with a zero.
    pub fn symbols_for(&self, bits: usize) -> usize {
        let per = self.bits_per_symbol();
        (bits + per - 1) / per
    }

    /// Maps bits to unit-energy symbols.
    pub fn modulate(&self, bits: &BitString) -> Vec<Complex64> {
        let level = |bit: bool| if bit { -1.0 } else { 1.0 };
        match self {
            Modulation::Bpsk => bits.iter().map(|b| Complex64::new(level(b), 0.0)).collect(),
            Modulation::Qpsk => {
                let padded: Vec<bool> = bits
                    .iter()
                    .chain(std::iter::repeat(false))
                    .take(2 * self.symbols_for(bits.len()))
                    .collect();
                padded
                    .chunks_exact(2)
                    .map(|pair| Complex64::new(level(pair[0]), level(pair[1])) * FRAC_1_SQRT_2)
                    .collect()
            }
        }
    }
}

/// Demodulator output.
#[derive(Clone, Debug, PartialEq)]
pub struct Demodulated {
    /// Hard decisions, one per transmitted bit.
    pub bits: BitString,
    /// True where the received value fell inside the guard band.
    pub uncertain: Vec<bool>,
}

impl Demodulated {
    /// Number of decisions flagged uncertain.
    pub fn uncertain_count(&self) -> usize {
        self.uncertain.iter().filter(|&&u| u).count()
    }
}

/// AWGN modem with guard-band flagging.
#[derive(Debug)]
pub struct Modem<R> {
    modulation: Modulation,
    noise_variance: f64,
    guard_band_sigma: f64,
    rng: R,
}

impl<R: Rng> Modem<R> {
    /// Builds a modem.
    ///
    /// # Errors
    /// `InvalidParameter` for a negative noise variance or guard band.
    pub fn new(modulation: Modulation, noise_variance: f64, guard_band_sigma: f64, rng: R) -> Result<Self> {
        if !(noise_variance >= 0.0) || !noise_variance.is_finite() {
            return Err(ReciproError::invalid(format!(
                "noise variance must be >= 0, got {}",
                noise_variance
            )));
        }
        if !(guard_band_sigma >= 0.0) {
            return Err(ReciproError::invalid(format!(
                "guard_band_sigma must be >= 0, got {}",
                guard_band_sigma
            )));
        }
        Ok(Self {
            modulation,
            noise_variance,
            guard_band_sigma,
            rng,
        })
    }

    /// Symbol mapping in use.
    pub fn modulation(&self) -> Modulation {
        self.modulation
    }

    /// Mutable access to the random source.
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Sends `bits` through gains `true_gains` and demodulates with `est_gains`.
    ///
    /// Both gain slices hold channel amplitudes, one per symbol.
    ///
    /// # Errors
    /// `LengthMismatch` if a gain slice does not have one entry per symbol.
    pub fn transmit(&mut self, bits: &BitString, true_gains: &[f64], est_gains: &[f64]) -> Result<Demodulated> {
        let symbols = self.modulation.modulate(bits);
        for gains in [true_gains, est_gains] {
            if gains.len() != symbols.len() {
                return Err(ReciproError::LengthMismatch {
                    expected: symbols.len(),
                    actual: gains.len(),
                });
            }
        }

        let component_std = match self.modulation {
            Modulation::Bpsk => self.noise_variance.sqrt(),
            Modulation::Qpsk => (self.noise_variance / 2.0).sqrt(),
        };
        let scale = match self.modulation {
            Modulation::Bpsk => 1.0,
            Modulation::Qpsk => std::f64::consts::SQRT_2,
        };

        let mut out = Vec::with_capacity(symbols.len() * self.modulation.bits_per_symbol());
        let mut uncertain = Vec::with_capacity(out.capacity());
        for ((x, &gain), &est) in symbols.iter().zip(true_gains).zip(est_gains) {
            let threshold = self.guard_band_sigma * component_std * scale * est.abs();
            let (received, count) = match self.modulation {
                Modulation::Bpsk => ([gain * x.re + self.noise(component_std), 0.0], 1),
                Modulation::Qpsk => {
                    let y = *x * gain + Complex64::new(self.noise(component_std), self.noise(component_std));
                    ([y.re, y.im], 2)
                }
            };
            for &value in &received[..count] {
                // Positive maps to bit 0.
                out.push(value < 0.0);
                uncertain.push(self.guard_band_sigma > 0.0 && value.abs() <= threshold);
            }
        }

        out.truncate(bits.len());
        uncertain.truncate(bits.len());
        Ok(Demodulated {
            bits: BitString::new(out),
            uncertain,
        })
    }

    fn noise(&mut self, std: f64) -> f64 {
        let z: f64 = self.rng.sample(StandardNormal);
        z * std
    }
}
