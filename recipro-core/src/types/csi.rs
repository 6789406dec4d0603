//! Channel state information.
//!
//! A [`ChannelSeq`] is a batch of complex channel coefficients `h = I + jQ`,
//! one per coherence interval, observed by a single party.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{ReciproError, Result};

/// A single complex channel coefficient.
pub type ChannelCoefficient = Complex64;

/// An immutable batch of complex channel coefficients.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelSeq {
    coefficients: Vec<ChannelCoefficient>,
}

impl ChannelSeq {
    /// Wraps a vector of coefficients.
    pub fn new(coefficients: Vec<ChannelCoefficient>) -> Self {
        Self { coefficients }
    }

    /// Builds a sequence from matching in-phase and quadrature components.
    ///
    /// # Errors
    /// Returns `LengthMismatch` if `q` is not as long as `i`.
    pub fn from_components(i: &[f64], q: &[f64]) -> Result<Self> {
        if i.len() != q.len() {
            return Err(ReciproError::LengthMismatch {
                expected: i.len(),
                actual: q.len(),
            });
        }
        Ok(Self {
            coefficients: i
                .iter()
                .zip(q.iter())
                .map(|(&re, &im)| Complex64::new(re, im))
                .collect(),
        })
    }

    /// Number of coefficients.
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    /// Returns true if the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Borrows the coefficients.
    pub fn as_slice(&self) -> &[ChannelCoefficient] {
        &self.coefficients
    }

    /// Iterates over the coefficients.
    pub fn iter(&self) -> impl Iterator<Item = &ChannelCoefficient> + '_ {
        self.coefficients.iter()
    }

    /// Amplitudes `|h|`, Rayleigh distributed for a base sequence.
    pub fn amplitudes(&self) -> Vec<f64> {
        self.coefficients.iter().map(|h| h.norm()).collect()
    }

    /// Instantaneous powers `|h|²`.
    pub fn powers(&self) -> Vec<f64> {
        self.coefficients.iter().map(|h| h.norm_sqr()).collect()
    }

    /// In-phase components.
    pub fn in_phase(&self) -> Vec<f64> {
        self.coefficients.iter().map(|h| h.re).collect()
    }

    /// Quadrature components.
    pub fn quadrature(&self) -> Vec<f64> {
        self.coefficients.iter().map(|h| h.im).collect()
    }
}

impl From<Vec<ChannelCoefficient>> for ChannelSeq {
    fn from(coefficients: Vec<ChannelCoefficient>) -> Self {
        Self::new(coefficients)
    }
}

impl FromIterator<ChannelCoefficient> for ChannelSeq {
    fn from_iter<I: IntoIterator<Item = ChannelCoefficient>>(iter: I) -> Self {
        Self {
            coefficients: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components_and_amplitudes() {
        let seq = ChannelSeq::from_components(&[3.0, 0.0], &[4.0, -2.0]).unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.amplitudes(), vec![5.0, 2.0]);
        assert_eq!(seq.powers(), vec![25.0, 4.0]);
        assert_eq!(seq.in_phase(), vec![3.0, 0.0]);
        assert_eq!(seq.quadrature(), vec![4.0, -2.0]);
    }

    #[test]
    fn test_components_must_match() {
        let err = ChannelSeq::from_components(&[1.0, 2.0, 3.0], &[0.5]).unwrap_err();
        assert!(matches!(err, ReciproError::LengthMismatch { expected: 3, actual: 1 }));
    }

    #[test]
    fn test_serde_roundtrip() {
        let seq = ChannelSeq::from_components(&[1.5], &[-0.5]).unwrap();
        let json = serde_json::to_string(&seq).unwrap();
        let back: ChannelSeq = serde_json::from_str(&json).unwrap();
        assert_eq!(seq, back);
    }
}
