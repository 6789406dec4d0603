//! Sample statistics used by quantization and evaluation.

use serde::{Deserialize, Serialize};

use recipro_core::error::{ReciproError, Result};
use recipro_core::types::ChannelSeq;

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(ReciproError::EmptyInput("mean of an empty sample".into()));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median; the mean of the two middle values for even lengths.
pub fn median(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(ReciproError::EmptyInput("median of an empty sample".into()));
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Ok(sorted[mid])
    }
}

/// Population standard deviation (divides by N).
pub fn std_dev(values: &[f64]) -> Result<f64> {
    let mu = mean(values)?;
    let var = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    Ok(var.sqrt())
}

/// Pearson correlation of two equally long samples.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Result<f64> {
    if xs.len() != ys.len() {
        return Err(ReciproError::LengthMismatch {
            expected: xs.len(),
            actual: ys.len(),
        });
    }
    if xs.is_empty() {
        return Err(ReciproError::EmptyInput("correlation of empty samples".into()));
    }
    let mut acc = CorrelationAccumulator::default();
    acc.extend(xs, ys);
    Ok(acc.pearson())
}

// ═══════════════════════════════════════════════════════════════════════════════
// MERGEABLE ACCUMULATOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Running sums for a Pearson estimate.
///
/// Accumulators from independent trials merge by plain addition, so the final
/// estimate does not depend on the order trials finish in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationAccumulator {
    n: u64,
    sx: f64,
    sy: f64,
    sxx: f64,
    syy: f64,
    sxy: f64,
}

impl CorrelationAccumulator {
    /// Adds one pair.
    pub fn push(&mut self, x: f64, y: f64) {
        self.n += 1;
        self.sx += x;
        self.sy += y;
        self.sxx += x * x;
        self.syy += y * y;
        self.sxy += x * y;
    }

    /// Adds pairs from two slices (extra elements of the longer one are ignored).
    pub fn extend(&mut self, xs: &[f64], ys: &[f64]) {
        for (&x, &y) in xs.iter().zip(ys) {
            self.push(x, y);
        }
    }

    /// Folds another accumulator into this one.
    pub fn merge(&mut self, other: &CorrelationAccumulator) {
        self.n += other.n;
        self.sx += other.sx;
        self.sy += other.sy;
        self.sxx += other.sxx;
        self.syy += other.syy;
        self.sxy += other.sxy;
    }

    /// Number of pairs seen.
    pub fn count(&self) -> u64 {
        self.n
    }

    /// Pearson correlation, or 0.0 when either sample has no variance.
    pub fn pearson(&self) -> f64 {
        if self.n < 2 {
            return 0.0;
        }
        let n = self.n as f64;
        let cov = self.sxy - self.sx * self.sy / n;
        let vx = self.sxx - self.sx * self.sx / n;
        let vy = self.syy - self.sy * self.sy / n;
        if vx <= 0.0 || vy <= 0.0 {
            return 0.0;
        }
        (cov / (vx.sqrt() * vy.sqrt())).clamp(-1.0, 1.0)
    }
}

/// Correlation between two complex channel sequences.
///
/// The in-phase and quadrature components are tracked separately and the
/// reported value is the mean of their two Pearson coefficients.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IqCorrelation {
    in_phase: CorrelationAccumulator,
    quadrature: CorrelationAccumulator,
}

impl IqCorrelation {
    /// Adds the coefficient pairs of two sequences (extra elements of the longer one are ignored).
    pub fn extend(&mut self, a: &ChannelSeq, b: &ChannelSeq) {
        for (x, y) in a.iter().zip(b.iter()) {
            self.in_phase.push(x.re, y.re);
            self.quadrature.push(x.im, y.im);
        }
    }

    /// Folds another estimate into this one.
    pub fn merge(&mut self, other: &IqCorrelation) {
        self.in_phase.merge(&other.in_phase);
        self.quadrature.merge(&other.quadrature);
    }

    /// Number of coefficient pairs seen.
    pub fn count(&self) -> u64 {
        self.in_phase.count()
    }

    /// Accumulator for the in-phase component.
    pub fn in_phase(&self) -> &CorrelationAccumulator {
        &self.in_phase
    }

    /// Accumulator for the quadrature component.
    pub fn quadrature(&self) -> &CorrelationAccumulator {
        &self.quadrature
    }

    /// `(ρ_I + ρ_Q) / 2`.
    pub fn pearson(&self) -> f64 {
        (self.in_phase.pearson() + self.quadrature.pearson()) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]).unwrap(), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]).unwrap(), 2.5);
        assert!(median(&[]).is_err());
    }

    #[test]
    fn test_population_std() {
        let sd = std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((sd - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_extremes() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert!((pearson(&xs, &[2.0, 4.0, 6.0, 8.0]).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&xs, &[-1.0, -2.0, -3.0, -4.0]).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(pearson(&xs, &[5.0; 4]).unwrap(), 0.0);
        assert!(pearson(&xs, &[1.0]).unwrap_err().is_validation_error());
    }

    #[test]
    fn test_iq_correlation_averages_components() {
        // Perfectly correlated I, uncorrelated Q with a much larger spread.
        let a = ChannelSeq::from_components(&[1.0, 2.0, 3.0, 4.0], &[1.0, -1.0, 1.0, -1.0]).unwrap();
        let b = ChannelSeq::from_components(&[2.0, 4.0, 6.0, 8.0], &[100.0, 100.0, -100.0, -100.0])
            .unwrap();

        let mut iq = IqCorrelation::default();
        iq.extend(&a, &b);
        assert_eq!(iq.count(), 4);
        assert!((iq.in_phase().pearson() - 1.0).abs() < 1e-12);
        assert!(iq.quadrature().pearson().abs() < 1e-12);
        assert!((iq.pearson() - 0.5).abs() < 1e-12);

        let mut pooled = CorrelationAccumulator::default();
        for (x, y) in a.iter().zip(b.iter()) {
            pooled.push(x.re, y.re);
            pooled.push(x.im, y.im);
        }
        assert!((pooled.pearson() - iq.pearson()).abs() > 0.1);
    }

    #[test]
    fn test_iq_correlation_anti_phase() {
        let a = ChannelSeq::from_components(&[1.0, 2.0, 3.0], &[0.5, -0.5, 2.0]).unwrap();
        let b = ChannelSeq::from_components(&[-1.0, -2.0, -3.0], &[-0.5, 0.5, -2.0]).unwrap();
        let mut iq = IqCorrelation::default();
        iq.extend(&a, &b);
        assert!((iq.pearson() + 1.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_merge_is_order_independent(
            pairs in proptest::collection::vec((-10.0f64..10.0, -10.0f64..10.0), 4..60),
            split in 1usize..4,
        ) {
            let cut = pairs.len() / split;
            let mut whole = CorrelationAccumulator::default();
            let mut left = CorrelationAccumulator::default();
            let mut right = CorrelationAccumulator::default();
            for (i, &(x, y)) in pairs.iter().enumerate() {
                whole.push(x, y);
                if i < cut { left.push(x, y) } else { right.push(x, y) }
            }
            let mut ab = left;
            ab.merge(&right);
            let mut ba = right;
            ba.merge(&left);
            prop_assert_eq!(ab.count(), whole.count());
            prop_assert!((ab.pearson() - whole.pearson()).abs() < 1e-9);
            prop_assert!((ba.pearson() - whole.pearson()).abs() < 1e-9);
        }
    }
}
