//! Extremum-based key extraction (List-Encoding).
//!
//! The extracting party marks local maxima of its amplitude trace as 1 and
//! local minima as 0, keeping extrema at least `min_separation` samples apart.
//! Only the extremum indices are published. A partner looks at a window of
//! `±window` samples around each index in its own trace and outputs 1 when its
//! window maximum sits closer to the index than its window minimum.

use serde::{Deserialize, Serialize};

use recipro_core::constants::{DEFAULT_EXTREMA_WINDOW, DEFAULT_MIN_EXTREMA_SEPARATION};
use recipro_core::error::{ReciproError, Result};
use recipro_core::types::BitString;

/// Bits and public extremum indices produced by the extracting party.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEncoding {
    /// One bit per extremum, 1 for a maximum.
    pub bits: BitString,
    /// Sample index of each extremum, ascending.
    pub indices: Vec<usize>,
}

/// List-Encoding extractor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListEncoder {
    min_separation: usize,
    window: usize,
}

impl Default for ListEncoder {
    fn default() -> Self {
        Self {
            min_separation: DEFAULT_MIN_EXTREMA_SEPARATION,
            window: DEFAULT_EXTREMA_WINDOW,
        }
    }
}

impl ListEncoder {
    /// Builds an encoder.
    ///
    /// # Errors
    /// `InvalidParameter` if `min_separation` is zero.
    pub fn new(min_separation: usize, window: usize) -> Result<Self> {
        if min_separation == 0 {
            return Err(ReciproError::invalid("min_separation must be >= 1"));
        }
        Ok(Self {
            min_separation,
            window,
        })
    }

    /// Extracts bits from local extrema of `amplitudes`.
    pub fn encode(&self, amplitudes: &[f64]) -> ListEncoding {
        let maxima = find_peaks(amplitudes, self.min_separation, |a, b| a > b);
        let minima = find_peaks(amplitudes, self.min_separation, |a, b| a < b);

        let mut extrema: Vec<(usize, bool)> = maxima
            .into_iter()
            .map(|i| (i, true))
            .chain(minima.into_iter().map(|i| (i, false)))
            .collect();
        extrema.sort_unstable_by_key(|&(i, _)| i);

        ListEncoding {
            bits: extrema.iter().map(|&(_, bit)| bit).collect(),
            indices: extrema.into_iter().map(|(i, _)| i).collect(),
        }
    }

    /// Resolves one bit per published index from the partner's own trace.
    ///
    /// # Errors
    /// `InvalidParameter` if an index lies outside `amplitudes`.
    pub fn decode(&self, amplitudes: &[f64], indices: &[usize]) -> Result<BitString> {
        indices
            .iter()
            .map(|&idx| {
                if idx >= amplitudes.len() {
                    return Err(ReciproError::invalid(format!(
                        "extremum index {} outside trace of length {}",
                        idx,
                        amplitudes.len()
                    )));
                }
                let start = idx.saturating_sub(self.window);
                let end = (idx + self.window + 1).min(amplitudes.len());
                let window = &amplitudes[start..end];
                let center = idx - start;

                let arg_max = first_arg_by(window, |a, b| a > b);
                let arg_min = first_arg_by(window, |a, b| a < b);
                Ok(arg_max.abs_diff(center) < arg_min.abs_diff(center))
            })
            .collect()
    }
}

/// First index whose value beats every other under `better`.
fn first_arg_by(values: &[f64], better: impl Fn(f64, f64) -> bool) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if better(v, values[best]) {
            best = i;
        }
    }
    best
}

/// Strict local peaks under `above`, thinned so that kept peaks are at least
/// `distance` samples apart. More prominent peaks win; ties go to the earlier index.
fn find_peaks(values: &[f64], distance: usize, above: impl Fn(f64, f64) -> bool) -> Vec<usize> {
    if values.len() < 3 {
        return Vec::new();
    }
    let candidates: Vec<usize> = (1..values.len() - 1)
        .filter(|&i| above(values[i], values[i - 1]) && above(values[i], values[i + 1]))
        .collect();
    if distance <= 1 {
        return candidates;
    }

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        let (va, vb) = (values[candidates[a]], values[candidates[b]]);
        if above(va, vb) {
            std::cmp::Ordering::Less
        } else if above(vb, va) {
            std::cmp::Ordering::Greater
        } else {
            a.cmp(&b)
        }
    });

    let mut keep = vec![true; candidates.len()];
    for &c in &order {
        if !keep[c] {
            continue;
        }
        let pos = candidates[c];
        for (j, &other) in candidates.iter().enumerate() {
            if j != c && keep[j] && other.abs_diff(pos) < distance {
                keep[j] = false;
            }
        }
    }

    candidates
        .into_iter()
        .zip(keep)
        .filter(|&(_, k)| k)
        .map(|(i, _)| i)
        .collect()
}
