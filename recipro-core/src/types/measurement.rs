//! Aggregate security measurements.
//!
//! Rates are fractions in `[0, 1]`; the `*_percent` helpers scale them for display.
//! A rate with a zero denominator is `NaN`, as is a correlation when no
//! samples were observed. serde_json writes `NaN` as `null`.

use serde::{Deserialize, Serialize};

/// Result of a key-generation security evaluation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityMeasurement {
    /// Trials requested.
    pub trials: usize,
    /// Trials that produced no complete code block.
    pub skipped_trials: usize,
    /// Key bits fed into reconciliation (whole blocks only).
    pub bits_reconciled: usize,
    /// Code blocks reconciled.
    pub blocks: usize,
    /// Disagreement between Alice's and Bob's raw keys.
    pub ber_bob_raw: f64,
    /// Disagreement between Bob's reconciled key and Alice's raw key.
    pub kdr_bob: f64,
    /// Disagreement between Eve's own quantized key and Alice's raw key.
    pub ber_eve_raw: f64,
    /// Disagreement after Eve runs the reconciliation against the public syndrome.
    pub ber_eve_reconciled: f64,
    /// Fraction of Bob's blocks the decoder could not correct.
    pub decode_failure_rate: f64,
    /// Empirical Pearson correlation of Alice's and Bob's I/Q (averaged).
    pub corr_alice_bob: f64,
    /// Empirical Pearson correlation of Alice's and Eve's I/Q (averaged).
    pub corr_alice_eve: f64,
    /// Channel samples drawn per party.
    pub samples_generated: usize,
    /// Samples surviving guard-band erasure.
    pub samples_kept: usize,
    /// Fraction of productive trials whose amplified keys matched Alice's (Bob).
    pub final_key_agreement: Option<f64>,
    /// Fraction of productive trials whose amplified keys matched Alice's (Eve).
    pub eve_final_key_agreement: Option<f64>,
}

impl SecurityMeasurement {
    /// Fraction of generated samples removed by the guard band.
    pub fn discarded_fraction(&self) -> f64 {
        if self.samples_generated == 0 {
            0.0
        } else {
            1.0 - self.samples_kept as f64 / self.samples_generated as f64
        }
    }

    /// KDR for Bob as a percentage.
    pub fn kdr_bob_percent(&self) -> f64 {
        self.kdr_bob * 100.0
    }

    /// Eve's raw BER as a percentage.
    pub fn ber_eve_raw_percent(&self) -> f64 {
        self.ber_eve_raw * 100.0
    }

    /// Eve's post-reconciliation BER as a percentage.
    pub fn ber_eve_reconciled_percent(&self) -> f64 {
        self.ber_eve_reconciled * 100.0
    }
}

/// Result of a data-link (modulated transmission) evaluation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkMeasurement {
    /// Trials requested.
    pub trials: usize,
    /// Bits compared across all trials.
    pub bits: usize,
    /// Disagreement between Alice's and Bob's demodulated words, before reconciliation.
    pub ber: f64,
    /// Disagreement after Bob reconciles against Alice.
    pub kdr: f64,
    /// Fraction of received samples that fell inside the demodulation guard band.
    pub uncertain_fraction: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discarded_fraction() {
        let m = SecurityMeasurement {
            samples_generated: 200,
            samples_kept: 50,
            ..Default::default()
        };
        assert!((m.discarded_fraction() - 0.75).abs() < 1e-12);
        assert_eq!(SecurityMeasurement::default().discarded_fraction(), 0.0);
    }

    #[test]
    fn test_percent_helpers() {
        let m = SecurityMeasurement {
            kdr_bob: 0.0125,
            ber_eve_raw: 0.5,
            ber_eve_reconciled: 0.49,
            ..Default::default()
        };
        assert!((m.kdr_bob_percent() - 1.25).abs() < 1e-12);
        assert!((m.ber_eve_raw_percent() - 50.0).abs() < 1e-12);
        assert!((m.ber_eve_reconciled_percent() - 49.0).abs() < 1e-12);
    }

    #[test]
    fn test_json_shape() {
        let m = SecurityMeasurement::default();
        let json = serde_json::to_value(&m).unwrap();
        assert!(json.get("kdr_bob").is_some());
        assert!(json.get("ber_eve_reconciled").is_some());
    }

    #[test]
    fn test_undefined_rates_serialize_as_null() {
        let m = LinkMeasurement {
            ber: f64::NAN,
            kdr: f64::NAN,
            ..Default::default()
        };
        assert!(m.kdr.is_nan());
        let json = serde_json::to_value(&m).unwrap();
        assert!(json["kdr"].is_null());
        assert_eq!(json["uncertain_fraction"], 0.0);
    }
}
