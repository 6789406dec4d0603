//! Monte-Carlo security evaluator.
//!
//! Each trial realizes a fresh three-party link, extracts raw keys, reconciles
//! Bob and Eve against Alice's public syndromes and tallies disagreements. A
//! run seeds one master ChaCha20 stream, draws one 64-bit seed per trial and
//! runs every trial on its own generator, so results depend only on the seed,
//! never on scheduling.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use recipro_channel::{ChannelModel, IqCorrelation, LinkParams, Modem};
use recipro_codec::build_codec;
use recipro_core::constants::FINAL_KEY_BITS;
use recipro_core::error::Result;
use recipro_core::traits::Codec;
use recipro_core::types::{BitString, LinkMeasurement, SecurityMeasurement};
use recipro_crypto::PrivacyAmplifier;
use recipro_keygen::{extract_raw_keys, ListEncoder, Quantizer, RawKeys, Reconciler};

use crate::config::{EvaluatorConfig, Extraction};

/// Trials between two progress callbacks.
const PROGRESS_INTERVAL: usize = 100;

/// Progress callback type.
pub type ProgressCallback = Box<dyn Fn(EvalProgress) + Send + Sync>;

/// Evaluation progress information.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvalProgress {
    /// Trials in the run.
    pub total: usize,
    /// Trials finished so far.
    pub completed: usize,
    /// Percentage complete (0-100).
    pub percent: f64,
}

impl EvalProgress {
    fn new(total: usize, completed: usize) -> Self {
        Self {
            total,
            completed,
            percent: completed as f64 / total.max(1) as f64 * 100.0,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TALLIES
// ═══════════════════════════════════════════════════════════════════════════════

/// Counters of one key-generation trial. Merging is plain addition.
#[derive(Clone, Debug, Default)]
struct KeyTally {
    skipped: usize,
    samples_generated: usize,
    samples_kept: usize,
    bits: usize,
    blocks: usize,
    decode_failures: usize,
    bob_raw_errors: usize,
    bob_errors: usize,
    eve_raw_errors: usize,
    eve_errors: usize,
    corr_ab: IqCorrelation,
    corr_ae: IqCorrelation,
    amplified: usize,
    bob_key_matches: usize,
    eve_key_matches: usize,
}

impl KeyTally {
    fn merge(&mut self, other: &KeyTally) {
        self.skipped += other.skipped;
        self.samples_generated += other.samples_generated;
        self.samples_kept += other.samples_kept;
        self.bits += other.bits;
        self.blocks += other.blocks;
        self.decode_failures += other.decode_failures;
        self.bob_raw_errors += other.bob_raw_errors;
        self.bob_errors += other.bob_errors;
        self.eve_raw_errors += other.eve_raw_errors;
        self.eve_errors += other.eve_errors;
        self.corr_ab.merge(&other.corr_ab);
        self.corr_ae.merge(&other.corr_ae);
        self.amplified += other.amplified;
        self.bob_key_matches += other.bob_key_matches;
        self.eve_key_matches += other.eve_key_matches;
    }

    fn into_measurement(self, trials: usize, amplify: bool) -> SecurityMeasurement {
        let agreement = |matches: usize| amplify.then(|| ratio(matches, self.amplified));
        SecurityMeasurement {
            trials,
            skipped_trials: self.skipped,
            bits_reconciled: self.bits,
            blocks: self.blocks,
            ber_bob_raw: ratio(self.bob_raw_errors, self.bits),
            kdr_bob: ratio(self.bob_errors, self.bits),
            ber_eve_raw: ratio(self.eve_raw_errors, self.bits),
            ber_eve_reconciled: ratio(self.eve_errors, self.bits),
            decode_failure_rate: ratio(self.decode_failures, self.blocks),
            corr_alice_bob: correlation(&self.corr_ab),
            corr_alice_eve: correlation(&self.corr_ae),
            samples_generated: self.samples_generated,
            samples_kept: self.samples_kept,
            final_key_agreement: agreement(self.bob_key_matches),
            eve_final_key_agreement: agreement(self.eve_key_matches),
        }
    }
}

/// Counters of one data-link trial.
#[derive(Clone, Debug, Default)]
struct LinkTally {
    bits: usize,
    raw_errors: usize,
    key_errors: usize,
    received: usize,
    uncertain: usize,
}

impl LinkTally {
    fn merge(&mut self, other: &LinkTally) {
        self.bits += other.bits;
        self.raw_errors += other.raw_errors;
        self.key_errors += other.key_errors;
        self.received += other.received;
        self.uncertain += other.uncertain;
    }
}

/// `NaN` when nothing was counted, so an empty run never reads as error-free.
fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        f64::NAN
    } else {
        num as f64 / den as f64
    }
}

fn correlation(acc: &IqCorrelation) -> f64 {
    if acc.count() == 0 {
        f64::NAN
    } else {
        acc.pearson()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVALUATOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Runs the key-generation pipeline over many independent trials.
pub struct SecurityEvaluator {
    config: EvaluatorConfig,
    link: LinkParams,
    codec: Arc<dyn Codec>,
    quantizer: Quantizer,
    list_encoder: Option<ListEncoder>,
    amplifier: Option<PrivacyAmplifier>,
}

impl SecurityEvaluator {
    /// Validates `config` and builds the shared codec.
    pub fn new(config: EvaluatorConfig) -> Result<Self> {
        config.validate()?;
        let codec = build_codec(&config.code)?;
        let quantizer = Quantizer::new(config.guard_band_sigma)?;
        let list_encoder = match config.extraction {
            Extraction::Threshold => None,
            Extraction::ListEncoding { min_separation, window } => Some(ListEncoder::new(min_separation, window)?),
        };
        let amplifier = if config.amplify {
            Some(PrivacyAmplifier::new(FINAL_KEY_BITS, config.hash)?)
        } else {
            None
        };

        Ok(Self {
            link: config.link_params(),
            config,
            codec,
            quantizer,
            list_encoder,
            amplifier,
        })
    }

    /// The validated configuration.
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// The shared codec.
    pub fn codec(&self) -> &Arc<dyn Codec> {
        &self.codec
    }

    /// Runs all trials from `seed`.
    #[instrument(skip(self), fields(trials = self.config.trials, n = self.codec.n(), guard = self.config.guard_band_sigma))]
    pub fn run(&self, seed: u64) -> Result<SecurityMeasurement> {
        self.run_inner(seed, None)
    }

    /// Runs all trials from `seed`, reporting progress every hundred trials and at the end.
    #[instrument(skip(self, progress_callback), fields(trials = self.config.trials))]
    pub fn run_with_progress(&self, seed: u64, progress_callback: ProgressCallback) -> Result<SecurityMeasurement> {
        self.run_inner(seed, Some(&progress_callback))
    }

    fn run_inner(&self, seed: u64, progress: Option<&ProgressCallback>) -> Result<SecurityMeasurement> {
        let trials = self.config.trials;
        let completed = AtomicUsize::new(0);
        let tick = || {
            if let Some(callback) = progress {
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if done % PROGRESS_INTERVAL == 0 && done < trials {
                    callback(EvalProgress::new(trials, done));
                }
            }
        };

        let tallies = map_trials(trial_seeds(seed, trials), |trial_seed| {
            let tally = self.key_trial(trial_seed);
            tick();
            tally
        })?;
        if let Some(callback) = progress {
            callback(EvalProgress::new(trials, trials));
        }

        let mut total = KeyTally::default();
        for tally in &tallies {
            total.merge(tally);
        }
        let measurement = total.into_measurement(trials, self.amplifier.is_some());

        if measurement.skipped_trials == trials {
            warn!(
                trials,
                n = self.codec.n(),
                "every trial was skipped; no trial produced a complete code block"
            );
        }
        info!(
            trials,
            skipped = measurement.skipped_trials,
            bits = measurement.bits_reconciled,
            kdr_bob = measurement.kdr_bob,
            ber_eve_raw = measurement.ber_eve_raw,
            ber_eve_reconciled = measurement.ber_eve_reconciled,
            corr_ab = measurement.corr_alice_bob,
            discarded = measurement.discarded_fraction(),
            "Evaluation complete"
        );
        Ok(measurement)
    }

    /// Transmits a random word over Alice's and Bob's channels through the
    /// modem, then reconciles Bob's demodulated word against Alice's.
    #[instrument(skip(self), fields(trials = self.config.trials, modulation = ?self.config.modulation))]
    pub fn run_data_link(&self, seed: u64) -> Result<LinkMeasurement> {
        let trials = self.config.trials;
        let tallies = map_trials(trial_seeds(seed, trials), |trial_seed| self.link_trial(trial_seed))?;

        let mut total = LinkTally::default();
        for tally in &tallies {
            total.merge(tally);
        }
        if total.bits == 0 {
            warn!(
                samples = self.config.samples,
                n = self.codec.n(),
                "word shorter than one code block; nothing reconciled"
            );
        }

        let measurement = LinkMeasurement {
            trials,
            bits: total.bits,
            ber: ratio(total.raw_errors, total.bits),
            kdr: ratio(total.key_errors, total.bits),
            uncertain_fraction: ratio(total.uncertain, total.received),
        };
        info!(
            trials,
            bits = measurement.bits,
            ber = measurement.ber,
            kdr = measurement.kdr,
            uncertain = measurement.uncertain_fraction,
            "Data-link evaluation complete"
        );
        Ok(measurement)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // TRIALS
    // ═══════════════════════════════════════════════════════════════════════════

    fn key_trial(&self, seed: u64) -> Result<KeyTally> {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let len = self.config.samples_per_trial();
        let link = ChannelModel::new(&mut rng).realize_link(&self.link, len)?;

        let mut tally = KeyTally {
            samples_generated: len,
            ..Default::default()
        };
        tally.corr_ab.extend(&link.alice, &link.bob);
        tally.corr_ae.extend(&link.alice, &link.eve);

        let alice_amps = link.alice_est.amplitudes();
        let bob_amps = link.bob_est.amplitudes();
        let eve_amps = link.eve_est.amplitudes();

        let raw = match &self.list_encoder {
            None => extract_raw_keys(
                &self.quantizer,
                self.config.erasure_policy,
                &alice_amps,
                &bob_amps,
                &eve_amps,
            )?,
            Some(encoder) => {
                let encoding = encoder.encode(&alice_amps);
                RawKeys {
                    bob: encoder.decode(&bob_amps, &encoding.indices)?,
                    eve: encoder.decode(&eve_amps, &encoding.indices)?,
                    alice: encoding.bits,
                    samples: len,
                }
            }
        };
        tally.samples_kept = match self.list_encoder {
            None => raw.kept(),
            Some(_) => len,
        };

        let n = self.codec.n();
        if raw.kept() < n {
            debug!(kept = raw.kept(), n, "skipping trial: not enough bits for one block");
            tally.skipped = 1;
            return Ok(tally);
        }

        let mut reconciler = Reconciler::new(Arc::clone(&self.codec), &mut rng);
        let syndromes = reconciler.publish_all(&raw.alice)?;
        let bob = reconciler.recover_all(&raw.bob, &syndromes)?;
        let eve = reconciler.recover_all(&raw.eve, &syndromes)?;

        let bits = bob.key.len();
        let reference = raw.alice.slice(0, bits)?;
        tally.bits = bits;
        tally.blocks = bob.blocks;
        tally.decode_failures = bob.decode_failures;
        tally.bob_raw_errors = reference.hamming_distance(&raw.bob.slice(0, bits)?)?;
        tally.eve_raw_errors = reference.hamming_distance(&raw.eve.slice(0, bits)?)?;
        tally.bob_errors = reference.hamming_distance(&bob.key)?;
        tally.eve_errors = reference.hamming_distance(&eve.key)?;

        if let Some(amplifier) = &self.amplifier {
            let alice_key = amplifier.final_key(&reference)?;
            tally.amplified = 1;
            if amplifier.final_key(&bob.key)? == alice_key {
                tally.bob_key_matches = 1;
            }
            if amplifier.final_key(&eve.key)? == alice_key {
                tally.eve_key_matches = 1;
            }
        }
        Ok(tally)
    }

    fn link_trial(&self, seed: u64) -> Result<LinkTally> {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let modulation = self.config.modulation;
        let symbols = modulation.symbols_for(self.config.samples);
        let link = ChannelModel::new(&mut rng).realize_link(&self.link, symbols)?;
        let word = BitString::random(&mut rng, self.config.samples);

        let (alice_rx, bob_rx) = {
            let mut modem = Modem::new(
                modulation,
                self.config.noise_variance,
                self.config.guard_band_sigma,
                &mut rng,
            )?;
            let alice_rx = modem.transmit(&word, &link.alice.amplitudes(), &link.alice_est.amplitudes())?;
            let bob_rx = modem.transmit(&word, &link.bob.amplitudes(), &link.bob_est.amplitudes())?;
            (alice_rx, bob_rx)
        };

        let mut reconciler = Reconciler::new(Arc::clone(&self.codec), &mut rng);
        let result = reconciler.reconcile(&alice_rx.bits, &bob_rx.bits)?;
        let bits = result.key.len();

        Ok(LinkTally {
            bits,
            raw_errors: result.reference.hamming_distance(&bob_rx.bits.slice(0, bits)?)?,
            key_errors: result.reference.hamming_distance(&result.key)?,
            received: alice_rx.bits.len() + bob_rx.bits.len(),
            uncertain: alice_rx.uncertain_count() + bob_rx.uncertain_count(),
        })
    }
}

impl std::fmt::Debug for SecurityEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityEvaluator")
            .field("config", &self.config)
            .field("code", &self.codec.params())
            .finish()
    }
}

/// Maps trial seeds to per-trial results, keeping seed order.
fn map_trials<T, F>(seeds: Vec<u64>, trial: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(u64) -> Result<T> + Sync + Send,
{
    #[cfg(feature = "parallel")]
    let results = seeds.into_par_iter().map(trial).collect();
    #[cfg(not(feature = "parallel"))]
    let results = seeds.into_iter().map(trial).collect();
    results
}

/// One seed per trial, drawn from a master stream seeded once per run.
fn trial_seeds(seed: u64, trials: usize) -> Vec<u64> {
    let mut master = ChaCha20Rng::seed_from_u64(seed);
    (0..trials).map(|_| master.next_u64()).collect()
}
