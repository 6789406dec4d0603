//! Code-offset secure sketch.
//!
//! ## Protocol (per n-bit block)
//!
//! ```text
//! Alice:  C ← uniform codeword          (fresh for every block)
//!         S = K_A ⊕ C                   (published)
//! Bob:    C_B = K_B ⊕ S = C ⊕ e
//!         Ĉ   = nearest_codeword(C_B)
//!         K̂   = S ⊕ Ĉ
//! ```
//!
//! If weight(e) ≤ t then K̂ = K_A. Otherwise K̂ is silently wrong and the
//! failure shows up only in disagreement statistics. Leftover bits that do not
//! fill a block are never reconciled.

use std::sync::Arc;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::trace;

use recipro_core::error::{ReciproError, Result};
use recipro_core::traits::{ensure_len, Codec, DecodeOutcome};
use recipro_core::types::BitString;

/// Public helper data for one block: Alice's key XOR a random codeword.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Syndrome(BitString);

impl Syndrome {
    /// The published bits.
    pub fn bits(&self) -> &BitString {
        &self.0
    }

    /// Block length.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a zero-length syndrome.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A partner's reconciled block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recovered {
    /// Reconciled key block.
    pub key: BitString,
    /// How decoding ended.
    pub outcome: DecodeOutcome,
}

/// Multi-block reconciliation result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Alice's key cut to whole blocks.
    pub reference: BitString,
    /// Reconciled key, same length as `reference`.
    pub key: BitString,
    /// Number of blocks processed.
    pub blocks: usize,
    /// Blocks the decoder gave up on.
    pub decode_failures: usize,
}

/// Secure-sketch reconciler over a shared codec.
pub struct Reconciler<R> {
    codec: Arc<dyn Codec>,
    rng: R,
}

impl<R: RngCore> Reconciler<R> {
    /// Builds a reconciler drawing codewords from `rng`.
    pub fn new(codec: Arc<dyn Codec>, rng: R) -> Self {
        Self { codec, rng }
    }

    /// The underlying codec.
    pub fn codec(&self) -> &Arc<dyn Codec> {
        &self.codec
    }

    /// Block length n.
    pub fn block_len(&self) -> usize {
        self.codec.n()
    }

    /// Alice's side: draws a fresh codeword and publishes `alice ⊕ C`.
    ///
    /// # Errors
    /// `LengthMismatch` unless `alice` is exactly one block.
    pub fn publish(&mut self, alice: &BitString) -> Result<Syndrome> {
        ensure_len(alice, self.codec.n())?;
        let codeword = self.codec.random_codeword(&mut self.rng)?;
        Ok(Syndrome(alice.xor(&codeword)?))
    }

    /// Publishes one syndrome per whole block of `alice`, dropping the tail.
    pub fn publish_all(&mut self, alice: &BitString) -> Result<Vec<Syndrome>> {
        let n = self.codec.n();
        alice.blocks(n).map(|block| self.publish(&block)).collect()
    }

    /// Reconciles the first `syndromes.len()` blocks of `key` against Alice's
    /// published syndromes. Used by Bob and, in evaluation, by Eve.
    ///
    /// # Errors
    /// `LengthMismatch` if `key` is shorter than the published blocks.
    pub fn recover_all(&self, key: &BitString, syndromes: &[Syndrome]) -> Result<Reconciliation> {
        let n = self.codec.n();
        let needed = syndromes.len() * n;
        if key.len() < needed {
            return Err(ReciproError::LengthMismatch {
                expected: needed,
                actual: key.len(),
            });
        }

        let mut out = Reconciliation {
            blocks: syndromes.len(),
            ..Default::default()
        };
        for (block, syndrome) in key.blocks(n).zip(syndromes) {
            let recovered = recover(self.codec.as_ref(), &block, syndrome)?;
            if recovered.outcome == DecodeOutcome::Uncorrectable {
                out.decode_failures += 1;
            }
            out.key.extend_from(&recovered.key);
        }
        Ok(out)
    }

    /// Runs the whole exchange for one block.
    pub fn reconcile_block(&mut self, alice: &BitString, bob: &BitString) -> Result<Recovered> {
        let syndrome = self.publish(alice)?;
        recover(self.codec.as_ref(), bob, &syndrome)
    }

    /// Runs the exchange block by block over equally long keys.
    ///
    /// # Errors
    /// `LengthMismatch` if the keys differ in length.
    pub fn reconcile(&mut self, alice: &BitString, bob: &BitString) -> Result<Reconciliation> {
        if alice.len() != bob.len() {
            return Err(ReciproError::LengthMismatch {
                expected: alice.len(),
                actual: bob.len(),
            });
        }
        let syndromes = self.publish_all(alice)?;
        let mut result = self.recover_all(bob, &syndromes)?;
        result.reference = alice.slice(0, result.key.len())?;
        trace!(blocks = result.blocks, failures = result.decode_failures, "reconciled");
        Ok(result)
    }
}

/// Partner side of one block: `S ⊕ nearest_codeword(key ⊕ S)`.
pub fn recover(codec: &dyn Codec, key: &BitString, syndrome: &Syndrome) -> Result<Recovered> {
    ensure_len(key, codec.n())?;
    ensure_len(&syndrome.0, codec.n())?;
    let noisy_codeword = key.xor(&syndrome.0)?;
    let correction = codec.correct(&noisy_codeword)?;
    Ok(Recovered {
        key: syndrome.0.xor(&correction.codeword)?,
        outcome: correction.outcome,
    })
}

impl<R> std::fmt::Debug for Reconciler<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("params", &self.codec.params())
            .finish()
    }
}
