//! Brute-force nearest-codeword codec.
//!
//! Enumerates all 2^k codewords of a source code once and answers every
//! correction by exhaustive minimum-distance search. Only sensible for small
//! codes; limits are [`TABLE_CODEC_MAX_K`] and [`TABLE_CODEC_MAX_N`].

use std::collections::HashMap;

use tracing::debug;

use recipro_core::constants::{TABLE_CODEC_MAX_K, TABLE_CODEC_MAX_N};
use recipro_core::error::{ReciproError, Result};
use recipro_core::traits::{ensure_len, Codec, CodeParams, Correction, DecodeOutcome};
use recipro_core::types::BitString;

/// Precomputed codeword table with nearest-codeword search.
///
/// Ties between equally distant codewords go to the lowest message value.
#[derive(Clone, Debug)]
pub struct TableCodec {
    params: CodeParams,
    /// Codeword for message value `i`, packed with position `j` at bit `j`.
    codewords: Vec<u64>,
    messages: HashMap<u64, u64>,
}

impl TableCodec {
    /// Tabulates every codeword of `source`.
    ///
    /// # Errors
    /// Returns `InvalidParameter` if the code exceeds the table limits.
    pub fn from_codec(source: &dyn Codec) -> Result<Self> {
        let params = source.params();
        if params.k > TABLE_CODEC_MAX_K || params.n > TABLE_CODEC_MAX_N {
            return Err(ReciproError::invalid(format!(
                "code ({}, {}) is too large for a lookup table",
                params.n, params.k
            )));
        }

        let size = 1u64 << params.k;
        let mut codewords = Vec::with_capacity(size as usize);
        let mut messages = HashMap::with_capacity(size as usize);
        for value in 0..size {
            let codeword = source.encode(&BitString::from_u64(value, params.k))?.to_u64()?;
            codewords.push(codeword);
            messages.insert(codeword, value);
        }
        debug!(n = params.n, k = params.k, entries = codewords.len(), "built codeword table");

        Ok(Self {
            params,
            codewords,
            messages,
        })
    }

    /// Number of tabulated codewords (2^k).
    pub fn len(&self) -> usize {
        self.codewords.len()
    }

    /// Always false; a code has at least one codeword.
    pub fn is_empty(&self) -> bool {
        self.codewords.is_empty()
    }

    fn nearest(&self, received: u64) -> (u64, usize) {
        let mut best = (0u64, usize::MAX);
        for &codeword in &self.codewords {
            let distance = (codeword ^ received).count_ones() as usize;
            if distance < best.1 {
                best = (codeword, distance);
                if distance == 0 {
                    break;
                }
            }
        }
        best
    }
}

impl Codec for TableCodec {
    fn params(&self) -> CodeParams {
        self.params
    }

    fn encode(&self, message: &BitString) -> Result<BitString> {
        ensure_len(message, self.params.k)?;
        let index = message.to_u64()? as usize;
        Ok(BitString::from_u64(self.codewords[index], self.params.n))
    }

    fn correct(&self, received: &BitString) -> Result<Correction> {
        ensure_len(received, self.params.n)?;
        let (codeword, distance) = self.nearest(received.to_u64()?);
        let outcome = match distance {
            0 => DecodeOutcome::Clean,
            d if d <= self.params.t => DecodeOutcome::Corrected(d),
            _ => DecodeOutcome::Uncorrectable,
        };
        Ok(Correction {
            codeword: BitString::from_u64(codeword, self.params.n),
            outcome,
        })
    }

    fn message_of(&self, codeword: &BitString) -> Result<BitString> {
        ensure_len(codeword, self.params.n)?;
        let packed = codeword.to_u64()?;
        let value = match self.messages.get(&packed) {
            Some(&value) => value,
            None => {
                let (nearest, _) = self.nearest(packed);
                self.messages.get(&nearest).copied().unwrap_or_default()
            }
        };
        Ok(BitString::from_u64(value, self.params.k))
    }
}
