//! # RECIPRO Codecs
//!
//! Binary error-correcting codes for the code-offset secure sketch.
//!
//! This crate provides:
//!
//! - **GF(2^m)**: log/antilog field arithmetic
//! - **BCH**: algebraic decoding (Berlekamp–Massey + Chien search)
//! - **Table**: exhaustive nearest-codeword search for small codes
//! - **Factory**: [`build_codec`] keyed on `(n, k)`
//!
//! ## Example
//!
//! ```rust
//! use recipro_codec::codec_for;
//! use recipro_core::BitString;
//!
//! let codec = codec_for(15, 7).unwrap();
//! let message = BitString::parse("1011001").unwrap();
//! let mut received = codec.encode(&message).unwrap();
//! received.flip(2);
//! received.flip(11);
//! assert_eq!(codec.decode(&received).unwrap(), message);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod bch;
pub mod gf;
pub mod table;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use recipro_core::constants::{AUTO_TABLE_MAX_K, BCH_PARAMETERS};
use recipro_core::error::{ReciproError, Result};
use recipro_core::traits::Codec;

pub use bch::BchCode;
pub use gf::GaloisField;
pub use table::TableCodec;

/// Which decoder implementation to build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodecKind {
    /// Table lookup for small message lengths, algebraic otherwise.
    #[default]
    Auto,
    /// Berlekamp–Massey BCH decoder.
    Algebraic,
    /// Exhaustive nearest-codeword table.
    Table,
}

/// Code selection: block length, message length, decoder kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSpec {
    /// Block length.
    pub n: usize,
    /// Message length.
    pub k: usize,
    /// Decoder implementation.
    #[serde(default)]
    pub kind: CodecKind,
}

impl CodeSpec {
    /// Code `(n, k)` with the automatic decoder choice.
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            k,
            kind: CodecKind::Auto,
        }
    }

    /// Sets the decoder kind.
    pub fn with_kind(mut self, kind: CodecKind) -> Self {
        self.kind = kind;
        self
    }
}

impl Default for CodeSpec {
    fn default() -> Self {
        Self::new(15, 7)
    }
}

/// Correction radius of a supported BCH code.
pub fn bch_t_for(n: usize, k: usize) -> Result<usize> {
    BCH_PARAMETERS
        .iter()
        .find(|&&(pn, pk, _)| pn == n && pk == k)
        .map(|&(_, _, t)| t)
        .ok_or(ReciproError::UnsupportedCode { n, k })
}

/// Builds the codec described by `spec`.
///
/// # Errors
/// `UnsupportedCode` for an `(n, k)` pair outside [`BCH_PARAMETERS`];
/// `InvalidParameter` if a table is requested for a code that is too large.
pub fn build_codec(spec: &CodeSpec) -> Result<Arc<dyn Codec>> {
    let t = bch_t_for(spec.n, spec.k)?;
    let bch = BchCode::new(spec.n, spec.k, t)?;

    let use_table = match spec.kind {
        CodecKind::Auto => spec.k <= AUTO_TABLE_MAX_K,
        CodecKind::Algebraic => false,
        CodecKind::Table => true,
    };

    debug!(n = spec.n, k = spec.k, t, table = use_table, "building codec");
    if use_table {
        Ok(Arc::new(TableCodec::from_codec(&bch)?))
    } else {
        Ok(Arc::new(bch))
    }
}

/// Builds the default codec for `(n, k)`.
pub fn codec_for(n: usize, k: usize) -> Result<Arc<dyn Codec>> {
    build_codec(&CodeSpec::new(n, k))
}
