//! # RECIPRO Key Generation
//!
//! Turns channel observations into agreed key material.
//!
//! This crate provides:
//!
//! - **Quantizer**: median-threshold quantization with guard-band erasure
//! - **ListEncoder**: extremum-based extraction with public indices
//! - **Reconciler**: the code-offset secure sketch over any [`Codec`]
//!
//! ## Example
//!
//! ```rust
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//! use recipro_codec::codec_for;
//! use recipro_core::BitString;
//! use recipro_keygen::Reconciler;
//!
//! let mut reconciler = Reconciler::new(codec_for(15, 7).unwrap(), ChaCha20Rng::seed_from_u64(1));
//! let alice = BitString::parse("101100111000101").unwrap();
//! let bob = BitString::parse("101100101000100").unwrap();
//! let recovered = reconciler.reconcile_block(&alice, &bob).unwrap();
//! assert_eq!(recovered.key, alice);
//! ```
//!
//! [`Codec`]: recipro_core::Codec

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod list_encoding;
pub mod quantize;
pub mod reconcile;

pub use list_encoding::{ListEncoder, ListEncoding};
pub use quantize::{extract_raw_keys, ErasurePolicy, Quantizer, RawKeys};
pub use reconcile::{recover, Reconciler, Reconciliation, Recovered, Syndrome};
