//! # RECIPRO Cryptography
//!
//! Privacy amplification for the RECIPRO key-generation pipeline.
//!
//! This crate provides:
//!
//! - **Hash**: SHA-256, SHA-512, SHA3-256 and SHA3-512 behind [`HashAlgorithm`]
//! - **Amplification**: fixed-width compression of reconciled bits
//! - **FinalKey**: the 256-bit shared secret
//!
//! ## Security Properties
//!
//! - Final keys are zeroized on drop
//! - Final-key comparison is constant time
//! - Output width never depends on input width
//!
//! ## Example
//!
//! ```rust
//! use recipro_core::BitString;
//! use recipro_crypto::PrivacyAmplifier;
//!
//! let reconciled = BitString::parse("1011001110").unwrap();
//! let key = PrivacyAmplifier::default().final_key(&reconciled).unwrap();
//! assert_eq!(key.to_hex().len(), 64);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod amplify;
pub mod hash;
pub mod key;

// Re-export main items at crate root
pub use amplify::{amplify, PrivacyAmplifier};
pub use hash::HashAlgorithm;
pub use key::FinalKey;
