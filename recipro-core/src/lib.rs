//! # RECIPRO Core
//!
//! Core types, errors, and traits for RECIPRO, a physical-layer key generation
//! pipeline for reciprocal fading channels.
//!
//! This crate provides the foundational building blocks used by all other RECIPRO crates:
//!
//! - **Types**: bit strings, complex channel sequences, measurements, device profiles
//! - **Errors**: the eager-validation error taxonomy
//! - **Constants**: final key width, supported BCH parameters, extraction defaults
//! - **Traits**: the [`Codec`] capability set used by the secure sketch
//!
//! ## Example
//!
//! ```rust
//! use recipro_core::BitString;
//!
//! let alice = BitString::parse("1011001").unwrap();
//! let bob = BitString::parse("1001001").unwrap();
//! assert_eq!(alice.hamming_distance(&bob).unwrap(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{ReciproError, Result};
pub use traits::*;
pub use types::*;
