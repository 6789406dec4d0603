//! # RECIPRO Evaluator
//!
//! Monte-Carlo evaluation of the RECIPRO key-generation pipeline.
//!
//! This crate provides:
//!
//! - **EvaluatorConfig**: serde-loadable run configuration with builder setters
//! - **SecurityEvaluator**: key-generation runs reporting KDR, Eve's BER and
//!   channel correlations, plus a data-link mode through the modem
//!
//! Trials run on `rayon` when the default `parallel` feature is enabled. The
//! numbers are the same either way.
//!
//! ## Example
//!
//! ```rust
//! use recipro_evaluator::{EvaluatorConfig, SecurityEvaluator};
//!
//! let config = EvaluatorConfig::new().trials(20).rho_ae(0.0);
//! let evaluator = SecurityEvaluator::new(config).unwrap();
//! let measurement = evaluator.run(42).unwrap();
//! assert!(measurement.ber_eve_raw > 0.3);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod config;
pub mod evaluator;

pub use config::{EvaluatorConfig, Extraction};
pub use evaluator::{EvalProgress, ProgressCallback, SecurityEvaluator};
