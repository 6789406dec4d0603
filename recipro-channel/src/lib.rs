//! # RECIPRO Channel
//!
//! Channel side of the RECIPRO key-generation pipeline.
//!
//! This crate provides:
//!
//! - **ChannelModel**: correlated complex Rayleigh coefficients for Alice, Bob
//!   and Eve, with amplitude-proportional estimation error
//! - **Modem**: BPSK/QPSK over the fading channel with guard-band flagging
//! - **Stats**: median, population std and mergeable Pearson accumulators
//!
//! All randomness comes from the `Rng` handed to a component's constructor,
//! so a trial is fully determined by its seed.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod channel;
pub mod modem;
pub mod stats;

pub use channel::{ChannelModel, ErrorScale, LinkParams, LinkTriad};
pub use modem::{Demodulated, Modem, Modulation};
pub use stats::{mean, median, pearson, std_dev, CorrelationAccumulator, IqCorrelation};
