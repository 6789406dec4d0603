//! Domain types for RECIPRO.
//!
//! - [`BitString`]: raw keys, codewords, syndromes, reconciled keys
//! - [`ChannelSeq`]: complex channel coefficients observed by one party
//! - [`SecurityMeasurement`] / [`LinkMeasurement`]: evaluator output
//! - [`DeviceProfile`]: numeric parameters from an external profile table

mod bits;
mod csi;
mod measurement;
mod profile;

pub use bits::*;
pub use csi::*;
pub use measurement::*;
pub use profile::*;
