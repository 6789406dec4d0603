//! Bit sequences.
//!
//! [`BitString`] carries raw key bits, codewords, syndromes and reconciled keys.
//! Bitwise operations between two strings validate their lengths eagerly.

use std::fmt;
use std::ops::Index;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::{ReciproError, Result};

/// An owned, ordered sequence of bits.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BitString {
    bits: Vec<bool>,
}

impl BitString {
    /// Creates a bit string from booleans.
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Creates an all-zero bit string.
    pub fn zeros(len: usize) -> Self {
        Self {
            bits: vec![false; len],
        }
    }

    /// Creates a bit string from `0`/`1` integers.
    ///
    /// # Errors
    /// Returns `InvalidParameter` if any value is not 0 or 1.
    pub fn from_bits(values: &[u8]) -> Result<Self> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| match v {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(ReciproError::invalid(format!(
                    "bit {} has value {}, expected 0 or 1",
                    i, other
                ))),
            })
            .collect::<Result<Vec<_>>>()
            .map(Self::new)
    }

    /// Parses a string of `'0'` and `'1'` characters.
    pub fn parse(s: &str) -> Result<Self> {
        s.chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(ReciproError::invalid(format!("invalid bit character '{}'", other))),
            })
            .collect::<Result<Vec<_>>>()
            .map(Self::new)
    }

    /// Draws `len` independent uniform bits.
    pub fn random<R: RngCore + ?Sized>(rng: &mut R, len: usize) -> Self {
        Self {
            bits: (0..len).map(|_| rng.gen::<bool>()).collect(),
        }
    }

    /// Unpacks bytes MSB-first.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bits: bytes
                .iter()
                .flat_map(|&byte| (0..8).rev().map(move |i| (byte >> i) & 1 == 1))
                .collect(),
        }
    }

    /// Builds a `len`-bit string where position `i` holds bit `i` of `value`.
    pub fn from_u64(value: u64, len: usize) -> Self {
        debug_assert!(len <= 64);
        Self {
            bits: (0..len).map(|i| (value >> i) & 1 == 1).collect(),
        }
    }

    /// Packs the string into a `u64` with position `i` at bit `i`.
    ///
    /// # Errors
    /// Returns `InvalidParameter` if the string is longer than 64 bits.
    pub fn to_u64(&self) -> Result<u64> {
        if self.bits.len() > 64 {
            return Err(ReciproError::invalid(format!(
                "{} bits do not fit in a u64",
                self.bits.len()
            )));
        }
        Ok(self
            .bits
            .iter()
            .enumerate()
            .fold(0u64, |acc, (i, &b)| acc | ((b as u64) << i)))
    }

    /// Packs bits MSB-first, left-padding with zero bits to a whole byte.
    ///
    /// `[1, 0, 1]` becomes `0b0000_0101`, the big-endian integer value of the bits.
    pub fn to_bytes_left_padded(&self) -> Vec<u8> {
        let pad = (8 - self.bits.len() % 8) % 8;
        let padded = std::iter::repeat(false).take(pad).chain(self.bits.iter().copied());

        let mut out = Vec::with_capacity((self.bits.len() + pad) / 8);
        let mut byte = 0u8;
        for (i, bit) in padded.enumerate() {
            byte = (byte << 1) | bit as u8;
            if i % 8 == 7 {
                out.push(byte);
                byte = 0;
            }
        }
        out
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Returns true if the string holds no bits.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Borrows the underlying booleans.
    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    /// Consumes the string, returning the booleans.
    pub fn into_inner(self) -> Vec<bool> {
        self.bits
    }

    /// Iterates over the bits.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }

    /// Appends a bit.
    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    /// Inverts the bit at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn flip(&mut self, index: usize) {
        self.bits[index] = !self.bits[index];
    }

    /// Shortens the string to `len` bits. Longer lengths are a no-op.
    pub fn truncate(&mut self, len: usize) {
        self.bits.truncate(len);
    }

    /// Returns the sub-string `[start, end)`.
    ///
    /// # Errors
    /// Returns `InvalidParameter` if `start > end` or `end` is past the last bit.
    pub fn slice(&self, start: usize, end: usize) -> Result<Self> {
        match self.bits.get(start..end) {
            Some(bits) => Ok(Self { bits: bits.to_vec() }),
            None => Err(ReciproError::invalid(format!(
                "range {}..{} outside a {}-bit string",
                start,
                end,
                self.bits.len()
            ))),
        }
    }

    /// Splits into consecutive `block_len`-bit blocks; a trailing partial block is dropped.
    pub fn blocks(&self, block_len: usize) -> impl Iterator<Item = BitString> + '_ {
        self.bits
            .chunks_exact(block_len.max(1))
            .map(|chunk| BitString::new(chunk.to_vec()))
    }

    /// Appends every bit of `other`.
    pub fn extend_from(&mut self, other: &BitString) {
        self.bits.extend_from_slice(&other.bits);
    }

    /// Number of one bits (Hamming weight).
    pub fn weight(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Bitwise XOR.
    ///
    /// # Errors
    /// Returns `InvalidParameter` if the strings differ in length.
    pub fn xor(&self, other: &BitString) -> Result<BitString> {
        self.check_len(other)?;
        Ok(self
            .bits
            .iter()
            .zip(other.bits.iter())
            .map(|(&a, &b)| a ^ b)
            .collect())
    }

    /// Number of positions where the strings differ.
    ///
    /// # Errors
    /// Returns `InvalidParameter` if the strings differ in length.
    pub fn hamming_distance(&self, other: &BitString) -> Result<usize> {
        self.check_len(other)?;
        Ok(self
            .bits
            .iter()
            .zip(other.bits.iter())
            .filter(|(a, b)| a != b)
            .count())
    }

    fn check_len(&self, other: &BitString) -> Result<()> {
        if self.bits.len() != other.bits.len() {
            return Err(ReciproError::invalid(format!(
                "bit strings differ in length: {} vs {}",
                self.bits.len(),
                other.bits.len()
            )));
        }
        Ok(())
    }
}

impl Index<usize> for BitString {
    type Output = bool;

    fn index(&self, index: usize) -> &bool {
        &self.bits[index]
    }
}

impl From<Vec<bool>> for BitString {
    fn from(bits: Vec<bool>) -> Self {
        Self::new(bits)
    }
}

impl FromIterator<bool> for BitString {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self {
            bits: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.bits {
            f.write_str(if b { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bits.len() <= 64 {
            write!(f, "BitString({})", self)
        } else {
            write!(f, "BitString({} bits, weight {})", self.bits.len(), self.weight())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_from_bits_rejects_non_binary() {
        assert!(BitString::from_bits(&[0, 1, 1, 0]).is_ok());
        let err = BitString::from_bits(&[0, 2]).unwrap_err();
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_parse_and_display() {
        let bits = BitString::parse("1011001").unwrap();
        assert_eq!(bits.len(), 7);
        assert_eq!(bits.weight(), 4);
        assert_eq!(bits.to_string(), "1011001");
        assert!(BitString::parse("10x").is_err());
    }

    #[test]
    fn test_xor_length_mismatch() {
        let a = BitString::zeros(7);
        let b = BitString::zeros(8);
        assert!(matches!(a.xor(&b), Err(ReciproError::InvalidParameter(_))));
        assert!(matches!(
            a.hamming_distance(&b),
            Err(ReciproError::InvalidParameter(_))
        ));
        assert!(a.xor(&b).unwrap_err().is_validation_error());
    }

    #[test]
    fn test_slice_checks_range() {
        let bits = BitString::parse("110010").unwrap();
        assert_eq!(bits.slice(1, 4).unwrap().to_string(), "100");
        assert!(bits.slice(6, 6).unwrap().is_empty());
        assert!(matches!(bits.slice(4, 7), Err(ReciproError::InvalidParameter(_))));
        assert!(matches!(bits.slice(4, 2), Err(ReciproError::InvalidParameter(_))));
    }

    #[test]
    fn test_left_padded_bytes() {
        let bits = BitString::parse("101").unwrap();
        assert_eq!(bits.to_bytes_left_padded(), vec![0b0000_0101]);

        let bits = BitString::parse("1000000011").unwrap();
        assert_eq!(bits.to_bytes_left_padded(), vec![0b0000_0010, 0b0000_0011]);

        let bits = BitString::parse("11110000").unwrap();
        assert_eq!(bits.to_bytes_left_padded(), vec![0xF0]);
    }

    #[test]
    fn test_from_bytes_msb_first() {
        let bits = BitString::from_bytes(&[0b1000_0001]);
        assert_eq!(bits.to_string(), "10000001");
    }

    #[test]
    fn test_u64_packing() {
        let bits = BitString::parse("1100").unwrap();
        assert_eq!(bits.to_u64().unwrap(), 0b0011);
        assert_eq!(BitString::from_u64(0b0011, 4), bits);
        assert!(BitString::zeros(65).to_u64().is_err());
    }

    #[test]
    fn test_blocks_drop_partial_tail() {
        let bits = BitString::zeros(37);
        let blocks: Vec<_> = bits.blocks(15).collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.len() == 15));
    }

    #[test]
    fn test_random_is_seeded() {
        let mut a = ChaCha20Rng::seed_from_u64(7);
        let mut b = ChaCha20Rng::seed_from_u64(7);
        assert_eq!(BitString::random(&mut a, 100), BitString::random(&mut b, 100));
    }

    proptest! {
        #[test]
        fn prop_xor_weight_is_hamming_distance(
            a in proptest::collection::vec(any::<bool>(), 0..200),
            seed in any::<u64>(),
        ) {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let a = BitString::new(a);
            let b = BitString::random(&mut rng, a.len());
            let diff = a.xor(&b).unwrap();
            prop_assert_eq!(diff.weight(), a.hamming_distance(&b).unwrap());
            prop_assert_eq!(diff.xor(&b).unwrap(), a);
        }

        #[test]
        fn prop_padded_bytes_roundtrip_value(a in proptest::collection::vec(any::<bool>(), 1..64)) {
            let bits = BitString::new(a);
            let bytes = bits.to_bytes_left_padded();
            prop_assert_eq!(bytes.len(), (bits.len() + 7) / 8);
            let unpacked = BitString::from_bytes(&bytes);
            let pad = unpacked.len() - bits.len();
            prop_assert_eq!(unpacked.slice(pad, unpacked.len()).unwrap(), bits);
            prop_assert_eq!(unpacked.slice(0, pad).unwrap().weight(), 0);
        }
    }
}
