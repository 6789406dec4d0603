//! The 256-bit output of privacy amplification.

use subtle::{Choice, ConstantTimeEq};
use zeroize::{Zeroize, ZeroizeOnDrop};

use recipro_core::constants::FINAL_KEY_BYTES;
use recipro_core::error::{ReciproError, Result};
use recipro_core::types::BitString;

// ═══════════════════════════════════════════════════════════════════════════════
// FINAL KEY
// ═══════════════════════════════════════════════════════════════════════════════

/// Shared secret key produced by privacy amplification.
///
/// Zeroized when dropped. Equality is constant time.
/// Never expose this key in logs or error messages.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct FinalKey {
    bytes: [u8; FINAL_KEY_BYTES],
}

impl FinalKey {
    /// Creates a key from raw bytes.
    ///
    /// # Errors
    /// Returns `LengthMismatch` if `bytes` is not [`FINAL_KEY_BYTES`] long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != FINAL_KEY_BYTES {
            return Err(ReciproError::LengthMismatch {
                expected: FINAL_KEY_BYTES,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; FINAL_KEY_BYTES];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Creates a key from a fixed-size array.
    pub fn from_array(bytes: [u8; FINAL_KEY_BYTES]) -> Self {
        Self { bytes }
    }

    /// Raw key bytes.
    ///
    /// # Security
    /// Handle the returned bytes carefully - do not log or expose them.
    pub fn as_bytes(&self) -> &[u8; FINAL_KEY_BYTES] {
        &self.bytes
    }

    /// The key as a bit string, MSB-first per byte.
    pub fn to_bits(&self) -> BitString {
        BitString::from_bytes(&self.bytes)
    }

    /// Lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl ConstantTimeEq for FinalKey {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.bytes.ct_eq(&other.bytes)
    }
}

impl PartialEq for FinalKey {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for FinalKey {}

impl std::fmt::Debug for FinalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FinalKey([REDACTED])")
    }
}
