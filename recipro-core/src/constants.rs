//! Protocol constants for RECIPRO.

// ═══════════════════════════════════════════════════════════════════════════════
// FINAL KEY
// ═══════════════════════════════════════════════════════════════════════════════

/// Width of the privacy-amplified final key in bits.
pub const FINAL_KEY_BITS: usize = 256;

/// Width of the privacy-amplified final key in bytes.
pub const FINAL_KEY_BYTES: usize = FINAL_KEY_BITS / 8;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR-CORRECTING CODES
// ═══════════════════════════════════════════════════════════════════════════════

/// Binary primitive BCH codes known to the codec factory, as `(n, k, t)`.
///
/// Each entry satisfies `n - k = deg g(x)` where `g` is the generator built
/// from the minimal polynomials of α¹..α²ᵗ.
pub const BCH_PARAMETERS: &[(usize, usize, usize)] = &[
    (7, 4, 1),
    (15, 7, 2),
    (31, 16, 3),
    (63, 36, 5),
    (127, 64, 10),
    (255, 139, 15),
];

/// Largest message length for which `CodecKind::Auto` builds a lookup table.
pub const AUTO_TABLE_MAX_K: usize = 8;

/// Hard limit on message length for the table codec (2^k codewords in memory).
pub const TABLE_CODEC_MAX_K: usize = 16;

/// Hard limit on block length for the table codec (codewords packed in a u64).
pub const TABLE_CODEC_MAX_N: usize = 64;

// ═══════════════════════════════════════════════════════════════════════════════
// KEY EXTRACTION DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Sample over-provisioning applied when a guard band is active.
/// Guard banding can erase most samples near the median.
pub const DEFAULT_OVER_PROVISIONING: usize = 5;

/// Minimum separation between List-Encoding extrema, in samples.
/// Should be at least the coherence time expressed in samples.
pub const DEFAULT_MIN_EXTREMA_SEPARATION: usize = 10;

/// Half-width of the search window a partner uses around each published index.
pub const DEFAULT_EXTREMA_WINDOW: usize = 5;

// ═══════════════════════════════════════════════════════════════════════════════
// EVALUATION DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default number of independent trials per evaluation.
pub const DEFAULT_TRIALS: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_key_width() {
        assert_eq!(FINAL_KEY_BITS, 256);
        assert_eq!(FINAL_KEY_BYTES, 32);
    }

    #[test]
    fn test_bch_parameters_are_consistent() {
        for &(n, k, t) in BCH_PARAMETERS {
            assert!((n + 1).is_power_of_two(), "n={} is not 2^m - 1", n);
            assert!(k < n);
            // Each of the t minimal polynomials has degree at most m.
            let m = (n + 1).trailing_zeros() as usize;
            assert!(n - k <= m * t);
        }
    }

    #[test]
    fn test_table_limits() {
        assert!(AUTO_TABLE_MAX_K <= TABLE_CODEC_MAX_K);
        assert!(TABLE_CODEC_MAX_N <= 64);
    }
}
