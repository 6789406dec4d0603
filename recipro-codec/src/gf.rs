//! Arithmetic in GF(2^m).
//!
//! Elements are stored as `u16` bit vectors over the polynomial basis.
//! Multiplication and inversion go through exp/log tables built from a
//! primitive polynomial, so α (the element `0b10`) generates the multiplicative group.

use recipro_core::error::{ReciproError, Result};

/// Primitive polynomials indexed by degree m, including the x^m term.
const PRIMITIVE_POLYNOMIALS: [(u32, u32); 9] = [
    (2, 0b111),
    (3, 0b1011),
    (4, 0b1_0011),
    (5, 0b10_0101),
    (6, 0b100_0011),
    (7, 0b1000_1001),
    (8, 0b1_0001_1101),
    (9, 0b10_0001_0001),
    (10, 0b100_0000_1001),
];

/// The finite field GF(2^m) with log/antilog tables.
#[derive(Clone, Debug)]
pub struct GaloisField {
    m: u32,
    order: usize,
    exp: Vec<u16>,
    log: Vec<usize>,
}

impl GaloisField {
    /// Builds GF(2^m) for 2 ≤ m ≤ 10.
    pub fn new(m: u32) -> Result<Self> {
        let poly = PRIMITIVE_POLYNOMIALS
            .iter()
            .find(|(deg, _)| *deg == m)
            .map(|(_, p)| *p)
            .ok_or_else(|| ReciproError::invalid(format!("GF(2^{}) is not supported", m)))?;

        let size = 1usize << m;
        let order = size - 1;
        let mut exp = vec![0u16; 2 * order];
        let mut log = vec![0usize; size];

        let mut x: u32 = 1;
        for i in 0..order {
            exp[i] = x as u16;
            log[x as usize] = i;
            x <<= 1;
            if x & (1 << m) != 0 {
                x ^= poly;
            }
        }
        for i in order..2 * order {
            exp[i] = exp[i - order];
        }

        Ok(Self { m, order, exp, log })
    }

    /// Extension degree m.
    pub fn degree(&self) -> u32 {
        self.m
    }

    /// Size of the multiplicative group, 2^m − 1.
    pub fn order(&self) -> usize {
        self.order
    }

    /// α^i for any non-negative exponent.
    pub fn alpha_pow(&self, i: usize) -> u16 {
        self.exp[i % self.order]
    }

    /// Discrete logarithm base α, or `None` for zero and for values outside the field.
    pub fn log(&self, a: u16) -> Option<usize> {
        if a == 0 || a as usize > self.order {
            return None;
        }
        Some(self.log[a as usize])
    }

    /// Field multiplication.
    pub fn mul(&self, a: u16, b: u16) -> u16 {
        if a == 0 || b == 0 {
            0
        } else {
            self.exp[self.log[a as usize] + self.log[b as usize]]
        }
    }

    /// Multiplicative inverse. `a` must be non-zero.
    pub fn inv(&self, a: u16) -> u16 {
        debug_assert!(a != 0);
        self.exp[(self.order - self.log[a as usize]) % self.order]
    }

    /// Field division. `b` must be non-zero.
    pub fn div(&self, a: u16, b: u16) -> u16 {
        self.mul(a, self.inv(b))
    }

    /// Evaluates a polynomial (coefficients lowest degree first) at `x` by Horner's rule.
    pub fn eval(&self, poly: &[u16], x: u16) -> u16 {
        poly.iter().rev().fold(0u16, |acc, &c| self.mul(acc, x) ^ c)
    }

    /// Multiplies two polynomials with coefficients in the field.
    pub fn poly_mul(&self, a: &[u16], b: &[u16]) -> Vec<u16> {
        if a.is_empty() || b.is_empty() {
            return Vec::new();
        }
        let mut out = vec![0u16; a.len() + b.len() - 1];
        for (i, &ai) in a.iter().enumerate() {
            if ai == 0 {
                continue;
            }
            for (j, &bj) in b.iter().enumerate() {
                out[i + j] ^= self.mul(ai, bj);
            }
        }
        out
    }

    /// Cyclotomic coset of `i` modulo 2^m − 1: {i, 2i, 4i, ...}.
    pub fn cyclotomic_coset(&self, i: usize) -> Vec<usize> {
        let mut coset = Vec::new();
        let mut j = i % self.order;
        loop {
            coset.push(j);
            j = (j * 2) % self.order;
            if j == i % self.order {
                break;
            }
        }
        coset
    }

    /// Minimal polynomial of α^i over GF(2), coefficients lowest degree first.
    pub fn minimal_polynomial(&self, i: usize) -> Vec<u8> {
        let mut poly: Vec<u16> = vec![1];
        for j in self.cyclotomic_coset(i) {
            // (x + α^j)
            poly = self.poly_mul(&poly, &[self.alpha_pow(j), 1]);
        }
        // Products over a full coset have binary coefficients.
        poly.into_iter().map(|c| (c & 1) as u8).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_generates_group() {
        for m in 2..=10 {
            let gf = GaloisField::new(m).unwrap();
            let mut seen = vec![false; gf.order() + 1];
            for i in 0..gf.order() {
                let a = gf.alpha_pow(i) as usize;
                assert!(!seen[a], "alpha^{} repeats in GF(2^{})", i, m);
                seen[a] = true;
            }
            assert!(!seen[0]);
        }
    }

    #[test]
    fn test_unsupported_degree() {
        assert!(GaloisField::new(1).is_err());
        assert!(GaloisField::new(11).is_err());
    }

    #[test]
    fn test_log_inverts_alpha_pow() {
        let gf = GaloisField::new(5).unwrap();
        for i in 0..gf.order() {
            assert_eq!(gf.log(gf.alpha_pow(i)), Some(i));
        }
        assert_eq!(gf.log(0), None);
        assert_eq!(gf.log(32), None);
    }

    #[test]
    fn test_inverse_and_division() {
        let gf = GaloisField::new(4).unwrap();
        for a in 1u16..16 {
            assert_eq!(gf.mul(a, gf.inv(a)), 1);
            assert_eq!(gf.div(a, a), 1);
        }
        assert_eq!(gf.mul(0, 7), 0);
    }

    #[test]
    fn test_minimal_polynomials_gf16() {
        let gf = GaloisField::new(4).unwrap();
        // m1(x) = x^4 + x + 1, m3(x) = x^4 + x^3 + x^2 + x + 1
        assert_eq!(gf.minimal_polynomial(1), vec![1, 1, 0, 0, 1]);
        assert_eq!(gf.minimal_polynomial(3), vec![1, 1, 1, 1, 1]);
        // m5(x) = x^2 + x + 1 (coset {5, 10})
        assert_eq!(gf.minimal_polynomial(5), vec![1, 1, 1]);
    }

    #[test]
    fn test_minimal_polynomial_has_root() {
        let gf = GaloisField::new(5).unwrap();
        let m3: Vec<u16> = gf.minimal_polynomial(3).into_iter().map(u16::from).collect();
        assert_eq!(gf.eval(&m3, gf.alpha_pow(3)), 0);
        assert_eq!(gf.eval(&m3, gf.alpha_pow(6)), 0);
        assert_ne!(gf.eval(&m3, gf.alpha_pow(1)), 0);
    }
}
