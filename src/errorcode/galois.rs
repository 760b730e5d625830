//! This module contains the implementation of the GF(256) arithmetic used by
//! the Reed-Solomon codes in QR Code.
//!
//! An element of GF(256) is represented by an u8 value. Its bits are the
//! coefficients of a degree 7 polynomial, the least significant bit being
//! the coefficient for 1. For example:
//!
//! > 29 = 0b00011101 = x^4 + x^3 + x^2 + 1.
//!
//! Addition is done coefficient by coefficient, which is just XOR.
//!
//! Multiplication is defined modulo a fixed polynomial. QR Code uses
//! x^8 + x^4 + x^3 + x^2 + 1 (0x11D). With this choice x is a generator of
//! the multiplicative group, so every non-zero element is a power x^i with
//! i in 0..255 and x^255 = 1. The two lookup tables EXP and LOG translate
//! between both representations, turning a product into a sum of powers.
use core::ops::{Add, AddAssign, Mul};

use crate::error::QrError;

/// Compute the two lookup tables for GF(256).
const fn compute_exp_log() -> ([u8; 256], [u8; 256]) {
    let mut exp = [0u8; 256];
    let mut log = [0u8; 256];
    let mut p: u16 = 1; // polynomial representation
    let mut i: usize = 0; // power
    while i < 256 {
        exp[i] = p as u8;
        // x^255 = 1 again, the log of 1 stays 0
        if i < 255 {
            log[p as usize] = i as u8;
        }

        p <<= 1;
        if p >= 256 {
            p ^= 0x11D;
        }

        i += 1;
    }
    (exp, log)
}

/// Lookup table for x^i, indices 0 to 255.
const EXP: [u8; 256] = compute_exp_log().0;

/// Lookup table for the power i with x^i = n. The entry for 0 is unused.
const LOG: [u8; 256] = compute_exp_log().1;

/// Compute x^n for any integer `n`.
///
/// The exponent is reduced modulo 255 first, so negative values are fine.
pub fn exp(n: i32) -> u8 {
    EXP[n.rem_euclid(255) as usize]
}

/// Compute the power `i` such that x^i = `n`.
///
/// Fails with [QrError::LogOfZero] for `n = 0`.
pub fn log(n: u8) -> Result<u8, QrError> {
    if n == 0 {
        return Err(QrError::LogOfZero);
    }
    Ok(LOG[n as usize])
}

#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct GF(pub u8);

impl GF {
    pub fn primitive_power(i: i32) -> Self {
        GF(exp(i))
    }

    pub fn log(self) -> Result<i32, QrError> {
        log(self.0).map(i32::from)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl core::fmt::Debug for GF {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> Result<(), core::fmt::Error> {
        f.write_fmt(format_args!("{}₂₅₆", self.0))
    }
}

impl Add<GF> for GF {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        GF(self.0 ^ rhs.0)
    }
}

impl AddAssign<GF> for GF {
    fn add_assign(&mut self, rhs: GF) {
        *self = *self + rhs;
    }
}

impl Mul<GF> for GF {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        // zero has no logarithm, the product is zero anyway
        if self.0 == 0 || rhs.0 == 0 {
            return GF(0);
        }
        let ia = LOG[self.0 as usize] as i32;
        let ib = LOG[rhs.0 as usize] as i32;
        GF(exp(ia + ib))
    }
}

impl From<u8> for GF {
    fn from(i: u8) -> Self {
        GF(i)
    }
}

impl From<GF> for u8 {
    fn from(v: GF) -> u8 {
        v.0
    }
}

#[test]
fn sanity_check_tables() {
    use std::collections::HashSet;

    let exp: HashSet<u8> = EXP[..255].iter().cloned().collect();
    assert_eq!(exp.len(), 255);
    assert!(!exp.contains(&0));

    for i in 0..255 {
        assert_eq!(i, LOG[EXP[i] as usize] as usize);
        assert_eq!(i + 1, EXP[LOG[i + 1] as usize] as usize);
    }
}

#[test]
fn known_values() {
    assert_eq!(exp(0), 1);
    assert_eq!(exp(1), 2);
    assert_eq!(exp(8), 29);
    assert_eq!(exp(25), 3);
    assert_eq!(exp(255), 1);
    assert_eq!(exp(256), 2);
    assert_eq!(exp(-1), 142);
    assert_eq!(log(1), Ok(0));
    assert_eq!(log(2), Ok(1));
    assert_eq!(log(3), Ok(25));
    assert_eq!(log(255), Ok(175));
}

#[test]
fn log_of_zero_fails() {
    assert_eq!(log(0), Err(QrError::LogOfZero));
    assert_eq!(GF(0).log(), Err(QrError::LogOfZero));
}

#[test]
fn gf256_mul() {
    assert_eq!(GF(123) * GF(1), GF(123));
    assert_eq!(GF(234) * GF(0), GF(0));
    assert_eq!(GF(0) * GF(23), GF(0));
    assert_eq!(GF(2) * GF(128), GF(29));
    for a in 1..=255u8 {
        for b in 1..=255u8 {
            assert_eq!(GF(a) * GF(b), GF(b) * GF(a));
        }
    }
}

#[test]
fn test_primitive_power() {
    let mut a = GF(1);
    for i in 0..500 {
        assert_eq!(GF::primitive_power(i), a);
        a = a * GF(2);
    }
}
