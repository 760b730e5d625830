//! BCH protected format and version information.
//!
//! The format information holds the error correction level and the mask
//! pattern in 5 bits, extended by 10 check bits of a BCH(15,5) code and
//! XORed with a fixed mask so it is never all zero. Symbols of version 7
//! and up also carry their version number in 6 bits with 12 check bits of
//! a BCH(18,6) code.
use super::mask::MaskPattern;
use crate::version::{EcLevel, Version};

#[cfg(test)]
use pretty_assertions::assert_eq;

/// Generator polynomial of the format information code.
pub const G15: u32 = 0b101_0011_0111;

/// Generator polynomial of the version information code.
pub const G18: u32 = 0b1_1111_0010_0101;

/// XOR mask applied to the format information.
pub const G15_MASK: u32 = 0b101_0100_0001_0010;

/// Number of significant bits of `data`.
fn bch_digit(data: u32) -> u32 {
    u32::BITS - data.leading_zeros()
}

/// Remainder of `data * x^(deg g)` divided by `g`, as polynomials over GF(2).
fn bch_remainder(data: u32, generator: u32) -> u32 {
    let g_digit = bch_digit(generator);
    let mut d = data << (g_digit - 1);
    while bch_digit(d) >= g_digit {
        d ^= generator << (bch_digit(d) - g_digit);
    }
    d
}

/// The 15 format information bits, least significant bit placed first.
pub fn format_info_bits(ec_level: EcLevel, mask: MaskPattern) -> u16 {
    let data = ((ec_level.format_bits() as u32) << 3) | mask.index() as u32;
    (((data << 10) | bch_remainder(data, G15)) ^ G15_MASK) as u16
}

/// The 18 version information bits, least significant bit placed first.
pub fn version_info_bits(version: Version) -> u32 {
    let data = version.number() as u32;
    (data << 12) | bch_remainder(data, G18)
}

/// Find the level and mask whose format information differs in the fewest bits from `bits`.
///
/// The code has a minimum distance of 7, so up to three flipped bits are
/// corrected. Returns `None` if the closest candidate is further away.
pub fn decode_format_info(bits: u16) -> Option<(EcLevel, MaskPattern)> {
    let mut best: Option<(u32, EcLevel, MaskPattern)> = None;
    for ec_bits in 0..4 {
        let ec_level = EcLevel::from_format_bits(ec_bits)?;
        for mask in super::mask::ALL_PATTERNS {
            let distance = (format_info_bits(ec_level, mask) ^ bits).count_ones();
            if best.map_or(true, |(d, _, _)| distance < d) {
                best = Some((distance, ec_level, mask));
            }
        }
    }
    best.filter(|(d, _, _)| *d <= 3).map(|(_, e, m)| (e, m))
}

#[test]
fn digit() {
    assert_eq!(bch_digit(0), 0);
    assert_eq!(bch_digit(1), 1);
    assert_eq!(bch_digit(G15), 11);
    assert_eq!(bch_digit(G18), 13);
}

#[test]
fn known_format_info() {
    assert_eq!(
        format_info_bits(EcLevel::H, MaskPattern::Pattern0),
        0b001_0110_1000_1001
    );
    assert_eq!(format_info_bits(EcLevel::L, MaskPattern::Pattern0), 0x77C4);
    assert_eq!(format_info_bits(EcLevel::M, MaskPattern::Pattern0), 0x5412);
    assert_eq!(format_info_bits(EcLevel::Q, MaskPattern::Pattern7), 0x2BED);
    assert_eq!(format_info_bits(EcLevel::H, MaskPattern::Pattern4), 0x0762);
}

#[test]
fn known_version_info() {
    let v = |n| Version::new(n).unwrap();
    assert_eq!(version_info_bits(v(7)), 0b00_0111_1100_1001_0100);
    assert_eq!(version_info_bits(v(8)), 0x085BC);
    assert_eq!(version_info_bits(v(40)), 0x28C69);
}

#[test]
fn format_info_decodes_with_errors() {
    for ec_level in enum_iterator::all::<EcLevel>() {
        for mask in super::mask::ALL_PATTERNS {
            let bits = format_info_bits(ec_level, mask);
            assert_eq!(decode_format_info(bits), Some((ec_level, mask)));
            // flip three bits
            assert_eq!(
                decode_format_info(bits ^ 0b100_0000_0100_0001),
                Some((ec_level, mask))
            );
        }
    }
}
