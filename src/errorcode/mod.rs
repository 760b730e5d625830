//! Reed-Solomon error correction codes.
//!
//! By putting some redundancy into the symbol a reader can recover from
//! damaged or misread modules. QR Code uses Reed-Solomon codes over GF(256)
//! for this, see [galois] for the field arithmetic.
//!
//! The data codewords are cut into blocks (see [blocks]). For a block with
//! `k` error correction codewords the data is read as a polynomial `d(x)`,
//! highest degree first, and the error code is the remainder
//!
//! ```text
//! r(x) = d(x) * x^k mod g(x)
//! ```
//!
//! where the generator polynomial `g` is the product of `(x - α^i)` for
//! `i` in `0..k`. In GF(256) subtraction is addition, so `d(x) * x^k + r(x)`
//! is a multiple of `g`.
//!
//! Finally the blocks are interleaved: first the i-th data codeword of every
//! block for increasing i, then the error codewords in the same manner.
pub mod blocks;
pub mod galois;
pub mod polynomial;

use tracing::trace;

use crate::error::QrError;
use crate::version::{EcLevel, Version};
use blocks::rs_blocks;
use polynomial::Polynomial;

#[cfg(test)]
use pretty_assertions::assert_eq;

/// The generator polynomial with `ec_count` roots α^0, ..., α^(ec_count - 1).
pub fn generator_polynomial(ec_count: usize) -> Polynomial {
    let mut g = Polynomial::new(&[1], 0);
    for i in 0..ec_count {
        g = g.multiply(&Polynomial::new(&[1, galois::exp(i as i32)], 0));
    }
    g
}

/// Compute the `ec_count` error correction codewords for a single block.
///
/// The result is left-padded with zeros if the remainder happens to have
/// leading zero coefficients.
pub fn ec_block(data: &[u8], generator: &Polynomial) -> Result<Vec<u8>, QrError> {
    let ec_count = generator.len() - 1;
    let remainder = Polynomial::new(data, ec_count).rem(generator)?;
    let mut ecc = vec![0; ec_count];
    // the remainder has at most ec_count coefficients
    let offset = ec_count.saturating_sub(remainder.len());
    for (dst, src) in ecc[offset..].iter_mut().zip(remainder.coefficients()) {
        *dst = src;
    }
    Ok(ecc)
}

/// Compute the final codeword sequence of a symbol.
///
/// `data` must hold exactly the number of data codewords of the version
/// and level. Returns data and error correction codewords, interleaved.
pub fn encode_error(data: &[u8], version: Version, ec_level: EcLevel) -> Result<Vec<u8>, QrError> {
    let blocks = rs_blocks(version, ec_level);
    let total: usize = blocks.iter().map(|b| b.total_count).sum();

    let mut data_blocks: Vec<&[u8]> = Vec::with_capacity(blocks.len());
    let mut ec_blocks: Vec<Vec<u8>> = Vec::with_capacity(blocks.len());
    // within one symbol all blocks share the same ec count
    let mut generator: Option<Polynomial> = None;
    let mut offset = 0;
    for block in &blocks {
        let end = (offset + block.data_count).min(data.len());
        let block_data = &data[offset.min(end)..end];
        offset += block.data_count;

        let g = match generator.take() {
            Some(g) if g.len() == block.ec_count() + 1 => g,
            _ => generator_polynomial(block.ec_count()),
        };
        ec_blocks.push(ec_block(block_data, &g)?);
        generator = Some(g);
        data_blocks.push(block_data);
    }

    let max_data = blocks.iter().map(|b| b.data_count).max().unwrap_or(0);
    let max_ec = blocks.iter().map(|b| b.ec_count()).max().unwrap_or(0);
    let mut codewords = Vec::with_capacity(total);
    for i in 0..max_data {
        codewords.extend(data_blocks.iter().filter_map(|b| b.get(i)));
    }
    for i in 0..max_ec {
        codewords.extend(ec_blocks.iter().filter_map(|b| b.get(i)));
    }
    trace!(
        blocks = blocks.len(),
        codewords = codewords.len(),
        "interleaved codewords"
    );
    Ok(codewords)
}

#[test]
fn generator_7() {
    let g = generator_polynomial(7);
    assert_eq!(
        g.coefficients().collect::<Vec<_>>(),
        vec![1, 127, 122, 154, 164, 11, 68, 117]
    );
}

#[test]
fn ec_block_known_vector() {
    // "HELLO WORLD" at 1-M
    let data = [
        32, 91, 11, 120, 209, 114, 220, 77, 67, 64, 236, 17, 236, 17, 236, 17,
    ];
    let g = generator_polynomial(10);
    assert_eq!(
        ec_block(&data, &g).unwrap(),
        vec![196, 35, 39, 119, 235, 215, 231, 226, 93, 23]
    );
}

#[test]
fn ec_block_of_zero_data() {
    let g = generator_polynomial(7);
    assert_eq!(ec_block(&[0; 19], &g).unwrap(), vec![0; 7]);
}

#[test]
fn codeword_is_multiple_of_generator() {
    let data = [64, 84, 132, 84, 196, 196, 240, 236, 17];
    let g = generator_polynomial(17);
    let mut full = data.to_vec();
    full.extend(ec_block(&data, &g).unwrap());
    let r = Polynomial::new(&full, 0).rem(&g).unwrap();
    assert_eq!(r.coefficients().collect::<Vec<_>>(), vec![0]);
}

#[test]
fn single_block_symbol() {
    let data = [64, 84, 132, 84, 196, 196, 240, 236, 17];
    let codewords = encode_error(&data, Version::MIN, EcLevel::H).unwrap();
    assert_eq!(
        codewords,
        vec![
            64, 84, 132, 84, 196, 196, 240, 236, 17, 11, 255, 95, 67, 206, 238, 56, 40, 120, 241,
            71, 240, 109, 36, 68, 154, 184
        ]
    );
}

#[test]
fn interleaving_order() {
    // 5-Q has two blocks of 15 and two of 16 data codewords
    let version = Version::new(5).unwrap();
    let n = blocks::num_data_codewords(version, EcLevel::Q);
    let data: Vec<u8> = (0..n as u8).collect();
    let codewords = encode_error(&data, version, EcLevel::Q).unwrap();
    assert_eq!(codewords.len(), blocks::num_codewords(version));
    // block starts are 0, 15, 30, 46
    assert_eq!(codewords[..8], [0, 15, 30, 46, 1, 16, 31, 47]);
    // the last data codewords only exist in the long blocks
    assert_eq!(codewords[n - 2..n], [45, 61]);

    let g = generator_polynomial(18);
    let first_ec = ec_block(&data[..15], &g).unwrap();
    let last_ec = ec_block(&data[46..], &g).unwrap();
    assert_eq!(codewords[n], first_ec[0]);
    assert_eq!(codewords[n + 3], last_ec[0]);
    assert_eq!(*codewords.last().unwrap(), *last_ec.last().unwrap());
}
