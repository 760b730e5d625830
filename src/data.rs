//! Data part encoding
//!
//! The bytes encoded into a QR Code symbol consist of two parts,
//! the first part is the actual information one wants to encode,
//! the second part error correction bytes.
//!
//! The functions in this module encode the first part, the data part.
//! Only the 8-bit byte mode is supported. A segment is written as a 4 bit
//! mode indicator, a length field and the payload bytes. After the last
//! segment follow a terminator and pad codewords up to the capacity of the
//! symbol.
//!
//! Text is turned into bytes per UTF-16 code unit with the variable width
//! rule of UTF-8. For characters outside of the Basic Multilingual Plane
//! this encodes the two surrogates separately, which existing readers of
//! such symbols expect. If any character needs more than one byte the
//! payload is prefixed with a UTF-8 byte order mark.
use crate::bits::BitBuffer;
use crate::error::QrError;
use crate::errorcode::blocks::num_data_codewords;
use crate::version::{EcLevel, Version};

#[cfg(test)]
use pretty_assertions::assert_eq;

/// Mode indicator of the 8-bit byte mode.
pub const BYTE_MODE: u32 = 0b0100;

/// Width of the mode indicator in bits.
pub const MODE_BITS: u8 = 4;

/// Pad codewords, used alternately to fill the data capacity.
pub const PAD_CODEWORDS: [u8; 2] = [0xEC, 0x11];

const BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// A run of bytes encoded in byte mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteSegment {
    data: Vec<u8>,
}

impl ByteSegment {
    /// Encode `text` into a segment, see [encode_text].
    pub fn new(text: &str) -> Self {
        Self {
            data: encode_text(text),
        }
    }

    /// Use the bytes as they are.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of bits this segment takes in a symbol of the given version.
    pub fn bit_len(&self, version: Version) -> usize {
        MODE_BITS as usize + length_field_bits(version) as usize + 8 * self.data.len()
    }

    /// Write mode indicator, length field and payload.
    pub fn write(&self, buffer: &mut BitBuffer, version: Version) -> Result<(), QrError> {
        buffer.append(BYTE_MODE, MODE_BITS)?;
        buffer.append(self.data.len() as u32, length_field_bits(version))?;
        for byte in &self.data {
            buffer.append(*byte as u32, 8)?;
        }
        Ok(())
    }
}

/// Width of the byte mode length field.
pub fn length_field_bits(version: Version) -> u8 {
    if version.number() < 10 {
        8
    } else {
        16
    }
}

fn unit_width(unit: u32) -> usize {
    match unit {
        0..=0x7F => 1,
        0x80..=0x7FF => 2,
        0x800..=0xFFFF => 3,
        _ => 4,
    }
}

/// Number of bytes of `text` without the byte order mark, see [encode_text].
pub fn utf8_length(text: &str) -> usize {
    text.encode_utf16().map(|u| unit_width(u as u32)).sum()
}

/// Number of bytes [encode_text] produces for `text`, byte order mark included.
pub fn encoded_len(text: &str) -> usize {
    let len = utf8_length(text);
    if len != text.encode_utf16().count() {
        len + BOM.len()
    } else {
        len
    }
}

/// Turn text into the bytes of a byte mode segment.
pub fn encode_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(utf8_length(text) + BOM.len());
    let mut units = 0;
    for unit in text.encode_utf16() {
        let c = unit as u32;
        units += 1;
        match unit_width(c) {
            1 => out.push(c as u8),
            2 => out.extend([0xC0 | (c >> 6) as u8, 0x80 | (c & 0x3F) as u8]),
            3 => out.extend([
                0xE0 | (c >> 12) as u8,
                0x80 | ((c >> 6) & 0x3F) as u8,
                0x80 | (c & 0x3F) as u8,
            ]),
            _ => out.extend([
                0xF0 | (c >> 18) as u8,
                0x80 | ((c >> 12) & 0x3F) as u8,
                0x80 | ((c >> 6) & 0x3F) as u8,
                0x80 | (c & 0x3F) as u8,
            ]),
        }
    }
    if out.len() != units {
        let mut with_bom = BOM.to_vec();
        with_bom.append(&mut out);
        return with_bom;
    }
    out
}

/// Pack the segments into exactly the number of data codewords of the symbol.
///
/// Fails with [QrError::BufferOverflow] if the segments need more bits than
/// the symbol offers.
pub fn encode_data(
    segments: &[ByteSegment],
    version: Version,
    ec_level: EcLevel,
) -> Result<Vec<u8>, QrError> {
    let capacity = num_data_codewords(version, ec_level);
    let capacity_bits = capacity * 8;
    // checked up front, an oversized segment would not fit its length field
    let bits: usize = segments.iter().map(|s| s.bit_len(version)).sum();
    if bits > capacity_bits {
        return Err(QrError::BufferOverflow {
            bits,
            capacity: capacity_bits,
        });
    }
    let mut buffer = BitBuffer::with_capacity(capacity_bits);
    for segment in segments {
        segment.write(&mut buffer, version)?;
    }

    // terminator, only if it fits completely
    if buffer.len() + 4 <= capacity_bits {
        buffer.append(0, 4)?;
    }
    while buffer.len() % 8 != 0 {
        buffer.append_bit(false);
    }

    let mut codewords = buffer.into_bytes();
    let pads = PAD_CODEWORDS.iter().cycle();
    let missing = capacity - codewords.len();
    codewords.extend(pads.take(missing));
    Ok(codewords)
}

#[test]
fn ascii_text() {
    assert_eq!(encode_text("HELLO"), b"HELLO".to_vec());
    assert_eq!(utf8_length("HELLO"), 5);
    assert_eq!(encoded_len("HELLO"), 5);
    assert_eq!(encode_text(""), Vec::<u8>::new());
}

#[test]
fn multi_byte_text_gets_bom() {
    assert_eq!(
        encode_text("Doppelgänger"),
        vec![239, 187, 191, 68, 111, 112, 112, 101, 108, 103, 195, 164, 110, 103, 101, 114]
    );
    assert_eq!(utf8_length("Doppelgänger"), 13);
    assert_eq!(encoded_len("Doppelgänger"), 16);
}

#[test]
fn width_boundaries() {
    assert_eq!(encode_text("\u{7F}"), vec![0x7F]);
    assert_eq!(encode_text("\u{80}"), vec![239, 187, 191, 194, 128]);
    assert_eq!(encode_text("\u{7FF}"), vec![239, 187, 191, 223, 191]);
    assert_eq!(encode_text("\u{800}"), vec![239, 187, 191, 224, 160, 128]);
    assert_eq!(encode_text("\u{FFFF}"), vec![239, 187, 191, 239, 191, 191]);
}

#[test]
fn surrogates_are_encoded_separately() {
    let bytes = encode_text("\u{1F600}");
    assert_eq!(bytes, vec![0xEF, 0xBB, 0xBF, 0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80]);
    assert_eq!(utf8_length("\u{1F600}"), 6);
    assert_eq!(encoded_len("\u{1F600}"), bytes.len());
}

#[test]
fn length_field() {
    assert_eq!(length_field_bits(Version::new(1).unwrap()), 8);
    assert_eq!(length_field_bits(Version::new(9).unwrap()), 8);
    assert_eq!(length_field_bits(Version::new(10).unwrap()), 16);
    assert_eq!(length_field_bits(Version::MAX), 16);
    let segment = ByteSegment::new("abc");
    assert_eq!(segment.bit_len(Version::MIN), 4 + 8 + 24);
    assert_eq!(segment.bit_len(Version::MAX), 4 + 16 + 24);
}

#[test]
fn hello_data_codewords() {
    let data = encode_data(&[ByteSegment::new("HELLO")], Version::MIN, EcLevel::H).unwrap();
    assert_eq!(data, vec![64, 84, 132, 84, 196, 196, 240, 236, 17]);
}

#[test]
fn empty_data_is_all_padding() {
    let data = encode_data(&[], Version::MIN, EcLevel::M).unwrap();
    assert_eq!(
        data,
        vec![0, 236, 17, 236, 17, 236, 17, 236, 17, 236, 17, 236, 17, 236, 17, 236]
    );
}

#[test]
fn full_symbol_has_no_padding() {
    // 7 bytes and the terminator fill 1-H exactly
    let data = encode_data(&[ByteSegment::new("ABCDEFG")], Version::MIN, EcLevel::H).unwrap();
    assert_eq!(data.len(), 9);
    assert_eq!(data[0], 0x40);
    assert_eq!(data[1], 0x74);
    assert_eq!(data[8], 0x70);
}

#[test]
fn overflow() {
    let err = encode_data(&[ByteSegment::new("ABCDEFGH")], Version::MIN, EcLevel::H);
    assert_eq!(
        err,
        Err(QrError::BufferOverflow {
            bits: 76,
            capacity: 72
        })
    );
}
