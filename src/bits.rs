//! A growable buffer of bits, most significant bit first.
use crate::error::QrError;

#[cfg(test)]
use pretty_assertions::assert_eq;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitBuffer {
    buffer: Vec<u8>,
    length: usize,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self {
            buffer: Vec::with_capacity((bits + 7) / 8),
            length: 0,
        }
    }

    /// Number of bits written so far.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Bit at `index`, `None` if it was never written.
    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.length {
            return None;
        }
        Some((self.buffer[index / 8] >> (7 - index % 8)) & 1 == 1)
    }

    pub fn append_bit(&mut self, bit: bool) {
        if self.length % 8 == 0 {
            self.buffer.push(0);
        }
        if bit {
            if let Some(last) = self.buffer.last_mut() {
                *last |= 0x80 >> (self.length % 8);
            }
        }
        self.length += 1;
    }

    /// Append the `width` lowest bits of `value`, most significant first.
    ///
    /// Fails if `value` does not fit into `width` bits.
    pub fn append(&mut self, value: u32, width: u8) -> Result<(), QrError> {
        if width > 32 || (width < 32 && value >> width != 0) {
            return Err(QrError::ValueTooWide { value, width });
        }
        for i in (0..width).rev() {
            self.append_bit((value >> i) & 1 == 1);
        }
        Ok(())
    }

    /// The underlying bytes. A trailing partial byte is padded with zeros.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

#[test]
fn append_msb_first() {
    let mut buf = BitBuffer::new();
    buf.append(0b0100, 4).unwrap();
    buf.append(0x4D, 8).unwrap();
    assert_eq!(buf.len(), 12);
    assert_eq!(buf.as_bytes(), &[0x44, 0xD0]);
    let bits: Vec<bool> = (0..12).map(|i| buf.get(i).unwrap()).collect();
    assert_eq!(
        bits,
        vec![false, true, false, false, false, true, false, false, true, true, false, true]
    );
    assert_eq!(buf.get(12), None);
}

#[test]
fn single_bits() {
    let mut buf = BitBuffer::new();
    assert!(buf.is_empty());
    for bit in [true, false, true, true, false, false, true, false, true] {
        buf.append_bit(bit);
    }
    assert_eq!(buf.len(), 9);
    assert_eq!(buf.into_bytes(), vec![0b1011_0010, 0b1000_0000]);
}

#[test]
fn value_too_wide() {
    let mut buf = BitBuffer::new();
    assert_eq!(
        buf.append(16, 4),
        Err(QrError::ValueTooWide { value: 16, width: 4 })
    );
    assert!(buf.is_empty());
    assert_eq!(buf.append(u32::MAX, 32), Ok(()));
    assert_eq!(buf.append(0, 0), Ok(()));
    assert_eq!(buf.len(), 32);
}
