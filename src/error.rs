use thiserror::Error;

use crate::version::EcLevel;

/// Errors raised while encoding a QR Code symbol.
///
/// All of them are raised synchronously to the caller, none is retried.
/// [LogOfZero](QrError::LogOfZero) and [ValueTooWide](QrError::ValueTooWide)
/// can only happen if the encoder itself is broken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QrError {
    /// The content does not fit into a version 40 symbol at the requested level.
    #[error("data too long: {length} bytes do not fit into a version 40 symbol at level {ec_level:?}")]
    CapacityExceeded { length: usize, ec_level: EcLevel },

    /// The packed data is bigger than the data capacity of the chosen version.
    ///
    /// Only reachable if a version was forced which is too small for the content.
    #[error("code length overflow ({bits} > {capacity})")]
    BufferOverflow { bits: usize, capacity: usize },

    /// A module outside of the symbol was queried.
    #[error("module ({row}, {col}) is outside of the {module_count}x{module_count} symbol")]
    InvalidCoordinate {
        row: usize,
        col: usize,
        module_count: usize,
    },

    /// The discrete logarithm of zero was requested in GF(256).
    #[error("logarithm of 0 is undefined in GF(256)")]
    LogOfZero,

    /// A value was appended to a bit buffer with too few bits to hold it.
    #[error("value {value} does not fit into {width} bits")]
    ValueTooWide { value: u32, width: u8 },

    /// A version number outside of `1..=40`.
    #[error("version {0} is not in 1..=40")]
    InvalidVersion(u8),
}
