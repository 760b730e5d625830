//! Symbol versions, error correction levels and their capacities.
//!
//! A QR Code comes in 40 sizes, called versions. Version `v` has
//! `4 * v + 17` modules per side, so the smallest symbol is 21x21 and
//! the biggest 177x177. Together with the error correction level the version
//! determines how many bytes fit into the symbol.
use arrayvec::ArrayVec;
use tracing::debug;

use crate::error::QrError;

#[cfg(test)]
use enum_iterator::Sequence;

#[cfg(test)]
use pretty_assertions::assert_eq;

/// Maximal number of alignment pattern coordinates of any version.
pub const MAX_ALIGNMENT_POSITIONS: usize = 7;

/// Error correction level of a symbol.
///
/// Higher levels can restore more damaged codewords but leave less room
/// for data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(test, derive(Sequence))]
pub enum EcLevel {
    /// Recovers about 7% of the codewords
    L,
    /// Recovers about 15% of the codewords
    M,
    /// Recovers about 25% of the codewords
    Q,
    /// Recovers about 30% of the codewords
    #[default]
    H,
}

impl EcLevel {
    /// Column of this level in the capacity and block tables.
    pub(crate) fn index(self) -> usize {
        match self {
            Self::L => 0,
            Self::M => 1,
            Self::Q => 2,
            Self::H => 3,
        }
    }

    /// The two bits identifying this level in the format information.
    ///
    /// The values are fixed by the standard and not in the natural order.
    pub fn format_bits(self) -> u8 {
        match self {
            Self::L => 0b01,
            Self::M => 0b00,
            Self::Q => 0b11,
            Self::H => 0b10,
        }
    }

    /// Inverse of [format_bits](Self::format_bits).
    pub fn from_format_bits(bits: u8) -> Option<Self> {
        match bits {
            0b01 => Some(Self::L),
            0b00 => Some(Self::M),
            0b11 => Some(Self::Q),
            0b10 => Some(Self::H),
            _ => None,
        }
    }
}

/// Version (size class) of a QR Code symbol, between 1 and 40.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(u8);

impl Version {
    pub const MIN: Version = Version(1);
    pub const MAX: Version = Version(40);

    pub fn new(number: u8) -> Result<Self, QrError> {
        if (Self::MIN.0..=Self::MAX.0).contains(&number) {
            Ok(Self(number))
        } else {
            Err(QrError::InvalidVersion(number))
        }
    }

    /// The version number, between 1 and 40.
    pub fn number(self) -> u8 {
        self.0
    }

    /// Number of modules per side, `4 * version + 17`.
    pub fn module_count(self) -> usize {
        4 * self.0 as usize + 17
    }

    /// Maximal number of bytes a single byte mode segment may have.
    pub fn byte_capacity(self, ec_level: EcLevel) -> usize {
        BYTE_CAPACITY[self.index()][ec_level.index()]
    }

    /// Row and column coordinates of the alignment pattern centers.
    ///
    /// Every combination of two coordinates is a candidate center, except
    /// for those overlapping a finder pattern.
    pub fn alignment_positions(self) -> ArrayVec<usize, MAX_ALIGNMENT_POSITIONS> {
        ALIGNMENT_POSITIONS[self.index()].iter().cloned().collect()
    }

    /// Symbols from version 7 on carry an extra version information block.
    pub fn has_version_info(self) -> bool {
        self.0 >= 7
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// Iterate over all versions in increasing order.
    pub fn all() -> impl Iterator<Item = Version> {
        (Self::MIN.0..=Self::MAX.0).map(Version)
    }
}

impl core::fmt::Display for Version {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Find the smallest version whose byte capacity at `ec_level` holds `byte_len` bytes.
pub fn select_version(byte_len: usize, ec_level: EcLevel) -> Result<Version, QrError> {
    let version = Version::all()
        .find(|v| v.byte_capacity(ec_level) >= byte_len)
        .ok_or(QrError::CapacityExceeded {
            length: byte_len,
            ec_level,
        })?;
    debug!(byte_len, ?ec_level, version = version.number(), "selected version");
    Ok(version)
}

#[rustfmt::skip]
const BYTE_CAPACITY: [[usize; 4]; 40] = [
    [17, 14, 11, 7],
    [32, 26, 20, 14],
    [53, 42, 32, 24],
    [78, 62, 46, 34],
    [106, 84, 60, 44],
    [134, 106, 74, 58],
    [154, 122, 86, 64],
    [192, 152, 108, 84],
    [230, 180, 130, 98],
    [271, 213, 151, 119],
    [321, 251, 177, 137],
    [367, 287, 203, 155],
    [425, 331, 241, 177],
    [458, 362, 258, 194],
    [520, 412, 292, 220],
    [586, 450, 322, 250],
    [644, 504, 364, 280],
    [718, 560, 394, 310],
    [792, 624, 442, 338],
    [858, 666, 482, 382],
    [929, 711, 509, 403],
    [1003, 779, 565, 439],
    [1091, 857, 611, 461],
    [1171, 911, 661, 511],
    [1273, 997, 715, 535],
    [1367, 1059, 751, 593],
    [1465, 1125, 805, 625],
    [1528, 1190, 868, 658],
    [1628, 1264, 908, 698],
    [1732, 1370, 982, 742],
    [1840, 1452, 1030, 790],
    [1952, 1538, 1112, 842],
    [2068, 1628, 1168, 898],
    [2188, 1722, 1228, 958],
    [2303, 1809, 1283, 983],
    [2431, 1911, 1351, 1051],
    [2563, 1989, 1423, 1093],
    [2699, 2099, 1499, 1139],
    [2809, 2213, 1579, 1219],
    [2953, 2331, 1663, 1273],
];

#[rustfmt::skip]
const ALIGNMENT_POSITIONS: [&[usize]; 40] = [
    &[], &[6, 18], &[6, 22], &[6, 26], &[6, 30], &[6, 34], &[6, 22, 38], &[6, 24, 42],
    &[6, 26, 46], &[6, 28, 50], &[6, 30, 54], &[6, 32, 58], &[6, 34, 62], &[6, 26, 46, 66],
    &[6, 26, 48, 70], &[6, 26, 50, 74], &[6, 30, 54, 78], &[6, 30, 56, 82], &[6, 30, 58, 86],
    &[6, 34, 62, 90], &[6, 28, 50, 72, 94], &[6, 26, 50, 74, 98], &[6, 30, 54, 78, 102],
    &[6, 28, 54, 80, 106], &[6, 32, 58, 84, 110], &[6, 30, 58, 86, 114], &[6, 34, 62, 90, 118],
    &[6, 26, 50, 74, 98, 122], &[6, 30, 54, 78, 102, 126], &[6, 26, 52, 78, 104, 130],
    &[6, 30, 56, 82, 108, 134], &[6, 34, 60, 86, 112, 138], &[6, 30, 58, 86, 114, 142],
    &[6, 34, 62, 90, 118, 146], &[6, 30, 54, 78, 102, 126, 150], &[6, 24, 50, 76, 102, 128, 154],
    &[6, 28, 54, 80, 106, 132, 158], &[6, 32, 58, 84, 110, 136, 162],
    &[6, 26, 54, 82, 110, 138, 166], &[6, 30, 58, 86, 114, 142, 170],
];

#[test]
fn test_module_count() {
    for v in Version::all() {
        let n = v.module_count();
        assert_eq!(n, 4 * v.number() as usize + 17);
        assert_eq!(n % 2, 1);
        assert!((21..=177).contains(&n));
    }
}

#[test]
fn test_version_bounds() {
    assert_eq!(Version::new(0), Err(QrError::InvalidVersion(0)));
    assert_eq!(Version::new(41), Err(QrError::InvalidVersion(41)));
    assert_eq!(Version::new(1), Ok(Version::MIN));
    assert_eq!(Version::new(40), Ok(Version::MAX));
}

#[test]
fn test_format_bits_roundtrip() {
    for level in enum_iterator::all::<EcLevel>() {
        assert_eq!(EcLevel::from_format_bits(level.format_bits()), Some(level));
    }
    assert_eq!(EcLevel::H.format_bits(), 2);
    assert_eq!(EcLevel::L.format_bits(), 1);
}

#[test]
fn test_capacity_monotone() {
    for level in enum_iterator::all::<EcLevel>() {
        let caps: Vec<usize> = Version::all().map(|v| v.byte_capacity(level)).collect();
        assert!(caps.windows(2).all(|w| w[0] < w[1]));
    }
    for v in Version::all() {
        assert!(v.byte_capacity(EcLevel::L) > v.byte_capacity(EcLevel::M));
        assert!(v.byte_capacity(EcLevel::M) > v.byte_capacity(EcLevel::Q));
        assert!(v.byte_capacity(EcLevel::Q) > v.byte_capacity(EcLevel::H));
    }
}

#[test]
fn test_select_version() {
    assert_eq!(select_version(0, EcLevel::H), Ok(Version::MIN));
    assert_eq!(select_version(7, EcLevel::H), Ok(Version(1)));
    assert_eq!(select_version(8, EcLevel::H), Ok(Version(2)));
    assert_eq!(select_version(19, EcLevel::H), Ok(Version(3)));
    assert_eq!(select_version(20, EcLevel::H), Ok(Version(3)));
    assert_eq!(select_version(25, EcLevel::H), Ok(Version(4)));
    assert_eq!(select_version(2953, EcLevel::L), Ok(Version::MAX));
    assert_eq!(
        select_version(2954, EcLevel::L),
        Err(QrError::CapacityExceeded {
            length: 2954,
            ec_level: EcLevel::L
        })
    );
    assert_eq!(
        select_version(1274, EcLevel::H),
        Err(QrError::CapacityExceeded {
            length: 1274,
            ec_level: EcLevel::H
        })
    );
}

#[test]
fn test_alignment_positions() {
    assert!(Version(1).alignment_positions().is_empty());
    assert_eq!(Version(2).alignment_positions().as_slice(), &[6, 18]);
    assert_eq!(
        Version(40).alignment_positions().as_slice(),
        &[6, 30, 58, 86, 114, 142, 170]
    );
    for v in Version::all() {
        let pos = v.alignment_positions();
        if let Some(last) = pos.last() {
            // the last center is always 7 modules from the far edge
            assert_eq!(*last, v.module_count() - 7);
        }
    }
}
