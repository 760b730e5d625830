//! Arrangement of modules in a QR Code symbol.
//!
//! The struct [Matrix] is used to build a symbol. First the function
//! patterns are stamped (finder, alignment and timing patterns, format and
//! version information), then the remaining modules are traversed in the
//! zig-zag placement order and handed to a [Visitor], which writes the
//! masked codeword bits.
//!
//! An abstract bitmap struct [Bitmap] is the final output of encoding. It
//! also contains helpers for rendering.
use crate::version::{EcLevel, Version};

pub mod format;
pub mod mask;

use format::{format_info_bits, version_info_bits};
use mask::MaskPattern;

#[cfg(test)]
use pretty_assertions::assert_eq;

/// Trait for a visitor to the symbol's data modules.
///
/// During traversal the visitor is called once for every module which is
/// not part of a function pattern, in placement order. `bit_index` counts
/// the visited modules, so bit `i` of the codeword stream (most significant
/// bit first) belongs to `bit_index = i`.
pub trait Visitor {
    fn visit(&mut self, bit_index: usize, row: usize, col: usize, module: &mut bool);
}

/// Writes codewords into the data modules and applies a mask.
///
/// Modules after the last codeword (the remainder bits) are light before
/// masking.
pub struct CodewordPlacer<'a> {
    pub codewords: &'a [u8],
    pub mask: MaskPattern,
}

impl Visitor for CodewordPlacer<'_> {
    fn visit(&mut self, bit_index: usize, row: usize, col: usize, module: &mut bool) {
        let dark = self
            .codewords
            .get(bit_index / 8)
            .map_or(false, |cw| (cw >> (7 - bit_index % 8)) & 1 == 1);
        *module = dark != self.mask.is_masked(row, col);
    }
}

/// State of a single module while the symbol is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Module {
    #[default]
    Undecided,
    Light,
    Dark,
}

impl Module {
    fn new(dark: bool) -> Self {
        if dark {
            Self::Dark
        } else {
            Self::Light
        }
    }

    /// `None` while undecided.
    pub fn is_dark(self) -> Option<bool> {
        match self {
            Self::Undecided => None,
            Self::Light => Some(false),
            Self::Dark => Some(true),
        }
    }
}

/// A symbol under construction, stored row by row.
pub struct Matrix {
    size: usize,
    modules: Vec<Module>,
}

impl Matrix {
    /// Create an empty matrix for the given version.
    pub fn new(version: Version) -> Self {
        let size = version.module_count();
        Self {
            size,
            modules: vec![Module::Undecided; size * size],
        }
    }

    /// Number of modules per side.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the module is dark, `None` if it is still undecided.
    pub fn get(&self, row: usize, col: usize) -> Option<bool> {
        self.modules[row * self.size + col].is_dark()
    }

    fn set(&mut self, row: usize, col: usize, dark: bool) {
        self.modules[row * self.size + col] = Module::new(dark);
    }

    /// True if no module is undecided.
    pub fn is_complete(&self) -> bool {
        !self.modules.contains(&Module::Undecided)
    }

    /// Draw a 7x7 finder pattern with its top left corner at (`row`, `col`),
    /// including the light separator where it lies inside the symbol.
    pub fn place_finder_pattern(&mut self, row: usize, col: usize) {
        let n = self.size as isize;
        for r in -1..=7isize {
            let rr = row as isize + r;
            if rr < 0 || rr >= n {
                continue;
            }
            for c in -1..=7isize {
                let cc = col as isize + c;
                if cc < 0 || cc >= n {
                    continue;
                }
                let ring = ((0..=6).contains(&r) && (c == 0 || c == 6))
                    || ((0..=6).contains(&c) && (r == 0 || r == 6));
                let center = (2..=4).contains(&r) && (2..=4).contains(&c);
                self.set(rr as usize, cc as usize, ring || center);
            }
        }
    }

    /// Draw the 5x5 alignment patterns, skipping those overlapping a finder pattern.
    pub fn place_alignment_patterns(&mut self, version: Version) {
        let positions = version.alignment_positions();
        for &row in &positions {
            for &col in &positions {
                if self.get(row, col).is_some() {
                    continue;
                }
                for r in -2..=2isize {
                    for c in -2..=2isize {
                        let dark = r.abs() == 2 || c.abs() == 2 || (r == 0 && c == 0);
                        let rr = (row as isize + r) as usize;
                        let cc = (col as isize + c) as usize;
                        self.set(rr, cc, dark);
                    }
                }
            }
        }
    }

    /// Draw the alternating timing patterns in row 6 and column 6.
    pub fn place_timing_patterns(&mut self) {
        for i in 8..self.size.saturating_sub(8) {
            if self.get(i, 6).is_none() {
                self.set(i, 6, i % 2 == 0);
            }
            if self.get(6, i).is_none() {
                self.set(6, i, i % 2 == 0);
            }
        }
    }

    /// Write both copies of the format information and the dark module.
    ///
    /// With `test` set all bits are written light, the modules are reserved only.
    pub fn place_format_info(&mut self, ec_level: EcLevel, mask: MaskPattern, test: bool) {
        let n = self.size;
        let bits = format_info_bits(ec_level, mask);
        for i in 0..15 {
            let dark = !test && (bits >> i) & 1 == 1;

            // vertical, next to the left finder patterns
            match i {
                0..=5 => self.set(i, 8, dark),
                6..=7 => self.set(i + 1, 8, dark),
                _ => self.set(n - 15 + i, 8, dark),
            }

            // horizontal, next to the top finder patterns
            match i {
                0..=7 => self.set(8, n - i - 1, dark),
                8 => self.set(8, 15 - i, dark),
                _ => self.set(8, 15 - i - 1, dark),
            }
        }
        self.set(n - 8, 8, !test);
    }

    /// Write both copies of the version information, version 7 and up only.
    pub fn place_version_info(&mut self, version: Version, test: bool) {
        if !version.has_version_info() {
            return;
        }
        let n = self.size;
        let bits = version_info_bits(version);
        for i in 0..18 {
            let dark = !test && (bits >> i) & 1 == 1;
            self.set(i / 3, i % 3 + n - 11, dark);
            self.set(i % 3 + n - 11, i / 3, dark);
        }
    }

    /// Traverse the free modules in placement order and call the visitor.
    ///
    /// The traversal runs through column pairs from right to left, skipping
    /// the vertical timing pattern, alternately upwards and downwards.
    /// Within a pair the right module comes first. Returns the number of
    /// visited modules.
    pub fn traverse<V: Visitor>(&mut self, visitor: &mut V) -> usize {
        let n = self.size;
        let mut bit_index = 0;
        let mut upwards = true;
        let mut col = n - 1;
        while col > 0 {
            if col == 6 {
                col -= 1;
            }
            for step in 0..n {
                let row = if upwards { n - 1 - step } else { step };
                for c in [col, col - 1] {
                    let idx = row * n + c;
                    if self.modules[idx] == Module::Undecided {
                        let mut dark = false;
                        visitor.visit(bit_index, row, c, &mut dark);
                        self.modules[idx] = Module::new(dark);
                        bit_index += 1;
                    }
                }
            }
            upwards = !upwards;
            if col < 2 {
                break;
            }
            col -= 2;
        }
        bit_index
    }

    /// Convert into a bitmap, undecided modules are light.
    ///
    /// After [traverse()](Self::traverse) no module is undecided: the
    /// traversal covers every column but the vertical timing pattern, which
    /// is fully placed beforehand.
    pub fn bitmap(&self) -> Bitmap {
        Bitmap::new(
            self.size,
            self.modules.iter().map(|m| *m == Module::Dark).collect(),
        )
    }
}

/// Build a complete symbol.
///
/// With `test` set the format and version information is left light, which
/// is how candidate masks are compared.
pub fn build(
    version: Version,
    ec_level: EcLevel,
    codewords: &[u8],
    mask: MaskPattern,
    test: bool,
) -> Bitmap {
    let mut matrix = Matrix::new(version);
    let n = matrix.size();
    matrix.place_finder_pattern(0, 0);
    matrix.place_finder_pattern(n - 7, 0);
    matrix.place_finder_pattern(0, n - 7);
    matrix.place_alignment_patterns(version);
    matrix.place_timing_patterns();
    matrix.place_format_info(ec_level, mask, test);
    matrix.place_version_info(version, test);
    matrix.traverse(&mut CodewordPlacer { codewords, mask });
    // holds for every version, see the traversal tests
    debug_assert!(matrix.is_complete());
    matrix.bitmap()
}

/// An abstract bitmap, the finished symbol.
///
/// Contains helpers for rendering the content. For rendering targets which
/// use something similar to pixels try [pixels()](Self::pixels).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    bits: Vec<bool>,
}

impl Bitmap {
    pub(crate) fn new(width: usize, bits: Vec<bool>) -> Self {
        debug_assert_eq!(bits.len(), width * width);
        Self { width, bits }
    }

    /// Return the width of the bitmap (no quiet zone included).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Return the height of the bitmap (no quiet zone included).
    pub fn height(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.bits.len() / self.width
        }
    }

    /// Whether the module at (`row`, `col`) is dark, `None` outside of the symbol.
    pub fn is_dark(&self, row: usize, col: usize) -> Option<bool> {
        if row >= self.height() || col >= self.width {
            return None;
        }
        Some(self.bits[row * self.width + col])
    }

    pub(crate) fn get(&self, row: usize, col: usize) -> bool {
        self.bits[row * self.width + col]
    }

    /// Number of dark modules.
    pub fn dark_count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// Compute a unicode representation ("ASCII art").
    ///
    /// This is intended as a demo functionality. It might look weird
    /// if the line height is wrong or if you are not using a monospaced font.
    /// The quiet zone is four modules wide.
    pub fn unicode(&self) -> String {
        const BORDER: usize = 4;
        const CHAR: [char; 4] = [' ', '▄', '▀', '█'];
        let height = self.height();
        let get = |i: usize, j: usize| -> usize {
            if i < BORDER || j < BORDER {
                return 0;
            }
            match self.is_dark(i - BORDER, j - BORDER) {
                Some(true) => 1,
                _ => 0,
            }
        };
        let mut out =
            String::with_capacity((height + 2 * BORDER) * (self.width + 1 + 2 * BORDER) * 3 / 2);
        for i in (0..height + 2 * BORDER).step_by(2) {
            for j in 0..(self.width + 2 * BORDER) {
                let idx = (get(i, j) << 1) | get(i + 1, j);
                out.push(CHAR[idx]);
            }
            out.push('\n');
        }
        out
    }

    /// Get an iterator over the dark modules' coordinates `(x, y)`.
    ///
    /// The coordinate system is centered in the top left corner starting
    /// in `(0, 0)` with a horizontal x-axis and vertical y-axis.
    /// The modules are returned in order, incrementing x before y.
    ///
    /// A quiet zone is not included in the coordinates but one must
    /// be added when rendering: the free space around the symbol
    /// should be four modules wide and have the background's color.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use qrmatrix::EcLevel;
    /// let bitmap = qrmatrix::encode("Foo", EcLevel::M).unwrap();
    /// for (x, y) in bitmap.pixels() {
    ///     // place square/circle at (x, y) to render this QR Code
    /// }
    /// ```
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let w = self.width();
        self.bits
            .iter()
            .enumerate()
            .filter(|(_i, b)| **b)
            .map(move |(i, _b)| (i % w, i / w))
    }
}

#[cfg(test)]
mod tests {
    use super::{Matrix, Visitor};
    use crate::version::{EcLevel, Version};

    use super::mask::MaskPattern;

    /// Records the placement order.
    pub struct LogVisitor(pub Vec<(usize, usize)>);

    impl Visitor for LogVisitor {
        fn visit(&mut self, bit_index: usize, row: usize, col: usize, module: &mut bool) {
            assert_eq!(bit_index, self.0.len());
            self.0.push((row, col));
            *module = false;
        }
    }

    pub fn function_patterns(version: Version) -> Matrix {
        let mut matrix = Matrix::new(version);
        let n = matrix.size();
        matrix.place_finder_pattern(0, 0);
        matrix.place_finder_pattern(n - 7, 0);
        matrix.place_finder_pattern(0, n - 7);
        matrix.place_alignment_patterns(version);
        matrix.place_timing_patterns();
        matrix.place_format_info(EcLevel::H, MaskPattern::Pattern0, true);
        matrix.place_version_info(version, true);
        matrix
    }

    pub fn log(version: Version) -> Vec<(usize, usize)> {
        let mut matrix = function_patterns(version);
        let mut visitor = LogVisitor(vec![]);
        matrix.traverse(&mut visitor);
        assert!(matrix.is_complete());
        visitor.0
    }
}

#[test]
fn placement_order_version_1() {
    let log = tests::log(Version::MIN);
    assert_eq!(log.len(), 208);
    // upwards through the two rightmost columns
    assert_eq!(log[..6], [(20, 20), (20, 19), (19, 20), (19, 19), (18, 20), (18, 19)]);
    // the first column pair ends below the format information
    assert_eq!(log[23], (9, 19));
    // then downwards through the next pair
    assert_eq!(log[24], (9, 18));
    assert_eq!(log[25], (9, 17));
    // the last module sits left of the timing pattern, above the bottom left finder
    assert_eq!(*log.last().unwrap(), (12, 0));
}

#[test]
fn data_module_counts() {
    // 8 bits per codeword plus the remainder bits
    for (version, modules) in [(1, 208), (2, 359), (7, 1568), (40, 29648)] {
        let log = tests::log(Version::new(version).unwrap());
        assert_eq!(log.len(), modules, "version {}", version);
    }
}

#[test]
fn traversal_decides_every_module() {
    use crate::errorcode::blocks::num_codewords;

    for version in Version::all() {
        let log = tests::log(version);
        let remainder_bits = match version.number() {
            2..=6 => 7,
            14..=20 | 28..=34 => 3,
            21..=27 => 4,
            _ => 0,
        };
        assert_eq!(
            log.len(),
            num_codewords(version) * 8 + remainder_bits,
            "version {}",
            version.number()
        );
    }
}

#[test]
fn finder_pattern_rings() {
    let matrix = tests::function_patterns(Version::MIN);
    let n = matrix.size();
    for (top, left) in [(0, 0), (n - 7, 0), (0, n - 7)] {
        for r in 0..7 {
            for c in 0..7 {
                let ring = r == 0 || r == 6 || c == 0 || c == 6;
                let center = (2..=4).contains(&r) && (2..=4).contains(&c);
                assert_eq!(matrix.get(top + r, left + c), Some(ring || center));
            }
        }
    }
    // separators
    assert_eq!(matrix.get(7, 7), Some(false));
    assert_eq!(matrix.get(n - 8, 7), Some(false));
    assert_eq!(matrix.get(7, n - 8), Some(false));
}

#[test]
fn alignment_and_timing() {
    let matrix = tests::function_patterns(Version::new(7).unwrap());
    // center, middle ring and outer ring of the pattern at (22, 22)
    assert_eq!(matrix.get(22, 22), Some(true));
    assert_eq!(matrix.get(21, 22), Some(false));
    assert_eq!(matrix.get(20, 22), Some(true));
    // patterns on the timing lines are stamped, those on finder patterns skipped
    assert_eq!(matrix.get(6, 22), Some(true));
    assert_eq!(matrix.get(4, 22), Some(true));
    assert_eq!(matrix.get(8, 36), None);
    for i in 8..matrix.size() - 8 {
        if !(20..=24).contains(&i) {
            assert_eq!(matrix.get(6, i), Some(i % 2 == 0));
            assert_eq!(matrix.get(i, 6), Some(i % 2 == 0));
        }
    }
}

#[test]
fn test_mode_reserves_light_info() {
    let matrix = tests::function_patterns(Version::new(7).unwrap());
    let n = matrix.size();
    for i in 0..6 {
        assert_eq!(matrix.get(i, 8), Some(false));
        assert_eq!(matrix.get(8, n - 1 - i), Some(false));
    }
    // the dark module is light in test mode as well
    assert_eq!(matrix.get(n - 8, 8), Some(false));
    for i in 0..18 {
        assert_eq!(matrix.get(i / 3, i % 3 + n - 11), Some(false));
    }
}

#[test]
fn unicode_rendering() {
    let bitmap = build(Version::MIN, EcLevel::H, &[], MaskPattern::Pattern0, false);
    let art = bitmap.unicode();
    let lines: Vec<&str> = art.lines().collect();
    // 21 modules plus twice 4 border, two rows per line
    assert_eq!(lines.len(), 15);
    assert!(lines.iter().all(|l| l.chars().count() == 29));
    assert!(lines[0].chars().all(|c| c == ' '));
    // the first two rows of the finder pattern share one line
    let finder: String = lines[2].chars().skip(4).take(7).collect();
    assert_eq!(finder, "█▀▀▀▀▀█");
}

#[test]
fn pixels_and_bounds() {
    let bitmap = build(Version::MIN, EcLevel::H, &[], MaskPattern::Pattern0, false);
    assert_eq!(bitmap.width(), 21);
    assert_eq!(bitmap.height(), 21);
    assert_eq!(bitmap.pixels().count(), bitmap.dark_count());
    assert_eq!(bitmap.pixels().next(), Some((0, 0)));
    assert_eq!(bitmap.is_dark(21, 0), None);
    assert_eq!(bitmap.is_dark(0, 21), None);
}
