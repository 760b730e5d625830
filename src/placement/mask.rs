//! Mask patterns and the penalty used to choose between them.
//!
//! A mask inverts the data modules for which its condition holds. It never
//! touches function patterns. Of the eight masks the one whose symbol has the
//! lowest penalty is used, the penalty being a sum of four rules:
//!
//! 1. A run of five or more modules of the same color in a row or column
//!    costs `3 + (run - 5)`.
//! 2. Every 2x2 block of one color costs 3. Blocks may overlap.
//! 3. Every occurrence of the finder-like sequence dark-light-dark-dark-dark-light-dark
//!    in a row or column costs 40.
//! 4. Deviation from a 50% share of dark modules costs 10 for every full 5%.
use flagset::{flags, FlagSet};

use super::Bitmap;

#[cfg(test)]
use pretty_assertions::assert_eq;

flags! {
    /// The eight data mask patterns.
    ///
    /// `row` and `col` are counted from the top left corner.
    pub enum MaskPattern: u8 {
        /// `(row + col) % 2 == 0`
        Pattern0 = 0b0000_0001,
        /// `row % 2 == 0`
        Pattern1 = 0b0000_0010,
        /// `col % 3 == 0`
        Pattern2 = 0b0000_0100,
        /// `(row + col) % 3 == 0`
        Pattern3 = 0b0000_1000,
        /// `(row / 2 + col / 3) % 2 == 0`
        Pattern4 = 0b0001_0000,
        /// `(row * col) % 2 + (row * col) % 3 == 0`
        Pattern5 = 0b0010_0000,
        /// `((row * col) % 2 + (row * col) % 3) % 2 == 0`
        Pattern6 = 0b0100_0000,
        /// `((row * col) % 3 + (row + col) % 2) % 2 == 0`
        Pattern7 = 0b1000_0000,
    }
}

/// All patterns, ordered by index.
pub const ALL_PATTERNS: [MaskPattern; 8] = [
    MaskPattern::Pattern0,
    MaskPattern::Pattern1,
    MaskPattern::Pattern2,
    MaskPattern::Pattern3,
    MaskPattern::Pattern4,
    MaskPattern::Pattern5,
    MaskPattern::Pattern6,
    MaskPattern::Pattern7,
];

impl MaskPattern {
    /// The three bit reference of the pattern as written to the format information.
    pub fn index(&self) -> u8 {
        match self {
            Self::Pattern0 => 0,
            Self::Pattern1 => 1,
            Self::Pattern2 => 2,
            Self::Pattern3 => 3,
            Self::Pattern4 => 4,
            Self::Pattern5 => 5,
            Self::Pattern6 => 6,
            Self::Pattern7 => 7,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        ALL_PATTERNS.get(index as usize).copied()
    }

    /// Get flag set with all patterns activated.
    pub fn all() -> FlagSet<Self> {
        FlagSet::full()
    }

    /// Whether the data module at (`row`, `col`) is inverted.
    pub fn is_masked(&self, row: usize, col: usize) -> bool {
        let (i, j) = (row, col);
        match self {
            Self::Pattern0 => (i + j) % 2 == 0,
            Self::Pattern1 => i % 2 == 0,
            Self::Pattern2 => j % 3 == 0,
            Self::Pattern3 => (i + j) % 3 == 0,
            Self::Pattern4 => (i / 2 + j / 3) % 2 == 0,
            Self::Pattern5 => (i * j) % 2 + (i * j) % 3 == 0,
            Self::Pattern6 => ((i * j) % 2 + (i * j) % 3) % 2 == 0,
            Self::Pattern7 => ((i * j) % 3 + (i + j) % 2) % 2 == 0,
        }
    }
}

const RUN_PENALTY: u32 = 3;
const BLOCK_PENALTY: u32 = 3;
const FINDER_LIKE_PENALTY: u32 = 40;
const BALANCE_PENALTY: u32 = 10;

const FINDER_LIKE: [bool; 7] = [true, false, true, true, true, false, true];

/// Total penalty of a finished symbol, lower is better.
pub fn penalty_score(bitmap: &Bitmap) -> u32 {
    run_penalty(bitmap)
        + block_penalty(bitmap)
        + finder_like_penalty(bitmap)
        + balance_penalty(bitmap)
}

/// All rows followed by all columns.
fn lines(bitmap: &Bitmap) -> impl Iterator<Item = Vec<bool>> + '_ {
    let n = bitmap.width();
    let rows = (0..n).map(move |r| (0..n).map(|c| bitmap.get(r, c)).collect::<Vec<_>>());
    let cols = (0..n).map(move |c| (0..n).map(|r| bitmap.get(r, c)).collect::<Vec<_>>());
    rows.chain(cols)
}

pub(crate) fn run_penalty(bitmap: &Bitmap) -> u32 {
    let mut penalty = 0;
    for line in lines(bitmap) {
        let mut run = 1;
        for k in 1..=line.len() {
            if k < line.len() && line[k] == line[k - 1] {
                run += 1;
                continue;
            }
            if run >= 5 {
                penalty += RUN_PENALTY + (run - 5);
            }
            run = 1;
        }
    }
    penalty
}

pub(crate) fn block_penalty(bitmap: &Bitmap) -> u32 {
    let n = bitmap.width();
    let mut penalty = 0;
    for r in 0..n.saturating_sub(1) {
        for c in 0..n - 1 {
            let dark = bitmap.get(r, c);
            if dark == bitmap.get(r + 1, c)
                && dark == bitmap.get(r, c + 1)
                && dark == bitmap.get(r + 1, c + 1)
            {
                penalty += BLOCK_PENALTY;
            }
        }
    }
    penalty
}

pub(crate) fn finder_like_penalty(bitmap: &Bitmap) -> u32 {
    lines(bitmap)
        .map(|line| {
            line.windows(FINDER_LIKE.len())
                .filter(|w| *w == FINDER_LIKE)
                .count() as u32
                * FINDER_LIKE_PENALTY
        })
        .sum()
}

pub(crate) fn balance_penalty(bitmap: &Bitmap) -> u32 {
    let n = bitmap.width();
    let total = n * n;
    if total == 0 {
        return 0;
    }
    let dark = bitmap.dark_count();
    let deviation = (100 * dark).abs_diff(50 * total);
    BALANCE_PENALTY * (deviation / (5 * total)) as u32
}

#[cfg(test)]
fn bitmap_from(rows: &[&str]) -> Bitmap {
    let width = rows.len();
    let bits = rows
        .iter()
        .flat_map(|r| r.chars().map(|c| c == '#'))
        .collect();
    Bitmap::new(width, bits)
}

#[test]
fn index_roundtrip() {
    for (i, pattern) in ALL_PATTERNS.iter().enumerate() {
        assert_eq!(pattern.index() as usize, i);
        assert_eq!(MaskPattern::from_index(i as u8), Some(*pattern));
    }
    assert_eq!(MaskPattern::from_index(8), None);
    assert!(ALL_PATTERNS.iter().all(|p| MaskPattern::all().contains(*p)));
}

#[test]
fn mask_conditions() {
    assert!(MaskPattern::Pattern0.is_masked(0, 0));
    assert!(!MaskPattern::Pattern0.is_masked(0, 1));
    assert!(MaskPattern::Pattern1.is_masked(2, 1));
    assert!(!MaskPattern::Pattern1.is_masked(3, 0));
    assert!(MaskPattern::Pattern2.is_masked(5, 3));
    assert!(!MaskPattern::Pattern2.is_masked(5, 4));
    assert!(MaskPattern::Pattern3.is_masked(1, 2));
    assert!(MaskPattern::Pattern4.is_masked(1, 2));
    assert!(!MaskPattern::Pattern4.is_masked(2, 0));
    assert!(MaskPattern::Pattern5.is_masked(0, 7));
    assert!(!MaskPattern::Pattern5.is_masked(1, 1));
    assert!(MaskPattern::Pattern6.is_masked(1, 1));
    assert!(!MaskPattern::Pattern6.is_masked(1, 3));
    assert!(MaskPattern::Pattern7.is_masked(0, 0));
    assert!(!MaskPattern::Pattern7.is_masked(1, 1));
}

#[test]
fn all_light_symbol() {
    let bitmap = Bitmap::new(5, vec![false; 25]);
    // five rows and five columns with a run of 5
    assert_eq!(run_penalty(&bitmap), 10 * 3);
    assert_eq!(block_penalty(&bitmap), 16 * 3);
    assert_eq!(finder_like_penalty(&bitmap), 0);
    assert_eq!(balance_penalty(&bitmap), 100);
    assert_eq!(penalty_score(&bitmap), 30 + 48 + 100);
}

#[test]
fn longer_runs() {
    let bitmap = bitmap_from(&[
        "#######", //
        "#.#.#.#", //
        ".#.#.#.", //
        "#.#.#.#", //
        ".#.#.#.", //
        "#.#.#.#", //
        ".#.#.#.", //
    ]);
    // a single run of 7 in the first row
    assert_eq!(run_penalty(&bitmap), 3 + 2);
    assert_eq!(block_penalty(&bitmap), 0);
}

#[test]
fn finder_like_sequence() {
    let bitmap = bitmap_from(&[
        "#.###.#", //
        ".......", //
        "#######", //
        "#######", //
        "#######", //
        ".......", //
        "#######", //
    ]);
    // the first row and every column starting dark
    assert_eq!(finder_like_penalty(&bitmap), 6 * 40);
}

#[test]
fn balance_is_floored() {
    // 13 of 25 dark modules (52%) is less than a full step away from 50%
    let mut bits = vec![false; 25];
    for b in bits.iter_mut().take(13) {
        *b = true;
    }
    assert_eq!(balance_penalty(&Bitmap::new(5, bits.clone())), 0);
    // 20 of 25 (80%) deviates by 6 full steps of 5%
    for b in bits.iter_mut().take(20) {
        *b = true;
    }
    assert_eq!(balance_penalty(&Bitmap::new(5, bits)), 60);
}
