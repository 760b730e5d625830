//! The QR Code model, the entry point for renderers.
//!
//! A [QrCodeModel] collects byte segments, builds the symbol in [make()](QrCodeModel::make)
//! and afterwards answers [is_dark()](QrCodeModel::is_dark) and
//! [module_count()](QrCodeModel::module_count) queries.
use flagset::FlagSet;
use tracing::{debug, trace, warn};

use crate::data::{encode_data, ByteSegment};
use crate::error::QrError;
use crate::errorcode::{blocks::num_data_codewords, encode_error};
use crate::placement::mask::{penalty_score, MaskPattern, ALL_PATTERNS};
use crate::placement::{build, Bitmap};
use crate::version::{select_version, EcLevel, Version};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Configuration of an encode.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeOptions {
    /// Fixed version, picked automatically if `None`.
    pub version: Option<Version>,
    pub ec_level: EcLevel,
    /// The masks considered by the mask search.
    ///
    /// A single mask forces it. If the set is empty pattern 0 is used.
    pub masks: FlagSet<MaskPattern>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            version: None,
            ec_level: EcLevel::default(),
            masks: MaskPattern::all(),
        }
    }
}

impl EncodeOptions {
    pub fn new(ec_level: EcLevel) -> Self {
        Self {
            ec_level,
            ..Self::default()
        }
    }
}

/// A finished symbol.
#[derive(Debug, Clone)]
struct Symbol {
    version: Version,
    mask: MaskPattern,
    bitmap: Bitmap,
}

/// The model of a QR Code symbol.
#[derive(Debug, Clone)]
pub struct QrCodeModel {
    options: EncodeOptions,
    segments: Vec<ByteSegment>,
    /// Codewords of the last make, valid until data is added.
    data_cache: Option<(Version, Vec<u8>)>,
    symbol: Option<Symbol>,
}

impl QrCodeModel {
    /// Create an empty model with the given fixed version, or automatic
    /// version selection for `None`.
    pub fn new(version: Option<Version>, ec_level: EcLevel) -> Self {
        Self::with_options(EncodeOptions {
            version,
            ec_level,
            ..EncodeOptions::default()
        })
    }

    pub fn with_options(options: EncodeOptions) -> Self {
        Self {
            options,
            segments: Vec::new(),
            data_cache: None,
            symbol: None,
        }
    }

    /// Append `text` as a new byte segment.
    pub fn add_data(&mut self, text: &str) {
        self.segments.push(ByteSegment::new(text));
        self.data_cache = None;
    }

    /// Build the symbol, choosing the mask with the lowest penalty.
    ///
    /// On failure the model holds no symbol, a previous one is discarded.
    pub fn make(&mut self) -> Result<(), QrError> {
        self.symbol = None;
        self.symbol = Some(self.build_symbol()?);
        Ok(())
    }

    /// Build the symbol and return it, consuming the model.
    pub fn make_bitmap(mut self) -> Result<Bitmap, QrError> {
        self.build_symbol().map(|s| s.bitmap)
    }

    fn build_symbol(&mut self) -> Result<Symbol, QrError> {
        let version = self.resolve_version()?;
        let ec_level = self.options.ec_level;
        let codewords = self.codewords(version)?;
        let (mask, penalty) = best_mask(version, ec_level, &codewords, self.options.masks);
        debug!(
            version = version.number(),
            mask = mask.index(),
            penalty,
            "selected mask"
        );
        Ok(Symbol {
            version,
            mask,
            bitmap: build(version, ec_level, &codewords, mask, false),
        })
    }

    /// Number of modules per side, 0 before [make()](Self::make).
    pub fn module_count(&self) -> usize {
        self.symbol.as_ref().map_or(0, |s| s.bitmap.width())
    }

    /// Whether the module at (`row`, `col`) is dark.
    ///
    /// Fails if the coordinate is outside of the symbol, or the symbol was
    /// not made yet.
    pub fn is_dark(&self, row: usize, col: usize) -> Result<bool, QrError> {
        self.symbol
            .as_ref()
            .and_then(|s| s.bitmap.is_dark(row, col))
            .ok_or(QrError::InvalidCoordinate {
                row,
                col,
                module_count: self.module_count(),
            })
    }

    /// The version of the built symbol, or the requested one before [make()](Self::make).
    pub fn version(&self) -> Option<Version> {
        self.symbol
            .as_ref()
            .map(|s| s.version)
            .or(self.options.version)
    }

    pub fn ec_level(&self) -> EcLevel {
        self.options.ec_level
    }

    /// The mask chosen by the last [make()](Self::make).
    pub fn mask_pattern(&self) -> Option<MaskPattern> {
        self.symbol.as_ref().map(|s| s.mask)
    }

    pub fn bitmap(&self) -> Option<&Bitmap> {
        self.symbol.as_ref().map(|s| &s.bitmap)
    }

    /// Coordinates `(row, col)` of all dark modules, row by row.
    pub fn dark_modules(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.symbol
            .iter()
            .flat_map(|s| s.bitmap.pixels().map(|(x, y)| (y, x)))
    }

    /// Text rendering of the symbol, see [Bitmap::unicode].
    pub fn unicode(&self) -> Option<String> {
        self.bitmap().map(Bitmap::unicode)
    }

    fn data_bits(&self, version: Version) -> usize {
        self.segments.iter().map(|s| s.bit_len(version)).sum()
    }

    fn resolve_version(&self) -> Result<Version, QrError> {
        let ec_level = self.options.ec_level;
        let byte_len: usize = self.segments.iter().map(ByteSegment::len).sum();
        let auto = select_version(byte_len, ec_level);
        let Some(version) = self.options.version else {
            let mut version = auto?;
            // every further segment brings its own header
            while self.data_bits(version) > num_data_codewords(version, ec_level) * 8 {
                version = Version::new(version.number() + 1).map_err(|_| {
                    QrError::CapacityExceeded {
                        length: byte_len,
                        ec_level,
                    }
                })?;
            }
            return Ok(version);
        };
        if let Ok(auto) = auto {
            if version < auto {
                warn!(
                    requested = version.number(),
                    required = auto.number(),
                    "requested version is too small for the data"
                );
            }
        }
        Ok(version)
    }

    fn codewords(&mut self, version: Version) -> Result<Vec<u8>, QrError> {
        if let Some((cached_version, codewords)) = &self.data_cache {
            if *cached_version == version {
                return Ok(codewords.clone());
            }
        }
        let codewords = build_codewords(&self.segments, version, self.options.ec_level)?;
        self.data_cache = Some((version, codewords.clone()));
        Ok(codewords)
    }
}

/// Data and error correction codewords of a symbol, in placement order.
pub fn build_codewords(
    segments: &[ByteSegment],
    version: Version,
    ec_level: EcLevel,
) -> Result<Vec<u8>, QrError> {
    let data = encode_data(segments, version, ec_level)?;
    let codewords = encode_error(&data, version, ec_level)?;
    debug!(
        version = version.number(),
        data = data.len(),
        total = codewords.len(),
        "built codewords"
    );
    Ok(codewords)
}

/// Find the mask with the lowest penalty among `masks`, the lowest index wins ties.
pub fn best_mask(
    version: Version,
    ec_level: EcLevel,
    codewords: &[u8],
    masks: FlagSet<MaskPattern>,
) -> (MaskPattern, u32) {
    let score = |mask: MaskPattern| {
        let penalty = penalty_score(&build(version, ec_level, codewords, mask, true));
        trace!(mask = mask.index(), penalty, "mask penalty");
        (penalty, mask)
    };
    let candidates: Vec<MaskPattern> = ALL_PATTERNS
        .iter()
        .copied()
        .filter(|m| masks.contains(*m))
        .collect();

    #[cfg(feature = "parallel")]
    let best = candidates
        .par_iter()
        .map(|m| score(*m))
        .min_by_key(|(penalty, mask)| (*penalty, mask.index()));
    #[cfg(not(feature = "parallel"))]
    let best = candidates
        .iter()
        .map(|m| score(*m))
        .min_by_key(|(penalty, mask)| (*penalty, mask.index()));

    match best {
        Some((penalty, mask)) => (mask, penalty),
        None => {
            let (penalty, mask) = score(MaskPattern::Pattern0);
            (mask, penalty)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn module_count_before_make() {
        let model = QrCodeModel::new(None, EcLevel::H);
        assert_eq!(model.module_count(), 0);
        assert_eq!(model.mask_pattern(), None);
        assert_eq!(model.dark_modules().count(), 0);
        assert_eq!(model.unicode(), None);
        assert_eq!(
            model.is_dark(0, 0),
            Err(QrError::InvalidCoordinate {
                row: 0,
                col: 0,
                module_count: 0
            })
        );
    }

    #[test]
    fn hello() {
        let mut model = QrCodeModel::new(None, EcLevel::H);
        model.add_data("HELLO");
        model.make().unwrap();
        assert_eq!(model.module_count(), 21);
        assert_eq!(model.version(), Some(Version::MIN));
        assert_eq!(model.mask_pattern(), Some(MaskPattern::Pattern4));
        assert_eq!(model.ec_level(), EcLevel::H);
        assert!(model.is_dark(0, 0).unwrap());
        assert!(!model.is_dark(7, 7).unwrap());
        assert_eq!(
            model.is_dark(21, 3),
            Err(QrError::InvalidCoordinate {
                row: 21,
                col: 3,
                module_count: 21
            })
        );
    }

    #[test]
    fn empty_model_makes_a_symbol() {
        let mut model = QrCodeModel::new(None, EcLevel::M);
        model.make().unwrap();
        assert_eq!(model.module_count(), 21);
        assert_eq!(model.mask_pattern(), Some(MaskPattern::Pattern6));
        let codewords = build_codewords(&[], Version::MIN, EcLevel::M).unwrap();
        assert_eq!(
            codewords,
            vec![
                0, 236, 17, 236, 17, 236, 17, 236, 17, 236, 17, 236, 17, 236, 17, 236, 132, 153, 34,
                207, 170, 213, 189, 131, 248, 88
            ]
        );
    }

    #[test]
    fn add_data_invalidates_cache() {
        let mut model = QrCodeModel::new(Some(Version::MIN), EcLevel::L);
        model.add_data("abc");
        model.make().unwrap();
        let first: Vec<_> = model.dark_modules().collect();
        model.add_data("def");
        model.make().unwrap();
        let second: Vec<_> = model.dark_modules().collect();
        assert_ne!(first, second);

        let mut once = QrCodeModel::new(Some(Version::MIN), EcLevel::L);
        once.add_data("abc");
        once.add_data("def");
        once.make().unwrap();
        assert_eq!(once.dark_modules().collect::<Vec<_>>(), second);
    }

    #[test]
    fn forced_version_too_small() {
        let mut model = QrCodeModel::new(Some(Version::MIN), EcLevel::H);
        model.add_data("https://example.com");
        assert_eq!(
            model.make(),
            Err(QrError::BufferOverflow {
                bits: 164,
                capacity: 72
            })
        );
        assert_eq!(model.module_count(), 0);
    }

    #[test]
    fn failed_make_discards_previous_symbol() {
        let mut model = QrCodeModel::new(Some(Version::MIN), EcLevel::H);
        model.add_data("HELLO");
        model.make().unwrap();
        assert_eq!(model.module_count(), 21);

        model.add_data(&"x".repeat(36));
        assert_eq!(
            model.make(),
            Err(QrError::BufferOverflow {
                bits: 352,
                capacity: 72
            })
        );
        assert_eq!(model.module_count(), 0);
        assert_eq!(model.mask_pattern(), None);
        assert_eq!(model.bitmap(), None);
        assert_eq!(
            model.is_dark(0, 0),
            Err(QrError::InvalidCoordinate {
                row: 0,
                col: 0,
                module_count: 0
            })
        );
    }

    #[test]
    fn segments_bring_their_own_headers() {
        // 14 bytes fill 2-H by capacity, two segments need one more header
        let mut model = QrCodeModel::new(None, EcLevel::H);
        model.add_data("abcdefg");
        model.add_data("hijklmn");
        model.make().unwrap();
        assert_eq!(model.version(), Version::new(3).ok());
    }

    #[test]
    fn restricted_masks() {
        let mut options = EncodeOptions::new(EcLevel::H);
        options.masks = MaskPattern::Pattern2.into();
        let mut model = QrCodeModel::with_options(options.clone());
        model.add_data("HELLO");
        model.make().unwrap();
        assert_eq!(model.mask_pattern(), Some(MaskPattern::Pattern2));

        options.masks = FlagSet::new_truncated(0);
        let mut model = QrCodeModel::with_options(options);
        model.add_data("HELLO");
        model.make().unwrap();
        assert_eq!(model.mask_pattern(), Some(MaskPattern::Pattern0));
    }

    #[test]
    fn mask_penalties_of_hello() {
        let codewords = build_codewords(&[ByteSegment::new("HELLO")], Version::MIN, EcLevel::H)
            .unwrap();
        let penalties: Vec<u32> = ALL_PATTERNS
            .iter()
            .map(|m| penalty_score(&build(Version::MIN, EcLevel::H, &codewords, *m, true)))
            .collect();
        assert_eq!(penalties, vec![1269, 1266, 1266, 1284, 1162, 1256, 1190, 1304]);
        assert_eq!(
            best_mask(Version::MIN, EcLevel::H, &codewords, MaskPattern::all()),
            (MaskPattern::Pattern4, 1162)
        );
        // ties go to the lower index
        let tied = MaskPattern::Pattern1 | MaskPattern::Pattern2;
        assert_eq!(
            best_mask(Version::MIN, EcLevel::H, &codewords, tied),
            (MaskPattern::Pattern1, 1266)
        );
    }
}
