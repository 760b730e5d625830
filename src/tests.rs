use enum_iterator::all;
use pretty_assertions::assert_eq;

use crate::placement::format::decode_format_info;
use crate::placement::mask::{penalty_score, ALL_PATTERNS};
use crate::placement::{build, Bitmap};
use crate::{
    build_codewords, data::ByteSegment, encode, encode_with, EcLevel, EncodeOptions, MaskPattern,
    QrCodeModel, QrError, Version,
};

fn rows(bitmap: &Bitmap) -> Vec<String> {
    (0..bitmap.height())
        .map(|r| {
            (0..bitmap.width())
                .map(|c| if bitmap.is_dark(r, c) == Some(true) { '#' } else { '.' })
                .collect()
        })
        .collect()
}

fn model(text: &str, options: EncodeOptions) -> QrCodeModel {
    let mut model = QrCodeModel::with_options(options);
    model.add_data(text);
    model.make().unwrap();
    model
}

fn assert_finder_at(bitmap: &Bitmap, top: usize, left: usize) {
    for r in 0..7 {
        for c in 0..7 {
            let ring = r == 0 || r == 6 || c == 0 || c == 6;
            let center = (2..=4).contains(&r) && (2..=4).contains(&c);
            assert_eq!(
                bitmap.is_dark(top + r, left + c),
                Some(ring || center),
                "finder at ({}, {}), module ({}, {})",
                top,
                left,
                r,
                c
            );
        }
    }
}

#[test]
fn hello_h() {
    let bitmap = encode("HELLO", EcLevel::H).unwrap();
    #[rustfmt::skip]
    let should = [
        "#######..#..#.#######",
        "#.....#.###...#.....#",
        "#.###.#..#.##.#.###.#",
        "#.###.#..###..#.###.#",
        "#.###.#..##.#.#.###.#",
        "#.....#.###...#.....#",
        "#######.#.#.#.#######",
        "........###.#........",
        "....####.#..#.##...#.",
        "#.###..###...###.####",
        "##..####.##.#..##..#.",
        ".###.#..#.###.#.#....",
        "####..######......##.",
        "........###......#.##",
        "#######.#...###..#.#.",
        "#.....#.####.###...#.",
        "#.###.#.#..#...##.#.#",
        "#.###.#..#.#..#..#.##",
        "#.###.#..#.#.#.###...",
        "#.....#....#.##......",
        "#######..#.##..##.#.#",
    ];
    assert_eq!(rows(&bitmap), should);
}

/// Decode the symbol with an independent reader.
fn read_back(bitmap: &Bitmap) -> String {
    const QUIET: usize = 4;
    const SCALE: usize = 4;
    let side = (bitmap.width() + 2 * QUIET) * SCALE;
    let mut image = rqrr::PreparedImage::prepare_from_greyscale(side, side, |x, y| {
        let (row, col) = (y / SCALE, x / SCALE);
        let dark = row >= QUIET
            && col >= QUIET
            && bitmap.is_dark(row - QUIET, col - QUIET) == Some(true);
        if dark {
            0
        } else {
            255
        }
    });
    let grids = image.detect_grids();
    assert_eq!(grids.len(), 1);
    let (_meta, content) = grids[0].decode().unwrap();
    content
}

#[test]
fn readable_by_other_decoder() {
    let hello = encode("HELLO", EcLevel::H).unwrap();
    assert_eq!(read_back(&hello), "HELLO");

    // several blocks and version information
    let options = EncodeOptions {
        version: Version::new(7).ok(),
        ..EncodeOptions::new(EcLevel::M)
    };
    let text = "interleaved blocks with version information";
    assert_eq!(read_back(&encode_with(text, &options).unwrap()), text);

    let text = "0123456789".repeat(100);
    let model = model(&text, EncodeOptions::new(EcLevel::Q));
    assert_eq!(model.version(), Version::new(31).ok());
    assert_eq!(read_back(model.bitmap().unwrap()), text);
}

#[test]
fn example_url_auto_version() {
    let model = model("https://example.com", EncodeOptions::new(EcLevel::H));
    // 19 bytes fit the 24 byte capacity of 3-H
    assert_eq!(model.version(), Version::new(3).ok());
    assert_eq!(model.module_count(), 29);
    assert_eq!(model.mask_pattern(), Some(MaskPattern::Pattern3));
    assert_eq!(model.dark_modules().count(), 436);
    let bitmap = model.bitmap().unwrap();
    assert_finder_at(bitmap, 0, 0);
    assert_finder_at(bitmap, 0, 22);
    assert_finder_at(bitmap, 22, 0);
}

#[test]
fn example_url_version_4() {
    let options = EncodeOptions {
        version: Version::new(4).ok(),
        ..EncodeOptions::new(EcLevel::H)
    };
    let model = model("https://example.com", options);
    assert_eq!(model.module_count(), 33);
    assert_eq!(model.mask_pattern(), Some(MaskPattern::Pattern2));
    assert_eq!(model.dark_modules().count(), 537);
    let bitmap = model.bitmap().unwrap();
    assert_finder_at(bitmap, 0, 0);
    assert_finder_at(bitmap, 0, 26);
    assert_finder_at(bitmap, 26, 0);
}

#[test]
fn codeword_streams() {
    let long = "A".repeat(200);
    let cases: [(&str, EcLevel, u8, &[u8], usize); 3] = [
        (
            "https://example.com",
            EcLevel::H,
            3,
            &[65, 215, 54, 6, 135, 198, 71, 82, 71, 230, 7, 54],
            70,
        ),
        (
            "Doppelgänger",
            EcLevel::Q,
            2,
            &[65, 14, 251, 187, 244, 70, 247, 7, 6, 86, 198, 124],
            44,
        ),
        (
            long.as_str(),
            EcLevel::M,
            10,
            &[64, 20, 20, 20, 20, 12, 20, 20, 20, 20, 132, 20],
            346,
        ),
    ];
    for (text, ec_level, version, start, total) in cases {
        let version = Version::new(version).unwrap();
        let codewords = build_codewords(&[ByteSegment::new(text)], version, ec_level).unwrap();
        assert_eq!(&codewords[..start.len()], start);
        assert_eq!(codewords.len(), total);
    }
}

#[test]
fn larger_symbols() {
    let model_q = model("Doppelgänger", EncodeOptions::new(EcLevel::Q));
    assert_eq!(model_q.version(), Version::new(2).ok());
    assert_eq!(model_q.mask_pattern(), Some(MaskPattern::Pattern4));
    assert_eq!(model_q.dark_modules().count(), 328);

    let model_m = model(&"A".repeat(200), EncodeOptions::new(EcLevel::M));
    assert_eq!(model_m.version(), Version::new(10).ok());
    assert_eq!(model_m.module_count(), 57);
    assert_eq!(model_m.mask_pattern(), Some(MaskPattern::Pattern3));
    assert_eq!(model_m.dark_modules().count(), 1482);
}

#[test]
fn capacity_boundary_40_l() {
    let text = "a".repeat(2953);
    let model = model(&text, EncodeOptions::new(EcLevel::L));
    assert_eq!(model.version(), Some(Version::MAX));
    assert_eq!(model.module_count(), 177);
    assert_eq!(model.mask_pattern(), Some(MaskPattern::Pattern3));
    assert_eq!(model.dark_modules().count(), 14906);

    let text = "a".repeat(2954);
    assert_eq!(
        encode(&text, EcLevel::L),
        Err(QrError::CapacityExceeded {
            length: 2954,
            ec_level: EcLevel::L
        })
    );
}

#[test]
fn module_count_of_all_versions() {
    for version in Version::all() {
        for ec_level in all::<EcLevel>() {
            let options = EncodeOptions {
                version: Some(version),
                ec_level,
                masks: MaskPattern::Pattern0.into(),
            };
            let mut model = QrCodeModel::with_options(options);
            model.add_data("QR");
            model.make().unwrap();
            let n = 4 * version.number() as usize + 17;
            assert_eq!(model.module_count(), n);
            assert!(model.is_dark(n - 1, n - 1).is_ok());
            assert!(model.is_dark(n, 0).is_err());
            assert!(model.is_dark(0, n).is_err());
        }
    }
}

#[test]
fn deterministic() {
    let a = encode("Determinism", EcLevel::Q).unwrap();
    let b = encode("Determinism", EcLevel::Q).unwrap();
    assert_eq!(a, b);
}

#[test]
fn selected_mask_is_optimal() {
    for (text, ec_level) in [
        ("https://example.com", EcLevel::H),
        ("HELLO", EcLevel::L),
        ("Doppelgänger", EcLevel::Q),
    ] {
        let model = model(text, EncodeOptions::new(ec_level));
        let version = model.version().unwrap();
        let codewords = build_codewords(&[ByteSegment::new(text)], version, ec_level).unwrap();
        let chosen = model.mask_pattern().unwrap();
        let score = |m| penalty_score(&build(version, ec_level, &codewords, m, true));
        let best = score(chosen);
        for mask in ALL_PATTERNS {
            assert!(best <= score(mask), "{:?} beats {:?}", mask, chosen);
            if mask.index() < chosen.index() {
                assert!(best < score(mask));
            }
        }
    }
}

#[test]
fn final_symbol_matches_test_layout_outside_info() {
    let model = model("HELLO", EncodeOptions::new(EcLevel::H));
    let mask = model.mask_pattern().unwrap();
    let codewords = build_codewords(&[ByteSegment::new("HELLO")], Version::MIN, EcLevel::H).unwrap();
    let test = build(Version::MIN, EcLevel::H, &codewords, mask, true);
    let n = model.module_count();
    let is_info = |r: usize, c: usize| {
        (r == 8 && (c <= 8 || c >= n - 8)) || (c == 8 && (r <= 8 || r >= n - 8))
    };
    for r in 0..n {
        for c in 0..n {
            if !is_info(r, c) {
                assert_eq!(Some(model.is_dark(r, c).unwrap()), test.is_dark(r, c));
            }
        }
    }
}

fn read_format_strips(bitmap: &Bitmap) -> (u16, u16) {
    let n = bitmap.width();
    let bit = |r: usize, c: usize| bitmap.is_dark(r, c) == Some(true);
    let mut vertical = 0u16;
    let mut horizontal = 0u16;
    for i in 0..15 {
        let v = match i {
            0..=5 => bit(i, 8),
            6..=7 => bit(i + 1, 8),
            _ => bit(n - 15 + i, 8),
        };
        let h = match i {
            0..=7 => bit(8, n - i - 1),
            8 => bit(8, 15 - i),
            _ => bit(8, 15 - i - 1),
        };
        vertical |= (v as u16) << i;
        horizontal |= (h as u16) << i;
    }
    (vertical, horizontal)
}

#[test]
fn format_info_decodes_from_symbol() {
    let options = EncodeOptions {
        masks: MaskPattern::Pattern0.into(),
        ..EncodeOptions::new(EcLevel::H)
    };
    let bitmap = encode_with("https://example.com", &options).unwrap();
    let (vertical, horizontal) = read_format_strips(&bitmap);
    assert_eq!(vertical, 0b001_0110_1000_1001);
    assert_eq!(horizontal, vertical);
    assert_eq!(
        decode_format_info(vertical),
        Some((EcLevel::H, MaskPattern::Pattern0))
    );
    // the dark module
    assert_eq!(bitmap.is_dark(bitmap.width() - 8, 8), Some(true));
}

#[test]
fn version_info_in_symbol() {
    let options = EncodeOptions {
        version: Version::new(7).ok(),
        masks: MaskPattern::Pattern1.into(),
        ..EncodeOptions::new(EcLevel::M)
    };
    let bitmap = encode_with("version seven", &options).unwrap();
    let n = bitmap.width();
    let mut top_right = 0u32;
    let mut bottom_left = 0u32;
    for i in 0..18 {
        top_right |= (bitmap.is_dark(i / 3, i % 3 + n - 11) == Some(true)) as u32 * (1 << i);
        bottom_left |= (bitmap.is_dark(i % 3 + n - 11, i / 3) == Some(true)) as u32 * (1 << i);
    }
    assert_eq!(top_right, 0b00_0111_1100_1001_0100);
    assert_eq!(bottom_left, top_right);
}

#[test]
fn forced_version_overflow() {
    let options = EncodeOptions {
        version: Some(Version::MIN),
        ..EncodeOptions::new(EcLevel::L)
    };
    let text = "x".repeat(18);
    assert_eq!(
        encode_with(&text, &options),
        Err(QrError::BufferOverflow {
            bits: 4 + 8 + 18 * 8,
            capacity: 19 * 8
        })
    );
}

#[test]
fn unicode_demo_output() {
    let model = model("HELLO", EncodeOptions::new(EcLevel::H));
    let art = model.unicode().unwrap();
    // (21 + 8) modules high, two per line
    assert_eq!(art.lines().count(), 15);
    assert!(art.contains('█'));
}
