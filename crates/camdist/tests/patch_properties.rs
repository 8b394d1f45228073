//! End-to-end behaviour of building a pattern and patching image files.

use std::fs;

use camdist::{AnchorDefect, Error, ImagePatcher, PatternBuilder, anchor, build, patch, scan};
use tempfile::NamedTempFile;

const ANCHOR: &str = "0000000000002e40000096440000e144";

/// A fake library: pseudo-random filler with the anchor spliced in at `at`.
fn synthetic_image(len: usize, inserts: &[(usize, &str)]) -> Vec<u8> {
    let mut state = 0x2545_F491u32;
    let mut image: Vec<u8> = (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect();
    for (at, hex) in inserts {
        let bytes = anchor::decode_hex(hex).unwrap();
        image[*at..*at + bytes.len()].copy_from_slice(&bytes);
    }
    image
}

fn write_temp(image: &[u8]) -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    fs::write(file.path(), image).unwrap();
    file
}

#[test]
fn round_trip_restores_original_image() {
    let original = synthetic_image(64 * 1024, &[(40_000, ANCHOR)]);
    let file = write_temp(&original);

    let forward = build(ANCHOR, 1200.0, 1400.0).unwrap();
    patch(file.path(), &forward).unwrap();
    assert_ne!(fs::read(file.path()).unwrap(), original);

    let outcome = patch(file.path(), &forward.reversed()).unwrap();
    assert_eq!(outcome.previous, 1400.0);
    assert_eq!(outcome.written, 1200.0);
    assert_eq!(fs::read(file.path()).unwrap(), original);
}

#[test]
fn only_the_field_changes() {
    let original = synthetic_image(32 * 1024, &[(1_000, ANCHOR)]);
    let file = write_temp(&original);

    let pattern = build(ANCHOR, 1200.0, 1400.0).unwrap();
    let outcome = patch(file.path(), &pattern).unwrap();
    assert_eq!(outcome.field_offset, 1_008);

    let patched = fs::read(file.path()).unwrap();
    assert_eq!(patched.len(), original.len());
    let changed: Vec<usize> = original
        .iter()
        .zip(&patched)
        .enumerate()
        .filter(|(_, (a, b))| a != b)
        .map(|(i, _)| i)
        .collect();
    // 1200.0 and 1400.0 differ only in their third byte
    assert_eq!(changed, vec![1_010]);
    assert_eq!(&patched[1_008..1_012], &1400.0f32.to_le_bytes());
}

#[test]
fn duplicate_anchor_is_ambiguous() {
    let original = synthetic_image(16 * 1024, &[(100, ANCHOR), (9_000, ANCHOR)]);
    let file = write_temp(&original);

    let pattern = build(ANCHOR, 1200.0, 1400.0).unwrap();
    let err = patch(file.path(), &pattern).unwrap_err();
    assert!(matches!(err, Error::AmbiguousPattern(2)));
    assert_eq!(fs::read(file.path()).unwrap(), original);
}

#[test]
fn stale_anchor_is_not_found() {
    let original = synthetic_image(16 * 1024, &[(100, "0000000000002e40000096440000e145")]);
    let file = write_temp(&original);

    let pattern = build(ANCHOR, 1200.0, 1400.0).unwrap();
    let err = patch(file.path(), &pattern).unwrap_err();
    assert!(err.is_stale_anchor());
    assert_eq!(fs::read(file.path()).unwrap(), original);
}

#[test]
fn invalid_anchors_are_rejected_before_io() {
    assert!(matches!(
        build("00009644", 1200.0, 1400.0),
        Err(Error::InvalidAnchor {
            reason: AnchorDefect::TooShort { .. }
        })
    ));
    assert!(matches!(
        build("0000000000002e400000c8440000e144", 1200.0, 1400.0),
        Err(Error::InvalidAnchor {
            reason: AnchorDefect::BaselineAbsent { .. }
        })
    ));
}

#[test]
fn already_patched_field_is_still_found() {
    let original = synthetic_image(8 * 1024, &[(512, "0000000000002e400000c8440000e144")]);
    let file = write_temp(&original);

    let pattern = build(ANCHOR, 1200.0, 1400.0).unwrap();
    let report = scan(file.path(), &pattern).unwrap();
    assert_eq!(report.unique().unwrap().value, 1600.0);

    let outcome = patch(file.path(), &pattern).unwrap();
    assert_eq!(outcome.previous, 1600.0);
    assert_eq!(outcome.written, 1400.0);
}

#[test]
fn reference_scenario() {
    let pattern = PatternBuilder::new(1200.0).build(ANCHOR, 1400.0).unwrap();
    assert_eq!(
        pattern.replacement_hex(),
        "0000000000002e400000af440000e144"
    );
    assert_eq!(anchor::encode_hex(pattern.prefix()), "0000000000002e40");
    assert_eq!(anchor::encode_hex(pattern.suffix()), "0000e144");

    let mut image = synthetic_image(4 * 1024, &[(2_048, ANCHOR)]);
    let report = ImagePatcher::new(&pattern).scan(&image);
    assert_eq!(report.matches.len(), 1);

    ImagePatcher::new(&pattern)
        .patch_in_place(&mut image)
        .unwrap();
    assert_eq!(
        anchor::encode_hex(&image[2_048..2_064]),
        "0000000000002e400000af440000e144"
    );
}
