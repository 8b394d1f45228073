//! Locates the anchored field in a binary image and rewrites it.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use super::matcher::WildcardMatcher;
use crate::anchor::{FIELD_WIDTH, PatchPattern};
use crate::error::{Error, Result};

/// One occurrence of the search pattern in an image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldMatch {
    /// Start of the matched anchor.
    pub offset: usize,
    /// Absolute offset of the field.
    pub field_offset: usize,
    /// Field bytes as currently stored.
    pub raw: [u8; FIELD_WIDTH],
    /// Field decoded as `f32`.
    pub value: f32,
}

/// Result of scanning an image without modifying it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    pub image_len: usize,
    pub matches: Vec<FieldMatch>,
}

impl ScanReport {
    /// The single match, or the error the patch step would raise.
    pub fn unique(&self) -> Result<&FieldMatch> {
        match self.matches.as_slice() {
            [] => Err(Error::PatternNotFound),
            [only] => Ok(only),
            many => Err(Error::AmbiguousPattern(many.len())),
        }
    }
}

/// Outcome of a successful patch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PatchOutcome {
    /// Absolute offset of the rewritten field.
    pub field_offset: usize,
    /// Value found in the field before patching.
    pub previous: f32,
    /// Value written.
    pub written: f32,
    pub image_len: usize,
}

impl PatchOutcome {
    /// Whether the field already held the target value.
    pub fn unchanged(&self) -> bool {
        self.previous.to_bits() == self.written.to_bits()
    }
}

/// Applies a [`PatchPattern`] to images.
pub struct ImagePatcher<'a> {
    pattern: &'a PatchPattern,
    matcher: WildcardMatcher<'a>,
}

impl<'a> ImagePatcher<'a> {
    pub fn new(pattern: &'a PatchPattern) -> Self {
        Self {
            pattern,
            matcher: WildcardMatcher::new(pattern.search()),
        }
    }

    /// List every non-overlapping match in `image`.
    pub fn scan(&self, image: &[u8]) -> ScanReport {
        let matches: Vec<FieldMatch> = self
            .matcher
            .find_all(image)
            .into_iter()
            .map(|offset| {
                let field_offset = offset + self.pattern.field_offset();
                let mut raw = [0u8; FIELD_WIDTH];
                raw.copy_from_slice(&image[field_offset..field_offset + FIELD_WIDTH]);
                FieldMatch {
                    offset,
                    field_offset,
                    raw,
                    value: f32::from_le_bytes(raw),
                }
            })
            .collect();

        debug!(
            "Matches count: {}. Offsets: {:?}",
            matches.len(),
            matches.iter().map(|m| m.offset).collect::<Vec<_>>()
        );

        ScanReport {
            image_len: image.len(),
            matches,
        }
    }

    /// Rewrite the field in memory. Only the field bytes change.
    pub fn patch_in_place(&self, image: &mut [u8]) -> Result<PatchOutcome> {
        let report = self.scan(image);
        let found = *report.unique()?;

        let field = found.field_offset..found.field_offset + FIELD_WIDTH;
        image[field].copy_from_slice(&self.pattern.field_bytes());
        debug!(
            "Replaced field at 0x{:X}: {} -> {}",
            found.field_offset, found.value, self.pattern.target()
        );

        Ok(PatchOutcome {
            field_offset: found.field_offset,
            previous: found.value,
            written: self.pattern.target(),
            image_len: image.len(),
        })
    }

    pub fn scan_file<P: AsRef<Path>>(&self, path: P) -> Result<ScanReport> {
        let image = fs::read(path.as_ref())?;
        debug!("Read: {} ({} bytes)", path.as_ref().display(), image.len());
        Ok(self.scan(&image))
    }

    /// Read the whole file, patch the unique match, and write it back.
    ///
    /// Nothing is written unless exactly one match exists.
    pub fn patch_file<P: AsRef<Path>>(&self, path: P) -> Result<PatchOutcome> {
        self.patch_file_with(path.as_ref(), open_for_write)
    }

    fn patch_file_with<O>(&self, path: &Path, open: O) -> Result<PatchOutcome>
    where
        O: FnOnce(&Path) -> io::Result<File>,
    {
        let mut image = fs::read(path)?;
        debug!("Read: {} ({} bytes)", path.display(), image.len());

        let outcome = self.patch_in_place(&mut image)?;
        write_image(path, &image, open)?;
        info!(
            "Patched {} at 0x{:X}: {} -> {}",
            path.display(),
            outcome.field_offset,
            outcome.previous,
            outcome.written
        );

        Ok(outcome)
    }
}

/// Patch the image at `path` with `pattern`.
pub fn patch<P: AsRef<Path>>(path: P, pattern: &PatchPattern) -> Result<PatchOutcome> {
    ImagePatcher::new(pattern).patch_file(path)
}

/// Scan the image at `path` for `pattern` without writing.
pub fn scan<P: AsRef<Path>>(path: P, pattern: &PatchPattern) -> Result<ScanReport> {
    ImagePatcher::new(pattern).scan_file(path)
}

fn open_for_write(path: &Path) -> io::Result<File> {
    OpenOptions::new().write(true).truncate(true).open(path)
}

fn write_image<O>(path: &Path, image: &[u8], open: O) -> Result<()>
where
    O: FnOnce(&Path) -> io::Result<File>,
{
    let mut file = open(path).map_err(|e| {
        if is_lock_error(&e) {
            Error::TargetLocked {
                path: PathBuf::from(path),
                source: e,
            }
        } else {
            Error::Io(e)
        }
    })?;

    file.write_all(image)?;
    file.sync_all()?;

    let written = file.metadata()?.len() as usize;
    if written != image.len() {
        return Err(Error::LengthMismatch {
            expected: image.len(),
            actual: written,
        });
    }

    debug!("Written: {}", path.display());
    Ok(())
}

/// Errors meaning another process holds the file.
fn is_lock_error(e: &io::Error) -> bool {
    // ERROR_SHARING_VIOLATION / ERROR_LOCK_VIOLATION
    if cfg!(target_os = "windows") && matches!(e.raw_os_error(), Some(32) | Some(33)) {
        return true;
    }
    matches!(
        e.kind(),
        io::ErrorKind::PermissionDenied
            | io::ErrorKind::ResourceBusy
            | io::ErrorKind::ExecutableFileBusy
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::build;
    use tempfile::NamedTempFile;

    const ANCHOR: &str = "0000000000002e40000096440000e144";

    fn image_with(anchor_hex: &str, copies: usize) -> Vec<u8> {
        let anchor = crate::anchor::decode_hex(anchor_hex).unwrap();
        let mut image = vec![0xCCu8; 64];
        for _ in 0..copies {
            image.extend_from_slice(&anchor);
            image.extend_from_slice(&[0xCC; 32]);
        }
        image
    }

    #[test]
    fn test_patch_in_place_unique() {
        let pattern = build(ANCHOR, 1200.0, 1400.0).unwrap();
        let mut image = image_with(ANCHOR, 1);
        let original = image.clone();

        let outcome = ImagePatcher::new(&pattern)
            .patch_in_place(&mut image)
            .unwrap();
        assert_eq!(outcome.field_offset, 64 + 8);
        assert_eq!(outcome.previous, 1200.0);
        assert_eq!(outcome.written, 1400.0);
        assert_eq!(&image[72..76], &[0x00, 0x00, 0xAF, 0x44]);

        for (i, (before, after)) in original.iter().zip(&image).enumerate() {
            if !(72..76).contains(&i) {
                assert_eq!(before, after, "byte {} changed", i);
            }
        }
    }

    #[test]
    fn test_patch_in_place_not_found() {
        let pattern = build(ANCHOR, 1200.0, 1400.0).unwrap();
        let mut image = vec![0xCCu8; 256];
        assert!(matches!(
            ImagePatcher::new(&pattern).patch_in_place(&mut image),
            Err(Error::PatternNotFound)
        ));
    }

    #[test]
    fn test_patch_in_place_ambiguous() {
        let pattern = build(ANCHOR, 1200.0, 1400.0).unwrap();
        let mut image = image_with(ANCHOR, 2);
        let original = image.clone();
        assert!(matches!(
            ImagePatcher::new(&pattern).patch_in_place(&mut image),
            Err(Error::AmbiguousPattern(2))
        ));
        assert_eq!(image, original);
    }

    #[test]
    fn test_scan_matches_any_field_value() {
        let pattern = build(ANCHOR, 1200.0, 1400.0).unwrap();
        // Field already holds 1600.0
        let image = image_with("0000000000002e400000c8440000e144", 1);
        let report = ImagePatcher::new(&pattern).scan(&image);
        let found = report.unique().unwrap();
        assert_eq!(found.value, 1600.0);
        assert_eq!(found.raw, [0x00, 0x00, 0xC8, 0x44]);
    }

    #[test]
    fn test_patch_file_preserves_length() {
        let pattern = build(ANCHOR, 1200.0, 1400.0).unwrap();
        let file = NamedTempFile::new().unwrap();
        let image = image_with(ANCHOR, 1);
        fs::write(file.path(), &image).unwrap();

        let outcome = patch(file.path(), &pattern).unwrap();
        assert_eq!(outcome.image_len, image.len());

        let patched = fs::read(file.path()).unwrap();
        assert_eq!(patched.len(), image.len());
        assert_eq!(&patched[72..76], &1400.0f32.to_le_bytes());
    }

    #[test]
    fn test_patch_file_leaves_file_untouched_on_failure() {
        let pattern = build(ANCHOR, 1200.0, 1400.0).unwrap();
        let file = NamedTempFile::new().unwrap();
        let image = image_with(ANCHOR, 3);
        fs::write(file.path(), &image).unwrap();

        assert!(matches!(
            patch(file.path(), &pattern),
            Err(Error::AmbiguousPattern(3))
        ));
        assert_eq!(fs::read(file.path()).unwrap(), image);
    }

    #[test]
    fn test_patch_missing_file() {
        let pattern = build(ANCHOR, 1200.0, 1400.0).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let err = patch(dir.path().join("libclient.so"), &pattern).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_patch_file_reports_locked_target() {
        let pattern = build(ANCHOR, 1200.0, 1400.0).unwrap();
        let file = NamedTempFile::new().unwrap();
        let image = image_with(ANCHOR, 1);
        fs::write(file.path(), &image).unwrap();

        let err = ImagePatcher::new(&pattern)
            .patch_file_with(file.path(), |_| {
                Err(io::Error::new(io::ErrorKind::ResourceBusy, "in use"))
            })
            .unwrap_err();
        match err {
            Error::TargetLocked { path, .. } => assert_eq!(path, file.path()),
            other => panic!("expected TargetLocked, got {other:?}"),
        }
        assert_eq!(fs::read(file.path()).unwrap(), image);
    }

    #[test]
    fn test_patch_file_other_open_errors_stay_io() {
        let pattern = build(ANCHOR, 1200.0, 1400.0).unwrap();
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), image_with(ANCHOR, 1)).unwrap();

        let err = ImagePatcher::new(&pattern)
            .patch_file_with(file.path(), |_| {
                Err(io::Error::new(io::ErrorKind::NotFound, "gone"))
            })
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_lock_error_classification() {
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert!(is_lock_error(&denied));
        let missing = io::Error::new(io::ErrorKind::NotFound, "missing");
        assert!(!is_lock_error(&missing));
    }

    #[test]
    fn test_patch_outcome_unchanged() {
        let pattern = build(ANCHOR, 1200.0, 1200.0).unwrap();
        let mut image = image_with(ANCHOR, 1);
        let outcome = ImagePatcher::new(&pattern)
            .patch_in_place(&mut image)
            .unwrap();
        assert!(outcome.unchanged());
    }
}
