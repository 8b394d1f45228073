//! Derives the wildcarded search pattern and replacement bytes from an anchor.

use std::fmt;
use std::ops::Range;

use tracing::{debug, error, warn};

use super::hex::{FIELD_WIDTH, decode_f32, decode_hex, encode_f32, encode_hex, normalize_hex};
use crate::error::{AnchorDefect, Error, Result};

/// Anchors of this many hex digits or fewer are rejected.
pub const REJECT_MAX_DIGITS: usize = 8;
/// Anchors of this many hex digits or fewer are accepted with a low-confidence advisory.
pub const LOW_CONFIDENCE_MAX_DIGITS: usize = 16;
/// Length at which an anchor is considered specific enough.
pub const RECOMMENDED_DIGITS: usize = 24;

/// Non-fatal anchor weaknesses surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    /// Anchor is longer than the rejection threshold but shorter than recommended.
    LowConfidence { digits: usize },
    /// The baseline encoding starts the anchor, so there is no leading context.
    WeakAnchor,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::LowConfidence { digits } => write!(
                f,
                "anchor is only {} hex digits long, the search might match more than once; \
                 use at least {} hex digits",
                digits, RECOMMENDED_DIGITS
            ),
            Advisory::WeakAnchor => write!(
                f,
                "anchor starts with the baseline encoding, which makes the search slower; \
                 shift it so it starts with other bytes"
            ),
        }
    }
}

/// A search pattern with a single 4-byte wildcard and the bytes that replace it.
///
/// Only [`PatternBuilder`] constructs these, so the wildcard always lies
/// inside the pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchPattern {
    /// Anchor bytes, `None` at the wildcard positions.
    search: Vec<Option<u8>>,
    /// Anchor bytes with the target encoding at the wildcard positions.
    replacement: Vec<u8>,
    /// Start of the wildcard within the pattern.
    field_offset: usize,
    baseline: f32,
    target: f32,
    advisories: Vec<Advisory>,
}

impl PatchPattern {
    /// Anchor bytes, `None` at the wildcard positions.
    pub fn search(&self) -> &[Option<u8>] {
        &self.search
    }

    /// Anchor bytes with the target encoding in place of the field.
    pub fn replacement(&self) -> &[u8] {
        &self.replacement
    }

    /// Start of the wildcard within the pattern.
    pub fn field_offset(&self) -> usize {
        self.field_offset
    }

    pub fn baseline(&self) -> f32 {
        self.baseline
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    pub fn len(&self) -> usize {
        self.search.len()
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_empty()
    }

    /// Position of the field relative to the start of a match.
    pub fn field_range(&self) -> Range<usize> {
        self.field_offset..self.field_offset + FIELD_WIDTH
    }

    /// Literal bytes before the wildcard.
    pub fn prefix(&self) -> &[u8] {
        &self.replacement[..self.field_offset]
    }

    /// Literal bytes after the wildcard.
    pub fn suffix(&self) -> &[u8] {
        &self.replacement[self.field_offset + FIELD_WIDTH..]
    }

    /// Encoded target value.
    pub fn field_bytes(&self) -> [u8; FIELD_WIDTH] {
        let mut field = [0u8; FIELD_WIDTH];
        field.copy_from_slice(&self.replacement[self.field_range()]);
        field
    }

    /// Search pattern as hex with `??` for wildcard bytes.
    pub fn search_hex(&self) -> String {
        self.search
            .iter()
            .map(|b| match b {
                Some(value) => format!("{:02x}", value),
                None => "??".to_string(),
            })
            .collect()
    }

    pub fn replacement_hex(&self) -> String {
        encode_hex(&self.replacement)
    }

    /// The same anchor pointed the other way, restoring `baseline` over `target`.
    pub fn reversed(&self) -> Self {
        let mut replacement = self.replacement.clone();
        let range = self.field_range();
        replacement[range].copy_from_slice(&self.baseline.to_le_bytes());
        Self {
            search: self.search.clone(),
            replacement,
            field_offset: self.field_offset,
            baseline: self.target,
            target: self.baseline,
            advisories: self.advisories.clone(),
        }
    }
}

/// Builds [`PatchPattern`]s for a fixed baseline value.
#[derive(Debug, Clone, Copy)]
pub struct PatternBuilder {
    baseline: f32,
    strict: bool,
}

impl PatternBuilder {
    pub fn new(baseline: f32) -> Self {
        Self {
            baseline,
            strict: false,
        }
    }

    /// Promote advisories to [`Error::InvalidAnchor`] failures.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn baseline(&self) -> f32 {
        self.baseline
    }

    pub fn build(&self, anchor_hex: &str, target: f32) -> Result<PatchPattern> {
        let normalized = normalize_hex(anchor_hex)?;
        let digits = normalized.len();

        let mut advisories = Vec::new();
        if digits <= REJECT_MAX_DIGITS {
            return Err(Error::invalid_anchor(AnchorDefect::TooShort { digits }));
        } else if digits <= LOW_CONFIDENCE_MAX_DIGITS {
            advisories.push(Advisory::LowConfidence { digits });
        }

        let baseline_bytes = encode_f32(self.baseline)?;
        let target_bytes = encode_f32(target)?;
        let anchor = decode_hex(&normalized)?;

        let field_offset = memchr::memmem::find(&anchor, &baseline_bytes).ok_or_else(|| {
            Error::invalid_anchor(AnchorDefect::BaselineAbsent {
                baseline_hex: encode_hex(&baseline_bytes),
            })
        })?;
        if field_offset == 0 {
            advisories.push(Advisory::WeakAnchor);
        }

        for advisory in &advisories {
            match advisory {
                Advisory::LowConfidence { .. } => error!("Anchor {}: {}", normalized, advisory),
                Advisory::WeakAnchor => warn!("Anchor {}: {}", normalized, advisory),
            }
        }
        if self.strict
            && let Some(advisory) = advisories.first()
        {
            return Err(Error::invalid_anchor(AnchorDefect::Strict(*advisory)));
        }

        let field = field_offset..field_offset + FIELD_WIDTH;
        let search = anchor
            .iter()
            .enumerate()
            .map(|(i, &b)| if field.contains(&i) { None } else { Some(b) })
            .collect();

        let mut replacement = anchor;
        replacement[field].copy_from_slice(&target_bytes);

        let pattern = PatchPattern {
            search,
            replacement,
            field_offset,
            baseline: decode_f32(baseline_bytes),
            target: decode_f32(target_bytes),
            advisories,
        };
        debug!("Search pattern: {}", pattern.search_hex());
        debug!("Replacement: {}", pattern.replacement_hex());

        Ok(pattern)
    }
}

/// Build a pattern for `anchor_hex`, replacing `baseline` with `target`.
pub fn build(anchor_hex: &str, baseline: f32, target: f32) -> Result<PatchPattern> {
    PatternBuilder::new(baseline).build(anchor_hex, target)
}
