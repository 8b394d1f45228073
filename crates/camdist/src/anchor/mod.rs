//! Anchor parsing and pattern derivation.

mod builder;
pub mod hex;

pub use builder::*;
pub use hex::{FIELD_WIDTH, decode_hex, encode_f32, encode_hex, format_spaced, normalize_hex};

/// Reference value the shipped binaries carry in the patched field.
pub const DEFAULT_BASELINE: f32 = 1200.0;
