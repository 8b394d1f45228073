//! Hex string and field encoding helpers.

use crate::error::{AnchorDefect, Error, Result};

/// Width of the patched field in bytes (one `f32`).
pub const FIELD_WIDTH: usize = 4;

/// Strip whitespace and lowercase a hex string, rejecting anything that is not
/// an even run of hex digits.
pub fn normalize_hex(input: &str) -> Result<String> {
    let normalized: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    if let Some(bad) = normalized.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(Error::invalid_anchor(AnchorDefect::Malformed(format!(
            "unexpected character '{}'",
            bad
        ))));
    }

    if normalized.len() % 2 != 0 {
        return Err(Error::invalid_anchor(AnchorDefect::Malformed(format!(
            "odd number of hex digits ({})",
            normalized.len()
        ))));
    }

    Ok(normalized)
}

/// Decode a hex string (whitespace and case are ignored) into raw bytes.
pub fn decode_hex(input: &str) -> Result<Vec<u8>> {
    let normalized = normalize_hex(input)?;
    normalized
        .as_bytes()
        .chunks(2)
        .map(|pair| {
            // normalize_hex guarantees ASCII hex digits
            let digits = std::str::from_utf8(pair).unwrap_or("");
            u8::from_str_radix(digits, 16).map_err(|e| {
                Error::invalid_anchor(AnchorDefect::Malformed(format!(
                    "invalid byte '{}': {}",
                    digits, e
                )))
            })
        })
        .collect()
}

/// Lowercase hex without separators.
pub fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Space separated uppercase hex, the format anchors are usually published in.
pub fn format_spaced(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Encode a value as little-endian IEEE-754 single precision.
pub fn encode_f32(value: f32) -> Result<[u8; FIELD_WIDTH]> {
    if !value.is_finite() {
        return Err(Error::InvalidValue(value));
    }
    Ok(value.to_le_bytes())
}

pub fn decode_f32(bytes: [u8; FIELD_WIDTH]) -> f32 {
    f32::from_le_bytes(bytes)
}
