//! Encode command implementation.

use anyhow::Result;
use camdist::anchor::{encode_f32, encode_hex, format_spaced};

/// Run the encode command
pub fn run(value: f32) -> Result<()> {
    let bytes = encode_f32(value)?;

    println!("Value:   {}", value);
    println!("Hex:     {}", encode_hex(&bytes));
    println!("Spaced:  {}", format_spaced(&bytes));

    Ok(())
}
