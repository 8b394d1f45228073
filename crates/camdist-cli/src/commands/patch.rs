//! Patch command implementation.

use std::path::Path;

use anyhow::Result;
use camdist::PatternBuilder;
use owo_colors::OwoColorize;

/// Run the patch command
pub fn run(file: &Path, anchor: &str, distance: f32, baseline: f32, strict: bool) -> Result<()> {
    let pattern = PatternBuilder::new(baseline)
        .strict(strict)
        .build(anchor, distance)?;
    for advisory in pattern.advisories() {
        eprintln!("{} {}", "warning:".yellow().bold(), advisory);
    }

    let outcome = camdist::patch(file, &pattern)?;

    println!("Patched: {}", file.display());
    println!("Field:   0x{:X}", outcome.field_offset);
    if outcome.unchanged() {
        println!("Value:   {} (already set)", outcome.written);
    } else {
        println!("Value:   {} -> {}", outcome.previous, outcome.written);
    }

    Ok(())
}
