//! Scan command implementation.
//!
//! Shows where an anchor matches without writing anything, so a new anchor
//! can be checked against a fresh client library before it is published.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use camdist::{ImagePatcher, PatternBuilder};
use owo_colors::OwoColorize;

use crate::hexdump::dump_lines;

/// Bytes of context shown around each match
const CONTEXT: usize = 16;

/// Run the scan command
pub fn run(file: &Path, anchor: &str, baseline: f32, json: bool) -> Result<()> {
    // Target equal to baseline: the pattern is only used for matching
    let pattern = PatternBuilder::new(baseline).build(anchor, baseline)?;
    let image =
        fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let report = ImagePatcher::new(&pattern).scan(&image);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Image:   {} ({} bytes)", file.display(), report.image_len);
    println!("Pattern: {}", pattern.search_hex());
    for advisory in pattern.advisories() {
        println!("{} {}", "warning:".yellow().bold(), advisory);
    }
    println!("Matches: {}", report.matches.len());

    for found in &report.matches {
        println!();
        println!(
            "  Match at 0x{:X}, field at 0x{:X} = {} ({})",
            found.offset,
            found.field_offset,
            found.value,
            camdist::anchor::format_spaced(&found.raw)
        );
        let start = found.offset.saturating_sub(CONTEXT);
        let end = found.offset + pattern.len() + CONTEXT;
        let field = found.field_offset..found.field_offset + camdist::anchor::FIELD_WIDTH;
        for line in dump_lines(&image, start..end, field, true) {
            println!("    {}", line);
        }
    }

    println!();
    match report.unique() {
        Ok(_) => println!("{}", "Anchor is unique, the image can be patched".green()),
        Err(e) => println!("{} {}", "error:".red().bold(), e),
    }

    Ok(())
}
