//! Hexdump rendering for match context.
//!
//! ```text
//! 0x0001F3A0: 00 00 00 00 00 00 2E 40  00 00 96 44 00 00 E1 44
//! ```

use std::ops::Range;

use owo_colors::OwoColorize;

const ROW: usize = 16;

/// Render `image[range]` in 16-byte rows aligned to absolute offsets.
///
/// Bytes inside `highlight` are colored when `color` is set.
pub fn dump_lines(
    image: &[u8],
    range: Range<usize>,
    highlight: Range<usize>,
    color: bool,
) -> Vec<String> {
    let end = range.end.min(image.len());
    let mut lines = Vec::new();
    let mut row = range.start - range.start % ROW;

    while row < end {
        let mut line = format!("0x{:08X}: ", row);
        for offset in row..row + ROW {
            if offset == row + ROW / 2 {
                line.push(' ');
            }
            if offset < range.start || offset >= end {
                line.push_str("   ");
                continue;
            }

            let byte = format!("{:02X}", image[offset]);
            if color && highlight.contains(&offset) {
                line.push_str(&byte.red().bold().to_string());
            } else {
                line.push_str(&byte);
            }
            line.push(' ');
        }
        lines.push(line.trim_end().to_string());
        row += ROW;
    }

    lines
}
