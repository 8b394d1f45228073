//! Interactive prompts for missing settings.

use std::io::{self, BufRead, Write};

/// Asks the operator for a value on one stream and reads the answer from another.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl LinePrompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prompt until a finite number is entered. An empty line or closed input
    /// selects `default`.
    pub fn prompt_f32(&mut self, message: &str, default: f32) -> f32 {
        loop {
            write!(self.output, "{}", message).ok();
            self.output.flush().ok();

            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) => return default,
                Ok(_) => {}
                Err(_) => {
                    writeln!(self.output, "Failed to read input, please try again").ok();
                    continue;
                }
            }

            let answer = line.trim();
            if answer.is_empty() {
                return default;
            }
            match answer.parse::<f32>() {
                Ok(value) if value.is_finite() => return value,
                _ => {
                    writeln!(self.output, "Invalid number, please try again").ok();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_prompt_parses_value() {
        let mut output = Vec::new();
        let value = LinePrompter::new(Cursor::new("1400\n"), &mut output)
            .prompt_f32("Enter distance: ", 1200.0);
        assert_eq!(value, 1400.0);
        assert_eq!(String::from_utf8(output).unwrap(), "Enter distance: ");
    }

    #[test]
    fn test_prompt_empty_line_uses_default() {
        let value = LinePrompter::new(Cursor::new("\n"), Vec::new()).prompt_f32("> ", 1200.0);
        assert_eq!(value, 1200.0);
    }

    #[test]
    fn test_prompt_retries_invalid_input() {
        let mut output = Vec::new();
        let value = LinePrompter::new(Cursor::new("far\ninf\n1600\n"), &mut output)
            .prompt_f32("> ", 1200.0);
        assert_eq!(value, 1600.0);
        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.matches("Invalid number").count(), 2);
    }

    #[test]
    fn test_prompt_closed_input_uses_default() {
        let value = LinePrompter::new(Cursor::new(""), Vec::new()).prompt_f32("> ", 1200.0);
        assert_eq!(value, 1200.0);
    }
}
