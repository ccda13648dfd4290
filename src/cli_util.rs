use std::io::{self, IsTerminal, Write};

use nu_ansi_term::Style;

use crate::error::{ParseError, RuntimeError, VmError};
use crate::theme::catppuccin::Mocha;

/// Pretty-print a [`VmError`] with caret positioning.
///
/// `offsets` maps instruction indices back to char offsets in `code`, so
/// runtime errors point at the character that failed. If `program` is
/// `Some("bf")`, messages are prefixed with "bf: ...".
pub fn print_vm_error(program: Option<&str>, code: &str, offsets: &[usize], err: &VmError) {
    let prefix_program = |msg: &str| {
        if let Some(p) = program {
            format!("{p}: {msg}")
        } else {
            msg.to_string()
        }
    };

    match err {
        VmError::Parse(e) => {
            let msg = prefix_program(&format!("Parse error: {}", parse_error_summary(e)));
            print_error_with_context(&msg, code, e.offset());
        }
        VmError::Runtime(e) => {
            let msg = prefix_program(&format!("Runtime error: {}", runtime_error_summary(e)));
            let pos = offsets.get(e.ip()).copied().unwrap_or(e.ip());
            print_error_with_context(&msg, code, pos);
        }
        other => {
            eprintln!("{}", styled_header(&prefix_program(&other.to_string())));
            let _ = io::stderr().flush();
        }
    }
}

fn parse_error_summary(err: &ParseError) -> &'static str {
    match err {
        ParseError::UnmatchedCloseBracket { .. } => "unmatched bracket ']'",
        ParseError::UnmatchedOpenBracket { .. } => "unmatched bracket '['",
    }
}

fn runtime_error_summary(err: &RuntimeError) -> String {
    match err {
        RuntimeError::InvalidDataIndex { pointer, .. } => {
            format!("data pointer out of bounds (ptr={pointer})")
        }
        RuntimeError::InvalidInstructionIndex { target, .. } => {
            format!("jump target out of range (target={target})")
        }
    }
}

/// Styled error header for TTY stderr; keep pipelines clean otherwise.
fn styled_header(msg: &str) -> String {
    if io::stderr().is_terminal() {
        Style::new().fg(Mocha::RED).bold().paint(msg).to_string()
    } else {
        msg.to_string()
    }
}

/// Print a concise error with source position and a caret context window,
/// working with UTF-8 by slicing using char indices.
pub fn print_error_with_context(prefix: &str, code: &str, pos: usize) {
    let (header, slice, underline) = render_error_context(prefix, code, pos);
    eprintln!("{}", styled_header(&header));
    eprintln!("  {}", slice);
    eprintln!("  {}", underline);
    let _ = io::stderr().flush();
}

/// Build the header, source window and caret line for an error at char `pos`.
fn render_error_context(prefix: &str, code: &str, pos: usize) -> (String, String, String) {
    // Show a short window around the position for context
    const WINDOW_CHARS: usize = 32;

    let total_chars = code.chars().count();
    let start_char = pos.saturating_sub(WINDOW_CHARS);
    let end_char = (pos + WINDOW_CHARS + 1).min(total_chars);

    let slice: String = code
        .chars()
        .skip(start_char)
        .take(end_char.saturating_sub(start_char))
        .map(|c| if c == '\n' || c == '\t' { ' ' } else { c })
        .collect();

    // Caret under the exact position
    let caret_offset_chars = pos.saturating_sub(start_char);
    let underline = format!("{}^", " ".repeat(caret_offset_chars));

    (format!("{prefix} at position {pos}"), slice, underline)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caret_sits_under_the_position() {
        let (header, slice, underline) = render_error_context("bf: oops", "+++]", 3);
        assert_eq!(header, "bf: oops at position 3");
        assert_eq!(slice, "+++]");
        assert_eq!(underline, "   ^");
    }

    #[test]
    fn long_sources_are_windowed() {
        let code = format!("{}]{}", "+".repeat(100), "-".repeat(100));
        let (_, slice, underline) = render_error_context("e", &code, 100);
        assert_eq!(slice.chars().count(), 65);
        assert_eq!(slice.chars().nth(32), Some(']'));
        assert_eq!(underline.len(), 33);
    }

    #[test]
    fn multibyte_chars_are_counted_as_one() {
        let (_, slice, underline) = render_error_context("e", "é+é]", 3);
        assert_eq!(slice, "é+é]");
        assert_eq!(underline, "   ^");
    }

    #[test]
    fn newlines_are_flattened() {
        let (_, slice, _) = render_error_context("e", "+\n]", 2);
        assert_eq!(slice, "+ ]");
    }
}
