//! Read-only line view of the baseline text.
//!
//! The baseline is supplied once at tracker creation and never mutated, so this adapter only
//! needs line access and offset↔line conversion. Backed by [`ropey::Rope`] for O(log n) line
//! lookup on large baselines.
//!
//! Lines are split on `\n` only: N newlines yield N+1 lines (a trailing newline produces a
//! final empty line). Nothing else is normalized; a `\r` before a line break stays part of
//! the line content, so CRLF and LF renditions of a line compare unequal. That keeps
//! `text == lines.join("\n")` an identity, which rollback relies on to restore baseline
//! text byte for byte. (Ropey's Unicode line breaks are disabled in Cargo.toml so its line
//! boundaries agree with this.)

use ropey::Rope;

/// An immutable text snapshot exposed as an ordered sequence of lines.
pub struct LineBuffer {
    rope: Rope,
}

impl LineBuffer {
    /// Build a line buffer from a text snapshot.
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Total line count (always at least 1; the empty text has one empty line).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Total character count.
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Total byte count.
    pub fn byte_count(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Text of line `line`, without the trailing `\n`. `None` past the end.
    pub fn line_text(&self, line: usize) -> Option<String> {
        if line >= self.rope.len_lines() {
            return None;
        }
        Some(strip_line_break(&self.rope.line(line).to_string()))
    }

    /// The lines of `[start, end)`, clamped to the buffer.
    pub fn lines(&self, start: usize, end: usize) -> Vec<String> {
        let end = end.min(self.rope.len_lines());
        let start = start.min(end);
        (start..end)
            .map(|line| strip_line_break(&self.rope.line(line).to_string()))
            .collect()
    }

    /// All lines of the buffer.
    pub fn all_lines(&self) -> Vec<String> {
        self.lines(0, self.rope.len_lines())
    }

    /// Char offset of the start of `line` (clamped; `line == line_count()` maps to the end).
    pub fn line_to_char(&self, line: usize) -> usize {
        self.rope.line_to_char(line.min(self.rope.len_lines()))
    }

    /// Line containing char offset `offset` (clamped).
    pub fn char_to_line(&self, offset: usize) -> usize {
        self.rope.char_to_line(offset.min(self.rope.len_chars()))
    }

    /// The full text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }
}

/// Remove the trailing `\n` separator. `\r` is line content, never stripped.
pub(crate) fn strip_line_break(line: &str) -> String {
    line.strip_suffix('\n').unwrap_or(line).to_string()
}
