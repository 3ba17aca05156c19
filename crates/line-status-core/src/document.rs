//! Mutable text buffer with structured edit records.
//!
//! The tracker needs to know, for every mutation, which char span was touched and how the
//! line count changed. Instead of a notification bus, [`Document::replace`] returns a
//! [`DocumentEdit`] describing the applied mutation; the tracker applies edits through its
//! own methods and consumes the record synchronously. All offsets are char offsets
//! (Unicode scalar values).

use crate::line_buffer::strip_line_break;
use ropey::Rope;

/// A structured record of one applied mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEdit {
    /// Start char offset of the replaced span (clamped, pre-edit coordinates).
    pub start: usize,
    /// Exclusive end char offset of the replaced span (pre-edit coordinates).
    pub end: usize,
    /// Char length of the inserted text.
    pub inserted_chars: usize,
    /// Net change in line count produced by the edit.
    pub line_delta: isize,
}

/// A mutable, ropey-backed text buffer.
pub struct Document {
    rope: Rope,
}

impl Document {
    /// Create a document from initial text.
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Total character count.
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Total byte count.
    pub fn byte_count(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Total line count (always at least 1).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// The full text.
    pub fn text(&self) -> String {
        self.rope.to_string()
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

    /// Insert `text` at `offset`.
    pub fn insert(&mut self, offset: usize, text: &str) -> DocumentEdit {
        self.replace(offset, offset, text)
    }

    /// Delete the char span `[start, end)`.
    pub fn delete(&mut self, start: usize, end: usize) -> DocumentEdit {
        self.replace(start, end, "")
    }

    /// Replace the char span `[start, end)` with `text`. Offsets are clamped to the buffer.
    pub fn replace(&mut self, start: usize, end: usize, text: &str) -> DocumentEdit {
        let start = start.min(self.rope.len_chars());
        let end = end.clamp(start, self.rope.len_chars());
        let lines_before = self.rope.len_lines();

        if start < end {
            self.rope.remove(start..end);
        }
        if !text.is_empty() {
            self.rope.insert(start, text);
        }

        DocumentEdit {
            start,
            end,
            inserted_chars: text.chars().count(),
            line_delta: self.rope.len_lines() as isize - lines_before as isize,
        }
    }
}
