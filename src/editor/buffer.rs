use std::ops::Range;

use ropey::Rope;

/// A note body backed by a rope data structure.
///
/// Offsets are char indices (Unicode scalar values), which is the unit
/// format spans and selections are expressed in. Lines are delimited by
/// `'\n'` only.
#[derive(Clone, Default)]
pub struct TextBuffer {
    rope: Rope,
}

impl TextBuffer {
    /// Create a new buffer from a string.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Create an empty buffer.
    pub fn empty() -> Self {
        Self::from_text("")
    }

    /// Number of chars in the buffer.
    pub fn len(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// The char at `offset`, if any.
    pub fn char_at(&self, offset: usize) -> Option<char> {
        self.rope.get_char(offset)
    }

    /// Text in `range`, clamped to the buffer.
    pub fn slice(&self, range: Range<usize>) -> String {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        self.rope.slice(start..end).to_string()
    }

    /// Whether the text at `offset` begins with `prefix`.
    pub fn starts_with_at(&self, offset: usize, prefix: &str) -> bool {
        if offset > self.len() {
            return false;
        }
        let mut chars = self.rope.chars_at(offset);
        prefix.chars().all(|expected| chars.next() == Some(expected))
    }

    /// Insert `text` at `offset` (clamped to the end of the buffer).
    pub fn insert(&mut self, offset: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let offset = offset.min(self.len());
        self.rope.insert(offset, text);
    }

    /// Remove the chars in `range` (clamped to the buffer).
    pub fn remove(&mut self, range: Range<usize>) {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        if start < end {
            self.rope.remove(start..end);
        }
    }

    /// Offset of the first char of the line containing `offset`.
    ///
    /// Scans back to just after the nearest preceding `'\n'`.
    pub fn line_start(&self, offset: usize) -> usize {
        let offset = offset.min(self.len());
        let mut chars = self.rope.chars_at(offset);
        let mut start = offset;
        while let Some(ch) = chars.prev() {
            if ch == '\n' {
                break;
            }
            start -= 1;
        }
        start
    }

    /// Offset of the `'\n'` ending the line that starts at `line_start`,
    /// or the buffer length for the last line.
    pub fn line_end(&self, line_start: usize) -> usize {
        let line_start = line_start.min(self.len());
        let mut end = line_start;
        for ch in self.rope.chars_at(line_start) {
            if ch == '\n' {
                break;
            }
            end += 1;
        }
        end
    }

    /// Content of the line starting at `line_start` (without trailing newline).
    pub fn line_text(&self, line_start: usize) -> String {
        self.slice(line_start..self.line_end(line_start))
    }

    /// Total number of `'\n'`-delimited lines.
    pub fn line_count(&self) -> usize {
        self.rope.chars().filter(|&ch| ch == '\n').count() + 1
    }
}

impl std::fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextBuffer")
            .field(
                "rope",
                &format_args!("Rope({} chars)", self.rope.len_chars()),
            )
            .finish()
    }
}
