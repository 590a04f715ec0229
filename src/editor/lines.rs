//! Line-prefix markup: bullets, numbered items, checkboxes and indentation.
//!
//! Prefixes are literal characters in the buffer, never spans. Each helper
//! inspects the line starting at `line_start` and describes the buffer edit
//! that toggles its prefix; the editor applies it.

use std::sync::LazyLock;

use regex::Regex;

use super::buffer::TextBuffer;

const BULLET: &str = "• ";
const ALT_BULLET: &str = "- ";
const CHECKBOX_OPEN: &str = "[ ] ";
const CHECKBOX_DONE: &str = "[x] ";
const CHECKBOX_DONE_UPPER: &str = "[X] ";
const INDENT: &str = "    ";
const INDENT_WIDTH: usize = 4;

static NUMBERED_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)\.\s").expect("numbered prefix pattern is valid"));

/// A replacement of `deleted` chars at `offset` with `inserted`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEdit {
    pub offset: usize,
    pub deleted: usize,
    pub inserted: String,
}

impl LineEdit {
    fn insert(offset: usize, text: &str) -> Self {
        Self {
            offset,
            deleted: 0,
            inserted: text.to_string(),
        }
    }

    const fn delete(offset: usize, len: usize) -> Self {
        Self {
            offset,
            deleted: len,
            inserted: String::new(),
        }
    }
}

/// `"• "` / `"- "` are removed, anything else gets `"• "`.
pub fn bullet(buffer: &TextBuffer, line_start: usize) -> Option<LineEdit> {
    if buffer.starts_with_at(line_start, BULLET) || buffer.starts_with_at(line_start, ALT_BULLET) {
        Some(LineEdit::delete(line_start, 2))
    } else {
        Some(LineEdit::insert(line_start, BULLET))
    }
}

/// Removes an existing `"N. "` prefix, or numbers the line one past the
/// nearest numbered line above it.
pub fn numbered(buffer: &TextBuffer, line_start: usize) -> Option<LineEdit> {
    let line = buffer.line_text(line_start);
    if let Some(found) = NUMBERED_PREFIX.find(&line) {
        return Some(LineEdit::delete(line_start, found.as_str().chars().count()));
    }
    let number = next_number(buffer, line_start);
    Some(LineEdit::insert(line_start, &format!("{number}. ")))
}

/// Walk upward past blank lines. The first non-blank line decides: a
/// numbered line continues its sequence, anything else restarts at 1.
fn next_number(buffer: &TextBuffer, line_start: usize) -> u64 {
    let mut cursor = line_start;
    while cursor > 0 {
        let prev_start = buffer.line_start(cursor - 1);
        // Includes the newline that ends the previous line.
        let prev = buffer.slice(prev_start..cursor);
        if let Some(caps) = NUMBERED_PREFIX.captures(&prev) {
            return caps[1]
                .parse::<u64>()
                .ok()
                .and_then(|n| n.checked_add(1))
                .unwrap_or(1);
        }
        if !prev.trim().is_empty() {
            return 1;
        }
        cursor = prev_start;
    }
    1
}

/// Cycles `none → "[ ] " → "[x] " → none`.
pub fn checkbox(buffer: &TextBuffer, line_start: usize) -> Option<LineEdit> {
    if buffer.starts_with_at(line_start, CHECKBOX_OPEN) {
        Some(LineEdit {
            offset: line_start,
            deleted: CHECKBOX_OPEN.len(),
            inserted: CHECKBOX_DONE.to_string(),
        })
    } else if buffer.starts_with_at(line_start, CHECKBOX_DONE)
        || buffer.starts_with_at(line_start, CHECKBOX_DONE_UPPER)
    {
        Some(LineEdit::delete(line_start, CHECKBOX_DONE.len()))
    } else {
        Some(LineEdit::insert(line_start, CHECKBOX_OPEN))
    }
}

pub fn indent(_buffer: &TextBuffer, line_start: usize) -> Option<LineEdit> {
    Some(LineEdit::insert(line_start, INDENT))
}

/// Removes one leading tab, else up to four leading spaces.
pub fn outdent(buffer: &TextBuffer, line_start: usize) -> Option<LineEdit> {
    let count = if buffer.char_at(line_start) == Some('\t') {
        1
    } else {
        (line_start..line_start + INDENT_WIDTH)
            .take_while(|&i| buffer.char_at(i) == Some(' '))
            .count()
    };
    (count > 0).then(|| LineEdit::delete(line_start, count))
}
