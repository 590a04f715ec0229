//! Helpers around a note's stored body: format detection, statistics and
//! the text used for sharing or copying.

use std::fmt;

use serde::Serialize;

/// Whether a stored body should be read as markup.
///
/// There is no format tag: any body containing both `<` and `>` is treated
/// as markup, so plain text that happens to contain both is misread.
pub fn looks_like_markup(stored: &str) -> bool {
    stored.contains('<') && stored.contains('>')
}

/// Word, character and line counts for a note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NoteStats {
    pub words: usize,
    pub characters: usize,
    pub characters_no_spaces: usize,
    pub lines: usize,
}

impl NoteStats {
    /// Count over the title and plain-text body together; lines count the
    /// body only.
    pub fn compute(title: &str, content: &str) -> Self {
        let combined = format!("{title} {content}");
        let full = combined.trim();
        Self {
            words: full.split_whitespace().count(),
            characters: full.chars().count(),
            characters_no_spaces: full.chars().filter(|c| !c.is_whitespace()).count(),
            lines: line_count(content),
        }
    }
}

/// Lines end at `\r\n`, `\n` or a lone `\r`. A trailing terminator starts
/// an empty last line.
fn line_count(content: &str) -> usize {
    if content.is_empty() {
        return 0;
    }
    let mut count = 1;
    let mut chars = content.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\n' => count += 1,
            '\r' => {
                chars.next_if_eq(&'\n');
                count += 1;
            }
            _ => {}
        }
    }
    count
}

impl fmt::Display for NoteStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Words: {}", self.words)?;
        writeln!(f, "Characters: {}", self.characters)?;
        writeln!(f, "Characters (no spaces): {}", self.characters_no_spaces)?;
        write!(f, "Lines: {}", self.lines)
    }
}

/// Title and body joined by a blank line, or `None` when both are empty.
pub fn share_text(title: &str, content: &str) -> Option<String> {
    let title = title.trim();
    let content = content.trim();
    match (title.is_empty(), content.is_empty()) {
        (true, true) => None,
        (false, true) => Some(title.to_string()),
        (true, false) => Some(content.to_string()),
        (false, false) => Some(format!("{title}\n\n{content}")),
    }
}
