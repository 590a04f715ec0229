use std::ops::Range;

use serde::Serialize;

use super::buffer::TextBuffer;
use super::lines::{self, LineEdit};
use super::markup;
use super::span::{FormatSpan, SpanSet};
use super::style::{PendingStyle, Style, StyleSet};

/// Whether a buffer mutation comes from the user or from the editor itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditMode {
    #[default]
    Idle,
    /// Span or line-prefix changes made by the editor; never styled as typing.
    ApplyingProgrammaticEdit,
}

/// Serializable view of an editor's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditorSnapshot {
    pub text: String,
    pub spans: Vec<FormatSpan>,
    pub pending: PendingStyle,
}

/// A rich-text editor over one note body.
///
/// Owns the text, its format spans and the pending typing style. Every
/// change to the text goes through [`SpanEditor::apply_edit`] (user input)
/// or the line-prefix operations, and both paths keep span offsets in step
/// with the text.
///
/// Offsets are char indices. Offsets past the end of the text are clamped
/// for edits and selections; line operations with such a caret do nothing.
#[derive(Debug, Clone, Default)]
pub struct SpanEditor {
    buffer: TextBuffer,
    spans: SpanSet,
    pending: PendingStyle,
    mode: EditMode,
}

impl SpanEditor {
    /// Create an empty editor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an editor holding unstyled text.
    pub fn from_plain_text(text: &str) -> Self {
        let mut editor = Self::new();
        editor.load_plain_text(text);
        editor
    }

    /// Create an editor from stored markup.
    pub fn from_markup(markup: &str) -> Self {
        let mut editor = Self::new();
        editor.load_markup(markup);
        editor
    }

    // --- Loading and reading back ---

    /// Replace the content with unstyled text.
    pub fn load_plain_text(&mut self, text: &str) {
        self.buffer = TextBuffer::from_text(text);
        self.spans.clear();
    }

    /// Replace the content with parsed markup.
    ///
    /// A `<` that does not start a tag is read as text; blank
    /// markup yields an empty buffer.
    pub fn load_markup(&mut self, markup: &str) {
        let parsed = self.programmatic(|_| markup::parse_markup(markup));
        self.buffer = TextBuffer::from_text(&parsed.text);
        self.spans = parsed.spans;
        tracing::debug!(
            chars = self.buffer.len(),
            spans = self.spans.len(),
            "loaded markup"
        );
    }

    /// Load a stored note body, choosing markup or plain text by
    /// [`crate::note::looks_like_markup`].
    pub fn load_stored(&mut self, stored: &str) {
        if crate::note::looks_like_markup(stored) {
            self.load_markup(stored);
        } else {
            self.load_plain_text(stored);
        }
    }

    /// Serialize text and spans to markup.
    pub fn to_markup(&self) -> String {
        markup::to_markup(&self.buffer, &self.spans)
    }

    /// Text with spans stripped; line-prefix markup is kept verbatim.
    pub fn plain_text(&self) -> String {
        self.buffer.text()
    }

    /// Whether any span exists.
    pub const fn has_formatting(&self) -> bool {
        !self.spans.is_empty()
    }

    /// The form a note body is stored in: markup when styled, otherwise
    /// the trimmed plain text.
    pub fn persisted_content(&self) -> String {
        if self.has_formatting() {
            self.to_markup()
        } else {
            self.plain_text().trim().to_string()
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn spans(&self) -> &[FormatSpan] {
        self.spans.as_slice()
    }

    /// Effective styles of the char at `offset`.
    pub fn styles_at(&self, offset: usize) -> StyleSet {
        self.spans.styles_at(offset)
    }

    /// Runs of uniform style covering the whole text.
    pub fn styled_segments(&self) -> Vec<(String, StyleSet)> {
        self.spans
            .segments(self.buffer.len())
            .into_iter()
            .map(|(range, styles)| (self.buffer.slice(range), styles))
            .collect()
    }

    pub const fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot {
            text: self.plain_text(),
            spans: self.spans.as_slice().to_vec(),
            pending: self.pending,
        }
    }

    // --- Pending style flags ---

    pub const fn pending(&self) -> PendingStyle {
        self.pending
    }

    pub const fn is_bold_active(&self) -> bool {
        self.pending.bold
    }

    pub const fn is_italic_active(&self) -> bool {
        self.pending.italic
    }

    pub const fn is_underline_active(&self) -> bool {
        self.pending.underline
    }

    pub const fn is_strikethrough_active(&self) -> bool {
        self.pending.strikethrough
    }

    /// Turn every pending style off. Existing spans are untouched.
    pub const fn clear_formatting_state(&mut self) {
        self.pending.clear();
    }

    // --- Style toggles ---

    pub fn toggle_bold(&mut self, selection_start: usize, selection_end: usize) {
        self.toggle(Style::Bold, selection_start, selection_end);
    }

    pub fn toggle_italic(&mut self, selection_start: usize, selection_end: usize) {
        self.toggle(Style::Italic, selection_start, selection_end);
    }

    pub fn toggle_underline(&mut self, selection_start: usize, selection_end: usize) {
        self.toggle(Style::Underline, selection_start, selection_end);
    }

    pub fn toggle_strikethrough(&mut self, selection_start: usize, selection_end: usize) {
        self.toggle(Style::Strikethrough, selection_start, selection_end);
    }

    /// Toggle `style` over a selection, or flip its pending flag at a caret.
    pub fn toggle(&mut self, style: Style, selection_start: usize, selection_end: usize) {
        let len = self.buffer.len();
        let start = selection_start.min(selection_end).min(len);
        let end = selection_start.max(selection_end).min(len);
        if selection_start == selection_end {
            self.pending.toggle(style);
            tracing::trace!(?style, active = self.pending.is_active(style), "pending style");
            return;
        }
        if start == end {
            tracing::debug!(selection_start, selection_end, len, "selection outside text");
            return;
        }
        let outcome = self.programmatic(|editor| editor.spans.toggle(style, start, end));
        tracing::trace!(?style, start, end, ?outcome, "toggled selection");
    }

    // --- Text edits ---

    /// Replace `deleted_len` chars at `offset` with `inserted`.
    ///
    /// This is the single entry point for user edits. Span offsets follow
    /// the edit, and while the editor is idle any pending styles are
    /// applied over exactly the inserted text. Returns the inserted range.
    pub fn apply_edit(&mut self, offset: usize, deleted_len: usize, inserted: &str) -> Range<usize> {
        let range = self.mutate(offset, deleted_len, inserted);
        if self.mode == EditMode::Idle && !range.is_empty() && self.pending.any() {
            self.programmatic(|editor| {
                for kind in editor.pending.span_kinds() {
                    editor.spans.add_merged(kind, range.start, range.end);
                }
            });
        }
        range
    }

    /// Insert text at `offset`.
    pub fn insert(&mut self, offset: usize, text: &str) -> Range<usize> {
        self.apply_edit(offset, 0, text)
    }

    /// Delete `len` chars at `offset`.
    pub fn delete(&mut self, offset: usize, len: usize) {
        self.apply_edit(offset, len, "");
    }

    // --- Line-prefix markup ---

    pub fn insert_bullet_point(&mut self, caret: usize) {
        self.apply_line_edit(caret, lines::bullet);
    }

    pub fn insert_numbered_item(&mut self, caret: usize) {
        self.apply_line_edit(caret, lines::numbered);
    }

    pub fn insert_checkbox(&mut self, caret: usize) {
        self.apply_line_edit(caret, lines::checkbox);
    }

    pub fn increase_indent(&mut self, caret: usize) {
        self.apply_line_edit(caret, lines::indent);
    }

    pub fn decrease_indent(&mut self, caret: usize) {
        self.apply_line_edit(caret, lines::outdent);
    }

    // --- Private helpers ---

    fn apply_line_edit(&mut self, caret: usize, build: fn(&TextBuffer, usize) -> Option<LineEdit>) {
        let len = self.buffer.len();
        if caret > len {
            tracing::debug!(caret, len, "caret past end of text; line edit skipped");
            return;
        }
        let line_start = self.buffer.line_start(caret);
        let Some(edit) = build(&self.buffer, line_start) else {
            return;
        };
        self.programmatic(|editor| {
            editor.mutate(edit.offset, edit.deleted, &edit.inserted);
        });
    }

    /// Run `f` with the mode set to [`EditMode::ApplyingProgrammaticEdit`].
    fn programmatic<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = self.mode;
        self.mode = EditMode::ApplyingProgrammaticEdit;
        let result = f(self);
        self.mode = previous;
        result
    }

    /// Mutate the buffer, adjusting spans first. Every text change passes
    /// through here.
    fn mutate(&mut self, offset: usize, deleted_len: usize, inserted: &str) -> Range<usize> {
        let len = self.buffer.len();
        let offset = offset.min(len);
        let end = offset.saturating_add(deleted_len).min(len);
        if offset < end {
            self.spans.on_delete(offset, end);
            self.buffer.remove(offset..end);
        }
        let inserted_len = inserted.chars().count();
        if inserted_len > 0 {
            self.spans.on_insert(offset, inserted_len);
            self.buffer.insert(offset, inserted);
        }
        offset..offset + inserted_len
    }
}
