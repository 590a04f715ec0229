//! Rich-text span editor for note bodies.
//!
//! Provides a rope-backed text buffer carrying bold, italic, underline and
//! strikethrough spans, a pending typing style, line-prefix markup helpers
//! and an HTML-like markup format for storage.

mod buffer;
pub mod lines;
pub mod markup;
mod span;
mod span_editor;
mod style;

pub use buffer::TextBuffer;
pub use markup::{MarkupError, ParsedMarkup};
pub use span::{FormatSpan, SpanSet, ToggleOutcome};
pub use span_editor::{EditMode, EditorSnapshot, SpanEditor};
pub use style::{PendingStyle, SpanKind, Style, StyleSet};
