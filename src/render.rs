//! Terminal rendering of styled note bodies.

use crossterm::style::{Attribute, ContentStyle};

use crate::editor::{SpanEditor, StyleSet};

/// Map effective styles to terminal attributes.
pub fn content_style(styles: StyleSet) -> ContentStyle {
    let mut style = ContentStyle::new();
    if styles.bold {
        style.attributes.set(Attribute::Bold);
    }
    if styles.italic {
        style.attributes.set(Attribute::Italic);
    }
    if styles.underline {
        style.attributes.set(Attribute::Underlined);
    }
    if styles.strikethrough {
        style.attributes.set(Attribute::CrossedOut);
    }
    style
}

/// Render the editor's text with ANSI attributes for each styled run.
pub fn render_ansi(editor: &SpanEditor) -> String {
    let mut out = String::with_capacity(editor.len() * 2);
    for (text, styles) in editor.styled_segments() {
        if styles.is_plain() {
            out.push_str(&text);
        } else {
            out.push_str(&content_style(styles).apply(text).to_string());
        }
    }
    out
}
