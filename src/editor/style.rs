//! Style vocabulary shared by spans, the pending typing style and markup.

use serde::{Deserialize, Serialize};

/// A toolbar style the user can toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    Bold,
    Italic,
    Underline,
    Strikethrough,
}

impl Style {
    /// All styles in markup nesting order (outermost first).
    pub const ALL: [Self; 4] = [Self::Bold, Self::Italic, Self::Underline, Self::Strikethrough];

    /// The span kind created when this style is added on its own.
    pub const fn span_kind(self) -> SpanKind {
        match self {
            Self::Bold => SpanKind::Bold,
            Self::Italic => SpanKind::Italic,
            Self::Underline => SpanKind::Underline,
            Self::Strikethrough => SpanKind::Strikethrough,
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Bold => 0,
            Self::Italic => 1,
            Self::Underline => 2,
            Self::Strikethrough => 3,
        }
    }
}

/// What a stored span renders as.
///
/// Bold and italic share one typeface mechanism with a combined
/// `BoldItalic` value, so one span can carry both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    Bold,
    Italic,
    BoldItalic,
    Underline,
    Strikethrough,
}

impl SpanKind {
    /// Whether spans of this kind render `style`.
    pub const fn carries(self, style: Style) -> bool {
        matches!(
            (self, style),
            (Self::Bold | Self::BoldItalic, Style::Bold)
                | (Self::Italic | Self::BoldItalic, Style::Italic)
                | (Self::Underline, Style::Underline)
                | (Self::Strikethrough, Style::Strikethrough)
        )
    }

    /// The kind left over when `style` is taken away from this kind.
    pub const fn without(self, style: Style) -> Option<Self> {
        match (self, style) {
            (Self::BoldItalic, Style::Bold) => Some(Self::Italic),
            (Self::BoldItalic, Style::Italic) => Some(Self::Bold),
            _ => None,
        }
    }

    /// Combine bold/italic flags into a typeface kind.
    pub const fn typeface(bold: bool, italic: bool) -> Option<Self> {
        match (bold, italic) {
            (true, true) => Some(Self::BoldItalic),
            (true, false) => Some(Self::Bold),
            (false, true) => Some(Self::Italic),
            (false, false) => None,
        }
    }
}

/// Effective styles at a position, after resolving every covering span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StyleSet {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
}

impl StyleSet {
    pub const fn contains(self, style: Style) -> bool {
        match style {
            Style::Bold => self.bold,
            Style::Italic => self.italic,
            Style::Underline => self.underline,
            Style::Strikethrough => self.strikethrough,
        }
    }

    pub const fn is_plain(self) -> bool {
        !(self.bold || self.italic || self.underline || self.strikethrough)
    }

    /// Add every style carried by `kind`.
    pub fn insert_kind(&mut self, kind: SpanKind) {
        for style in Style::ALL {
            if kind.carries(style) {
                self.set(style, true);
            }
        }
    }

    fn set(&mut self, style: Style, on: bool) {
        match style {
            Style::Bold => self.bold = on,
            Style::Italic => self.italic = on,
            Style::Underline => self.underline = on,
            Style::Strikethrough => self.strikethrough = on,
        }
    }
}

/// Styles that apply to the next characters typed at a caret.
///
/// Persists across keystrokes until toggled off or cleared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
}

impl PendingStyle {
    pub const fn is_active(self, style: Style) -> bool {
        match style {
            Style::Bold => self.bold,
            Style::Italic => self.italic,
            Style::Underline => self.underline,
            Style::Strikethrough => self.strikethrough,
        }
    }

    /// Flip one style.
    pub const fn toggle(&mut self, style: Style) {
        match style {
            Style::Bold => self.bold = !self.bold,
            Style::Italic => self.italic = !self.italic,
            Style::Underline => self.underline = !self.underline,
            Style::Strikethrough => self.strikethrough = !self.strikethrough,
        }
    }

    pub const fn any(self) -> bool {
        self.bold || self.italic || self.underline || self.strikethrough
    }

    pub const fn clear(&mut self) {
        *self = Self {
            bold: false,
            italic: false,
            underline: false,
            strikethrough: false,
        };
    }

    /// Span kinds to apply over freshly typed text.
    ///
    /// Bold and italic compose into a single typeface span; underline and
    /// strikethrough are independent.
    pub fn span_kinds(self) -> Vec<SpanKind> {
        let mut kinds = Vec::with_capacity(3);
        if let Some(typeface) = SpanKind::typeface(self.bold, self.italic) {
            kinds.push(typeface);
        }
        if self.underline {
            kinds.push(SpanKind::Underline);
        }
        if self.strikethrough {
            kinds.push(SpanKind::Strikethrough);
        }
        kinds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_italic_carries_both_typeface_styles() {
        assert!(SpanKind::BoldItalic.carries(Style::Bold));
        assert!(SpanKind::BoldItalic.carries(Style::Italic));
        assert!(!SpanKind::BoldItalic.carries(Style::Underline));
        assert!(!SpanKind::Bold.carries(Style::Italic));
    }

    #[test]
    fn test_without_keeps_complementary_typeface() {
        assert_eq!(SpanKind::BoldItalic.without(Style::Bold), Some(SpanKind::Italic));
        assert_eq!(SpanKind::BoldItalic.without(Style::Italic), Some(SpanKind::Bold));
        assert_eq!(SpanKind::Bold.without(Style::Bold), None);
    }

    #[test]
    fn test_pending_bold_and_italic_compose() {
        let mut pending = PendingStyle::default();
        pending.toggle(Style::Bold);
        pending.toggle(Style::Italic);
        pending.toggle(Style::Strikethrough);
        assert_eq!(
            pending.span_kinds(),
            vec![SpanKind::BoldItalic, SpanKind::Strikethrough]
        );
    }

    #[test]
    fn test_pending_clear_resets_everything() {
        let mut pending = PendingStyle {
            bold: true,
            italic: false,
            underline: true,
            strikethrough: true,
        };
        pending.clear();
        assert!(!pending.any());
        assert!(pending.span_kinds().is_empty());
    }

    #[test]
    fn test_style_set_from_kinds() {
        let mut set = StyleSet::default();
        assert!(set.is_plain());
        set.insert_kind(SpanKind::BoldItalic);
        assert!(set.contains(Style::Bold));
        assert!(set.contains(Style::Italic));
        assert!(!set.contains(Style::Underline));
    }
}
