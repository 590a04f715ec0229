//! Format spans and the rules that keep them consistent with buffer edits.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::style::{SpanKind, Style, StyleSet};

/// A half-open `[start, end)` style annotation over char offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormatSpan {
    pub kind: SpanKind,
    pub start: usize,
    pub end: usize,
}

impl FormatSpan {
    pub const fn new(kind: SpanKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }

    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Whether the span shares at least one char with `[start, end)`.
    pub const fn intersects(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }

    /// Whether the span covers all of `[start, end)`.
    pub const fn covers(&self, start: usize, end: usize) -> bool {
        self.start <= start && self.end >= end
    }
}

/// Result of a selection toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
}

/// The spans of one buffer.
///
/// Spans are unordered. Zero-length spans are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanSet {
    spans: Vec<FormatSpan>,
}

impl SpanSet {
    pub const fn new() -> Self {
        Self { spans: Vec::new() }
    }

    pub fn as_slice(&self) -> &[FormatSpan] {
        &self.spans
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormatSpan> {
        self.spans.iter()
    }

    pub const fn len(&self) -> usize {
        self.spans.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn clear(&mut self) {
        self.spans.clear();
    }

    /// Add a span as-is, without merging. Empty ranges are ignored.
    pub fn add(&mut self, kind: SpanKind, start: usize, end: usize) {
        if start < end {
            self.spans.push(FormatSpan::new(kind, start, end));
        }
    }

    /// Add a span, absorbing same-kind spans it overlaps or touches.
    pub fn add_merged(&mut self, kind: SpanKind, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let (mut start, mut end) = (start, end);
        loop {
            let Some(idx) = self
                .spans
                .iter()
                .position(|s| s.kind == kind && s.start <= end && start <= s.end)
            else {
                break;
            };
            let absorbed = self.spans.swap_remove(idx);
            start = start.min(absorbed.start);
            end = end.max(absorbed.end);
        }
        self.spans.push(FormatSpan::new(kind, start, end));
    }

    /// Whether a single span rendering `style` covers all of `[start, end)`.
    pub fn is_covered(&self, style: Style, start: usize, end: usize) -> bool {
        self.spans
            .iter()
            .any(|s| s.kind.carries(style) && s.covers(start, end))
    }

    /// Toggle `style` over a non-empty `[start, end)`.
    ///
    /// When one span already covers the whole range the style is removed
    /// from exactly that range. Otherwise a new span is added over the
    /// range and left unmerged with any partially overlapping span of the
    /// same kind.
    pub fn toggle(&mut self, style: Style, start: usize, end: usize) -> ToggleOutcome {
        if self.is_covered(style, start, end) {
            self.remove_style(style, start, end);
            ToggleOutcome::Removed
        } else {
            self.add(style.span_kind(), start, end);
            ToggleOutcome::Added
        }
    }

    /// Remove `style` from `[start, end)`, keeping it outside the range.
    ///
    /// A `BoldItalic` span losing one half keeps the other half over the
    /// removed range.
    pub fn remove_style(&mut self, style: Style, start: usize, end: usize) {
        let (hit, kept): (Vec<FormatSpan>, Vec<FormatSpan>) = self
            .spans
            .drain(..)
            .partition(|s| s.kind.carries(style) && s.intersects(start, end));
        self.spans = kept;
        for span in hit {
            self.add(span.kind, span.start, start.min(span.end));
            self.add(span.kind, end.max(span.start), span.end);
            if let Some(rest) = span.kind.without(style) {
                self.add(rest, span.start.max(start), span.end.min(end));
            }
        }
    }

    /// Rewrite offsets for a deletion of `[start, end)`.
    ///
    /// Spans inside the deleted range are dropped, spans straddling a
    /// boundary shrink, spans after it shift left.
    pub fn on_delete(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let removed = end - start;
        let map = |x: usize| {
            if x <= start {
                x
            } else if x >= end {
                x - removed
            } else {
                start
            }
        };
        self.spans.retain_mut(|span| {
            span.start = map(span.start);
            span.end = map(span.end);
            span.start < span.end
        });
    }

    /// Rewrite offsets for an insertion of `len` chars at `at`.
    ///
    /// Text inserted strictly inside a span extends it. Text inserted at
    /// either edge does not.
    pub fn on_insert(&mut self, at: usize, len: usize) {
        if len == 0 {
            return;
        }
        for span in &mut self.spans {
            if at <= span.start {
                span.start += len;
                span.end += len;
            } else if at < span.end {
                span.end += len;
            }
        }
    }

    /// Effective styles at the char at `offset`.
    pub fn styles_at(&self, offset: usize) -> StyleSet {
        let mut set = StyleSet::default();
        for span in &self.spans {
            if span.start <= offset && offset < span.end {
                set.insert_kind(span.kind);
            }
        }
        set
    }

    /// Split `[0, len)` into maximal runs of uniform style.
    pub fn segments(&self, len: usize) -> Vec<(Range<usize>, StyleSet)> {
        let mut cuts: Vec<usize> = self
            .spans
            .iter()
            .flat_map(|s| [s.start, s.end])
            .filter(|&x| x < len)
            .chain([0, len])
            .collect();
        cuts.sort_unstable();
        cuts.dedup();

        let mut segments: Vec<(Range<usize>, StyleSet)> = Vec::with_capacity(cuts.len());
        for pair in cuts.windows(2) {
            let styles = self.styles_at(pair[0]);
            match segments.last_mut() {
                Some((range, prev)) if *prev == styles => range.end = pair[1],
                _ => segments.push((pair[0]..pair[1], styles)),
            }
        }
        segments
    }
}
