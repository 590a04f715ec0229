//! HTML-like interchange markup for styled note bodies.
//!
//! The writer emits inline `<b>`, `<i>`, `<u>` and line-through `<span>`
//! tags with `<br>` line breaks. The reader is lenient: it accepts the
//! paragraph-per-line markup older notes were stored in, ignores unknown
//! tags and keeps a `<` that does not start a tag as literal text.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

use super::buffer::TextBuffer;
use super::span::SpanSet;
use super::style::{Style, StyleSet};

const STRIKE_OPEN: &str = r#"<span style="text-decoration:line-through;">"#;

/// Tokenizer failure while reading markup. The reader recovers from it by
/// keeping the offending `<` as text.
#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("malformed markup near byte {position}: {source}")]
    Syntax {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },
}

/// Text and spans recovered from markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedMarkup {
    pub text: String,
    pub spans: SpanSet,
}

/// Serialize a buffer and its spans.
pub fn to_markup(buffer: &TextBuffer, spans: &SpanSet) -> String {
    if buffer.is_empty() {
        return String::new();
    }
    let mut writer = MarkupWriter::default();
    for (range, styles) in spans.segments(buffer.len()) {
        writer.sync_tags(styles);
        writer.write_text(&buffer.slice(range));
    }
    writer.finish()
}

/// Parse markup. Never fails: anything that is not a tag is read as text.
pub fn parse_markup(markup: &str) -> ParsedMarkup {
    if markup.trim().is_empty() {
        return ParsedMarkup::default();
    }
    let mut reader = MarkupReader::new();
    reader.read(markup);
    reader.finish()
}

const fn open_tag(style: Style) -> &'static str {
    match style {
        Style::Bold => "<b>",
        Style::Italic => "<i>",
        Style::Underline => "<u>",
        Style::Strikethrough => STRIKE_OPEN,
    }
}

const fn close_tag(style: Style) -> &'static str {
    match style {
        Style::Bold => "</b>",
        Style::Italic => "</i>",
        Style::Underline => "</u>",
        Style::Strikethrough => "</span>",
    }
}

#[derive(Debug, Default)]
struct MarkupWriter {
    out: String,
    open: Vec<Style>,
    run: String,
    /// Previous char on this line was not whitespace, so a space may be literal.
    after_text: bool,
}

impl MarkupWriter {
    /// Close tags down to the outermost one that ended, then open new ones.
    fn sync_tags(&mut self, active: StyleSet) {
        if let Some(pos) = self.open.iter().position(|&s| !active.contains(s)) {
            for style in self.open.drain(pos..).rev() {
                self.out.push_str(close_tag(style));
            }
        }
        for style in Style::ALL {
            if active.contains(style) && !self.open.contains(&style) {
                self.out.push_str(open_tag(style));
                self.open.push(style);
            }
        }
    }

    fn write_text(&mut self, text: &str) {
        for ch in text.chars() {
            match ch {
                '\n' => self.write_raw("<br>"),
                ' ' if self.after_text => {
                    self.run.push(' ');
                    self.after_text = false;
                }
                ' ' => self.write_raw("&nbsp;"),
                '\t' => self.write_raw("&#9;"),
                '\r' => self.write_raw("&#13;"),
                _ => {
                    self.run.push(ch);
                    self.after_text = true;
                }
            }
        }
        self.flush();
    }

    fn write_raw(&mut self, raw: &str) {
        self.flush();
        self.out.push_str(raw);
        self.after_text = false;
    }

    fn flush(&mut self) {
        if !self.run.is_empty() {
            self.out.push_str(&quick_xml::escape::escape(self.run.as_str()));
            self.run.clear();
        }
    }

    fn finish(mut self) -> String {
        self.flush();
        for style in self.open.drain(..).rev() {
            self.out.push_str(close_tag(style));
        }
        self.out
    }
}

#[derive(Debug)]
struct OpenElement {
    name: String,
    style: Option<Style>,
}

#[derive(Debug)]
struct MarkupReader {
    text: String,
    len: usize,
    at_line_start: bool,
    last_space: bool,
    /// The last char is a newline produced by closing a block element.
    trailing_block_break: bool,
    elements: Vec<OpenElement>,
    depth: [usize; 4],
    opened_at: [usize; 4],
    spans: SpanSet,
}

impl MarkupReader {
    const fn new() -> Self {
        Self {
            text: String::new(),
            len: 0,
            at_line_start: true,
            last_space: false,
            trailing_block_break: false,
            elements: Vec::new(),
            depth: [0; 4],
            opened_at: [0; 4],
            spans: SpanSet::new(),
        }
    }

    fn read(&mut self, markup: &str) {
        let mut rest = markup;
        while let Some(at) = self.read_fragment(rest) {
            self.push_str("<");
            rest = &rest[at + 1..];
        }
    }

    /// Tokenize `source` until its end, or until a `<` that cannot start a
    /// tag. Returns that `<`'s byte offset so the caller can keep it as
    /// text and resume after it.
    fn read_fragment(&mut self, source: &str) -> Option<usize> {
        let mut reader = Reader::from_str(source);
        reader.trim_text(false);
        reader.check_end_names(false);
        loop {
            let before = reader.buffer_position();
            match reader.read_event() {
                Ok(Event::Start(element)) => {
                    if !is_tag_name(element.local_name().as_ref()) {
                        return literal_lt(source, before);
                    }
                    self.start_element(&element);
                }
                Ok(Event::Empty(element)) => {
                    let name = element.local_name();
                    if !is_tag_name(name.as_ref()) {
                        return literal_lt(source, before);
                    }
                    if element_name(name.as_ref()) == "br" {
                        self.line_break();
                    }
                }
                Ok(Event::End(element)) => {
                    self.end_element(&element_name(element.local_name().as_ref()));
                }
                Ok(Event::Text(text)) => self.text(&String::from_utf8_lossy(&text)),
                Ok(Event::CData(data)) => self.push_str(&String::from_utf8_lossy(&data)),
                Ok(Event::Eof) => return None,
                Ok(_) => {}
                Err(source_err) => {
                    let err = MarkupError::Syntax {
                        position: reader.buffer_position(),
                        source: source_err,
                    };
                    tracing::debug!(%err, "keeping malformed fragment as text");
                    let at = literal_lt(source, before);
                    if at.is_none() {
                        self.push_str(source.get(before..).unwrap_or_default());
                    }
                    return at;
                }
            }
        }
    }

    fn start_element(&mut self, element: &BytesStart<'_>) {
        let name = element_name(element.local_name().as_ref());
        if name == "br" {
            self.line_break();
            return;
        }
        if is_block(&name) && !self.at_line_start {
            self.line_break();
        }
        let style = style_for(&name, element);
        if let Some(style) = style {
            self.open_style(style);
        }
        self.elements.push(OpenElement { name, style });
    }

    fn end_element(&mut self, name: &str) {
        let Some(idx) = self.elements.iter().rposition(|el| el.name == name) else {
            return;
        };
        let closed: Vec<OpenElement> = self.elements.drain(idx..).collect();
        for element in closed.into_iter().rev() {
            if let Some(style) = element.style {
                self.close_style(style);
            }
        }
        if is_block(name) && !self.at_line_start {
            self.line_break();
            self.trailing_block_break = true;
        }
    }

    /// Collapse literal whitespace, then decode entities.
    fn text(&mut self, raw: &str) {
        let mut collapsed = String::with_capacity(raw.len());
        let mut line_start = self.at_line_start;
        let mut space = self.last_space;
        for ch in raw.chars() {
            if matches!(ch, ' ' | '\t' | '\n' | '\r') {
                if !(line_start || space) {
                    collapsed.push(' ');
                    space = true;
                }
            } else {
                collapsed.push(ch);
                space = false;
                line_start = false;
            }
        }
        self.push_str(&decode_entities(&collapsed));
        self.last_space = space;
    }

    fn push_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.text.push_str(s);
        self.len += s.chars().count();
        self.at_line_start = false;
        self.last_space = false;
        self.trailing_block_break = false;
    }

    fn line_break(&mut self) {
        self.text.push('\n');
        self.len += 1;
        self.at_line_start = true;
        self.last_space = false;
        self.trailing_block_break = false;
    }

    const fn open_style(&mut self, style: Style) {
        let i = style.index();
        if self.depth[i] == 0 {
            self.opened_at[i] = self.len;
        }
        self.depth[i] += 1;
    }

    fn close_style(&mut self, style: Style) {
        let i = style.index();
        if self.depth[i] == 0 {
            return;
        }
        self.depth[i] -= 1;
        if self.depth[i] == 0 {
            self.spans
                .add_merged(style.span_kind(), self.opened_at[i], self.len);
        }
    }

    fn finish(mut self) -> ParsedMarkup {
        if self.trailing_block_break {
            self.text.pop();
            self.len -= 1;
            self.spans.on_delete(self.len, self.len + 1);
        }
        for style in Style::ALL {
            let i = style.index();
            if self.depth[i] > 0 {
                self.depth[i] = 0;
                self.spans
                    .add_merged(style.span_kind(), self.opened_at[i], self.len);
            }
        }
        ParsedMarkup {
            text: self.text,
            spans: self.spans,
        }
    }
}

/// Where the `<` of an event starting at byte `from` sits. The tokenizer
/// may or may not have consumed it already.
fn literal_lt(source: &str, from: usize) -> Option<usize> {
    if from > 0 && source.as_bytes().get(from - 1) == Some(&b'<') {
        return Some(from - 1);
    }
    source.get(from..)?.find('<').map(|i| from + i)
}

/// `< 4` or `<3` are text, not tags.
fn is_tag_name(raw: &[u8]) -> bool {
    raw.first().is_some_and(u8::is_ascii_alphabetic)
}

/// Decode each `&...;` reference on its own. Unknown or unterminated
/// references stay literal.
fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .map(|semi| &tail[..=semi])
            .filter(|reference| {
                reference.len() > 2
                    && !reference[1..reference.len() - 1]
                        .contains(|c: char| c.is_whitespace() || c == '&')
            })
            .and_then(|reference| {
                quick_xml::escape::unescape_with(reference, resolve_entity)
                    .ok()
                    .map(|value| (reference.len(), value))
            });
        match decoded {
            Some((consumed, value)) => {
                out.push_str(&value);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn element_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

fn is_block(name: &str) -> bool {
    matches!(
        name,
        "p" | "div" | "li" | "ul" | "ol" | "blockquote" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
    )
}

fn style_for(name: &str, element: &BytesStart<'_>) -> Option<Style> {
    match name {
        "b" | "strong" => Some(Style::Bold),
        "i" | "em" | "cite" | "dfn" => Some(Style::Italic),
        "u" | "ins" => Some(Style::Underline),
        "s" | "strike" | "del" => Some(Style::Strikethrough),
        "span" => has_line_through(element).then_some(Style::Strikethrough),
        _ => None,
    }
}

fn has_line_through(element: &BytesStart<'_>) -> bool {
    element
        .try_get_attribute("style")
        .ok()
        .flatten()
        .is_some_and(|attr| String::from_utf8_lossy(&attr.value).contains("line-through"))
}

/// `&nbsp;` reads back as a plain space so indentation survives.
fn resolve_entity(entity: &str) -> Option<&'static str> {
    match entity {
        "nbsp" => Some(" "),
        "lt" => Some("<"),
        "gt" => Some(">"),
        "amp" => Some("&"),
        "apos" => Some("'"),
        "quot" => Some("\""),
        "copy" => Some("\u{a9}"),
        "reg" => Some("\u{ae}"),
        "trade" => Some("\u{2122}"),
        "hellip" => Some("\u{2026}"),
        "mdash" => Some("\u{2014}"),
        "ndash" => Some("\u{2013}"),
        "lsquo" => Some("\u{2018}"),
        "rsquo" => Some("\u{2019}"),
        "ldquo" => Some("\u{201c}"),
        "rdquo" => Some("\u{201d}"),
        "laquo" => Some("\u{ab}"),
        "raquo" => Some("\u{bb}"),
        "bull" => Some("\u{2022}"),
        "middot" => Some("\u{b7}"),
        "deg" => Some("\u{b0}"),
        "plusmn" => Some("\u{b1}"),
        "times" => Some("\u{d7}"),
        "divide" => Some("\u{f7}"),
        "frac12" => Some("\u{bd}"),
        "euro" => Some("\u{20ac}"),
        "pound" => Some("\u{a3}"),
        "yen" => Some("\u{a5}"),
        "cent" => Some("\u{a2}"),
        "sect" => Some("\u{a7}"),
        "para" => Some("\u{b6}"),
        "iexcl" => Some("\u{a1}"),
        "iquest" => Some("\u{bf}"),
        "shy" => Some("\u{ad}"),
        "ensp" => Some("\u{2002}"),
        "emsp" => Some("\u{2003}"),
        "thinsp" => Some("\u{2009}"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::ops::Range;

    use super::*;
    use crate::editor::style::SpanKind;

    fn write(text: &str, spans: &[(SpanKind, usize, usize)]) -> String {
        let buffer = TextBuffer::from_text(text);
        let mut set = SpanSet::new();
        for &(kind, start, end) in spans {
            set.add(kind, start, end);
        }
        to_markup(&buffer, &set)
    }

    fn ranges(parsed: &ParsedMarkup, kind: SpanKind) -> Vec<Range<usize>> {
        let mut ranges: Vec<_> = parsed
            .spans
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| s.range())
            .collect();
        ranges.sort_by_key(|r| r.start);
        ranges
    }

    // --- Writer ---

    #[test]
    fn test_empty_buffer_writes_nothing() {
        assert_eq!(write("", &[]), "");
    }

    #[test]
    fn test_plain_text_has_no_tags() {
        assert_eq!(write("hello", &[]), "hello");
    }

    #[test]
    fn test_nested_styles_share_outer_tag() {
        let markup = write(
            "hello",
            &[(SpanKind::Bold, 0, 5), (SpanKind::Italic, 2, 5)],
        );
        assert_eq!(markup, "<b>he<i>llo</i></b>");
    }

    #[test]
    fn test_outer_style_ending_first_reopens_inner() {
        let markup = write(
            "hello",
            &[(SpanKind::Italic, 0, 3), (SpanKind::Bold, 2, 5)],
        );
        assert_eq!(markup, "<i>he<b>l</b></i><b>lo</b>");
    }

    #[test]
    fn test_bold_italic_span_writes_both_tags() {
        assert_eq!(write("ab", &[(SpanKind::BoldItalic, 0, 2)]), "<b><i>ab</i></b>");
    }

    #[test]
    fn test_underline_and_strikethrough_tags() {
        let markup = write(
            "ab",
            &[(SpanKind::Underline, 0, 1), (SpanKind::Strikethrough, 1, 2)],
        );
        assert_eq!(
            markup,
            r#"<u>a</u><span style="text-decoration:line-through;">b</span>"#
        );
    }

    #[test]
    fn test_newlines_become_breaks() {
        assert_eq!(write("a\n\nb", &[]), "a<br><br>b");
    }

    #[test]
    fn test_spaces_tabs_and_specials_are_escaped() {
        assert_eq!(write("a  b", &[]), "a &nbsp;b");
        assert_eq!(write("    x", &[]), "&nbsp;&nbsp;&nbsp;&nbsp;x");
        assert_eq!(write("\tx", &[]), "&#9;x");
        assert_eq!(write("a<b & c", &[]), "a&lt;b &amp; c");
    }

    // --- Reader ---

    #[test]
    fn test_blank_markup_is_empty() {
        assert_eq!(parse_markup(""), ParsedMarkup::default());
        assert_eq!(parse_markup("  \n "), ParsedMarkup::default());
    }

    #[test]
    fn test_reads_paragraph_per_line_markup() {
        let parsed = parse_markup(concat!(
            r#"<p dir="ltr"><b>bold</b> and <i>it</i></p>"#,
            "\n",
            r#"<p dir="ltr"><span style="text-decoration:line-through;">gone</span></p>"#,
            "\n",
        ));
        assert_eq!(parsed.text, "bold and it\ngone");
        assert_eq!(ranges(&parsed, SpanKind::Bold), vec![0..4]);
        assert_eq!(ranges(&parsed, SpanKind::Italic), vec![9..11]);
        assert_eq!(ranges(&parsed, SpanKind::Strikethrough), vec![12..16]);
    }

    #[test]
    fn test_tag_aliases() {
        let parsed = parse_markup("<strong>a</strong><em>b</em><ins>c</ins><del>d</del>");
        assert_eq!(parsed.text, "abcd");
        assert_eq!(ranges(&parsed, SpanKind::Bold), vec![0..1]);
        assert_eq!(ranges(&parsed, SpanKind::Italic), vec![1..2]);
        assert_eq!(ranges(&parsed, SpanKind::Underline), vec![2..3]);
        assert_eq!(ranges(&parsed, SpanKind::Strikethrough), vec![3..4]);
    }

    #[test]
    fn test_plain_span_is_not_strikethrough() {
        let parsed = parse_markup(r#"<span style="color:red">x</span>"#);
        assert_eq!(parsed.text, "x");
        assert!(parsed.spans.is_empty());
    }

    #[test]
    fn test_whitespace_collapses() {
        let parsed = parse_markup("<p>hello   world</p>");
        assert_eq!(parsed.text, "hello world");
    }

    #[test]
    fn test_entities_decode() {
        let parsed = parse_markup("a&nbsp;&amp;&#9;b&lt;");
        assert_eq!(parsed.text, "a &\tb<");
    }

    #[test]
    fn test_unclosed_style_runs_to_end() {
        let parsed = parse_markup("<b>unclosed");
        assert_eq!(parsed.text, "unclosed");
        assert_eq!(ranges(&parsed, SpanKind::Bold), vec![0..8]);
    }

    #[test]
    fn test_mismatched_end_tag_is_ignored() {
        let parsed = parse_markup("<b>bold</i> text</b>");
        assert_eq!(parsed.text, "bold text");
        assert_eq!(ranges(&parsed, SpanKind::Bold), vec![0..9]);
    }

    #[test]
    fn test_unterminated_tag_is_kept_as_text() {
        let parsed = parse_markup("plain <b");
        assert_eq!(parsed.text, "plain <b");
        assert!(parsed.spans.is_empty());
    }

    #[test]
    fn test_stray_less_than_keeps_following_text() {
        let parsed = parse_markup("a<b>c</b> 3 < 4 more text");
        assert_eq!(parsed.text, "ac 3 < 4 more text");
        assert_eq!(ranges(&parsed, SpanKind::Bold), vec![1..2]);

        let parsed = parse_markup("x > 0 and y < 1 end");
        assert_eq!(parsed.text, "x > 0 and y < 1 end");
    }

    #[test]
    fn test_comparison_between_brackets_is_text() {
        let parsed = parse_markup("a < b > c");
        assert_eq!(parsed.text, "a < b > c");
        assert!(parsed.spans.is_empty());
    }

    #[test]
    fn test_tags_after_stray_less_than_still_apply() {
        let parsed = parse_markup("3 < 4 <b>bold</b>");
        assert_eq!(parsed.text, "3 < 4 bold");
        assert_eq!(ranges(&parsed, SpanKind::Bold), vec![6..10]);
    }

    #[test]
    fn test_unknown_entity_does_not_block_known_ones() {
        let parsed = parse_markup("<b>x</b> &lt;tag&gt; &copy; 2024");
        assert_eq!(parsed.text, "x <tag> \u{a9} 2024");

        let parsed = parse_markup("<b>x</b> a &amp; b &foo c &bogus; &gt;");
        assert_eq!(parsed.text, "x a & b &foo c &bogus; >");
    }

    #[test]
    fn test_numeric_and_named_html_entities() {
        let parsed = parse_markup("&#65;&#x42;&mdash;&hellip;&euro;");
        assert_eq!(parsed.text, "AB\u{2014}\u{2026}\u{20ac}");
    }

    #[test]
    fn test_reopened_tags_merge() {
        let parsed = parse_markup("<i>he<b>l</b></i><b>lo</b>");
        assert_eq!(ranges(&parsed, SpanKind::Bold), vec![2..5]);
        assert_eq!(ranges(&parsed, SpanKind::Italic), vec![0..3]);
    }

    #[test]
    fn test_round_trip_keeps_indentation_and_lines() {
        let text = "• item\n    [ ] task\n\n1. a  b";
        let markup = write(text, &[(SpanKind::Underline, 2, 6)]);
        let parsed = parse_markup(&markup);
        assert_eq!(parsed.text, text);
        assert_eq!(ranges(&parsed, SpanKind::Underline), vec![2..6]);
    }
}
