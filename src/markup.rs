//! Inline markup parsing.
//!
//! The only tag is `<f attr=value ...>content</f>`. Tags do not nest, the
//! tag name is case-sensitive, and anything that does not form a complete
//! tag on a single line is kept as literal text.

/// Tokenizer for the attribute string of an opening tag.
pub mod attribute;
/// Segment and line data produced by the parser.
pub mod segment;

pub use attribute::{Attributes, RejectedAttribute, parse_attributes};
pub use segment::{Line, Segment};

use crate::{
    error::{RenderWarning, WarningKind},
    style::StyleOverride,
};

const OPEN_TAG: &str = "<f";
const CLOSE_TAG: &str = "</f>";

/// Output of [`parse`].
#[derive(Debug, Default)]
pub struct ParsedText {
    /// Whether at least one well-formed tag was found.
    pub has_markup: bool,
    /// Lines in input order; one per newline-delimited chunk.
    pub lines: Vec<Line>,
    /// Attribute values that could not be applied.
    pub warnings: Vec<RenderWarning>,
}

impl ParsedText {
    pub fn styled_count(&self) -> usize {
        self.lines
            .iter()
            .flat_map(|line| &line.segments)
            .filter(|segment| segment.is_styled())
            .count()
    }
}

/// Location of a complete opening tag inside a chunk of text.
struct OpenTag<'a> {
    start: usize,
    attributes: &'a str,
    content: &'a str,
}

/// Splits `text` into lines of plain and styled segments.
///
/// The text is walked chunk by chunk, each chunk ending at a closing tag.
/// Inside a chunk the last opening tag starts the styled content; text in
/// front of it is plain. A chunk without a usable opening tag is emitted
/// verbatim, closing tag included, so malformed markup degrades to literal
/// text.
pub fn parse(text: &str) -> ParsedText {
    let mut builder = LineBuilder::default();
    let mut warnings = Vec::new();
    let mut has_markup = false;

    let chunks: Vec<&str> = text.split(CLOSE_TAG).collect();
    let last = chunks.len() - 1;

    for (index, chunk) in chunks.iter().enumerate() {
        let closed = index < last;

        if closed && let Some(tag) = find_open_tag(chunk) {
            builder.push_plain(&chunk[..tag.start]);

            let attrs = parse_attributes(tag.attributes);
            let (line, segment) = builder.push_styled(tag.content, attrs.style);
            warnings.extend(attrs.rejected.into_iter().map(|rejected| {
                RenderWarning::new(
                    line,
                    Some(segment),
                    WarningKind::InvalidAttribute {
                        key: rejected.key,
                        value: rejected.value,
                    },
                )
            }));
            has_markup = true;
            continue;
        }

        builder.push_plain(chunk);
        if closed {
            builder.push_plain(CLOSE_TAG);
        }
    }

    ParsedText {
        has_markup,
        lines: builder.finish(),
        warnings,
    }
}

/// Finds the opening tag that the chunk's closing tag belongs to.
///
/// Openers are tried from the right; the first one whose attribute list is
/// closed by `>` wins, so a stray `<f` inside the content stays literal.
/// The tag and its content must not span a newline.
fn find_open_tag(chunk: &str) -> Option<OpenTag<'_>> {
    let (start, attributes, content) = chunk
        .rmatch_indices(OPEN_TAG)
        .find_map(|(start, _)| {
            let after = &chunk[start + OPEN_TAG.len()..];
            let first = after.chars().next()?;
            if first != '>' && !(first.is_whitespace() && first != '\n') {
                return None;
            }
            let end = after.find('>')?;
            Some((start, &after[..end], &after[end + 1..]))
        })?;

    if attributes.contains('\n') || content.contains('\n') {
        return None;
    }

    Some(OpenTag {
        start,
        attributes: attributes.trim(),
        content,
    })
}

/// Accumulates segments, starting a new line at every newline in plain text.
#[derive(Default)]
struct LineBuilder {
    lines: Vec<Line>,
    current: Vec<Segment>,
}

impl LineBuilder {
    fn push_plain(&mut self, text: &str) {
        for (index, piece) in text.split('\n').enumerate() {
            if index > 0 {
                self.break_line();
            }
            if piece.is_empty() {
                continue;
            }
            match self.current.last_mut() {
                Some(Segment::Plain(existing)) => existing.push_str(piece),
                _ => self.current.push(Segment::Plain(piece.to_string())),
            }
        }
    }

    /// Returns the (line, segment) position of the pushed segment.
    fn push_styled(&mut self, text: &str, style: StyleOverride) -> (usize, usize) {
        self.current.push(Segment::Styled {
            text: text.to_string(),
            style,
        });
        (self.lines.len(), self.current.len() - 1)
    }

    fn break_line(&mut self) {
        let segments = std::mem::take(&mut self.current);
        self.lines.push(Line::new(segments));
    }

    fn finish(mut self) -> Vec<Line> {
        self.break_line();
        self.lines
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn styled(text: &str, style: StyleOverride) -> Segment {
        Segment::Styled {
            text: text.into(),
            style,
        }
    }

    fn plain(text: &str) -> Segment {
        Segment::Plain(text.into())
    }

    #[test]
    fn text_without_tags_has_no_markup() {
        let parsed = parse("hello\nworld");
        assert!(!parsed.has_markup);
        assert_eq!(
            parsed.lines,
            vec![Line::new(vec![plain("hello")]), Line::new(vec![plain("world")])]
        );
    }

    #[test]
    fn single_tag_yields_one_styled_segment() {
        let parsed = parse("<f font_size=30>X</f>");
        assert!(parsed.has_markup);
        assert_eq!(parsed.lines.len(), 1);
        assert_eq!(
            parsed.lines[0].segments,
            vec![styled(
                "X",
                StyleOverride {
                    font_size: Some(30),
                    ..Default::default()
                }
            )]
        );
    }

    #[test]
    fn clamped_sizes_are_identical() {
        let big = parse("<f font_size=5000>X</f>");
        let max = parse("<f font_size=1000>X</f>");
        assert_eq!(big.lines, max.lines);
    }

    #[test]
    fn unterminated_tag_is_literal() {
        let parsed = parse("<f font_size=abc>text");
        assert!(!parsed.has_markup);
        assert_eq!(parsed.lines, vec![Line::new(vec![plain("<f font_size=abc>text")])]);
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn orphan_closing_tag_is_literal() {
        let parsed = parse("a</f>b");
        assert!(!parsed.has_markup);
        assert_eq!(parsed.lines[0].segments, vec![plain("a</f>b")]);
    }

    #[test]
    fn mixed_content_keeps_order() {
        let parsed = parse("before<f>X</f>after");
        assert!(parsed.has_markup);
        assert_eq!(
            parsed.lines[0].segments,
            vec![plain("before"), styled("X", StyleOverride::default()), plain("after")]
        );
    }

    #[test]
    fn splits_lines_outside_tags() {
        let text = "在不在，<f fs=30 fc=red>HibiKi</f>，\n你好<f fs=15>我</f>\n\n<f fs=25>金色</f>";
        let parsed = parse(text);
        assert_eq!(parsed.lines.len(), 4);
        assert_eq!(parsed.lines[0].segments.len(), 3);
        assert_eq!(parsed.lines[0].text(), "在不在，HibiKi，");
        assert_eq!(parsed.lines[1].segments.len(), 2);
        assert!(parsed.lines[2].is_empty());
        assert_eq!(parsed.lines[3].sole_styled(), Some(0));
        assert_eq!(parsed.styled_count(), 3);
    }

    #[test]
    fn newline_inside_content_is_literal() {
        let parsed = parse("<f fs=3>a\nb</f>");
        assert!(!parsed.has_markup);
        assert_eq!(parsed.lines.len(), 2);
        assert_eq!(parsed.lines[0].segments, vec![plain("<f fs=3>a")]);
        assert_eq!(parsed.lines[1].segments, vec![plain("b</f>")]);
    }

    #[test]
    fn tag_name_must_be_exact() {
        let parsed = parse("<font>x</f>");
        assert!(!parsed.has_markup);
        assert_eq!(parsed.lines[0].segments, vec![plain("<font>x</f>")]);

        let upper = parse("<F fs=3>x</F>");
        assert!(!upper.has_markup);
    }

    #[test]
    fn earlier_unterminated_opener_stays_literal() {
        let parsed = parse("<f fs=9>a <f fc=blue>b</f>");
        assert_eq!(
            parsed.lines[0].segments,
            vec![
                plain("<f fs=9>a "),
                styled(
                    "b",
                    StyleOverride {
                        font_color: Some(Color::rgb(0, 0, 255)),
                        ..Default::default()
                    }
                ),
            ]
        );
    }

    #[test]
    fn opener_without_bracket_is_part_of_content() {
        let parsed = parse("<f fs=1>a <f b</f>");
        assert!(parsed.has_markup);
        assert_eq!(
            parsed.lines[0].segments,
            vec![styled(
                "a <f b",
                StyleOverride {
                    font_size: Some(1),
                    ..Default::default()
                }
            )]
        );
    }

    #[test]
    fn styled_text_is_not_rescanned() {
        let parsed = parse("<f>a</f></f>");
        assert_eq!(
            parsed.lines[0].segments,
            vec![styled("a", StyleOverride::default()), plain("</f>")]
        );
    }

    #[test]
    fn invalid_attribute_is_reported_with_position() {
        let parsed = parse("x\nok <f fs=big>y</f>");
        assert_eq!(parsed.warnings.len(), 1);
        let warning = &parsed.warnings[0];
        assert_eq!(warning.line, 1);
        assert_eq!(warning.segment, Some(1));
        assert!(matches!(
            &warning.kind,
            WarningKind::InvalidAttribute { key, value } if key == "fs" && value == "big"
        ));
    }

    #[test]
    fn empty_input_is_one_empty_line() {
        let parsed = parse("");
        assert_eq!(parsed.lines, vec![Line::default()]);
    }

    #[test]
    fn sole_styled_tolerates_surrounding_blanks() {
        let parsed = parse("  <f fs=40>big</f> ");
        assert_eq!(parsed.lines[0].sole_styled(), Some(1));

        let mixed = parse("a<f fs=40>big</f>");
        assert_eq!(mixed.lines[0].sole_styled(), None);
    }
}
