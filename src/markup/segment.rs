use crate::style::StyleOverride;

/// An atomic run of text with one style.
///
/// Segments never nest: the text of a styled segment is not scanned for
/// further tags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// Text drawn with the document's base style.
    Plain(String),
    /// Text drawn with the base style merged with an override.
    Styled { text: String, style: StyleOverride },
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Segment::Plain(text) => text,
            Segment::Styled { text, .. } => text,
        }
    }

    pub fn is_styled(&self) -> bool {
        matches!(self, Segment::Styled { .. })
    }

    /// Plain text consisting only of whitespace (or nothing at all).
    pub fn is_blank_plain(&self) -> bool {
        matches!(self, Segment::Plain(text) if text.trim().is_empty())
    }
}

/// One newline-delimited unit of input.
///
/// An empty line has no segments and renders as a blank strip.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Line {
    pub segments: Vec<Segment>,
}

impl Line {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Concatenated text of every segment, without any markup.
    pub fn text(&self) -> String {
        self.segments.iter().map(Segment::text).collect()
    }

    /// The single styled segment of a line that holds nothing else but
    /// blank plain text, if there is one.
    pub fn sole_styled(&self) -> Option<usize> {
        let mut styled = self
            .segments
            .iter()
            .enumerate()
            .filter(|(_, segment)| !segment.is_blank_plain());
        match (styled.next(), styled.next()) {
            (Some((index, segment)), None) if segment.is_styled() => Some(index),
            _ => None,
        }
    }
}
