use crate::{
    color::Color,
    error::{RenderWarning, WarningKind},
    markup::{Line, Segment},
    metrics::GlyphRasterizer,
    style::Style,
    surface::Surface,
};

/// Glyph whose height in the base style sets the minimum line height and the
/// baseline plain text sits on.
pub const REFERENCE_GLYPH: &str = "正";

/// A segment with its resolved style and measured size.
#[derive(Clone, Debug, PartialEq)]
pub struct MeasuredSegment<'a> {
    /// Position of the segment within its line.
    pub index: usize,
    pub segment: &'a Segment,
    pub style: Style,
    pub width: u32,
    /// Height of the segment's own text.
    pub text_height: u32,
    /// `max(text_height, reference height)`.
    pub height: u32,
}

/// Sizes of everything on one line, computed before any drawing.
#[derive(Debug)]
pub struct LayoutPlan<'a> {
    /// Height of [`REFERENCE_GLYPH`] in the base style.
    pub reference_height: u32,
    /// One entry per segment, in order. Segments that failed to measure
    /// carry the warning instead and take no space.
    pub segments: Vec<Result<MeasuredSegment<'a>, RenderWarning>>,
    /// Sum of the measured widths.
    pub width: u32,
    /// `max(reference_height, tallest segment)`.
    pub height: u32,
    /// Index of the segment centered vertically, if any.
    pub centered: Option<usize>,
}

impl LayoutPlan<'_> {
    pub fn measured(&self) -> impl Iterator<Item = &MeasuredSegment<'_>> {
        self.segments.iter().filter_map(|entry| entry.as_ref().ok())
    }
}

/// Where a segment ended up on the line surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub index: usize,
    pub x: i64,
    pub y: i64,
    pub width: u32,
}

/// A laid-out line.
#[derive(Debug)]
pub struct RenderedLine {
    /// Transparent-backed unless a background was given, cropped to
    /// `width_used` columns.
    pub surface: Surface,
    /// Horizontal extent actually covered by drawn segments.
    pub width_used: u32,
    pub placements: Vec<Placement>,
    pub warnings: Vec<RenderWarning>,
}

/// Lays out and draws the segments of a single line left to right.
///
/// Segments are placed on one shared line surface:
///
/// * plain text sits on the reference baseline, `height - reference - 1`
///   pixels from the top;
/// * a styled segment alone on its line (other segments are blank plain
///   text) is centered vertically;
/// * any other styled segment is bottom-aligned.
///
/// Failures affect only the failing segment. It is skipped, reported as a
/// [`RenderWarning`] and takes no horizontal space.
pub struct LineLayout<'a, R: ?Sized> {
    base: &'a Style,
    fonts: &'a R,
    background: Color,
}

impl<'a, R> LineLayout<'a, R>
where
    R: GlyphRasterizer + ?Sized,
{
    pub fn new(base: &'a Style, fonts: &'a R) -> Self {
        Self {
            base,
            fonts,
            background: Color::TRANSPARENT,
        }
    }

    /// Fills line surfaces with `color` instead of transparency.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    /// Measures every segment of `line`.
    pub fn plan<'l>(&self, line_index: usize, line: &'l Line) -> LayoutPlan<'l> {
        let reference_height = match self.fonts.measure(
            self.base.font(),
            self.base.font_size,
            REFERENCE_GLYPH,
        ) {
            Ok(extent) => extent.height,
            Err(err) => {
                log::warn!("line {line_index}: reference glyph unavailable: {err}");
                0
            }
        };

        let segments: Vec<_> = line
            .segments
            .iter()
            .enumerate()
            .map(|(index, segment)| {
                self.measure_segment(line_index, index, segment, reference_height)
            })
            .collect();

        let mut width = 0u32;
        let mut height = reference_height;
        for measured in segments.iter().filter_map(|entry| entry.as_ref().ok()) {
            width = width.saturating_add(measured.width);
            height = height.max(measured.height);
        }

        let plan = LayoutPlan {
            reference_height,
            segments,
            width,
            height,
            centered: line.sole_styled(),
        };
        log::debug!(
            "line {line_index}: {} segments, {}x{} (reference {})",
            plan.segments.len(),
            plan.width,
            plan.height,
            plan.reference_height
        );
        plan
    }

    fn measure_segment<'l>(
        &self,
        line_index: usize,
        index: usize,
        segment: &'l Segment,
        reference_height: u32,
    ) -> Result<MeasuredSegment<'l>, RenderWarning> {
        let style = match segment {
            Segment::Plain(_) => self.base.clone(),
            Segment::Styled { style, .. } => style.apply(self.base),
        };
        match self.fonts.measure(style.font(), style.font_size, segment.text()) {
            Ok(extent) => Ok(MeasuredSegment {
                index,
                segment,
                style,
                width: extent.width,
                text_height: extent.height,
                height: extent.height.max(reference_height),
            }),
            Err(err) => {
                log::warn!("line {line_index}, segment {index}: measure failed: {err}");
                Err(RenderWarning::new(
                    line_index,
                    Some(index),
                    WarningKind::Measure(err),
                ))
            }
        }
    }

    /// Measures and draws `line`.
    pub fn render(&self, line_index: usize, line: &Line) -> RenderedLine {
        let plan = self.plan(line_index, line);
        let mut warnings = self.font_fallbacks(line_index, line);
        let mut surface = Surface::new(plan.width, plan.height, self.background);
        let mut placements = Vec::with_capacity(plan.segments.len());
        let line_height = plan.height as i64;
        let mut cursor_x = 0i64;

        for entry in plan.segments {
            let measured = match entry {
                Ok(measured) => measured,
                Err(warning) => {
                    warnings.push(warning);
                    continue;
                }
            };

            let y = match measured.segment {
                Segment::Plain(_) => (line_height - plan.reference_height as i64 - 1).max(0),
                Segment::Styled { .. } if plan.centered == Some(measured.index) => {
                    (line_height - measured.text_height as i64) / 2
                }
                Segment::Styled { .. } => line_height - measured.text_height as i64,
            };

            if let Err(err) = surface.draw_text(
                (cursor_x, y),
                measured.segment.text(),
                &measured.style,
                self.fonts,
            ) {
                log::warn!(
                    "line {line_index}, segment {}: draw failed: {err}",
                    measured.index
                );
                warnings.push(RenderWarning::new(
                    line_index,
                    Some(measured.index),
                    WarningKind::Draw(err),
                ));
                continue;
            }

            placements.push(Placement {
                index: measured.index,
                x: cursor_x,
                y,
                width: measured.width,
            });
            cursor_x += measured.width as i64;
        }

        let width_used = cursor_x as u32;
        surface.crop(0, 0, width_used, plan.height);

        RenderedLine {
            surface,
            width_used,
            placements,
            warnings,
        }
    }

    /// Warnings for styled segments whose font only resolves to the fallback.
    fn font_fallbacks(&self, line_index: usize, line: &Line) -> Vec<RenderWarning> {
        line.segments
            .iter()
            .enumerate()
            .filter_map(|(index, segment)| match segment {
                Segment::Styled { style, .. } => {
                    let font = style.font.as_deref()?;
                    (!self.fonts.has_font(font)).then(|| {
                        RenderWarning::new(
                            line_index,
                            Some(index),
                            WarningKind::FontFallback(font.to_string()),
                        )
                    })
                }
                Segment::Plain(_) => None,
            })
            .collect()
    }
}
