//! Document composition: turning a whole input text into one image.
//!
//! Text without markup (or with parsing disabled) goes through the plain
//! path, where every line is trimmed and drawn in the base style with a gap
//! of `font_size / 3` between consecutive lines. Text with at least one
//! `<f>` tag goes through [`LineLayout`] line by line, stacked without gaps.

use std::sync::Arc;

use crate::{
    config::RenderOptions,
    error::{Error, RenderWarning, Result, WarningKind},
    markup,
    metrics::{GlyphRasterizer, TextExtent},
    style::Style,
    surface::Surface,
    text::{LineLayout, REFERENCE_GLYPH},
};

/// A composed image together with the problems met while drawing it.
#[derive(Debug)]
pub struct Rendered {
    pub surface: Surface,
    pub warnings: Vec<RenderWarning>,
}

/// Composes documents with one set of options and one font backend.
pub struct DocumentComposer<'a, R: ?Sized> {
    options: &'a RenderOptions,
    base: Style,
    fonts: &'a R,
}

impl<'a, R> DocumentComposer<'a, R>
where
    R: GlyphRasterizer + ?Sized,
{
    pub fn new(options: &'a RenderOptions, fonts: &'a R) -> Self {
        Self {
            options,
            base: options.base_style(),
            fonts,
        }
    }

    /// Renders `text` to a single surface.
    ///
    /// Per-segment failures end up in [`Rendered::warnings`]. The only hard
    /// error is a document with nothing to draw: zero width or zero height
    /// after padding.
    pub fn compose(&self, text: &str) -> Result<Rendered> {
        let mut warnings = Vec::new();
        if let Some(font) = self.base.font()
            && !self.fonts.has_font(font)
        {
            log::warn!("base font `{font}` not found, using the default face");
            warnings.push(RenderWarning::new(
                0,
                None,
                WarningKind::FontFallback(font.to_string()),
            ));
        }

        let parsed = self.options.auto_parse.then(|| markup::parse(text));
        let (strips, gap) = match parsed {
            Some(parsed) if parsed.has_markup => {
                warnings.extend(parsed.warnings);
                (self.markup_strips(&parsed.lines, &mut warnings), 0)
            }
            _ => (
                self.plain_strips(text, &mut warnings),
                self.base.font_size / 3,
            ),
        };

        let surface = self.stack(&strips, gap)?;
        log::debug!(
            "composed {} lines into {}x{} with {} warnings",
            strips.len(),
            surface.width(),
            surface.height(),
            warnings.len()
        );
        Ok(Rendered { surface, warnings })
    }

    /// Lines drawn verbatim in the base style, each trimmed of surrounding
    /// whitespace. A line is as tall as [`REFERENCE_GLYPH`] or its own text,
    /// whichever is taller; blank lines keep the size of the reference glyph.
    fn plain_strips(&self, text: &str, warnings: &mut Vec<RenderWarning>) -> Vec<Surface> {
        let style = &self.base;
        let reference_height =
            match self.fonts.measure(style.font(), style.font_size, REFERENCE_GLYPH) {
                Ok(extent) => extent.height,
                Err(err) => {
                    log::warn!("reference glyph unavailable: {err}");
                    warnings.push(RenderWarning::new(0, None, WarningKind::Measure(err)));
                    0
                }
            };

        text.split('\n')
            .enumerate()
            .map(|(index, line)| {
                let line = line.trim();
                let probe = if line.is_empty() { REFERENCE_GLYPH } else { line };
                let extent = match self.fonts.measure(style.font(), style.font_size, probe) {
                    Ok(extent) => extent,
                    Err(err) => {
                        log::warn!("line {index}: measure failed: {err}");
                        warnings.push(RenderWarning::new(index, None, WarningKind::Measure(err)));
                        TextExtent::default()
                    }
                };

                let height = reference_height.max(extent.height);
                let mut surface = Surface::new(extent.width, height, self.options.background_color);
                if !line.is_empty()
                    && extent.width > 0
                    && let Err(err) = surface.draw_text((0, 0), line, style, self.fonts)
                {
                    log::warn!("line {index}: draw failed: {err}");
                    warnings.push(RenderWarning::new(index, None, WarningKind::Draw(err)));
                }
                surface
            })
            .collect()
    }

    fn markup_strips(
        &self,
        lines: &[markup::Line],
        warnings: &mut Vec<RenderWarning>,
    ) -> Vec<Surface> {
        let layout = LineLayout::new(&self.base, self.fonts)
            .with_background(self.options.background_color);
        lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                let rendered = layout.render(index, line);
                warnings.extend(rendered.warnings);
                rendered.surface
            })
            .collect()
    }

    /// Stacks `strips` top to bottom inside the padding, `gap` pixels apart.
    fn stack(&self, strips: &[Surface], gap: u32) -> Result<Surface> {
        let padding = self.options.padding;
        let content_width = strips.iter().map(Surface::width).max().unwrap_or(0);
        let gaps = u32::try_from(strips.len().saturating_sub(1))
            .ok()
            .and_then(|count| count.checked_mul(gap));
        let content_height = strips
            .iter()
            .try_fold(0u32, |sum, strip| sum.checked_add(strip.height()))
            .zip(gaps)
            .and_then(|(lines, gaps)| lines.checked_add(gaps))
            .ok_or(Error::CanvasTooLarge)?;

        let too_large = || Error::InvalidPadding(format!("{:?}", padding.to_array()));
        let width = [padding.left(), padding.right()]
            .into_iter()
            .try_fold(content_width, u32::checked_add)
            .ok_or_else(too_large)?;
        let height = [padding.top(), padding.bottom()]
            .into_iter()
            .try_fold(content_height, u32::checked_add)
            .ok_or_else(too_large)?;
        if width == 0 || height == 0 {
            return Err(Error::EmptyCanvas { width, height });
        }

        let mut canvas = Surface::new(width, height, self.options.background_color);
        let mut y = padding.top() as i64;
        for strip in strips {
            canvas.paste(strip, (padding.left() as i64, y), true);
            y += strip.height() as i64 + gap as i64;
        }
        Ok(canvas)
    }
}

/// Renders `text` with `options`, keeping the warnings.
pub fn compose<R>(text: &str, options: &RenderOptions, fonts: &R) -> Result<Rendered>
where
    R: GlyphRasterizer + ?Sized,
{
    DocumentComposer::new(options, fonts).compose(text)
}

/// Renders `text` with `options` into a single surface.
///
/// Warnings are logged as they occur and otherwise dropped; use [`compose`]
/// to inspect them.
pub fn compose_text_image<R>(text: &str, options: &RenderOptions, fonts: &R) -> Result<Surface>
where
    R: GlyphRasterizer + ?Sized,
{
    compose(text, options, fonts).map(|rendered| rendered.surface)
}

/// Async wrapper around [`compose`].
///
/// Rendering is CPU-bound, so it runs on tokio's blocking pool.
pub async fn render_text_image<R>(
    text: impl Into<String>,
    options: RenderOptions,
    fonts: Arc<R>,
) -> Result<Rendered>
where
    R: GlyphRasterizer + Send + Sync + 'static,
{
    let text = text.into();
    tokio::task::spawn_blocking(move || compose(&text, &options, fonts.as_ref())).await?
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{color::Color, config::Padding, testing::BlockFont};

    fn options() -> RenderOptions {
        RenderOptions::default()
    }

    #[test]
    fn plain_text_stacks_lines_with_gap() {
        let font = BlockFont::new();
        let surface = compose_text_image("abcd\nab", &options(), &font).unwrap();
        let line = BlockFont::line_height(20);
        assert_eq!(surface.dimensions(), (40, line * 2 + 20 / 3));
    }

    #[test]
    fn plain_height_grows_with_line_count() {
        let font = BlockFont::new();
        let mut last = 0;
        for count in 1..6 {
            let text = vec!["line"; count].join("\n");
            let height = compose_text_image(&text, &options(), &font)
                .unwrap()
                .height();
            assert!(height > last);
            assert_eq!(
                height,
                BlockFont::line_height(20) * count as u32 + (20 / 3) * (count as u32 - 1)
            );
            last = height;
        }
    }

    #[test]
    fn plain_lines_are_trimmed_and_blank_lines_keep_reference_width() {
        let font = BlockFont::new();
        let surface = compose_text_image("  ab  \n\n", &options(), &font).unwrap();
        // blank lines are as wide as one wide glyph
        assert_eq!(surface.width(), 20);
        assert_eq!(surface.height(), BlockFont::line_height(20) * 3 + (20 / 3) * 2);
    }

    #[test]
    fn disabled_parsing_draws_tags_verbatim() {
        let font = BlockFont::new();
        let text = "<f fs=40>hi</f>";
        let surface = compose_text_image(text, &options().with_auto_parse(false), &font).unwrap();
        assert_eq!(surface.width(), 10 * text.len() as u32);
        assert_eq!(surface.height(), BlockFont::line_height(20));
    }

    #[test]
    fn markup_lines_stack_without_gap() {
        let font = BlockFont::new();
        let rendered = compose("<f fs=40>ab</f>\nx", &options(), &font).unwrap();
        assert!(rendered.warnings.is_empty());
        assert_eq!(rendered.surface.width(), 40);
        assert_eq!(
            rendered.surface.height(),
            BlockFont::line_height(40) + BlockFont::line_height(20)
        );
    }

    #[test]
    fn uniform_padding_equals_four_equal_sides() {
        let font = BlockFont::new();
        let text = "a<f fc=red>b</f>";
        let uniform = compose_text_image(text, &options().with_padding(6), &font).unwrap();
        let sides =
            compose_text_image(text, &options().with_padding((6, 6, 6, 6)), &font).unwrap();
        assert_eq!(uniform, sides);

        let bare = compose_text_image(text, &options(), &font).unwrap();
        assert_eq!(uniform.width(), bare.width() + 12);
        assert_eq!(uniform.height(), bare.height() + 12);
    }

    #[test]
    fn padding_sides_are_top_left_bottom_right() {
        let font = BlockFont::new();
        let options = options()
            .with_padding(Padding::from((1, 2, 3, 4)))
            .with_background_color(Color::WHITE);
        let surface = compose_text_image("正", &options, &font).unwrap();
        assert_eq!(surface.width(), 20 + 2 + 4);
        assert_eq!(surface.height(), BlockFont::line_height(20) + 1 + 3);
        // glyph block starts after the left padding
        let y = 1 + 20 / 4;
        assert_eq!(surface.pixel(1, y), Some(Color::WHITE));
        assert_eq!(surface.pixel(2, y), Some(Color::BLACK));
    }

    #[test]
    fn nothing_to_draw_is_an_error() {
        let font = BlockFont::new();
        let err = compose("<f></f>", &options(), &font).unwrap_err();
        assert!(matches!(err, Error::EmptyCanvas { width: 0, .. }));

        // padding alone still produces an image
        let surface = compose_text_image("<f></f>", &options().with_padding(3), &font).unwrap();
        assert_eq!(surface.width(), 6);
    }

    #[test]
    fn failing_segments_become_warnings() {
        let font = BlockFont::new().failing_on("bad");
        let rendered = compose("ok <f fs=30>bad</f>\n<f font=x.ttf>y</f>", &options(), &font)
            .unwrap();
        assert_eq!(rendered.warnings.len(), 2);
        assert!(matches!(rendered.warnings[0].kind, WarningKind::Measure(_)));
        assert_eq!(rendered.warnings[0].line, 0);
        assert!(matches!(rendered.warnings[1].kind, WarningKind::FontFallback(_)));
        assert_eq!(rendered.warnings[1].line, 1);
    }

    #[test]
    fn invalid_attributes_are_reported() {
        let font = BlockFont::new();
        let rendered = compose("<f fs=big fc=nope>x</f>", &options(), &font).unwrap();
        assert_eq!(rendered.warnings.len(), 2);
        assert!(
            rendered
                .warnings
                .iter()
                .all(|w| matches!(w.kind, WarningKind::InvalidAttribute { .. }))
        );
    }

    #[test]
    fn background_fills_the_canvas() {
        let font = BlockFont::new();
        let options = options()
            .with_background_color(Color::rgb(0, 0, 255))
            .with_padding(2);
        let surface = compose_text_image("<f fc=red>a</f>", &options, &font).unwrap();
        assert_eq!(surface.pixel(0, 0), Some(Color::rgb(0, 0, 255)));
    }

    #[test]
    fn plain_lines_grow_to_fit_descenders() {
        let font = BlockFont::new().with_descenders("gy");
        let surface = compose_text_image("gy", &options(), &font).unwrap();
        let tall = BlockFont::line_height(20) + 20 / 4;
        assert_eq!(surface.height(), tall);
        // the lowest row still carries ink
        assert_eq!(surface.pixel(0, tall - 1), Some(Color::BLACK));

        let surface = compose_text_image("ab\ngy\nab", &options(), &font).unwrap();
        let line = BlockFont::line_height(20);
        assert_eq!(surface.height(), line + tall + line + 2 * (20 / 3));
        let last_gy_row = line + 20 / 3 + tall - 1;
        assert_eq!(surface.pixel(0, last_gy_row), Some(Color::BLACK));
    }

    #[test]
    fn markup_line_strips_carry_the_background() {
        let font = BlockFont::new();
        let background = Color::rgb(0, 128, 0);
        let options = options().with_background_color(background);
        let parsed = markup::parse("a<f fs=40>b</f>");
        let mut warnings = Vec::new();
        let strips =
            DocumentComposer::new(&options, &font).markup_strips(&parsed.lines, &mut warnings);
        assert_eq!(strips[0].pixel(0, 0), Some(background));
    }

    #[test]
    fn oversized_padding_is_rejected() {
        let font = BlockFont::new();
        let options = options().with_padding([0, u32::MAX, 0, 1]);
        let err = compose("x", &options, &font).unwrap_err();
        assert!(matches!(err, Error::InvalidPadding(_)));

        let options = RenderOptions::default().with_padding([u32::MAX, 0, 0, 0]);
        let err = compose("x", &options, &font).unwrap_err();
        assert!(matches!(err, Error::InvalidPadding(_)));
    }
}
