use crate::{glyph_id::GlyphId, metrics::TextExtent};

/// **Y-axis goes down**
///
/// A glyph placed relative to the top-left corner of its run's line box.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionedGlyph {
    pub glyph_id: GlyphId,
    pub x: f32,
    pub y: f32,
}

/// A single line of text shaped with one font at one size.
///
/// Glyphs are advanced left to right with kerning applied between
/// neighbors. The line box starts at `y = 0` and the baseline sits at
/// `ascent`.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphRun {
    pub glyphs: Vec<PositionedGlyph>,
    /// Pen position after the last glyph.
    pub advance: f32,
    /// Distance from the top of the line box to the baseline.
    pub ascent: f32,
    /// Lowest inked row measured from the top of the line box.
    pub ink_bottom: f32,
    /// Number of characters shaped.
    pub char_count: usize,
}

impl GlyphRun {
    /// Shapes `text` with `font`.
    ///
    /// Every character maps to one glyph; characters missing from the font
    /// use the font's notdef glyph so the advance stays stable.
    pub fn shape(font: &fontdue::Font, font_id: fontdb::ID, font_size: f32, text: &str) -> Self {
        let ascent = font
            .horizontal_line_metrics(font_size)
            .map(|metrics| metrics.ascent)
            .unwrap_or(font_size);

        let mut glyphs = Vec::with_capacity(text.len());
        let mut origin_x = 0.0f32;
        let mut ink_bottom = 0.0f32;
        let mut previous: Option<(u16, f32)> = None;
        let mut char_count = 0;

        for ch in text.chars() {
            char_count += 1;
            let glyph_idx = font.lookup_glyph_index(ch);
            let metrics = font.metrics_indexed(glyph_idx, font_size);

            if let Some((last_glyph, last_advance)) = previous {
                let kerning = font
                    .horizontal_kern_indexed(last_glyph, glyph_idx, font_size)
                    .unwrap_or(0.0);
                origin_x += last_advance + kerning;
            }

            if metrics.width > 0 && metrics.height > 0 {
                // fontdue reports ymin relative to the baseline, positive up.
                ink_bottom = ink_bottom.max(ascent - metrics.ymin as f32);
                glyphs.push(PositionedGlyph {
                    glyph_id: GlyphId::new(font_id, glyph_idx, font_size),
                    x: origin_x + metrics.xmin as f32,
                    y: ascent - (metrics.ymin as f32 + metrics.height as f32),
                });
            }

            previous = Some((glyph_idx, metrics.advance_width));
        }

        let advance = match previous {
            Some((_, last_advance)) => origin_x + last_advance,
            None => 0.0,
        };

        Self {
            glyphs,
            advance: advance.max(0.0),
            ascent,
            ink_bottom,
            char_count,
        }
    }

    /// Pixel extent of the run.
    ///
    /// Width is the pen advance rounded up. Height reaches from the top of
    /// the line box to whichever is lower, the baseline or the lowest ink.
    /// An empty run has no extent at all.
    pub fn extent(&self) -> TextExtent {
        if self.char_count == 0 {
            return TextExtent::default();
        }
        let height = self.ascent.max(self.ink_bottom).max(0.0);
        TextExtent::new(self.advance.ceil() as u32, height.ceil() as u32)
    }
}
