//! A font backend with fixed, predictable metrics.
//!
//! [`BlockFont`] draws every visible character as a solid block. It needs no
//! font files, so layout and composition can be checked exactly in tests and
//! in environments without system fonts.

use crate::{
    error::{Error, Result},
    metrics::{FontMetrics, GlyphRasterizer, TextExtent},
    renderer::CoverageMask,
};

/// Fixed-metrics font.
///
/// * ASCII characters advance `size / 2` pixels (at least 1), everything else
///   advances `size` pixels.
/// * Any non-empty string is `size + size / 4` pixels tall. Strings holding
///   one of the configured descender characters reach `size / 4` further
///   down; by default there are none and the height never depends on the
///   characters.
/// * Visible characters are drawn as a block covering their advance minus
///   one column, from `size / 4` down to the bottom of the line box.
#[derive(Clone, Debug, Default)]
pub struct BlockFont {
    known_fonts: Vec<String>,
    failing_text: Option<String>,
    descenders: Vec<char>,
}

impl BlockFont {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `font` as available; other identifiers report a fallback.
    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.known_fonts.push(font.into());
        self
    }

    /// Makes measuring any text containing `needle` fail.
    pub fn failing_on(mut self, needle: impl Into<String>) -> Self {
        self.failing_text = Some(needle.into());
        self
    }

    /// Makes strings containing any of `chars` taller by `size / 4`.
    pub fn with_descenders(mut self, chars: &str) -> Self {
        self.descenders.extend(chars.chars());
        self
    }

    pub fn advance(ch: char, size: u32) -> u32 {
        if ch.is_ascii() { (size / 2).max(1) } else { size }
    }

    pub fn line_height(size: u32) -> u32 {
        size + size / 4
    }

    fn check(&self, text: &str) -> Result<()> {
        match &self.failing_text {
            Some(needle) if text.contains(needle.as_str()) => {
                Err(Error::FontUnavailable(format!("cannot shape `{text}`")))
            }
            _ => Ok(()),
        }
    }
}

impl FontMetrics for BlockFont {
    fn measure(&self, _font: Option<&str>, size: u32, text: &str) -> Result<TextExtent> {
        self.check(text)?;
        if text.is_empty() {
            return Ok(TextExtent::default());
        }
        let width = text.chars().map(|ch| Self::advance(ch, size)).sum();
        let mut height = Self::line_height(size);
        if text.chars().any(|ch| self.descenders.contains(&ch)) {
            height += size / 4;
        }
        Ok(TextExtent::new(width, height))
    }

    fn has_font(&self, font: &str) -> bool {
        self.known_fonts.iter().any(|known| known == font)
    }
}

impl GlyphRasterizer for BlockFont {
    fn rasterize(&self, font: Option<&str>, size: u32, text: &str) -> Result<CoverageMask> {
        let extent = self.measure(font, size, text)?;
        let mut mask = CoverageMask::new(extent.width as usize, extent.height as usize);
        let top = (size / 4) as usize;
        let mut x = 0usize;
        for ch in text.chars() {
            let advance = Self::advance(ch, size) as usize;
            if !ch.is_whitespace() {
                mask.fill_rect(x, top, advance.saturating_sub(1).max(1), mask.height - top);
            }
            x += advance;
        }
        Ok(mask)
    }
}
