//! Capabilities the layout engine needs from a font backend.
//!
//! [`crate::FontSystem`] implements both traits on top of `fontdb` and
//! `fontdue`. [`crate::testing::BlockFont`] implements them with fixed
//! metrics so layout can be checked without any font files.

use crate::{error::Result, renderer::CoverageMask};

/// Pixel extent of a rendered string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextExtent {
    pub width: u32,
    pub height: u32,
}

impl TextExtent {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Answers "how large does this string render?".
///
/// Implementations must be deterministic for fixed inputs. `font` is a font
/// identifier (file name or family name); `None` and unknown identifiers
/// resolve to the backend's default face.
pub trait FontMetrics {
    fn measure(&self, font: Option<&str>, size: u32, text: &str) -> Result<TextExtent>;

    /// Whether `font` resolves to a face of its own rather than the fallback.
    fn has_font(&self, _font: &str) -> bool {
        true
    }
}

/// Produces glyph coverage for a string.
///
/// The returned mask has exactly the extent reported by
/// [`FontMetrics::measure`] for the same arguments, with the top edge of the
/// mask at the top of the line box.
pub trait GlyphRasterizer: FontMetrics {
    fn rasterize(&self, font: Option<&str>, size: u32, text: &str) -> Result<CoverageMask>;
}
