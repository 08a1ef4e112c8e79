use crate::color::Color;

/// Smallest font size accepted from markup.
pub const MIN_FONT_SIZE: u32 = 1;
/// Largest font size accepted from markup.
pub const MAX_FONT_SIZE: u32 = 1000;

/// Clamps a requested font size into `[MIN_FONT_SIZE, MAX_FONT_SIZE]`.
pub fn clamp_font_size(size: i64) -> u32 {
    size.clamp(MIN_FONT_SIZE as i64, MAX_FONT_SIZE as i64) as u32
}

/// Fully resolved style used to measure and draw a run of text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Style {
    /// Font identifier: a font file name or a family name. `None` selects
    /// the font system's default face.
    pub font: Option<String>,
    /// Font size in pixels.
    pub font_size: u32,
    pub font_color: Color,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            font: None,
            font_size: 20,
            font_color: Color::BLACK,
        }
    }
}

impl Style {
    pub fn font(&self) -> Option<&str> {
        self.font.as_deref()
    }
}

/// Partial style carried by a `<f ...>` tag.
///
/// Absent fields inherit from the document's base style.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleOverride {
    pub font: Option<String>,
    pub font_size: Option<u32>,
    pub font_color: Option<Color>,
}

impl StyleOverride {
    pub fn is_empty(&self) -> bool {
        self.font.is_none() && self.font_size.is_none() && self.font_color.is_none()
    }

    /// Resolves this override against `base`.
    pub fn apply(&self, base: &Style) -> Style {
        Style {
            font: self.font.clone().or_else(|| base.font.clone()),
            font_size: self.font_size.unwrap_or(base.font_size),
            font_color: self.font_color.unwrap_or(base.font_color),
        }
    }
}
