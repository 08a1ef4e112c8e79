//! Render and font system configuration.
//!
//! Both configs deserialize with every field optional, so a host can keep
//! only the values it changes in its own settings file.

use std::{path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    color::Color,
    error::Error,
    renderer::cpu_renderer::DEFAULT_GLYPH_CAPACITY,
    style::{Style, clamp_font_size},
};

/// Space around the rendered text.
///
/// The four-sided form is read as **(top, left, bottom, right)**, which is
/// not the CSS order. A bare integer or a 4-element array deserializes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PaddingRepr", into = "PaddingRepr")]
pub enum Padding {
    Uniform(u32),
    Sides {
        top: u32,
        left: u32,
        bottom: u32,
        right: u32,
    },
}

#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum PaddingRepr {
    Uniform(u32),
    Sides([u32; 4]),
}

impl From<PaddingRepr> for Padding {
    fn from(repr: PaddingRepr) -> Self {
        match repr {
            PaddingRepr::Uniform(value) => Padding::Uniform(value),
            PaddingRepr::Sides(sides) => Padding::from(sides),
        }
    }
}

impl From<Padding> for PaddingRepr {
    fn from(padding: Padding) -> Self {
        match padding {
            Padding::Uniform(value) => PaddingRepr::Uniform(value),
            Padding::Sides { .. } => PaddingRepr::Sides(padding.to_array()),
        }
    }
}

impl Default for Padding {
    fn default() -> Self {
        Padding::Uniform(0)
    }
}

impl From<u32> for Padding {
    fn from(value: u32) -> Self {
        Padding::Uniform(value)
    }
}

impl From<[u32; 4]> for Padding {
    fn from([top, left, bottom, right]: [u32; 4]) -> Self {
        Padding::Sides {
            top,
            left,
            bottom,
            right,
        }
    }
}

impl From<(u32, u32, u32, u32)> for Padding {
    fn from((top, left, bottom, right): (u32, u32, u32, u32)) -> Self {
        Padding::from([top, left, bottom, right])
    }
}

impl Padding {
    pub fn top(&self) -> u32 {
        match *self {
            Padding::Uniform(value) => value,
            Padding::Sides { top, .. } => top,
        }
    }

    pub fn left(&self) -> u32 {
        match *self {
            Padding::Uniform(value) => value,
            Padding::Sides { left, .. } => left,
        }
    }

    pub fn bottom(&self) -> u32 {
        match *self {
            Padding::Uniform(value) => value,
            Padding::Sides { bottom, .. } => bottom,
        }
    }

    pub fn right(&self) -> u32 {
        match *self {
            Padding::Uniform(value) => value,
            Padding::Sides { right, .. } => right,
        }
    }

    /// Left plus right, saturating at `u32::MAX`.
    pub fn horizontal(&self) -> u32 {
        self.left().saturating_add(self.right())
    }

    /// Top plus bottom, saturating at `u32::MAX`.
    pub fn vertical(&self) -> u32 {
        self.top().saturating_add(self.bottom())
    }

    /// Sides in (top, left, bottom, right) order.
    pub fn to_array(&self) -> [u32; 4] {
        [self.top(), self.left(), self.bottom(), self.right()]
    }
}

impl FromStr for Padding {
    type Err = Error;

    /// Accepts `"8"` or `"top,left,bottom,right"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidPadding(s.to_string());
        let values = s
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(')')
            .split(',')
            .map(|part| part.trim().parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;
        match values[..] {
            [value] => Ok(Padding::Uniform(value)),
            [top, left, bottom, right] => Ok(Padding::from([top, left, bottom, right])),
            _ => Err(invalid()),
        }
    }
}

/// Options of a single render call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Interpret `<f>` tags. When false the text is drawn verbatim.
    pub auto_parse: bool,
    /// Base font size in pixels.
    pub font_size: u32,
    pub background_color: Color,
    /// Base font identifier; `None` uses the font system's default face.
    pub font: Option<String>,
    pub font_color: Color,
    pub padding: Padding,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            auto_parse: true,
            font_size: 20,
            background_color: Color::WHITE,
            font: None,
            font_color: Color::BLACK,
            padding: Padding::default(),
        }
    }
}

impl RenderOptions {
    pub fn with_auto_parse(mut self, auto_parse: bool) -> Self {
        self.auto_parse = auto_parse;
        self
    }

    pub fn with_font_size(mut self, font_size: u32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_background_color(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    pub fn with_font_color(mut self, color: Color) -> Self {
        self.font_color = color;
        self
    }

    pub fn with_padding(mut self, padding: impl Into<Padding>) -> Self {
        self.padding = padding.into();
        self
    }

    /// The style plain text is drawn with.
    pub fn base_style(&self) -> Style {
        Style {
            font: self.font.clone(),
            font_size: clamp_font_size(self.font_size as i64),
            font_color: self.font_color,
        }
    }
}

/// How a [`crate::FontSystem`] finds its fonts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSystemConfig {
    /// Directory searched for identifiers that name a font file
    /// (`*.ttf`, `*.otf`, `*.ttc`).
    pub fonts_dir: Option<PathBuf>,
    pub load_system_fonts: bool,
    /// Family preferred when a requested font cannot be found.
    pub default_family: Option<String>,
    /// Number of rasterized glyphs kept in memory.
    pub glyph_cache_capacity: usize,
}

impl Default for FontSystemConfig {
    fn default() -> Self {
        Self {
            fonts_dir: None,
            load_system_fonts: true,
            default_family: None,
            glyph_cache_capacity: DEFAULT_GLYPH_CAPACITY,
        }
    }
}
