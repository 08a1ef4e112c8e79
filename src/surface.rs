//! Owned RGBA raster buffer with the drawing operations the composer needs.

use std::{io::Cursor, path::Path};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{ImageFormat, Rgba, RgbaImage, imageops};

use crate::{
    color::Color,
    error::Result,
    metrics::{GlyphRasterizer, TextExtent},
    renderer::CoverageMask,
    style::Style,
};

/// An owned RGBA canvas.
///
/// Every operation mutates the surface in place. Pasting copies pixels, so
/// the source surface can be dropped afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    image: RgbaImage,
}

impl Surface {
    /// Allocates a `width` x `height` surface filled with `color`.
    pub fn new(width: u32, height: u32, color: Color) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, color.into()),
        }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Color at (`x`, `y`), or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.image
            .get_pixel_checked(x, y)
            .map(|Rgba([r, g, b, a])| Color::rgba(*r, *g, *b, *a))
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Paints `color` through `mask` with its top-left corner at (`x`, `y`).
    ///
    /// Coverage scales the color's alpha; the result is composited over the
    /// existing pixels. Parts of the mask outside the surface are clipped.
    pub fn fill_mask(&mut self, x: i64, y: i64, mask: &CoverageMask, color: Color) {
        let (width, height) = (self.width() as i64, self.height() as i64);

        for row in 0..mask.height {
            let py = y + row as i64;
            if py < 0 || py >= height {
                continue;
            }
            for col in 0..mask.width {
                let px = x + col as i64;
                if px < 0 || px >= width {
                    continue;
                }
                let coverage = mask.pixels[row * mask.width + col];
                if coverage == 0 {
                    continue;
                }
                let alpha = (color.a as u32 * coverage as u32 + 127) / 255;
                let dst = self.image.get_pixel_mut(px as u32, py as u32);
                *dst = blend_over(*dst, color, alpha as u8);
            }
        }
    }

    /// Draws `text` in `style` with the top-left of its line box at `pos`.
    ///
    /// Returns the extent of the drawn text.
    pub fn draw_text<R>(
        &mut self,
        pos: (i64, i64),
        text: &str,
        style: &Style,
        rasterizer: &R,
    ) -> Result<TextExtent>
    where
        R: GlyphRasterizer + ?Sized,
    {
        let mask = rasterizer.rasterize(style.font(), style.font_size, text)?;
        self.fill_mask(pos.0, pos.1, &mask, style.font_color);
        Ok(TextExtent::new(mask.width as u32, mask.height as u32))
    }

    /// Copies `other` onto this surface with its top-left corner at `pos`.
    ///
    /// With `alpha_composite` the source is blended over the destination so
    /// transparent source pixels leave the destination untouched; without
    /// it source pixels replace destination pixels outright.
    pub fn paste(&mut self, other: &Surface, pos: (i64, i64), alpha_composite: bool) {
        if alpha_composite {
            imageops::overlay(&mut self.image, &other.image, pos.0, pos.1);
        } else {
            imageops::replace(&mut self.image, &other.image, pos.0, pos.1);
        }
    }

    /// Keeps only the given rectangle, clamped to the surface bounds.
    pub fn crop(&mut self, x: u32, y: u32, width: u32, height: u32) {
        if x == 0 && y == 0 && width >= self.width() && height >= self.height() {
            return;
        }
        self.image = imageops::crop_imm(&self.image, x, y, width, height).to_image();
    }

    /// Resamples the surface to `width` x `height`.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == self.dimensions() {
            return;
        }
        if width == 0 || height == 0 || self.width() == 0 || self.height() == 0 {
            self.image = RgbaImage::new(width, height);
            return;
        }
        self.image = imageops::resize(&self.image, width, height, imageops::FilterType::Lanczos3);
    }

    /// Resizes by `ratio`, keeping the aspect ratio. Non-positive ratios are
    /// ignored.
    pub fn scale(&mut self, ratio: f32) {
        if ratio.is_nan() || ratio <= 0.0 || ratio == 1.0 {
            return;
        }
        let width = (self.width() as f32 * ratio).round() as u32;
        let height = (self.height() as f32 * ratio).round() as u32;
        self.resize(width.max(1), height.max(1));
    }

    /// Encodes the surface as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        self.image.write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }

    /// Writes the surface to `path`; the format follows the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.image.save(path)?;
        Ok(())
    }

    /// PNG bytes as a `base64://` URI, the form chat adapters accept for
    /// inline images.
    pub fn to_base64(&self) -> Result<String> {
        let png = self.encode_png()?;
        Ok(format!("base64://{}", STANDARD.encode(png)))
    }
}

/// Source-over compositing of `color` at `alpha` onto `dst` (straight alpha).
fn blend_over(dst: Rgba<u8>, color: Color, alpha: u8) -> Rgba<u8> {
    if alpha == 255 {
        return Rgba([color.r, color.g, color.b, 255]);
    }
    let sa = alpha as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let mix = |s: u8, d: u8| {
        let value = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
        value.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        mix(color.r, dst[0]),
        mix(color.g, dst[1]),
        mix(color.b, dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}
