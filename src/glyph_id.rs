/// Font sizes are stored in 1/64 px steps so fractional sizes hash stably.
pub const SIZE_QUANTIZE: f32 = 64f32;

/// Cache key for one rasterized glyph: face, glyph index and pixel size.
///
/// Face ids come from `fontdb` and are only meaningful within one process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GlyphId {
    face: fontdb::ID,
    index: u16,
    quantized_size: u32,
}

impl GlyphId {
    pub fn new(face: fontdb::ID, index: u16, font_size: f32) -> Self {
        Self {
            face,
            index,
            quantized_size: (font_size.max(0.0) * SIZE_QUANTIZE).round() as u32,
        }
    }

    pub fn face(&self) -> fontdb::ID {
        self.face
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn font_size(&self) -> f32 {
        self.quantized_size as f32 / SIZE_QUANTIZE
    }
}
