mod glyph_cache;

use std::sync::Arc;

use crate::renderer::CoverageMask;
use crate::text::{GlyphRun, PositionedGlyph};

pub use glyph_cache::{DEFAULT_GLYPH_CAPACITY, GlyphBitmap, GlyphCache};

/// CPU-based renderer that rasterizes shaped runs using a glyph cache.
pub struct CpuRenderer {
    cache: GlyphCache,
}

impl Default for CpuRenderer {
    fn default() -> Self {
        Self::new(GlyphCache::default())
    }
}

impl CpuRenderer {
    /// Creates a renderer from the provided cache.
    pub fn new(cache: GlyphCache) -> Self {
        Self { cache }
    }

    /// Renders `run` into a coverage mask of `width` x `height` pixels.
    ///
    /// Glyphs falling outside the mask are clipped.
    pub fn render_run(
        &mut self,
        run: &GlyphRun,
        font: &Arc<fontdue::Font>,
        width: usize,
        height: usize,
    ) -> CoverageMask {
        if width == 0 || height == 0 {
            return CoverageMask::new(0, 0);
        }

        let mut mask = CoverageMask::new(width, height);
        for glyph in &run.glyphs {
            self.render_glyph_into_mask(&mut mask, glyph, font);
        }
        mask
    }

    fn render_glyph_into_mask(
        &mut self,
        mask: &mut CoverageMask,
        glyph_pos: &PositionedGlyph,
        font: &fontdue::Font,
    ) {
        let cached = self.cache.get(glyph_pos.glyph_id, font);
        if cached.width == 0 || cached.height == 0 {
            return;
        }

        let origin_x = glyph_pos.x.round() as isize;
        let origin_y = glyph_pos.y.round() as isize;

        for row in 0..cached.height {
            let iy = origin_y + row as isize;
            if iy < 0 || iy as usize >= mask.height {
                continue;
            }

            for col in 0..cached.width {
                let src_alpha = cached.data[row * cached.width + col];
                if src_alpha == 0 {
                    continue;
                }

                let ix = origin_x + col as isize;
                if ix < 0 {
                    continue;
                }

                // accumulate() clips the right edge.
                mask.accumulate(ix as usize, iy as usize, src_alpha);
            }
        }
    }

    pub fn cache(&self) -> &GlyphCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut GlyphCache {
        &mut self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
