use std::{num::NonZeroUsize, sync::Arc};

use lru::LruCache;

use crate::glyph_id::GlyphId;

/// Default number of glyph bitmaps kept by [`GlyphCache`].
pub const DEFAULT_GLYPH_CAPACITY: usize = 4096;

/// Coverage bitmap of a single rasterized glyph.
#[derive(Debug, PartialEq, Eq)]
pub struct GlyphBitmap {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

/// Least-recently-used cache of rasterized glyphs.
///
/// Entries are shared through `Arc` so a caller can keep drawing with a
/// bitmap after it has been evicted.
pub struct GlyphCache {
    glyphs: LruCache<GlyphId, Arc<GlyphBitmap>, fxhash::FxBuildHasher>,
}

impl Default for GlyphCache {
    fn default() -> Self {
        Self::new(DEFAULT_GLYPH_CAPACITY)
    }
}

impl GlyphCache {
    /// Creates a cache holding at most `capacity` glyphs (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            glyphs: LruCache::with_hasher(capacity, fxhash::FxBuildHasher::default()),
        }
    }

    pub fn clear(&mut self) {
        self.glyphs.clear();
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.glyphs.cap().get()
    }

    pub fn contains(&self, glyph_id: &GlyphId) -> bool {
        self.glyphs.contains(glyph_id)
    }

    /// Returns the cached bitmap for `glyph_id`, rasterizing it with
    /// `rasterize` on a miss.
    pub fn get_or_insert_with(
        &mut self,
        glyph_id: GlyphId,
        rasterize: impl FnOnce() -> GlyphBitmap,
    ) -> Arc<GlyphBitmap> {
        if let Some(bitmap) = self.glyphs.get(&glyph_id) {
            return Arc::clone(bitmap);
        }
        let bitmap = Arc::new(rasterize());
        self.glyphs.put(glyph_id, Arc::clone(&bitmap));
        bitmap
    }

    /// Rasterizes a glyph of `font`, going through the cache.
    pub fn get(&mut self, glyph_id: GlyphId, font: &fontdue::Font) -> Arc<GlyphBitmap> {
        self.get_or_insert_with(glyph_id, || {
            let (metrics, data) = font.rasterize_indexed(glyph_id.index(), glyph_id.font_size());
            GlyphBitmap {
                width: metrics.width,
                height: metrics.height,
                data,
            }
        })
    }
}
