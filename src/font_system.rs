use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::{
    config::FontSystemConfig,
    error::{Error, Result},
    font_storage::{FontStorage, ResolvedFont},
    metrics::{FontMetrics, GlyphRasterizer, TextExtent},
    renderer::{
        CoverageMask, CpuRenderer,
        cpu_renderer::{DEFAULT_GLYPH_CAPACITY, GlyphCache},
    },
    text::GlyphRun,
};

/// Process-wide font handle used by every render call.
///
/// Holds the `FontStorage` (faces and parsed fonts) and a CPU renderer with
/// its glyph cache, each behind its own `Mutex`. The storage lock is held
/// only while an identifier is resolved and its font loaded; shaping and
/// measuring run without it, so concurrent renders only contend on
/// first-time loads and glyph cache access.
///
/// Share it between threads with `Arc<FontSystem>`.
pub struct FontSystem {
    /// The underlying font storage.
    pub font_storage: Mutex<FontStorage>,
    /// The CPU renderer and its glyph cache.
    pub cpu_renderer: Mutex<CpuRenderer>,
}

impl Default for FontSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FontSystem {
    /// Creates a font system with no fonts loaded.
    pub fn new() -> Self {
        Self {
            font_storage: Mutex::new(FontStorage::new()),
            cpu_renderer: Mutex::new(CpuRenderer::new(GlyphCache::new(DEFAULT_GLYPH_CAPACITY))),
        }
    }

    /// Creates a font system set up according to `config`.
    pub fn with_config(config: &FontSystemConfig) -> Self {
        let mut storage = FontStorage::new();
        if config.load_system_fonts {
            storage.load_system_fonts();
        }
        if let Some(dir) = &config.fonts_dir {
            storage.set_fonts_dir(dir.clone());
        }
        if let Some(family) = &config.default_family {
            storage.set_default_family(family.clone());
        }
        log::debug!("font system ready with {} faces", storage.len());

        Self {
            font_storage: Mutex::new(storage),
            cpu_renderer: Mutex::new(CpuRenderer::new(GlyphCache::new(
                config.glyph_cache_capacity,
            ))),
        }
    }
}

/// font storage initialization
impl FontSystem {
    /// Loads the fonts installed on the system.
    pub fn load_system_fonts(&self) {
        self.font_storage.lock().load_system_fonts();
    }

    /// Loads every face contained in `data`.
    pub fn load_font_binary(&self, data: impl Into<Vec<u8>>) {
        self.font_storage.lock().load_font_binary(data);
    }

    /// Loads the faces of the font file at `path`.
    pub fn load_font_file(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.font_storage.lock().load_font_file(path)?;
        Ok(())
    }

    /// Loads every font file found in `dir`, recursively.
    pub fn load_fonts_dir(&self, dir: impl AsRef<Path>) {
        self.font_storage.lock().load_fonts_dir(dir);
    }

    /// Sets the directory font file identifiers such as `yz.ttf` are
    /// looked up in. Files there are loaded on first use.
    pub fn set_fonts_dir(&self, dir: impl Into<PathBuf>) {
        self.font_storage.lock().set_fonts_dir(dir);
    }

    /// Sets the family preferred when a requested font is missing.
    pub fn set_default_family(&self, family: impl Into<String>) {
        self.font_storage.lock().set_default_family(family);
    }

    /// Whether no face is loaded at all.
    pub fn is_empty(&self) -> bool {
        self.font_storage.lock().is_empty()
    }

    /// Number of loaded faces.
    pub fn len(&self) -> usize {
        self.font_storage.lock().len()
    }
}

/// shaping
impl FontSystem {
    /// Resolves `font`, falling back to the default face.
    pub fn resolve(&self, font: Option<&str>) -> Result<ResolvedFont> {
        self.font_storage
            .lock()
            .resolve(font)
            .ok_or_else(|| Error::FontUnavailable(font.unwrap_or("<default>").to_string()))
    }

    /// Shapes `text` into a single glyph run.
    pub fn shape(
        &self,
        font: Option<&str>,
        size: u32,
        text: &str,
    ) -> Result<(ResolvedFont, GlyphRun)> {
        let resolved = self.resolve(font)?;
        let run = GlyphRun::shape(&resolved.font, resolved.id, size as f32, text);
        Ok((resolved, run))
    }

    /// Clears the CPU renderer's glyph cache.
    pub fn cpu_cache_clear(&self) {
        self.cpu_renderer.lock().clear_cache();
    }
}

impl FontMetrics for FontSystem {
    fn measure(&self, font: Option<&str>, size: u32, text: &str) -> Result<TextExtent> {
        let (_, run) = self.shape(font, size, text)?;
        Ok(run.extent())
    }

    fn has_font(&self, font: &str) -> bool {
        self.font_storage.lock().contains(font)
    }
}

impl GlyphRasterizer for FontSystem {
    fn rasterize(&self, font: Option<&str>, size: u32, text: &str) -> Result<CoverageMask> {
        let (resolved, run) = self.shape(font, size, text)?;
        let extent = run.extent();
        let mask = self.cpu_renderer.lock().render_run(
            &run,
            &resolved.font,
            extent.width as usize,
            extent.height as usize,
        );
        Ok(mask)
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_system_reports_unavailable_font() {
        let system = FontSystem::new();
        assert!(system.is_empty());
        let err = system.measure(None, 20, "正").unwrap_err();
        assert!(matches!(err, Error::FontUnavailable(_)));
        assert!(!system.has_font("yz.ttf"));
    }

    #[test]
    fn config_without_system_fonts_starts_empty() {
        let config = FontSystemConfig {
            load_system_fonts: false,
            glyph_cache_capacity: 8,
            ..Default::default()
        };
        let system = FontSystem::with_config(&config);
        assert_eq!(system.len(), 0);
        assert_eq!(system.cpu_renderer.lock().cache().capacity(), 8);
    }

    fn system() -> Option<FontSystem> {
        let system = FontSystem::new();
        system.load_system_fonts();
        system.resolve(None).ok().map(|_| system)
    }

    #[test]
    fn mask_matches_measured_extent() {
        let Some(system) = system() else {
            return;
        };
        for size in [12, 20, 48] {
            for text in ["ab", "gy", "正", "Hello, World", " a "] {
                let extent = system.measure(None, size, text).unwrap();
                let mask = system.rasterize(None, size, text).unwrap();
                assert_eq!(
                    (mask.width as u32, mask.height as u32),
                    (extent.width, extent.height),
                    "{text:?} at {size}"
                );
                assert!(extent.width > 0 && extent.height > 0);
            }
        }
    }

    #[test]
    fn rasterized_text_has_ink() {
        let Some(system) = system() else {
            return;
        };
        let mask = system.rasterize(None, 32, "H").unwrap();
        assert!(!mask.is_blank());
        assert!(system.cpu_renderer.lock().cache().len() > 0);

        system.cpu_cache_clear();
        assert!(system.cpu_renderer.lock().cache().is_empty());
        assert_eq!(system.rasterize(None, 32, "H").unwrap(), mask);
    }

    #[test]
    fn empty_text_has_no_extent() {
        let Some(system) = system() else {
            return;
        };
        assert_eq!(system.measure(None, 20, "").unwrap(), TextExtent::default());
        let mask = system.rasterize(None, 20, "").unwrap();
        assert_eq!((mask.width, mask.height), (0, 0));
    }

    #[test]
    fn unknown_font_uses_fallback_face() {
        let Some(system) = system() else {
            return;
        };
        let name = "sumi-no-such-font.otf";
        let resolved = system.resolve(Some(name)).unwrap();
        assert!(resolved.fallback);
        assert!(!system.has_font(name));
        assert_eq!(
            system.measure(Some(name), 20, "abc").unwrap(),
            system.measure(None, 20, "abc").unwrap()
        );
    }

    #[test]
    fn larger_sizes_measure_larger() {
        let Some(system) = system() else {
            return;
        };
        let small = system.measure(None, 10, "正").unwrap();
        let large = system.measure(None, 40, "正").unwrap();
        assert!(large.width > small.width);
        assert!(large.height > small.height);
    }
}
