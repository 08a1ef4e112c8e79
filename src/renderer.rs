pub mod cpu_renderer;

pub use cpu_renderer::CpuRenderer;

/// Single-channel coverage bitmap produced by rasterizing a run of glyphs.
///
/// Pixels are arranged in row-major order with the origin at the top-left.
/// Each pixel stores an 8-bit coverage value where `0` is empty and `255`
/// is fully covered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoverageMask {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl CoverageMask {
    pub fn new(width: usize, height: usize) -> Self {
        let len = width.saturating_mul(height);
        Self {
            width,
            height,
            pixels: vec![0; len],
        }
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.pixels[y * self.width + x]
    }

    /// Adds coverage to a pixel, saturating at 255. Out-of-bounds writes are
    /// dropped.
    pub fn accumulate(&mut self, x: usize, y: usize, alpha: u8) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y * self.width + x;
        self.pixels[idx] = self.pixels[idx].saturating_add(alpha);
    }

    /// Marks a rectangle as fully covered.
    pub fn fill_rect(&mut self, x: usize, y: usize, width: usize, height: usize) {
        for row in y..(y + height).min(self.height) {
            for col in x..(x + width).min(self.width) {
                self.pixels[row * self.width + col] = 255;
            }
        }
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|&p| p == 0)
    }
}
