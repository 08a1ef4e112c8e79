/// Per-line layout: measuring segments and drawing them onto a surface.
pub mod line;
/// Shaping a single-font run of text into positioned glyphs.
pub mod run;

pub use line::{LayoutPlan, LineLayout, MeasuredSegment, Placement, REFERENCE_GLYPH, RenderedLine};
pub use run::{GlyphRun, PositionedGlyph};
