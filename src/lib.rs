//! # Sumi
//!
//! Renders text with inline font markup into a single raster image.
//!
//! ## Overview
//!
//! Input text may carry `<f attr=value ...>content</f>` tags that change the
//! font, size or color of the enclosed content. The text is split into lines,
//! each line into plain and styled segments, and every line is laid out left
//! to right and stacked into one padded image.
//!
//! Fonts come from a [`FontSystem`], which finds faces with `fontdb` and
//! rasterizes them with `fontdue`. Anything implementing
//! [`GlyphRasterizer`] can stand in for it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sumi::{FontSystem, RenderOptions, compose_text_image};
//!
//! let font_system = FontSystem::new();
//! font_system.load_system_fonts();
//!
//! let options = RenderOptions::default().with_padding(10);
//! let image = compose_text_image(
//!     "hello <f fs=40 fc=red>world</f>",
//!     &options,
//!     &font_system,
//! )?;
//! image.save("hello.png")?;
//! # Ok::<(), sumi::Error>(())
//! ```
//!
//! ## Markup
//!
//! *   `font`: a font file name (looked up in the configured fonts
//!     directory) or a family name.
//! *   `font_size` / `fs`: integer size in pixels, clamped to `1..=1000`.
//! *   `font_color` / `fc`: a color name, `#rrggbb` or `(r,g,b)`.
//!
//! Tags do not nest and must open and close on the same line; anything
//! malformed is drawn as literal text. A failing segment never fails the
//! whole render: it is skipped and reported as a [`RenderWarning`].

pub mod color;
pub mod compose;
pub mod config;
pub mod error;
pub mod font_storage;
pub mod font_system;
pub mod glyph_id;
pub mod markup;
pub mod metrics;
pub mod renderer;
pub mod style;
pub mod surface;
pub mod testing;
pub mod text;

// common re-exports
pub use color::Color;
pub use compose::{
    DocumentComposer, Rendered, compose, compose_text_image, render_text_image,
};
pub use config::{FontSystemConfig, Padding, RenderOptions};
pub use error::{Error, RenderWarning, Result, WarningKind};
pub use font_storage::FontStorage;
pub use font_system::FontSystem;
pub use glyph_id::GlyphId;
pub use metrics::{FontMetrics, GlyphRasterizer, TextExtent};
pub use style::{Style, StyleOverride};
pub use surface::Surface;

// re-export dependencies
pub use fontdb;
pub use fontdue;
pub use image;
pub use parking_lot;
