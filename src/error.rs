//! Error and warning types for the rendering pipeline.

use std::fmt;

use thiserror::Error;

/// Result type alias for rendering operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while measuring, drawing or composing text.
#[derive(Error, Debug)]
pub enum Error {
    /// No font face could be resolved, not even the fallback face.
    #[error("no usable font for `{0}`")]
    FontUnavailable(String),

    /// Failed to read a font file or write an image.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to encode or save an image.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// The composed document has nothing to draw.
    #[error("nothing to draw: canvas would be {width}x{height}")]
    EmptyCanvas { width: u32, height: u32 },

    /// The stacked lines are taller than a canvas can be.
    #[error("canvas too large")]
    CanvasTooLarge,

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A padding value could not be parsed.
    #[error("invalid padding: {0}")]
    InvalidPadding(String),

    /// The blocking render task did not complete.
    #[error("render task failed: {0}")]
    Join(String),
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Join(err.to_string())
    }
}

/// What went wrong with a single segment.
#[derive(Debug)]
pub enum WarningKind {
    /// The segment could not be measured and was skipped.
    Measure(Error),
    /// The segment was measured but could not be drawn.
    Draw(Error),
    /// A tag attribute carried a value that could not be used.
    InvalidAttribute { key: String, value: String },
    /// The requested font was not found; the default face was used instead.
    FontFallback(String),
}

/// A non-fatal problem reported while rendering.
///
/// Warnings never abort a render. They are logged when raised and handed
/// back in aggregate so callers can surface them if they care.
#[derive(Debug)]
pub struct RenderWarning {
    /// Zero-based index of the line the problem occurred on.
    pub line: usize,
    /// Zero-based index of the segment within the line, if any.
    pub segment: Option<usize>,
    pub kind: WarningKind,
}

impl RenderWarning {
    pub fn new(line: usize, segment: Option<usize>, kind: WarningKind) -> Self {
        Self {
            line,
            segment,
            kind,
        }
    }
}

impl fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.line)?;
        if let Some(segment) = self.segment {
            write!(f, ", segment {segment}")?;
        }
        match &self.kind {
            WarningKind::Measure(err) => write!(f, ": measure failed: {err}"),
            WarningKind::Draw(err) => write!(f, ": draw failed: {err}"),
            WarningKind::InvalidAttribute { key, value } => {
                write!(f, ": ignored attribute {key}={value}")
            }
            WarningKind::FontFallback(font) => write!(f, ": font `{font}` not found, using default"),
        }
    }
}
