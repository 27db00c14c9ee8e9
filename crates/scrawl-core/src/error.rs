//! Error types for Scrawl
//!
//! Fatal conditions (malformed markup, an absent font) are raised before
//! any drawing begins. Mid-animation outcomes like user-quit and overflow
//! are not errors at all; they travel through [`crate::driver::Tick`].

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrawlError>;

/// Main error type for Scrawl
#[derive(Debug, Error)]
pub enum ScrawlError {
    #[error("malformed markup: {0}")]
    Markup(#[from] MarkupError),

    #[error("stroke font loading failed: {0}")]
    FontLoad(#[from] StrokeFontError),

    #[error("equation rendering failed: {0}")]
    Equation(#[from] EquationError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Structural problems in the input text, all detected before any drawing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarkupError {
    /// Odd number of occurrences of an extraction delimiter.
    #[error("unmatched '{delimiter}' delimiter (odd number of occurrences)")]
    UnmatchedDelimiter { delimiter: char },

    /// A backslash followed by neither a space nor a registered token.
    /// `index` is the character index of the backslash itself.
    #[error("unrecognised escape token at index {index}")]
    IllegalEscape { index: usize },

    /// More style closes than opens.
    #[error("unbalanced style braces: close brace with no open style scope")]
    UnbalancedBraces,
}

/// Stroke font loading errors
#[derive(Debug, Error)]
pub enum StrokeFontError {
    /// No stroke files at all matched the font prefix. Fatal: individual
    /// unreadable files are skipped softly, a wholly absent font is not.
    #[error("stroke font not found: {0}")]
    FontNotFound(String),

    #[error("invalid stroke data in {path}: {reason}")]
    InvalidData { path: String, reason: String },
}

/// Equation rasterization errors. Always recovered locally: the driver
/// logs a warning, skips the equation and keeps animating.
#[derive(Debug, Error)]
pub enum EquationError {
    #[error("no equation rasterizer available: {0}")]
    RenderUnavailable(String),

    #[error("equation source rejected: {0}")]
    BadSource(String),
}
