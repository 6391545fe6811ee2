//! Traits for source readers.

use crate::syntax::SourceUnit;

/// Error that can occur when reading source code into declarations.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("{line}:{column}: syntax error: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
}

/// A reader parses one source file into its top-level declarations.
pub trait Reader: Send + Sync {
    /// Language identifier (e.g., "go").
    fn language(&self) -> &'static str;

    /// File extensions this reader handles (e.g., &["go"]).
    fn extensions(&self) -> &'static [&'static str];

    /// Parse source code into a [`SourceUnit`].
    fn read(&self, source: &str) -> Result<SourceUnit, ReadError>;
}
