//! Source readers.
//!
//! Each reader parses a source file into a [`SourceUnit`](crate::syntax::SourceUnit).

#[cfg(feature = "input-go")]
pub mod go;

#[cfg(feature = "input-go")]
pub use go::{GO_READER, GoReader, read_go};

use crate::traits::Reader;

/// All readers compiled into this build.
pub fn readers() -> Vec<&'static dyn Reader> {
    #[allow(unused_mut)]
    let mut readers: Vec<&'static dyn Reader> = Vec::new();

    #[cfg(feature = "input-go")]
    {
        readers.push(&go::GO_READER);
    }

    readers
}

/// Find the reader for a file extension (without the leading dot).
pub fn reader_for_extension(ext: &str) -> Option<&'static dyn Reader> {
    readers()
        .into_iter()
        .find(|reader| reader.extensions().contains(&ext))
}
