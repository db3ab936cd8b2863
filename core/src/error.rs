//! Error types for sampling and classification

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Out of bounds: {0}")]
    OutOfBounds(#[from] OutOfBounds),

    #[error("Unsupported pixel format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid color format for '{name}': {hex:?}")]
    InvalidColorFormat { name: String, hex: String },

    #[error("Palette is empty")]
    EmptyPalette,

    #[error("Palette document error: {0}")]
    PaletteDocument(#[from] serde_json::Error),
}

/// Ways a frame can fail to cover the pixel being read
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutOfBounds {
    #[error("frame has zero extent ({width}x{height})")]
    EmptyFrame { width: usize, height: usize },

    #[error("offset {offset} past end of plane {plane} (length {len})")]
    PlaneOverrun { plane: usize, offset: usize, len: usize },

    #[error("row {row} with stride {stride} overflows plane {plane} addressing")]
    OffsetOverflow { plane: usize, row: usize, stride: usize },

    #[error("expected {expected} planes, found {found}")]
    MissingPlane { expected: usize, found: usize },
}
