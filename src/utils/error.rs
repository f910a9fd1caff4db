use std::io;
use thiserror::Error;

/// Main error type for the lossless codec library.
///
/// The codec core itself never fails; these errors come from the boundaries
/// around it: file I/O, container parsing, raw buffer construction,
/// configuration, strict decoding and round-trip verification.
#[derive(Error, Debug)]
pub enum CodecError {
    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// An invalid argument was provided
    #[error("Invalid argument: {0}")]
    InvalidArg(String),
    /// A raw pixel buffer does not match the declared dimensions
    #[error("Invalid dimensions: {width}x{height} needs {expected} bytes, got {actual}")]
    InvalidDimensions {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    /// A `width` x `height` RGB buffer does not fit in memory
    #[error("Image too large: {width}x{height} RGB pixels cannot be allocated")]
    ImageTooLarge { width: u32, height: u32 },
    /// The compressed data ends before the width/height header is complete
    #[error("Truncated header: compressed data is shorter than 8 bytes")]
    TruncatedHeader,
    /// Two grids that should be equal have different dimensions
    #[error("Dimension mismatch: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },
    /// A decoded image differs from the original
    #[error("Round-trip mismatch at pixel ({x}, {y})")]
    Mismatch { x: u32, y: u32 },
    /// The decoder reconstructed a channel value outside 0..=255
    #[error("Decoder desynchronized at pixel ({x}, {y}), channel {channel}: value {value}")]
    Desync {
        x: u32,
        y: u32,
        channel: usize,
        value: i32,
    },
    /// Reading or writing a bitmap through the `image` crate failed
    #[error("Image error: {0}")]
    Image(String),
}

#[cfg(feature = "image")]
impl From<::image::ImageError> for CodecError {
    fn from(err: ::image::ImageError) -> Self {
        match err {
            ::image::ImageError::IoError(e) => CodecError::Io(e),
            other => CodecError::Image(other.to_string()),
        }
    }
}

/// A specialized `Result` type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
