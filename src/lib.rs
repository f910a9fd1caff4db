//! # Lossless RGB Codec
//!
//! Compresses a decoded RGB pixel grid into a compact bitstream and
//! reconstructs it exactly.
//!
//! This library is organized into several modules:
//! - `utils`: Error handling
//! - `image`: The `PixelGrid` type the codec operates on
//! - `encode`: The adaptive arithmetic coder and the predictive image codec
//! - `container`: The persisted compressed-file layout
//! - `batch`: Compressing many independent images at once

// Re-export commonly used types at the crate root
pub use utils::error::{CodecError, Result};

pub mod utils {
    pub mod error;
}

pub mod image {
    pub mod pixel_grid;

    pub use pixel_grid::*;
}

pub mod encode {
    pub mod ac {
        pub mod arithmetic_coder;
        pub mod bit_buffer;
        pub mod frequency_model;

        pub use arithmetic_coder::{ArithmeticDecoder, ArithmeticEncoder};
        pub use bit_buffer::BitBuffer;
        pub use frequency_model::FrequencyModel;
    }

    pub mod lossless;
}

pub mod container {
    pub mod compressed_file;

    pub use compressed_file::*;
}

pub mod batch;

// Public API exports
pub use crate::container::{compress, decompress, CompressedImage};
pub use crate::encode::ac::BitBuffer;
pub use crate::encode::lossless::{
    decode_image, encode_image, try_decode_image, verify_round_trip, CodecParams,
    CompressionStats,
};
pub use crate::image::{PixelGrid, Rgb};

pub const CODEC_VERSION: &str = env!("CARGO_PKG_VERSION");
