// src/encode/lossless/verify.rs

//! Round-trip verification and compression statistics.

use super::codec::{decode_image_with, CodecParams};
use crate::container::compressed_file::HEADER_LEN;
use crate::encode::ac::BitBuffer;
use crate::image::pixel_grid::PixelGrid;
use crate::utils::error::{CodecError, Result};
use log::info;

/// Decodes `bits` with the dimensions of `original` and checks that every
/// pixel matches.
///
/// The decoder never checks this itself, so callers that need the lossless
/// guarantee confirmed run this after encoding.
pub fn verify_round_trip(original: &PixelGrid, bits: &BitBuffer, params: &CodecParams) -> Result<()> {
    let (width, height) = original.dimensions();
    let decoded = decode_image_with(bits, width, height, params)?;
    match original.first_difference(&decoded)? {
        None => {
            info!("Round trip verified: {}x{} image matches", width, height);
            Ok(())
        }
        Some((x, y)) => Err(CodecError::Mismatch { x, y }),
    }
}

/// Sizes of one compressed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionStats {
    pub width: u32,
    pub height: u32,
    /// Uncompressed 24-bit RGB size.
    pub raw_bytes: usize,
    /// Length of the coded bitstream in bits.
    pub payload_bits: usize,
}

impl CompressionStats {
    pub fn new(width: u32, height: u32, payload_bits: usize) -> Self {
        Self {
            width,
            height,
            raw_bytes: width as usize * height as usize * 3,
            payload_bits,
        }
    }

    pub fn for_grid(grid: &PixelGrid, bits: &BitBuffer) -> Self {
        Self::new(grid.width(), grid.height(), bits.len())
    }

    /// Packed bitstream size in bytes.
    pub fn payload_bytes(&self) -> usize {
        self.payload_bits.div_ceil(8)
    }

    /// Size of the persisted file, header included.
    pub fn compressed_bytes(&self) -> usize {
        self.payload_bytes() + HEADER_LEN
    }

    /// Uncompressed size divided by compressed file size.
    pub fn ratio(&self) -> f64 {
        self.raw_bytes as f64 / self.compressed_bytes() as f64
    }

    pub fn bits_per_pixel(&self) -> f64 {
        let pixels = self.width as usize * self.height as usize;
        if pixels == 0 {
            0.0
        } else {
            self.payload_bits as f64 / pixels as f64
        }
    }
}

impl std::fmt::Display for CompressionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{}: {} -> {} bytes (ratio {:.2}, {:.3} bpp)",
            self.width,
            self.height,
            self.raw_bytes,
            self.compressed_bytes(),
            self.ratio(),
            self.bits_per_pixel()
        )
    }
}
