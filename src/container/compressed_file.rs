// src/container/compressed_file.rs

//! Persisted compressed-file layout.
//!
//! ```text
//! offset 0  u32 LE  width
//! offset 4  u32 LE  height
//! offset 8  ...     bitstream, packed MSB-first, last byte zero-padded
//! ```
//!
//! The bitstream carries no length of its own. Padding bits read back as
//! zeros, which is what the decoder assumes past the end of the stream
//! anyway.

use crate::encode::ac::BitBuffer;
use crate::encode::lossless::{
    decode_image_with, encode_image_with, CodecParams, CompressionStats,
};
use crate::image::pixel_grid::PixelGrid;
use crate::utils::error::{CodecError, Result};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use log::info;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Size of the width/height header in bytes.
pub const HEADER_LEN: usize = 8;

/// Default file extension for compressed images.
pub const FILE_EXTENSION: &str = "compress";

/// A compressed image together with the dimensions the decoder needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub width: u32,
    pub height: u32,
    pub bits: BitBuffer,
}

fn header_error(err: io::Error) -> CodecError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        CodecError::TruncatedHeader
    } else {
        CodecError::Io(err)
    }
}

impl CompressedImage {
    pub fn new(width: u32, height: u32, bits: BitBuffer) -> Self {
        Self {
            width,
            height,
            bits,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn header(&self) -> [u8; HEADER_LEN] {
        let mut header = [0u8; HEADER_LEN];
        LittleEndian::write_u32(&mut header[0..4], self.width);
        LittleEndian::write_u32(&mut header[4..8], self.height);
        header
    }

    /// Serialized size in bytes.
    pub fn byte_len(&self) -> usize {
        HEADER_LEN + self.bits.byte_len()
    }

    pub fn stats(&self) -> CompressionStats {
        CompressionStats::new(self.width, self.height, self.bits.len())
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.header())?;
        writer.write_all(&self.bits.to_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Parses a header and takes every remaining byte as the bitstream.
    ///
    /// Dimensions whose pixel buffer could not be addressed are rejected
    /// with [`CodecError::ImageTooLarge`] before the body is read.
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let width = reader.read_u32::<LittleEndian>().map_err(header_error)?;
        let height = reader.read_u32::<LittleEndian>().map_err(header_error)?;
        PixelGrid::checked_raw_size(width, height)?;
        let mut payload = Vec::new();
        reader.read_to_end(&mut payload)?;
        Ok(Self::new(width, height, BitBuffer::from_bytes(&payload)))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.byte_len());
        bytes.extend_from_slice(&self.header());
        bytes.extend_from_slice(&self.bits.to_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::read_from(bytes)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.write_to(BufWriter::new(File::create(path)?))?;
        info!(
            "Saved {}x{} compressed image to {} ({} bytes)",
            self.width,
            self.height,
            path.display(),
            self.byte_len()
        );
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let image = Self::read_from(BufReader::new(File::open(path)?))?;
        info!(
            "Loaded {}x{} compressed image from {} ({} bytes)",
            image.width,
            image.height,
            path.display(),
            image.byte_len()
        );
        Ok(image)
    }
}

/// Compresses `grid` with the default parameters.
pub fn compress(grid: &PixelGrid) -> CompressedImage {
    let bits = crate::encode::lossless::encode_image(grid);
    CompressedImage::new(grid.width(), grid.height(), bits)
}

pub fn compress_with(grid: &PixelGrid, params: &CodecParams) -> Result<CompressedImage> {
    let bits = encode_image_with(grid, params)?;
    Ok(CompressedImage::new(grid.width(), grid.height(), bits))
}

/// Decompresses with the default parameters.
///
/// Panics if `image` carries dimensions that cannot be allocated, which
/// [`CompressedImage::read_from`] never produces.
pub fn decompress(image: &CompressedImage) -> PixelGrid {
    crate::encode::lossless::decode_image(&image.bits, image.width, image.height)
}

pub fn decompress_with(image: &CompressedImage, params: &CodecParams) -> Result<PixelGrid> {
    decode_image_with(&image.bits, image.width, image.height, params)
}
