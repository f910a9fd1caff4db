// src/batch.rs

//! Compressing and decompressing many independent images.
//!
//! A single image is one sequential dependency chain, so parallelism only
//! exists between images. Each image gets its own model and coder. With the
//! `rayon` feature the images are spread over the rayon thread pool,
//! otherwise they are processed one after another.

use crate::container::compressed_file::CompressedImage;
use crate::encode::lossless::{decode_image_with_model, encode_image_with_model, CodecParams};
use crate::image::pixel_grid::PixelGrid;
use crate::utils::error::Result;
use log::info;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

fn compress_one(grid: &PixelGrid, params: &CodecParams) -> CompressedImage {
    let bits = encode_image_with_model(grid, &mut params.new_model());
    CompressedImage::new(grid.width(), grid.height(), bits)
}

fn decompress_one(image: &CompressedImage, params: &CodecParams) -> PixelGrid {
    decode_image_with_model(&image.bits, image.width, image.height, &mut params.new_model())
}

/// Compresses every grid; output order matches input order.
pub fn compress_batch(grids: &[PixelGrid], params: &CodecParams) -> Result<Vec<CompressedImage>> {
    params.validate()?;

    #[cfg(feature = "rayon")]
    let compressed: Vec<CompressedImage> =
        grids.par_iter().map(|grid| compress_one(grid, params)).collect();
    #[cfg(not(feature = "rayon"))]
    let compressed: Vec<CompressedImage> =
        grids.iter().map(|grid| compress_one(grid, params)).collect();

    let raw: usize = grids.iter().map(PixelGrid::raw_size).sum();
    let packed: usize = compressed.iter().map(CompressedImage::byte_len).sum();
    info!(
        "Compressed batch of {} images: {} -> {} bytes",
        compressed.len(),
        raw,
        packed
    );
    Ok(compressed)
}

/// Decompresses every image; output order matches input order.
pub fn decompress_batch(images: &[CompressedImage], params: &CodecParams) -> Result<Vec<PixelGrid>> {
    params.validate()?;
    for image in images {
        PixelGrid::checked_raw_size(image.width, image.height)?;
    }

    #[cfg(feature = "rayon")]
    let grids: Vec<PixelGrid> = images.par_iter().map(|image| decompress_one(image, params)).collect();
    #[cfg(not(feature = "rayon"))]
    let grids: Vec<PixelGrid> = images.iter().map(|image| decompress_one(image, params)).collect();

    info!("Decompressed batch of {} images", grids.len());
    Ok(grids)
}
