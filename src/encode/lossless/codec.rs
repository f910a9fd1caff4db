// src/encode/lossless/codec.rs

//! Raster-scan driver tying predictor, residual mapping, model and coder
//! together.
//!
//! Pixels are visited top to bottom, left to right, channels in R, G, B
//! order. Every channel goes through the same model and the same coder, and
//! the decoder repeats the encoder's calls in the same order.

use super::constants::{DEFAULT_RESCALE_THRESHOLD, MAX_RESCALE_THRESHOLD, SYMBOL_COUNT};
use super::predictor::predict;
use super::residual::{from_symbol, to_symbol};
use crate::encode::ac::{ArithmeticDecoder, ArithmeticEncoder, BitBuffer, FrequencyModel};
use crate::image::pixel_grid::{PixelGrid, Rgb, CHANNELS};
use crate::utils::error::{CodecError, Result};
use log::{debug, warn};

/// Parameters both sides of a stream must agree on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecParams {
    /// A symbol frequency above this halves the whole frequency table.
    pub rescale_threshold: u32,
}

impl Default for CodecParams {
    fn default() -> Self {
        Self {
            rescale_threshold: DEFAULT_RESCALE_THRESHOLD,
        }
    }
}

impl CodecParams {
    pub fn validate(&self) -> Result<()> {
        if !(2..=MAX_RESCALE_THRESHOLD).contains(&self.rescale_threshold) {
            return Err(CodecError::InvalidArg(format!(
                "rescale threshold {} outside 2..={}",
                self.rescale_threshold, MAX_RESCALE_THRESHOLD
            )));
        }
        Ok(())
    }

    /// A fresh residual model for one encode or decode call.
    pub fn new_model(&self) -> FrequencyModel {
        FrequencyModel::new(SYMBOL_COUNT, self.rescale_threshold)
    }
}

/// Compresses `grid` with the default parameters. Never fails.
pub fn encode_image(grid: &PixelGrid) -> BitBuffer {
    encode_image_with_model(grid, &mut CodecParams::default().new_model())
}

pub fn encode_image_with(grid: &PixelGrid, params: &CodecParams) -> Result<BitBuffer> {
    params.validate()?;
    Ok(encode_image_with_model(grid, &mut params.new_model()))
}

/// Compresses `grid` starting from the current state of `model`.
///
/// The decoder has to start from a model in the identical state.
pub fn encode_image_with_model(grid: &PixelGrid, model: &mut FrequencyModel) -> BitBuffer {
    let (width, height) = grid.dimensions();
    let mut encoder = ArithmeticEncoder::with_capacity(grid.raw_size() * 4);
    let mut causal = PixelGrid::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let predicted = predict(&causal, x, y);
            let actual = grid.get(x, y);
            for c in 0..CHANNELS {
                let symbol = to_symbol(actual.channel(c), predicted.channel(c));
                encoder.encode_symbol(model, symbol);
            }
            causal.set(x, y, actual);
        }
    }

    let bits = encoder.finish();
    debug!(
        "Encoded {}x{} image into {} bits ({} bytes)",
        width,
        height,
        bits.len(),
        bits.byte_len()
    );
    bits
}

/// Decoder side of the scan: owns the coder and the causal buffer, borrows
/// the model.
struct ScanDecoder<'a, 'm> {
    decoder: ArithmeticDecoder<'a>,
    model: &'m mut FrequencyModel,
    causal: PixelGrid,
}

impl<'a, 'm> ScanDecoder<'a, 'm> {
    /// `causal` is the black grid the decoded pixels are written into.
    fn new(bits: &'a BitBuffer, causal: PixelGrid, model: &'m mut FrequencyModel) -> Self {
        Self {
            decoder: ArithmeticDecoder::new(bits),
            model,
            causal,
        }
    }

    /// Decodes the three channels of `(x, y)` without range checks.
    fn decode_pixel(&mut self, x: u32, y: u32) -> [i32; CHANNELS] {
        let predicted = predict(&self.causal, x, y);
        let mut values = [0i32; CHANNELS];
        for (c, value) in values.iter_mut().enumerate() {
            let symbol = self.decoder.decode_symbol(self.model);
            *value = from_symbol(symbol, predicted.channel(c));
        }
        values
    }

    fn store(&mut self, x: u32, y: u32, px: Rgb) {
        self.causal.set(x, y, px);
    }

    fn finish(self) -> PixelGrid {
        let (width, height) = self.causal.dimensions();
        debug!(
            "Decoded {}x{} image from {} bits ({} read past end of stream)",
            width,
            height,
            self.decoder.bits_read() - self.decoder.bits_past_end(),
            self.decoder.bits_past_end()
        );
        self.causal
    }
}

/// Reconstructs a `width` x `height` grid with the default parameters.
///
/// Always returns a grid of the requested size. It equals the original only
/// if `bits` is exactly what the matching encode produced; a truncated stream
/// is padded with zero bits. A reconstructed channel outside `0..=255` is
/// logged once and stored as its low 8 bits.
///
/// Panics if the grid cannot be allocated. Dimensions read from a file go
/// through [`decode_image_with`], which reports that as an error.
pub fn decode_image(bits: &BitBuffer, width: u32, height: u32) -> PixelGrid {
    decode_image_with_model(bits, width, height, &mut CodecParams::default().new_model())
}

pub fn decode_image_with(
    bits: &BitBuffer,
    width: u32,
    height: u32,
    params: &CodecParams,
) -> Result<PixelGrid> {
    params.validate()?;
    let causal = PixelGrid::try_new(width, height)?;
    Ok(decode_lenient(ScanDecoder::new(bits, causal, &mut params.new_model())))
}

/// Decodes starting from the current state of `model`, which must match the
/// state the encoder started from. Panics like [`decode_image`] on sizes that
/// cannot be allocated.
pub fn decode_image_with_model(
    bits: &BitBuffer,
    width: u32,
    height: u32,
    model: &mut FrequencyModel,
) -> PixelGrid {
    decode_lenient(ScanDecoder::new(bits, PixelGrid::new(width, height), model))
}

fn decode_lenient(mut scan: ScanDecoder<'_, '_>) -> PixelGrid {
    let (width, height) = scan.causal.dimensions();
    let mut desync_reported = false;

    for y in 0..height {
        for x in 0..width {
            let values = scan.decode_pixel(x, y);
            if !desync_reported {
                if let Some(c) = values.iter().position(|v| !(0..=255).contains(v)) {
                    warn!(
                        "Decoder desynchronized at ({}, {}) channel {}: value {}",
                        x, y, c, values[c]
                    );
                    desync_reported = true;
                }
            }
            scan.store(x, y, Rgb::from_fn(|c| values[c] as u8));
        }
    }

    scan.finish()
}

/// Like [`decode_image_with`] but stops at the first reconstructed channel
/// outside `0..=255` with [`CodecError::Desync`].
pub fn try_decode_image(
    bits: &BitBuffer,
    width: u32,
    height: u32,
    params: &CodecParams,
) -> Result<PixelGrid> {
    params.validate()?;
    let causal = PixelGrid::try_new(width, height)?;
    let mut model = params.new_model();
    let mut scan = ScanDecoder::new(bits, causal, &mut model);

    for y in 0..height {
        for x in 0..width {
            let values = scan.decode_pixel(x, y);
            let mut px = [0u8; CHANNELS];
            for (c, (&value, out)) in values.iter().zip(px.iter_mut()).enumerate() {
                *out = u8::try_from(value).map_err(|_| CodecError::Desync {
                    x,
                    y,
                    channel: c,
                    value,
                })?;
            }
            scan.store(x, y, Rgb::from(px));
        }
    }

    Ok(scan.finish())
}
