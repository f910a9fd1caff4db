// src/encode/lossless/residual.rs

//! Mapping between (actual, predicted) channel values and residual symbols.

use super::constants::{MAX_SYMBOL, RESIDUAL_OFFSET};

/// Shifts `actual - predicted` into `0..=MAX_SYMBOL`.
///
/// For 8-bit inputs the clamp never triggers.
#[inline]
pub fn to_symbol(actual: u8, predicted: u8) -> usize {
    let residual = i32::from(actual) - i32::from(predicted) + RESIDUAL_OFFSET;
    residual.clamp(0, MAX_SYMBOL as i32) as usize
}

/// Inverse of [`to_symbol`].
///
/// Not clamped: a result outside `0..=255` means the decoder has lost sync
/// with the encoder.
#[inline]
pub fn from_symbol(symbol: usize, predicted: u8) -> i32 {
    symbol as i32 - RESIDUAL_OFFSET + i32::from(predicted)
}
