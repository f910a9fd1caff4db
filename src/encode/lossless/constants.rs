// src/encode/lossless/constants.rs

//! Algorithmic parameters of the codec.
//!
//! Encoder and decoder must agree on all of these; changing any of them
//! changes the bitstream.

use crate::encode::ac::FrequencyModel;

/// Offset added to `actual - predicted` so residuals become non-negative.
pub const RESIDUAL_OFFSET: i32 = 255;

/// Largest residual symbol (a difference of +255).
pub const MAX_SYMBOL: usize = 510;

/// Size of the residual alphabet.
pub const SYMBOL_COUNT: usize = MAX_SYMBOL + 1;

/// A frequency above this triggers halving of the whole table.
pub const DEFAULT_RESCALE_THRESHOLD: u32 = 1_000_000;

/// Largest threshold that keeps the model total within the coder's precision.
pub const MAX_RESCALE_THRESHOLD: u32 = FrequencyModel::max_rescale_threshold(SYMBOL_COUNT);
