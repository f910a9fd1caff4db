// src/encode/lossless/mod.rs

//! Predictive lossless RGB codec.
//!
//! Each pixel is predicted from its already-coded neighbours with the
//! median-edge rule, the per-channel prediction error is shifted into a
//! 511-symbol alphabet, and the symbols are entropy coded with a single
//! adaptive arithmetic coder shared by all pixels and channels.

pub mod codec;
pub mod constants;
pub mod predictor;
pub mod residual;
pub mod verify;

#[cfg(test)]
mod tests;

pub use codec::{
    decode_image, decode_image_with, decode_image_with_model, encode_image, encode_image_with,
    encode_image_with_model, try_decode_image, CodecParams,
};
pub use verify::{verify_round_trip, CompressionStats};
