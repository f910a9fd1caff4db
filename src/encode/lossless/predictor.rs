// src/encode/lossless/predictor.rs

//! Causal spatial predictor (LOCO-I median edge detector).

use crate::image::pixel_grid::{PixelGrid, Rgb};

/// Median-edge prediction for one channel.
///
/// `left + top - top_left`, clamped into the range spanned by `left` and
/// `top` so the estimate never overshoots at an edge.
#[inline]
pub fn median_edge(left: u8, top: u8, top_left: u8) -> u8 {
    let (lo, hi) = if left <= top { (left, top) } else { (top, left) };
    let gradient = i16::from(left) + i16::from(top) - i16::from(top_left);
    gradient.clamp(i16::from(lo), i16::from(hi)) as u8
}

/// Predicts pixel `(x, y)` from `causal`, reading only pixels that precede it
/// in raster order.
///
/// The first pixel predicts black, the rest of the first row copies the left
/// neighbour and the rest of the first column copies the top neighbour.
#[inline]
pub fn predict(causal: &PixelGrid, x: u32, y: u32) -> Rgb {
    match (x, y) {
        (0, 0) => Rgb::BLACK,
        (0, _) => causal.get(x, y - 1),
        (_, 0) => causal.get(x - 1, y),
        _ => {
            let left = causal.get(x - 1, y);
            let top = causal.get(x, y - 1);
            let top_left = causal.get(x - 1, y - 1);
            Rgb::from_fn(|c| median_edge(left.channel(c), top.channel(c), top_left.channel(c)))
        }
    }
}
