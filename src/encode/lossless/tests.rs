use super::codec::*;
use super::constants::{DEFAULT_RESCALE_THRESHOLD, MAX_RESCALE_THRESHOLD, SYMBOL_COUNT};
use super::predictor::predict;
use super::residual::{from_symbol, to_symbol};
use super::verify::verify_round_trip;
use crate::encode::ac::{ArithmeticDecoder, ArithmeticEncoder, BitBuffer, FrequencyModel};
use crate::image::pixel_grid::{PixelGrid, Rgb, CHANNELS};
use crate::utils::error::CodecError;

/// Deterministic pseudo-random grid (xorshift), no dependency on `rand`.
fn noise_grid(width: u32, height: u32, seed: u32) -> PixelGrid {
    let mut state = seed.max(1);
    PixelGrid::from_fn(width, height, |_, _| {
        Rgb::from_fn(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
    })
}

fn gradient_grid(width: u32, height: u32) -> PixelGrid {
    PixelGrid::from_fn(width, height, |x, y| {
        Rgb::new((x * 3) as u8, (y * 5) as u8, ((x + y) * 2) as u8)
    })
}

fn assert_model_invariants(model: &mut FrequencyModel) {
    let sum: u32 = (0..model.symbol_count()).map(|s| model.frequency(s)).sum();
    assert_eq!(sum, model.total());
    assert_eq!(model.cumulative_total(), model.total());
    assert!((0..model.symbol_count()).all(|s| model.frequency(s) >= 1));
}

#[test]
fn test_round_trip_noise() {
    let grid = noise_grid(16, 16, 0x1234_5678);
    let bits = encode_image(&grid);
    assert_eq!(decode_image(&bits, 16, 16), grid);
}

#[test]
fn test_round_trip_gradient_compresses() {
    let grid = gradient_grid(64, 48);
    let bits = encode_image(&grid);
    assert!(bits.byte_len() < grid.raw_size() / 4, "{} bytes", bits.byte_len());
    assert_eq!(decode_image(&bits, 64, 48), grid);
}

#[test]
fn test_round_trip_extreme_values() {
    let grid = PixelGrid::from_fn(9, 7, |x, y| {
        if (x + y) % 2 == 0 {
            Rgb::new(255, 0, 255)
        } else {
            Rgb::new(0, 255, 0)
        }
    });
    let bits = encode_image(&grid);
    assert_eq!(decode_image(&bits, 9, 7), grid);
}

#[test]
fn test_round_trip_single_row_and_column() {
    for (w, h) in [(17, 1), (1, 23)] {
        let grid = noise_grid(w, h, w * 31 + h);
        let bits = encode_image(&grid);
        assert_eq!(decode_image(&bits, w, h), grid);
    }
}

#[test]
fn test_determinism() {
    let grid = noise_grid(12, 9, 99);
    assert_eq!(encode_image(&grid), encode_image(&grid));
}

#[test]
fn test_empty_image_is_just_the_flush() {
    let flush = ArithmeticEncoder::new().finish();
    for (w, h) in [(0, 0), (0, 5), (7, 0)] {
        let grid = PixelGrid::new(w, h);
        assert_eq!(encode_image(&grid), flush);
        let decoded = decode_image(&flush, w, h);
        assert_eq!(decoded.dimensions(), (w, h));
        assert!(decoded.is_empty());
    }
}

#[test]
fn test_single_pixel() {
    let px = Rgb::new(200, 3, 0);
    let grid = PixelGrid::from_fn(1, 1, |_, _| px);

    assert_eq!(predict(&grid, 0, 0), Rgb::BLACK);
    let symbols: Vec<usize> = (0..CHANNELS).map(|c| to_symbol(px.channel(c), 0)).collect();
    assert_eq!(symbols, [455, 258, 255]);

    // The driver codes exactly these three symbols.
    let mut model = CodecParams::default().new_model();
    let mut encoder = ArithmeticEncoder::new();
    for &s in &symbols {
        encoder.encode_symbol(&mut model, s);
    }
    let bits = encoder.finish();
    assert_eq!(encode_image(&grid), bits);
    assert_eq!(decode_image(&bits, 1, 1), grid);
}

#[test]
fn test_constant_color_converges() {
    let color = Rgb::new(10, 20, 30);
    let grid = PixelGrid::from_fn(2, 2, |_, _| color);

    let mut model = CodecParams::default().new_model();
    let mut encoder = ArithmeticEncoder::new();
    let mut last_freq = model.frequency(255);
    for y in 0..2 {
        for x in 0..2 {
            let predicted = predict(&grid, x, y);
            if (x, y) != (0, 0) {
                assert_eq!(predicted, color);
            }
            for c in 0..CHANNELS {
                let symbol = to_symbol(color.channel(c), predicted.channel(c));
                encoder.encode_symbol(&mut model, symbol);
                if (x, y) != (0, 0) {
                    assert_eq!(symbol, 255);
                    let freq = model.frequency(255);
                    assert!(freq > last_freq);
                    last_freq = freq;
                }
                assert_model_invariants(&mut model);
            }
        }
    }
    assert_eq!(model.frequency(255), 10);

    let bits = encoder.finish();
    assert_eq!(bits, encode_image(&grid));
    assert_eq!(decode_image(&bits, 2, 2), grid);
}

#[test]
fn test_model_invariants_hold_through_image() {
    let grid = noise_grid(8, 8, 7);
    let mut model = CodecParams::default().new_model();
    let bits = encode_image_with_model(&grid, &mut model);
    assert_model_invariants(&mut model);
    assert_eq!(model.total(), SYMBOL_COUNT as u32 + 8 * 8 * 3);

    let mut decoder_model = CodecParams::default().new_model();
    let decoded = decode_image_with_model(&bits, 8, 8, &mut decoder_model);
    assert_eq!(decoded, grid);
    assert_model_invariants(&mut decoder_model);
    for s in 0..SYMBOL_COUNT {
        assert_eq!(model.frequency(s), decoder_model.frequency(s));
    }
}

#[test]
fn test_model_invariants_after_every_symbol() {
    // Mostly flat with noisy columns: residual 0 dominates, so the small
    // threshold rescales inside the image.
    let noise = noise_grid(12, 5, 11);
    let grid = PixelGrid::from_fn(12, 5, |x, y| {
        if x % 5 == 0 {
            noise.get(x, y)
        } else {
            Rgb::new(40, 90, 200)
        }
    });
    let (width, height) = grid.dimensions();

    let mut model = FrequencyModel::new(SYMBOL_COUNT, 64);
    let mut encoder = ArithmeticEncoder::new();
    let mut causal = PixelGrid::new(width, height);
    let mut totals = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let predicted = predict(&causal, x, y);
            let actual = grid.get(x, y);
            for c in 0..CHANNELS {
                encoder.encode_symbol(&mut model, to_symbol(actual.channel(c), predicted.channel(c)));
                assert_model_invariants(&mut model);
                totals.push(model.total());
            }
            causal.set(x, y, actual);
        }
    }
    let bits = encoder.finish();
    assert!(totals.windows(2).any(|w| w[1] < w[0]), "no rescale happened");

    let mut model = FrequencyModel::new(SYMBOL_COUNT, 64);
    let mut decoder = ArithmeticDecoder::new(&bits);
    let mut causal = PixelGrid::new(width, height);
    let mut step = 0;
    for y in 0..height {
        for x in 0..width {
            let predicted = predict(&causal, x, y);
            let px = Rgb::from_fn(|c| {
                let symbol = decoder.decode_symbol(&mut model);
                assert_model_invariants(&mut model);
                assert_eq!(model.total(), totals[step], "symbol {}", step);
                step += 1;
                from_symbol(symbol, predicted.channel(c)) as u8
            });
            causal.set(x, y, px);
        }
    }
    assert_eq!(step, totals.len());
    assert_eq!(causal, grid);
}

#[test]
fn test_fallible_decode_rejects_unaddressable_size() {
    let bits = encode_image(&PixelGrid::new(0, 0));
    let params = CodecParams::default();
    assert!(matches!(
        decode_image_with(&bits, u32::MAX, u32::MAX, &params),
        Err(CodecError::ImageTooLarge { .. })
    ));
    assert!(matches!(
        try_decode_image(&bits, u32::MAX, u32::MAX, &params),
        Err(CodecError::ImageTooLarge { .. })
    ));
}

#[test]
fn test_oversized_model_threshold_is_bounded() {
    let model = FrequencyModel::new(SYMBOL_COUNT, u32::MAX);
    assert_eq!(model.rescale_threshold(), MAX_RESCALE_THRESHOLD);
    let grid = gradient_grid(9, 7);
    let bits = encode_image_with_model(&grid, &mut FrequencyModel::new(SYMBOL_COUNT, u32::MAX));
    let decoded = decode_image_with_model(&bits, 9, 7, &mut FrequencyModel::new(SYMBOL_COUNT, u32::MAX));
    assert_eq!(decoded, grid);
}

#[test]
fn test_rescale_trigger_then_image() {
    // Leaves freq[255] exactly at the threshold; the next increment rescales.
    fn saturate(model: &mut FrequencyModel) {
        for _ in 1..DEFAULT_RESCALE_THRESHOLD {
            model.increment(255);
        }
    }

    let mut model = CodecParams::default().new_model();
    saturate(&mut model);
    let before = model.total();
    assert_eq!(model.frequency(255), DEFAULT_RESCALE_THRESHOLD);
    assert_eq!(before, SYMBOL_COUNT as u32 - 1 + DEFAULT_RESCALE_THRESHOLD);
    model.increment(255);
    let after = model.total();
    assert!(after <= before / 2 + SYMBOL_COUNT as u32, "{} -> {}", before, after);
    assert!(after >= before / 2 - SYMBOL_COUNT as u32);
    assert_model_invariants(&mut model);

    let grid = gradient_grid(20, 10);
    let bits = encode_image_with_model(&grid, &mut model);

    let mut decoder_model = CodecParams::default().new_model();
    saturate(&mut decoder_model);
    decoder_model.increment(255);
    assert_eq!(decode_image_with_model(&bits, 20, 10, &mut decoder_model), grid);
}

#[test]
fn test_small_threshold_round_trip() {
    let params = CodecParams {
        rescale_threshold: 8,
    };
    let grid = gradient_grid(30, 30);
    let bits = encode_image_with(&grid, &params).unwrap();
    assert_ne!(bits, encode_image(&grid));
    assert_eq!(decode_image_with(&bits, 30, 30, &params).unwrap(), grid);
}

#[test]
fn test_params_validation() {
    assert!(CodecParams::default().validate().is_ok());
    for threshold in [0, 1, u32::MAX] {
        let params = CodecParams {
            rescale_threshold: threshold,
        };
        assert!(matches!(params.validate(), Err(CodecError::InvalidArg(_))));
        assert!(encode_image_with(&PixelGrid::new(1, 1), &params).is_err());
    }
}

#[test]
fn test_truncated_stream_still_yields_grid() {
    let grid = noise_grid(10, 10, 5);
    let mut bits = encode_image(&grid);
    bits.truncate(bits.len() / 2);
    let decoded = decode_image(&bits, 10, 10);
    assert_eq!(decoded.dimensions(), (10, 10));
}

#[test]
fn test_lenient_decode_keeps_low_bits() {
    // All-zero input always selects symbol 0: residual -255 on a black prediction.
    let decoded = decode_image(&BitBuffer::new(), 1, 1);
    assert_eq!(decoded.get(0, 0), Rgb::new(1, 1, 1));
}

#[test]
fn test_strict_decode_reports_desync() {
    let err = try_decode_image(&BitBuffer::new(), 2, 2, &CodecParams::default()).unwrap_err();
    assert!(matches!(
        err,
        CodecError::Desync {
            x: 0,
            y: 0,
            channel: 0,
            value: -255
        }
    ));

    let grid = noise_grid(6, 5, 11);
    let bits = encode_image(&grid);
    assert_eq!(try_decode_image(&bits, 6, 5, &CodecParams::default()).unwrap(), grid);
}

#[test]
fn test_verify_round_trip() {
    let params = CodecParams::default();
    let grid = noise_grid(5, 5, 3);
    let bits = encode_image(&grid);
    assert!(verify_round_trip(&grid, &bits, &params).is_ok());

    let mut other = grid.clone();
    let px = other.get(2, 3);
    other.set(2, 3, Rgb::new(px.r.wrapping_add(1), px.g, px.b));
    assert!(matches!(
        verify_round_trip(&other, &bits, &params),
        Err(CodecError::Mismatch { x: 2, y: 3 })
    ));
}
