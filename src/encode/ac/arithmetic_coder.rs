// src/encode/ac/arithmetic_coder.rs

//! Multi-symbol arithmetic coder with 32-bit interval registers.
//!
//! Witten-Neal-Cleary style: the interval `[low, high]` is narrowed by the
//! model's cumulative counts for each symbol and then renormalized. Bits are
//! emitted once the top bit of `low` and `high` agree (E1/E2); when the
//! interval straddles the midpoint inside the middle half (E3) the decision
//! is deferred and counted in `pending`, to be resolved by the next emitted
//! bit.
//!
//! The decoder mirrors every register update of the encoder and calls
//! [`FrequencyModel::increment`] at the same point, so both models stay in
//! lock-step.

use super::bit_buffer::BitBuffer;
use super::frequency_model::FrequencyModel;

/// Width of the coder registers.
pub const CODE_BITS: u32 = 32;
/// Initial `high`: the whole 32-bit range.
pub const TOP_VALUE: u32 = u32::MAX;
pub const HALF: u32 = 1 << 31;
pub const FIRST_QTR: u32 = 1 << 30;
pub const THIRD_QTR: u32 = 3 << 30;

/// Largest model total for which every symbol keeps a non-empty subinterval.
/// After renormalization `high - low + 1 > FIRST_QTR`.
pub const MAX_TOTAL: u32 = FIRST_QTR;

/// Narrows `[low, high]` to the subinterval of a symbol with cumulative
/// counts `[sym_low, sym_high)` out of `total`. Returns the new `(low, high)`.
#[inline(always)]
fn narrow(low: u32, high: u32, sym_low: u32, sym_high: u32, total: u32) -> (u32, u32) {
    let range = u64::from(high - low) + 1;
    let base = u64::from(low);
    let total = u64::from(total);
    let new_high = base + range * u64::from(sym_high) / total - 1;
    let new_low = base + range * u64::from(sym_low) / total;
    (new_low as u32, new_high as u32)
}

/// The encoding half of the coder.
#[derive(Debug, Clone)]
pub struct ArithmeticEncoder {
    low: u32,
    high: u32,
    pending: usize, // E3 underflow bits awaiting resolution
    output: BitBuffer,
}

impl Default for ArithmeticEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArithmeticEncoder {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an encoder whose output buffer can hold `bits` without reallocating.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            low: 0,
            high: TOP_VALUE,
            pending: 0,
            output: BitBuffer::with_capacity(bits),
        }
    }

    /// Number of bits emitted so far, not counting pending underflow bits.
    #[inline]
    pub fn bits_written(&self) -> usize {
        self.output.len()
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Encodes `symbol` under the model's current distribution, then updates
    /// the model.
    pub fn encode_symbol(&mut self, model: &mut FrequencyModel, symbol: usize) {
        let total = model.total();
        let (sym_low, sym_high) = model.low_high(symbol);
        debug_assert!(total <= MAX_TOTAL);

        (self.low, self.high) = narrow(self.low, self.high, sym_low, sym_high, total);

        loop {
            if self.high < HALF {
                // E1
                self.emit_bit(false);
            } else if self.low >= HALF {
                // E2
                self.emit_bit(true);
                self.low -= HALF;
                self.high -= HALF;
            } else if self.low >= FIRST_QTR && self.high < THIRD_QTR {
                // E3
                self.pending += 1;
                self.low -= FIRST_QTR;
                self.high -= FIRST_QTR;
            } else {
                break;
            }
            self.low <<= 1;
            self.high = (self.high << 1) | 1;
        }

        #[cfg(feature = "codec-trace")]
        log::trace!(
            "enc sym={} [{}, {}) / {} -> low={:#010x} high={:#010x} pending={}",
            symbol,
            sym_low,
            sym_high,
            total,
            self.low,
            self.high,
            self.pending
        );

        model.increment(symbol);
    }

    /// Emits `bit` followed by the deferred opposite bits.
    #[inline]
    fn emit_bit(&mut self, bit: bool) {
        self.output.push(bit);
        self.output.push_repeated(!bit, self.pending);
        self.pending = 0;
    }

    /// Flushes enough bits to single out the final interval and returns the
    /// complete bitstream. Reading zero bits past its end stays inside the
    /// final interval.
    pub fn finish(mut self) -> BitBuffer {
        self.pending += 1;
        let bit = self.low >= FIRST_QTR;
        self.emit_bit(bit);
        self.output
    }
}

/// The decoding half of the coder, reading from a borrowed bitstream.
#[derive(Debug, Clone)]
pub struct ArithmeticDecoder<'a> {
    input: &'a BitBuffer,
    pos: usize,
    low: u32,
    high: u32,
    code: u32,
}

impl<'a> ArithmeticDecoder<'a> {
    /// Creates a decoder and primes `code` with the first 32 input bits.
    pub fn new(input: &'a BitBuffer) -> Self {
        let mut decoder = Self {
            input,
            pos: 0,
            low: 0,
            high: TOP_VALUE,
            code: 0,
        };
        for _ in 0..CODE_BITS {
            decoder.code = (decoder.code << 1) | decoder.read_bit();
        }
        decoder
    }

    /// Next input bit; past the end of the stream every bit reads as 0.
    #[inline]
    fn read_bit(&mut self) -> u32 {
        let bit = self.input.get(self.pos).map_or(0, u32::from);
        self.pos += 1;
        bit
    }

    /// Number of bits consumed so far, padding included.
    #[inline]
    pub fn bits_read(&self) -> usize {
        self.pos
    }

    /// Number of zero bits supplied beyond the end of the input.
    #[inline]
    pub fn bits_past_end(&self) -> usize {
        self.pos.saturating_sub(self.input.len())
    }

    /// Decodes one symbol under the model's current distribution, then
    /// updates the model exactly as the encoder did.
    pub fn decode_symbol(&mut self, model: &mut FrequencyModel) -> usize {
        let total = model.total();
        debug_assert!(total <= MAX_TOTAL);
        debug_assert!(self.low <= self.code && self.code <= self.high);

        let range = u64::from(self.high - self.low) + 1;
        let offset = u64::from(self.code - self.low) + 1;
        let value = ((offset * u64::from(total) - 1) / range) as u32;

        let symbol = model.symbol_for_value(value);
        let (sym_low, sym_high) = model.low_high(symbol);

        (self.low, self.high) = narrow(self.low, self.high, sym_low, sym_high, total);

        loop {
            if self.high < HALF {
                // E1
            } else if self.low >= HALF {
                // E2
                self.low -= HALF;
                self.high -= HALF;
                self.code -= HALF;
            } else if self.low >= FIRST_QTR && self.high < THIRD_QTR {
                // E3
                self.low -= FIRST_QTR;
                self.high -= FIRST_QTR;
                self.code -= FIRST_QTR;
            } else {
                break;
            }
            self.low <<= 1;
            self.high = (self.high << 1) | 1;
            self.code = (self.code << 1) | self.read_bit();
        }

        #[cfg(feature = "codec-trace")]
        log::trace!(
            "dec sym={} [{}, {}) / {} -> low={:#010x} high={:#010x} code={:#010x}",
            symbol,
            sym_low,
            sym_high,
            total,
            self.low,
            self.high,
            self.code
        );

        model.increment(symbol);
        symbol
    }
}
