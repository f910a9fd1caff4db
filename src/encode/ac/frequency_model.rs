// src/encode/ac/frequency_model.rs

//! Adaptive cumulative-frequency model over a fixed symbol alphabet.
//!
//! Encoder and decoder each build their own instance with the same alphabet
//! and rescale threshold and call [`FrequencyModel::increment`] in the same
//! order, so both sides hold identical statistics without transmitting them.

use super::arithmetic_coder::MAX_TOTAL;
use log::warn;

/// Adaptive frequency table.
///
/// Invariants: every `freq[s] >= 1`, `total == sum(freq)`, and once the
/// cumulative table is rebuilt `cum[s] == sum(freq[..s])` with
/// `cum[symbol_count] == total`.
#[derive(Debug, Clone)]
pub struct FrequencyModel {
    freq: Vec<u32>,
    cum: Vec<u32>,
    total: u32,
    dirty: bool,
    rescale_threshold: u32,
}

impl FrequencyModel {
    /// Creates a model with a uniform prior (every frequency 1).
    ///
    /// A `rescale_threshold` above [`max_rescale_threshold`](Self::max_rescale_threshold)
    /// is lowered to that bound, so the total never outgrows the coder's
    /// precision.
    pub fn new(symbol_count: usize, rescale_threshold: u32) -> Self {
        assert!(symbol_count > 0, "alphabet must not be empty");
        assert!(
            symbol_count < MAX_TOTAL as usize,
            "alphabet of {} symbols exceeds coder precision",
            symbol_count
        );
        let limit = Self::max_rescale_threshold(symbol_count);
        if rescale_threshold > limit {
            warn!(
                "Rescale threshold {} too large for {} symbols, using {}",
                rescale_threshold, symbol_count, limit
            );
        }
        let rescale_threshold = rescale_threshold.min(limit);
        Self {
            freq: vec![1; symbol_count],
            cum: vec![0; symbol_count + 1],
            total: symbol_count as u32,
            dirty: true,
            rescale_threshold,
        }
    }

    /// Largest threshold for which `total` stays at or below [`MAX_TOTAL`].
    ///
    /// Right before a rescale every frequency is at most the threshold except
    /// the one that just passed it, so `total <= symbol_count * threshold + 1`.
    pub const fn max_rescale_threshold(symbol_count: usize) -> u32 {
        ((MAX_TOTAL - 1) as usize / symbol_count) as u32
    }

    #[inline]
    pub fn symbol_count(&self) -> usize {
        self.freq.len()
    }

    #[inline]
    pub fn rescale_threshold(&self) -> u32 {
        self.rescale_threshold
    }

    #[inline]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[inline]
    pub fn frequency(&self, symbol: usize) -> u32 {
        self.freq[symbol]
    }

    /// Returns `(cum[symbol], cum[symbol + 1])`.
    #[inline]
    pub fn low_high(&mut self, symbol: usize) -> (u32, u32) {
        self.ensure_cumulative();
        (self.cum[symbol], self.cum[symbol + 1])
    }

    /// Finds the symbol `s` with `cum[s] <= value < cum[s + 1]` by binary search.
    ///
    /// `value` is expected in `0..total`; larger values map to the last symbol.
    pub fn symbol_for_value(&mut self, value: u32) -> usize {
        self.ensure_cumulative();
        let n = self.symbol_count();
        // cum is strictly increasing because every frequency is at least 1.
        self.cum[1..=n]
            .partition_point(|&upper| upper <= value)
            .min(n - 1)
    }

    /// Counts one more occurrence of `symbol`, halving every frequency once
    /// it passes the rescale threshold.
    pub fn increment(&mut self, symbol: usize) {
        self.freq[symbol] += 1;
        self.total += 1;
        if self.freq[symbol] > self.rescale_threshold {
            self.rescale();
        }
        self.dirty = true;
    }

    /// Sum of the cumulative table; equals [`total`](Self::total) at all times.
    pub fn cumulative_total(&mut self) -> u32 {
        self.ensure_cumulative();
        self.cum[self.symbol_count()]
    }

    fn rescale(&mut self) {
        let before = self.total;
        let mut total = 0u32;
        for f in self.freq.iter_mut() {
            *f = ((*f + 1) / 2).max(1);
            total += *f;
        }
        self.total = total;
        log::debug!("Rescaled frequency model: total {} -> {}", before, total);
    }

    #[inline]
    fn ensure_cumulative(&mut self) {
        if self.dirty {
            self.rebuild_cumulative();
        }
    }

    fn rebuild_cumulative(&mut self) {
        let mut sum = 0u32;
        for (slot, &f) in self.cum.iter_mut().zip(&self.freq) {
            *slot = sum;
            sum += f;
        }
        let n = self.symbol_count();
        self.cum[n] = sum;
        debug_assert_eq!(sum, self.total);
        self.dirty = false;
    }
}
