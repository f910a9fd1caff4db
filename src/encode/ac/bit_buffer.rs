// src/encode/ac/bit_buffer.rs

//! Growable bit-packed buffer carrying the arithmetic coder's output.
//!
//! The coder works in single bits and never sees byte alignment. Bits are
//! stored MSB-first inside each byte, which is also the persisted layout, so
//! packing for the file container is a copy of the backing storage with the
//! final partial byte zero-padded in its low bits.

use bitvec::prelude::*;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitBuffer {
    bits: BitVec<u8, Msb0>,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bits: BitVec::with_capacity(bits),
        }
    }

    /// Unpacks MSB-first bytes. Trailing padding bits are kept; the decoder
    /// treats them like the zero bits it reads past the end of the stream.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bits: BitVec::from_slice(bytes),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Number of bytes the packed form occupies.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.bits.len().div_ceil(8)
    }

    #[inline]
    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    /// Appends `count` copies of `bit`.
    #[inline]
    pub fn push_repeated(&mut self, bit: bool, count: usize) {
        if count > 0 {
            self.bits.resize(self.bits.len() + count, bit);
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<bool> {
        self.bits.get(index).map(|bit| *bit)
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().by_vals()
    }

    pub fn truncate(&mut self, len: usize) {
        self.bits.truncate(len);
    }

    pub fn as_bitslice(&self) -> &BitSlice<u8, Msb0> {
        &self.bits
    }

    /// Packs the bits MSB-first; the final partial byte is zero-padded.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut packed = self.bits.clone();
        packed.resize(self.byte_len() * 8, false);
        packed.into_vec()
    }
}

impl FromIterator<bool> for BitBuffer {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self {
            bits: iter.into_iter().collect(),
        }
    }
}
