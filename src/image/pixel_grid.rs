// src/image/pixel_grid.rs

//! The decoded RGB pixel grid the codec operates on.
//!
//! Row 0 is always the visually topmost row. Turning a bitmap file into a
//! grid (palette resolution, row padding, bottom-up row order) happens before
//! this type is constructed; with the `image` feature enabled that work is
//! delegated to the `image` crate.

use crate::utils::error::{CodecError, Result};
use bytemuck::{Pod, Zeroable};

/// Number of color channels per pixel, coded in this order: R, G, B.
pub const CHANNELS: usize = 3;

/// One RGB pixel. `#[repr(C)]` so a pixel slice can be viewed as interleaved bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a pixel by evaluating `f` for channel indices 0, 1 and 2.
    #[inline]
    pub fn from_fn<F: FnMut(usize) -> u8>(mut f: F) -> Self {
        Self::new(f(0), f(1), f(2))
    }

    /// Returns channel `c` (0 = red, 1 = green, 2 = blue).
    #[inline]
    pub fn channel(self, c: usize) -> u8 {
        self.channels()[c]
    }

    #[inline]
    pub fn channels(self) -> [u8; CHANNELS] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; CHANNELS]> for Rgb {
    #[inline]
    fn from([r, g, b]: [u8; CHANNELS]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Rgb> for [u8; CHANNELS] {
    #[inline]
    fn from(px: Rgb) -> Self {
        px.channels()
    }
}

/// An owned `width` x `height` grid of RGB pixels stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl PixelGrid {
    /// Size in bytes of a `width` x `height` RGB buffer, or
    /// [`CodecError::ImageTooLarge`] when it cannot be addressed.
    pub fn checked_raw_size(width: u32, height: u32) -> Result<usize> {
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|count| count.checked_mul(CHANNELS))
            .filter(|&bytes| bytes <= isize::MAX as usize)
            .ok_or(CodecError::ImageTooLarge { width, height })
    }

    /// Creates a black grid.
    ///
    /// Panics if the grid cannot be allocated; use [`try_new`](Self::try_new)
    /// for dimensions that come from untrusted input.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb::BLACK; width as usize * height as usize],
        }
    }

    /// Creates a black grid, failing instead of aborting when the dimensions
    /// are too large.
    pub fn try_new(width: u32, height: u32) -> Result<Self> {
        let count = Self::checked_raw_size(width, height)? / CHANNELS;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(count)
            .map_err(|_| CodecError::ImageTooLarge { width, height })?;
        pixels.resize(count, Rgb::BLACK);
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn from_fn<F: FnMut(u32, u32) -> Rgb>(width: u32, height: u32, mut f: F) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Wraps an existing row-major pixel vector.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgb>) -> Result<Self> {
        let expected = Self::checked_raw_size(width, height)?;
        if pixels.len() * CHANNELS != expected {
            return Err(CodecError::InvalidDimensions {
                width,
                height,
                expected,
                actual: pixels.len() * CHANNELS,
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Copies an interleaved `R, G, B, R, G, B, ...` buffer without row padding.
    pub fn from_raw(width: u32, height: u32, raw: &[u8]) -> Result<Self> {
        let expected = Self::checked_raw_size(width, height)?;
        if raw.len() != expected {
            return Err(CodecError::InvalidDimensions {
                width,
                height,
                expected,
                actual: raw.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels: bytemuck::cast_slice(raw).to_vec(),
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Size of the uncompressed interleaved RGB data in bytes.
    #[inline]
    pub fn raw_size(&self) -> usize {
        self.pixels.len() * CHANNELS
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Rgb {
        self.pixels[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, px: Rgb) {
        let idx = self.index(x, y);
        self.pixels[idx] = px;
    }

    pub fn row(&self, y: u32) -> &[Rgb] {
        debug_assert!(y < self.height);
        let start = y as usize * self.width as usize;
        &self.pixels[start..start + self.width as usize]
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Views the grid as interleaved RGB bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    /// Returns the coordinates of the first pixel (in scan order) where the
    /// two grids differ, or `None` if they are identical.
    pub fn first_difference(&self, other: &PixelGrid) -> Result<Option<(u32, u32)>> {
        if self.dimensions() != other.dimensions() {
            return Err(CodecError::DimensionMismatch {
                expected: self.dimensions(),
                found: other.dimensions(),
            });
        }
        let width = self.width.max(1) as usize;
        Ok(self
            .pixels
            .iter()
            .zip(&other.pixels)
            .position(|(a, b)| a != b)
            .map(|i| ((i % width) as u32, (i / width) as u32)))
    }
}

#[cfg(feature = "image")]
mod interop {
    use super::PixelGrid;
    use crate::utils::error::Result;
    use ::image::RgbImage;
    use std::path::Path;

    impl PixelGrid {
        pub fn from_rgb_image(img: &RgbImage) -> Self {
            let (width, height) = img.dimensions();
            Self {
                width,
                height,
                pixels: bytemuck::cast_slice(img.as_raw()).to_vec(),
            }
        }

        pub fn to_rgb_image(&self) -> RgbImage {
            RgbImage::from_fn(self.width, self.height, |x, y| {
                ::image::Rgb(self.get(x, y).channels())
            })
        }
    }

    impl From<&RgbImage> for PixelGrid {
        fn from(img: &RgbImage) -> Self {
            PixelGrid::from_rgb_image(img)
        }
    }

    /// Opens any image the `image` crate understands (BMP of every bit depth
    /// and row order included) and converts it to 8-bit RGB.
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<PixelGrid> {
        let img = ::image::open(path.as_ref())?.to_rgb8();
        log::info!(
            "Loaded {} ({}x{})",
            path.as_ref().display(),
            img.width(),
            img.height()
        );
        Ok(PixelGrid::from_rgb_image(&img))
    }

    /// Writes the grid in the format implied by the file extension.
    pub fn save_image<P: AsRef<Path>>(grid: &PixelGrid, path: P) -> Result<()> {
        grid.to_rgb_image().save(path.as_ref())?;
        Ok(())
    }
}

#[cfg(feature = "image")]
pub use interop::{load_image, save_image};
