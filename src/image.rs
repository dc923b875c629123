#![forbid(unsafe_code)]

//! Provides the heap-allocated image type.

use alloc::vec::Vec;
use bytemuck::{cast_slice, try_cast_slice};

use crate::{PcxError, RGBA8};

/// Converts an `(x,y)` position within a given `width` 2D space into a linear
/// index.
#[inline]
#[must_use]
pub const fn xy_width_to_index(x: u32, y: u32, width: u32) -> usize {
  (y as usize * width as usize) + x as usize
}

/// A direct-color image.
///
/// Pixels are row-major, with the origin in the top left.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub struct Bitmap<P> {
  pub width: u32,
  pub height: u32,
  pub pixels: Vec<P>,
}

/// The flat RGBA image that decoding produces and encoding consumes.
pub type PixelBuffer = Bitmap<RGBA8>;

impl<P: Clone> Bitmap<P> {
  /// Makes a `width` by `height` image with every pixel set to `fill`.
  ///
  /// ## Failure
  /// * The allocator can't give us `width * height` pixels.
  #[inline]
  pub fn try_new_filled(width: u32, height: u32, fill: P) -> Result<Self, PcxError> {
    let pixel_count = (width as usize).checked_mul(height as usize).ok_or(PcxError::AllocError)?;
    let mut pixels = Vec::new();
    pixels.try_reserve(pixel_count)?;
    pixels.resize(pixel_count, fill);
    Ok(Self { width, height, pixels })
  }
}

impl<P> Bitmap<P> {
  /// Gets the pixel at the position, or `None` if the position is out of
  /// bounds.
  #[inline]
  #[must_use]
  pub fn get(&self, x: u32, y: u32) -> Option<&P> {
    if x < self.width && y < self.height {
      self.pixels.get(xy_width_to_index(x, y, self.width))
    } else {
      None
    }
  }

  /// Gets the pixel at the position, or `None` if the position is out of
  /// bounds.
  #[inline]
  #[must_use]
  pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut P> {
    if x < self.width && y < self.height {
      self.pixels.get_mut(xy_width_to_index(x, y, self.width))
    } else {
      None
    }
  }

  /// If the pixel count matches the declared dimensions.
  #[inline]
  #[must_use]
  pub fn is_well_formed(&self) -> bool {
    (self.width as usize).checked_mul(self.height as usize) == Some(self.pixels.len())
  }
}

impl Bitmap<RGBA8> {
  /// Builds an image out of tightly packed `[r, g, b, a]` bytes.
  ///
  /// ## Failure
  /// * The byte count isn't exactly `width * height * 4`.
  #[inline]
  pub fn try_from_rgba_bytes(width: u32, height: u32, bytes: &[u8]) -> Result<Self, PcxError> {
    let pixels: &[RGBA8] =
      try_cast_slice(bytes).map_err(|_| PcxError::PixelBufferSizeMismatch)?;
    let mut v = Vec::new();
    v.try_reserve(pixels.len())?;
    v.extend_from_slice(pixels);
    let out = Self { width, height, pixels: v };
    if out.is_well_formed() {
      Ok(out)
    } else {
      Err(PcxError::PixelBufferSizeMismatch)
    }
  }

  /// Views the pixels as tightly packed `[r, g, b, a]` bytes.
  #[inline]
  #[must_use]
  pub fn as_rgba_bytes(&self) -> &[u8] {
    cast_slice(self.pixels.as_slice())
  }
}
