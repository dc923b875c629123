//! Module for the pixel data structures.
//!
//! PCX only needs two color shapes:
//! * [RGB8] is one palette entry, exactly as it's stored in a file (three
//!   bytes, red first).
//! * [RGBA8] is one pixel of a decoded image. PCX has no transparency, so the
//!   decoder always sets alpha to 255 and the encoder ignores it.
//!
//! Both are `Pod`, so a slice of them can be viewed as plain bytes (and the
//! other way around) with `bytemuck`.

use bytemuck::{Pod, Zeroable};
use ::pixel_formats::r8g8b8a8_Srgb;

/// An RGB value, 8-bits per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Zeroable, Pod)]
#[repr(C)]
#[allow(missing_docs)]
pub struct RGB8 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
}
impl RGB8 {
  /// Makes a new color.
  #[inline]
  #[must_use]
  pub const fn new(r: u8, g: u8, b: u8) -> Self {
    Self { r, g, b }
  }

  /// Packs the channels as `r << 16 | g << 8 | b`.
  ///
  /// Two colors pack to the same value exactly when they're equal.
  #[inline]
  #[must_use]
  pub const fn packed(self) -> u32 {
    (self.r as u32) << 16 | (self.g as u32) << 8 | (self.b as u32)
  }

  /// This color, fully opaque.
  #[inline]
  #[must_use]
  pub const fn opaque(self) -> RGBA8 {
    RGBA8 { r: self.r, g: self.g, b: self.b, a: 0xFF }
  }
}
impl From<[u8; 3]> for RGB8 {
  #[inline]
  fn from([r, g, b]: [u8; 3]) -> Self {
    Self { r, g, b }
  }
}
impl From<RGB8> for [u8; 3] {
  #[inline]
  fn from(RGB8 { r, g, b }: RGB8) -> Self {
    [r, g, b]
  }
}

/// An 8-bits per channel RGBA pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Zeroable, Pod)]
#[repr(C)]
#[allow(missing_docs)]
pub struct RGBA8 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub a: u8,
}
impl RGBA8 {
  /// Opaque black, the value every decoded pixel starts as.
  pub const BLACK: Self = Self { r: 0, g: 0, b: 0, a: 0xFF };

  /// Drops the alpha channel.
  #[inline]
  #[must_use]
  pub const fn rgb(self) -> RGB8 {
    RGB8 { r: self.r, g: self.g, b: self.b }
  }
}
impl From<RGBA8> for r8g8b8a8_Srgb {
  #[inline]
  fn from(RGBA8 { r, g, b, a }: RGBA8) -> Self {
    r8g8b8a8_Srgb { r, g, b, a }
  }
}
impl From<r8g8b8a8_Srgb> for RGBA8 {
  #[inline]
  fn from(r8g8b8a8_Srgb { r, g, b, a }: r8g8b8a8_Srgb) -> Self {
    Self { r, g, b, a }
  }
}
