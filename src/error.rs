use core::num::TryFromIntError;

/// An error from decoding or encoding a PCX image.
///
/// Every error is fatal to the call that produced it. Nothing is retried and
/// no partially built output is handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum PcxError {
  /// The manufacturer byte wasn't 10, so this probably isn't a PCX file.
  InvalidSignature,

  /// The encoding byte wasn't 1 (RLE).
  UnsupportedEncoding,

  /// The `(bits_per_pixel, color_planes)` pair isn't one of the eight
  /// supported variants.
  UnsupportedFormat,

  /// Two entries of a palette have the same RGB value.
  ///
  /// Decoding a CGA file treats this as "use the CGA system palette" rather
  /// than as a failure.
  PaletteDuplicate,

  /// The byte before the trailing 256 color palette wasn't `0x0C`.
  PaletteMarkerMissing,

  /// A palette didn't have the number of entries the variant needs.
  PaletteSizeMismatch,

  /// An encode was requested for a variant that needs a palette, but none was
  /// given.
  PaletteMissing,

  /// A pixel being encoded has a color that the palette doesn't contain.
  ColorNotInPalette,

  /// The input ran out early, or an output slice was too small.
  InsufficientBytes,

  /// The image bounds are inverted, zero, or too large for the format.
  InvalidDimensions,

  /// The image is too large to decode.
  ///
  /// See [PCX_DECODE_DIMENSION_LIMIT](crate::pcx::PCX_DECODE_DIMENSION_LIMIT).
  DimensionsTooLarge,

  /// The pixel buffer doesn't hold exactly `width * height` pixels.
  PixelBufferSizeMismatch,

  /// The allocator couldn't give us enough space.
  AllocError,
}
#[cfg(feature = "alloc")]
impl From<alloc::collections::TryReserveError> for PcxError {
  #[inline]
  fn from(_: alloc::collections::TryReserveError) -> Self {
    Self::AllocError
  }
}
impl From<TryFromIntError> for PcxError {
  #[inline]
  fn from(_: TryFromIntError) -> Self {
    Self::InvalidDimensions
  }
}
