//! The header codec.

use super::raw_header::*;
use crate::{try_pull_pod, util::packed_byte_len, PcxError};
use pack1::U16LE;

/// v2.5: fixed EGA palette, no palette info in the header.
pub const PCX_VERSION_2_5: u8 = 0;
/// v2.8 with the palette stored in the header.
pub const PCX_VERSION_2_8_PALETTE: u8 = 2;
/// v2.8 without palette info, so the EGA default palette is used.
pub const PCX_VERSION_2_8_NO_PALETTE: u8 = 3;
/// PC Paintbrush for Windows.
pub const PCX_VERSION_WINDOWS: u8 = 4;
/// v3.0 and later, the only version that can have a 256 color palette.
pub const PCX_VERSION_3_0: u8 = 5;

/// If a file of this version carries its own 16 color palette in the header.
///
/// Only v3.0 files are trusted to have one. Older versions, including v2.8
/// "with palette" and Paintbrush for Windows, get the EGA default palette.
#[inline]
#[must_use]
pub const fn pcx_version_has_header_palette(version: u8) -> bool {
  version == PCX_VERSION_3_0
}

/// The eight pixel layouts this crate supports.
///
/// Which one applies is decided by the `(bits_per_pixel, color_planes)` pair
/// in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PcxVariant {
  /// 1 bit, 1 plane. Black and white, no palette.
  Monochrome,
  /// 2 bits, 1 plane. Either a 4 entry header palette, or the CGA system
  /// palette picked by flag bits.
  Cga4Color,
  /// 1 bit, 2 planes.
  Planar4Color,
  /// 1 bit, 3 planes.
  Planar8Color,
  /// 1 bit, 4 planes.
  Planar16Color,
  /// 4 bits, 1 plane, two pixels per byte.
  Nibble16Color,
  /// 8 bits, 1 plane, palette stored at the end of the file.
  Indexed256Color,
  /// 8 bits, 3 planes. One plane each of red, green, and blue.
  TrueColor24,
}
impl TryFrom<(u8, u8)> for PcxVariant {
  type Error = PcxError;
  /// Picks the variant from `(bits_per_pixel, color_planes)`.
  #[inline]
  fn try_from((bits_per_pixel, color_planes): (u8, u8)) -> Result<Self, Self::Error> {
    use PcxVariant::*;
    Ok(match (bits_per_pixel, color_planes) {
      (1, 1) => Monochrome,
      (2, 1) => Cga4Color,
      (1, 2) => Planar4Color,
      (1, 3) => Planar8Color,
      (1, 4) => Planar16Color,
      (4, 1) => Nibble16Color,
      (8, 1) => Indexed256Color,
      (8, 3) => TrueColor24,
      _ => return Err(PcxError::UnsupportedFormat),
    })
  }
}
impl PcxVariant {
  /// All the variants, in header table order.
  pub const ALL: [Self; 8] = [
    Self::Monochrome,
    Self::Cga4Color,
    Self::Planar4Color,
    Self::Planar8Color,
    Self::Planar16Color,
    Self::Nibble16Color,
    Self::Indexed256Color,
    Self::TrueColor24,
  ];

  /// Bits per pixel within a single plane.
  #[inline]
  #[must_use]
  pub const fn bits_per_pixel(self) -> u8 {
    use PcxVariant::*;
    match self {
      Monochrome | Planar4Color | Planar8Color | Planar16Color => 1,
      Cga4Color => 2,
      Nibble16Color => 4,
      Indexed256Color | TrueColor24 => 8,
    }
  }

  /// Number of planes stored for each scan line.
  #[inline]
  #[must_use]
  pub const fn color_planes(self) -> u8 {
    use PcxVariant::*;
    match self {
      Monochrome | Cga4Color | Nibble16Color | Indexed256Color => 1,
      Planar4Color => 2,
      Planar8Color | TrueColor24 => 3,
      Planar16Color => 4,
    }
  }

  /// How many distinct palette indexes a pixel can have, or `None` for the
  /// variants that don't use a palette.
  #[inline]
  #[must_use]
  pub const fn index_count(self) -> Option<usize> {
    match self {
      Self::Monochrome | Self::TrueColor24 => None,
      other => Some(1 << (other.bits_per_pixel() * other.color_planes())),
    }
  }

  /// Pixels packed into each byte of a plane line.
  #[inline]
  #[must_use]
  pub const fn pixels_per_byte(self) -> u32 {
    8 / self.bits_per_pixel() as u32
  }
}

/// A fully parsed PCX header.
///
/// This is immutable, and every derived value (width, height, bytes per line,
/// variant, odd padding) is already worked out. Use [PcxHeaderBuilder] to make
/// one, or [PcxHeader::try_from_bytes] to read one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PcxHeader {
  version: u8,
  bits_per_pixel: u8,
  color_planes: u8,
  x_min: u16,
  y_min: u16,
  x_max: u32,
  y_max: u32,
  h_res: u16,
  v_res: u16,
  palette_region: [u8; PCX_HEADER_PALETTE_LEN],
  bytes_per_line_original: u16,
  palette_type: u16,
  width: u32,
  height: u32,
  bytes_per_line: usize,
  variant: PcxVariant,
  not_even: bool,
}
impl PcxHeader {
  /// Tries to get the header and the bytes after it (the compressed body).
  ///
  /// ## Failure
  /// * Fewer than 128 bytes.
  /// * Manufacturer byte isn't 10, or the encoding byte isn't 1.
  /// * An unsupported `(bits_per_pixel, color_planes)` pair.
  /// * Inverted image bounds.
  #[inline]
  pub fn try_from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), PcxError> {
    let (raw, rest) = try_pull_pod::<RawPcxHeader>(bytes)?;
    if raw.manufacturer != PCX_MANUFACTURER {
      return Err(PcxError::InvalidSignature);
    }
    if raw.encoding != PCX_ENCODING_RLE {
      return Err(PcxError::UnsupportedEncoding);
    }
    let header = PcxHeaderBuilder::new()
      .version(raw.version)
      .format(raw.bits_per_pixel, raw.color_planes)
      .bounds(raw.x_min.get(), raw.y_min.get(), raw.x_max.get(), raw.y_max.get())
      .resolution(raw.h_res.get(), raw.v_res.get())
      .palette_region(raw.palette)
      .stored_bytes_per_line(raw.bytes_per_line.get())
      .palette_type(raw.palette_type.get())
      .build()?;
    Ok((header, rest))
  }

  /// The version byte.
  #[inline]
  #[must_use]
  pub const fn version(&self) -> u8 {
    self.version
  }
  /// Bits per pixel within one plane.
  #[inline]
  #[must_use]
  pub const fn bits_per_pixel(&self) -> u8 {
    self.bits_per_pixel
  }
  /// Planes per scan line.
  #[inline]
  #[must_use]
  pub const fn color_planes(&self) -> u8 {
    self.color_planes
  }
  /// `(x_min, y_min, x_max, y_max)`, with the max values exclusive.
  #[inline]
  #[must_use]
  pub const fn bounds(&self) -> (u16, u16, u32, u32) {
    (self.x_min, self.y_min, self.x_max, self.y_max)
  }
  /// Horizontal and vertical resolution (usually DPI, often just 0).
  #[inline]
  #[must_use]
  pub const fn resolution(&self) -> (u16, u16) {
    (self.h_res, self.v_res)
  }
  /// The 48 byte palette region of the header, as stored.
  #[inline]
  #[must_use]
  pub const fn palette_region(&self) -> &[u8; PCX_HEADER_PALETTE_LEN] {
    &self.palette_region
  }
  /// Bytes per plane line as written in the file (can include padding).
  #[inline]
  #[must_use]
  pub const fn bytes_per_line_original(&self) -> u16 {
    self.bytes_per_line_original
  }
  /// The palette type field (1 = color/mono, 2 = grayscale), informational
  /// only.
  #[inline]
  #[must_use]
  pub const fn palette_type(&self) -> u16 {
    self.palette_type
  }
  /// Image width in pixels.
  #[inline]
  #[must_use]
  pub const fn width(&self) -> u32 {
    self.width
  }
  /// Image height in pixels.
  #[inline]
  #[must_use]
  pub const fn height(&self) -> u32 {
    self.height
  }
  /// Bytes per plane line needed for `width` pixels, with no padding.
  #[inline]
  #[must_use]
  pub const fn bytes_per_line(&self) -> usize {
    self.bytes_per_line
  }
  /// The pixel layout.
  #[inline]
  #[must_use]
  pub const fn variant(&self) -> PcxVariant {
    self.variant
  }
  /// If every stored line has exactly one padding byte to throw away.
  #[inline]
  #[must_use]
  pub const fn not_even(&self) -> bool {
    self.not_even
  }

  /// Number of stored lines in the body (`height * color_planes`).
  #[inline]
  #[must_use]
  pub const fn stored_line_count(&self) -> usize {
    self.height as usize * self.color_planes as usize
  }

  /// Size of the decoded plane-major bitmap, using the computed bytes per
  /// line.
  #[inline]
  #[must_use]
  pub const fn decoded_len(&self) -> usize {
    self.stored_line_count() * self.bytes_per_line
  }
}
impl From<PcxHeader> for [u8; PCX_HEADER_LEN] {
  /// Serializes the header.
  ///
  /// The bytes per line field is always written as the computed value, any
  /// padding from a decoded file is not carried over.
  #[inline]
  fn from(h: PcxHeader) -> Self {
    let raw = RawPcxHeader {
      manufacturer: PCX_MANUFACTURER,
      version: h.version,
      encoding: PCX_ENCODING_RLE,
      bits_per_pixel: h.bits_per_pixel,
      x_min: U16LE::new(h.x_min),
      y_min: U16LE::new(h.y_min),
      x_max: U16LE::new((h.x_max - 1) as u16),
      y_max: U16LE::new((h.y_max - 1) as u16),
      h_res: U16LE::new(h.h_res),
      v_res: U16LE::new(h.v_res),
      palette: h.palette_region,
      reserved: 0,
      color_planes: h.color_planes,
      bytes_per_line: U16LE::new(h.bytes_per_line as u16),
      palette_type: U16LE::new(h.palette_type),
      h_screen_size: U16LE::new(0),
      v_screen_size: U16LE::new(0),
      filler: [0; 54],
    };
    bytemuck::cast(raw)
  }
}

/// Builds a [PcxHeader].
///
/// Nothing is checked until [build](Self::build), which either gives a
/// complete header or an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PcxHeaderBuilder {
  version: u8,
  bits_per_pixel: u8,
  color_planes: u8,
  x_min: u16,
  y_min: u16,
  x_max_inclusive: u16,
  y_max_inclusive: u16,
  h_res: u16,
  v_res: u16,
  palette_region: [u8; PCX_HEADER_PALETTE_LEN],
  stored_bytes_per_line: Option<u16>,
  palette_type: u16,
}
impl Default for PcxHeaderBuilder {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}
impl PcxHeaderBuilder {
  /// A 1x1 monochrome, version 3.0 header.
  #[inline]
  #[must_use]
  pub const fn new() -> Self {
    Self {
      version: PCX_VERSION_3_0,
      bits_per_pixel: 1,
      color_planes: 1,
      x_min: 0,
      y_min: 0,
      x_max_inclusive: 0,
      y_max_inclusive: 0,
      h_res: 0,
      v_res: 0,
      palette_region: [0; PCX_HEADER_PALETTE_LEN],
      stored_bytes_per_line: None,
      palette_type: 1,
    }
  }

  /// Sets the version byte.
  #[inline]
  #[must_use]
  pub const fn version(mut self, version: u8) -> Self {
    self.version = version;
    self
  }

  /// Sets bits per pixel and the number of planes.
  #[inline]
  #[must_use]
  pub const fn format(mut self, bits_per_pixel: u8, color_planes: u8) -> Self {
    self.bits_per_pixel = bits_per_pixel;
    self.color_planes = color_planes;
    self
  }

  /// Sets the format from a variant.
  #[inline]
  #[must_use]
  pub const fn variant(self, variant: PcxVariant) -> Self {
    self.format(variant.bits_per_pixel(), variant.color_planes())
  }

  /// Sets the bounds as they're stored in a file (max values inclusive).
  #[inline]
  #[must_use]
  pub const fn bounds(mut self, x_min: u16, y_min: u16, x_max: u16, y_max: u16) -> Self {
    self.x_min = x_min;
    self.y_min = y_min;
    self.x_max_inclusive = x_max;
    self.y_max_inclusive = y_max;
    self
  }

  /// Sets bounds of `(0, 0)` to `(width - 1, height - 1)`.
  ///
  /// ## Failure
  /// * Either dimension is 0 or above 65536.
  #[inline]
  pub fn dimensions(self, width: u32, height: u32) -> Result<Self, PcxError> {
    let x_max = width.checked_sub(1).ok_or(PcxError::InvalidDimensions)?;
    let y_max = height.checked_sub(1).ok_or(PcxError::InvalidDimensions)?;
    Ok(self.bounds(0, 0, u16::try_from(x_max)?, u16::try_from(y_max)?))
  }

  /// Sets horizontal and vertical resolution.
  #[inline]
  #[must_use]
  pub const fn resolution(mut self, h_res: u16, v_res: u16) -> Self {
    self.h_res = h_res;
    self.v_res = v_res;
    self
  }

  /// Sets the 48 byte palette region verbatim.
  #[inline]
  #[must_use]
  pub const fn palette_region(mut self, region: [u8; PCX_HEADER_PALETTE_LEN]) -> Self {
    self.palette_region = region;
    self
  }

  /// Sets the bytes per line as stored in the file.
  ///
  /// If this isn't called the computed value is used.
  #[inline]
  #[must_use]
  pub const fn stored_bytes_per_line(mut self, bytes_per_line: u16) -> Self {
    self.stored_bytes_per_line = Some(bytes_per_line);
    self
  }

  /// Sets the palette type field.
  #[inline]
  #[must_use]
  pub const fn palette_type(mut self, palette_type: u16) -> Self {
    self.palette_type = palette_type;
    self
  }

  /// Finishes the header.
  ///
  /// ## Failure
  /// * [PcxError::UnsupportedFormat] if the bits and planes don't name a
  ///   variant.
  /// * [PcxError::InvalidDimensions] if a max bound is below its min bound, a
  ///   plane line would need more than 65535 bytes, or the stored bytes per
  ///   line is too small to hold a line.
  #[inline]
  pub fn build(self) -> Result<PcxHeader, PcxError> {
    let variant = PcxVariant::try_from((self.bits_per_pixel, self.color_planes))?;
    if self.x_max_inclusive < self.x_min || self.y_max_inclusive < self.y_min {
      return Err(PcxError::InvalidDimensions);
    }
    let x_max = u32::from(self.x_max_inclusive) + 1;
    let y_max = u32::from(self.y_max_inclusive) + 1;
    let width = x_max - u32::from(self.x_min);
    let height = y_max - u32::from(self.y_min);
    let bytes_per_line = packed_byte_len(u32::from(self.bits_per_pixel), width);
    let computed_bytes_per_line = u16::try_from(bytes_per_line)?;
    let bytes_per_line_original = self.stored_bytes_per_line.unwrap_or(computed_bytes_per_line);
    if bytes_per_line_original < computed_bytes_per_line {
      return Err(PcxError::InvalidDimensions);
    }
    let not_even = usize::from(bytes_per_line_original).checked_sub(bytes_per_line) == Some(1);
    Ok(PcxHeader {
      version: self.version,
      bits_per_pixel: self.bits_per_pixel,
      color_planes: self.color_planes,
      x_min: self.x_min,
      y_min: self.y_min,
      x_max,
      y_max,
      h_res: self.h_res,
      v_res: self.v_res,
      palette_region: self.palette_region,
      bytes_per_line_original,
      palette_type: self.palette_type,
      width,
      height,
      bytes_per_line,
      variant,
      not_even,
    })
  }
}
