//! Palette resolution and the reverse color lookup used when encoding.
//!
//! A palette comes from one of four places, recorded as a [PaletteSource]:
//! * Literal colors in the 48 byte palette region of the header.
//! * The fixed EGA table, for versions that say the header has no palette.
//! * The CGA system palette, picked by flag bits in the header palette region.
//! * The 768 byte block at the end of a 256 color file.
//!
//! The source decides how the palette gets written back out when encoding.

use alloc::{collections::BTreeMap, vec::Vec};
use bytemuck::cast_slice;

use super::{pcx_version_has_header_palette, PcxHeader, PcxVariant, PCX_HEADER_PALETTE_LEN};
use crate::{PcxError, RGB8};

/// The byte right before a trailing 256 color palette.
pub const PCX_PALETTE_256_MARKER: u8 = 0x0C;

/// Byte length of a trailing 256 color palette (not counting the marker).
pub const PCX_PALETTE_256_LEN: usize = 256 * 3;

const fn rgb(r: u8, g: u8, b: u8) -> RGB8 {
  RGB8::new(r, g, b)
}

/// The default 16 color EGA palette.
pub const PCX_EGA_PALETTE: [RGB8; 16] = [
  rgb(0x00, 0x00, 0x00),
  rgb(0x00, 0x00, 0xAA),
  rgb(0x00, 0xAA, 0x00),
  rgb(0x00, 0xAA, 0xAA),
  rgb(0xAA, 0x00, 0x00),
  rgb(0xAA, 0x00, 0xAA),
  rgb(0xAA, 0x55, 0x00),
  rgb(0xAA, 0xAA, 0xAA),
  rgb(0x55, 0x55, 0x55),
  rgb(0x55, 0x55, 0xFF),
  rgb(0x55, 0xFF, 0x55),
  rgb(0x55, 0xFF, 0xFF),
  rgb(0xFF, 0x55, 0x55),
  rgb(0xFF, 0x55, 0xFF),
  rgb(0xFF, 0xFF, 0x55),
  rgb(0xFF, 0xFF, 0xFF),
];

/// CGA palette 0, low intensity: green, red, brown.
pub const PCX_CGA_PALETTE_0_DARK: [RGB8; 3] =
  [rgb(0, 128, 0), rgb(128, 0, 0), rgb(128, 128, 0)];
/// CGA palette 0, high intensity: light green, light red, yellow.
pub const PCX_CGA_PALETTE_0_LIGHT: [RGB8; 3] =
  [rgb(0, 255, 0), rgb(255, 0, 0), rgb(255, 255, 0)];
/// CGA palette 1, low intensity: cyan, magenta, gray.
pub const PCX_CGA_PALETTE_1_DARK: [RGB8; 3] =
  [rgb(0, 128, 128), rgb(128, 0, 128), rgb(128, 128, 128)];
/// CGA palette 1, high intensity: light cyan, light magenta, white.
pub const PCX_CGA_PALETTE_1_LIGHT: [RGB8; 3] =
  [rgb(0, 255, 255), rgb(255, 0, 255), rgb(255, 255, 255)];

/// The CGA flag bits packed into the header palette region.
///
/// * Byte 0, high nibble: background color, an index into [PCX_EGA_PALETTE].
/// * Byte 3, bit 7: color burst, stored inverted (0 means enabled).
/// * Byte 3, bit 6: palette number.
/// * Byte 3, bit 5: intensity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CgaDescriptor {
  /// 0 to 15
  pub background_color: u8,
  pub color_burst: bool,
  /// 0 or 1
  pub palette_number: u8,
  pub intensity: bool,
}
impl CgaDescriptor {
  /// Reads the flags out of a header palette region.
  #[inline]
  #[must_use]
  pub const fn from_palette_region(region: &[u8; PCX_HEADER_PALETTE_LEN]) -> Self {
    Self {
      background_color: (region[0] & 0xF0) >> 4,
      color_burst: (region[3] & 0x80) == 0,
      palette_number: (region[3] & 0x40) >> 6,
      intensity: (region[3] & 0x20) != 0,
    }
  }

  /// Packs the flags into an otherwise zeroed header palette region.
  #[inline]
  #[must_use]
  pub const fn to_palette_region(self) -> [u8; PCX_HEADER_PALETTE_LEN] {
    let mut region = [0; PCX_HEADER_PALETTE_LEN];
    region[0] = (self.background_color & 0x0F) << 4;
    region[3] = ((!self.color_burst) as u8) << 7
      | (self.palette_number & 1) << 6
      | (self.intensity as u8) << 5;
    region
  }

  /// The three foreground colors picked by palette number and intensity.
  #[inline]
  #[must_use]
  pub const fn system_colors(self) -> [RGB8; 3] {
    match (self.palette_number & 1, self.intensity) {
      (0, false) => PCX_CGA_PALETTE_0_DARK,
      (0, true) => PCX_CGA_PALETTE_0_LIGHT,
      (_, false) => PCX_CGA_PALETTE_1_DARK,
      (_, true) => PCX_CGA_PALETTE_1_LIGHT,
    }
  }

  /// The full 4 color palette: background first, then the system colors.
  #[inline]
  #[must_use]
  pub const fn colors(self) -> [RGB8; 4] {
    let [a, b, c] = self.system_colors();
    [PCX_EGA_PALETTE[(self.background_color & 0x0F) as usize], a, b, c]
  }
}

/// Where a [PcxPalette] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PaletteSource {
  /// Literal colors in the header palette region.
  Header,
  /// The fixed EGA table.
  EgaDefault,
  /// Derived from the CGA flag bits.
  Cga(CgaDescriptor),
  /// The 256 color block at the end of the file.
  Trailing256,
}

/// An ordered list of colors, where the position is the color index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PcxPalette {
  colors: Vec<RGB8>,
  source: PaletteSource,
}
impl PcxPalette {
  /// Makes a palette from literal colors.
  ///
  /// 256 colors will be written as a trailing palette, up to 16 colors will be
  /// written into the header.
  ///
  /// ## Failure
  /// * Any other number of colors is [PcxError::PaletteSizeMismatch].
  /// * Allocation failure.
  #[inline]
  pub fn try_from_colors(colors: &[RGB8]) -> Result<Self, PcxError> {
    let source = match colors.len() {
      256 => PaletteSource::Trailing256,
      1..=16 => PaletteSource::Header,
      _ => return Err(PcxError::PaletteSizeMismatch),
    };
    Self::try_new(colors, source)
  }

  /// The EGA default palette.
  ///
  /// ## Failure
  /// * Allocation failure.
  #[inline]
  pub fn try_ega_default() -> Result<Self, PcxError> {
    Self::try_new(&PCX_EGA_PALETTE, PaletteSource::EgaDefault)
  }

  /// The 4 color palette derived from CGA flags.
  ///
  /// ## Failure
  /// * Allocation failure.
  #[inline]
  pub fn try_from_cga(cga: CgaDescriptor) -> Result<Self, PcxError> {
    Self::try_new(&cga.colors(), PaletteSource::Cga(cga))
  }

  fn try_new(colors: &[RGB8], source: PaletteSource) -> Result<Self, PcxError> {
    let mut v = Vec::new();
    v.try_reserve(colors.len())?;
    v.extend_from_slice(colors);
    Ok(Self { colors: v, source })
  }

  /// All the colors, in index order.
  #[inline]
  #[must_use]
  pub fn colors(&self) -> &[RGB8] {
    &self.colors
  }

  /// Where the colors came from.
  #[inline]
  #[must_use]
  pub const fn source(&self) -> PaletteSource {
    self.source
  }

  /// The color at `index`, or black if the index is out of range.
  #[inline]
  #[must_use]
  pub fn get(&self, index: u8) -> RGB8 {
    self.colors.get(usize::from(index)).copied().unwrap_or_default()
  }

  /// Reverse lookup over every entry.
  #[inline]
  #[must_use]
  pub fn dictionary(&self) -> ColorDictionary {
    ColorDictionary::from_colors(&self.colors)
  }

  /// Reverse lookup over only the entries that `variant` can address.
  #[inline]
  #[must_use]
  pub fn dictionary_for(&self, variant: PcxVariant) -> ColorDictionary {
    let count = variant.index_count().unwrap_or(0).min(self.colors.len());
    ColorDictionary::from_colors(&self.colors[..count])
  }

  /// The header palette region for this palette.
  ///
  /// CGA palettes become the flag bytes, anything else is the same as
  /// [literal_region](Self::literal_region).
  #[inline]
  #[must_use]
  pub fn header_region(&self) -> [u8; PCX_HEADER_PALETTE_LEN] {
    match self.source {
      PaletteSource::Cga(cga) => cga.to_palette_region(),
      _ => self.literal_region(),
    }
  }

  /// The colors copied into a header palette region, or a zeroed region if
  /// there's more than 16 colors.
  #[inline]
  #[must_use]
  pub fn literal_region(&self) -> [u8; PCX_HEADER_PALETTE_LEN] {
    let mut region = [0; PCX_HEADER_PALETTE_LEN];
    if self.colors.len() <= 16 {
      let bytes: &[u8] = cast_slice(self.colors.as_slice());
      region[..bytes.len()].copy_from_slice(bytes);
    }
    region
  }
}

/// Maps colors back to their palette index.
///
/// Keys are packed as `r << 16 | g << 8 | b`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ColorDictionary {
  map: BTreeMap<u32, u8>,
}
impl ColorDictionary {
  /// Builds a dictionary where a repeated color maps to its last index.
  ///
  /// Only the first 256 colors are used.
  #[inline]
  #[must_use]
  pub fn from_colors(colors: &[RGB8]) -> Self {
    let mut map = BTreeMap::new();
    for (i, c) in colors.iter().take(256).enumerate() {
      map.insert(c.packed(), i as u8);
    }
    Self { map }
  }

  /// Builds a dictionary, failing if any color appears more than once.
  ///
  /// ## Failure
  /// * [PcxError::PaletteDuplicate]
  #[inline]
  pub fn try_build_unique(colors: &[RGB8]) -> Result<Self, PcxError> {
    let mut map = BTreeMap::new();
    for (i, c) in colors.iter().take(256).enumerate() {
      if map.insert(c.packed(), i as u8).is_some() {
        return Err(PcxError::PaletteDuplicate);
      }
    }
    Ok(Self { map })
  }

  /// The index of a color, if it's in the dictionary.
  #[inline]
  #[must_use]
  pub fn index_of(&self, color: RGB8) -> Option<u8> {
    self.map.get(&color.packed()).copied()
  }

  /// Number of distinct colors.
  #[inline]
  #[must_use]
  pub fn len(&self) -> usize {
    self.map.len()
  }

  /// If there's no colors at all.
  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.map.is_empty()
  }
}

/// The first `count` colors of the header palette region.
#[inline]
#[must_use]
pub fn pcx_header_palette_colors(
  region: &[u8; PCX_HEADER_PALETTE_LEN], count: usize,
) -> &[RGB8] {
  let colors: &[RGB8] = cast_slice(region.as_slice());
  &colors[..count.min(colors.len())]
}

/// Reads the trailing 256 color palette.
///
/// `body_end` is the file position just past the compressed body. It's only
/// used to tell a missing palette apart from a malformed one.
///
/// ## Failure
/// * [PcxError::PaletteMarkerMissing] if the byte 769 from the end isn't
///   `0x0C`, and neither is the byte right after the body.
/// * [PcxError::PaletteSizeMismatch] if the byte after the body is `0x0C` but
///   the block after it isn't exactly 768 bytes.
#[inline]
pub fn pcx_trailing_palette(file: &[u8], body_end: usize) -> Result<PcxPalette, PcxError> {
  if let Some(marker_pos) = file.len().checked_sub(PCX_PALETTE_256_LEN + 1) {
    if file[marker_pos] == PCX_PALETTE_256_MARKER {
      let colors: &[RGB8] = cast_slice(&file[marker_pos + 1..]);
      return PcxPalette::try_new(colors, PaletteSource::Trailing256);
    }
  }
  match file.get(body_end) {
    Some(&PCX_PALETTE_256_MARKER) => Err(PcxError::PaletteSizeMismatch),
    _ => Err(PcxError::PaletteMarkerMissing),
  }
}

/// Works out the palette for a decoded header.
///
/// Gives `None` for monochrome and 24-bit files, which have no palette.
///
/// CGA files first try the 4 colors in the header. If two of those are the
/// same color, the file is using the CGA system palette instead, and that gets
/// derived from the flag bits.
///
/// ## Failure
/// * The trailing palette of a 256 color file is bad (see
///   [pcx_trailing_palette]).
/// * Allocation failure.
pub fn pcx_resolve_palette(
  header: &PcxHeader, file: &[u8], body_end: usize,
) -> Result<Option<PcxPalette>, PcxError> {
  use PcxVariant::*;
  let region = header.palette_region();
  let palette = match header.variant() {
    Monochrome | TrueColor24 => return Ok(None),
    Cga4Color => {
      let stored = pcx_header_palette_colors(region, 4);
      match ColorDictionary::try_build_unique(stored) {
        Ok(_) => PcxPalette::try_new(stored, PaletteSource::Header)?,
        Err(_) => PcxPalette::try_from_cga(CgaDescriptor::from_palette_region(region))?,
      }
    }
    variant @ (Planar4Color | Planar8Color | Planar16Color | Nibble16Color) => {
      if pcx_version_has_header_palette(header.version()) {
        let count = variant.index_count().unwrap_or(16);
        PcxPalette::try_new(pcx_header_palette_colors(region, count), PaletteSource::Header)?
      } else {
        PcxPalette::try_ega_default()?
      }
    }
    Indexed256Color => pcx_trailing_palette(file, body_end)?,
  };
  #[cfg(feature = "debug-logging")]
  log::debug!("pcx palette: {:?}, {} colors", palette.source(), palette.colors().len());
  Ok(Some(palette))
}
