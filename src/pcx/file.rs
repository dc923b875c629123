//! Whole-file decoding and encoding.

use alloc::vec::Vec;
use bytemuck::cast_slice;
use ::pixel_formats::r8g8b8a8_Srgb;

use super::*;
use crate::{image::Bitmap, PcxError, PixelBuffer, RGBA8};

/// Concatenates a header, a compressed body, and (for 256 colors) the marker
/// byte and trailing palette.
///
/// ## Failure
/// * Allocation failure.
#[inline]
pub fn pcx_assemble_file(
  header: &[u8; PCX_HEADER_LEN], body: &[u8], trailing_palette: Option<&PcxPalette>,
) -> Result<Vec<u8>, PcxError> {
  let trailer: &[u8] = trailing_palette.map(|p| cast_slice(p.colors())).unwrap_or(&[]);
  let trailer_len = if trailing_palette.is_some() { 1 + trailer.len() } else { 0 };
  let mut out = Vec::new();
  out.try_reserve(header.len() + body.len() + trailer_len)?;
  out.extend_from_slice(header);
  out.extend_from_slice(body);
  if trailing_palette.is_some() {
    out.push(PCX_PALETTE_256_MARKER);
    out.extend_from_slice(trailer);
  }
  Ok(out)
}

/// Everything that decoding a file gives back.
///
/// Keeping the header and palette around means the image can be saved again
/// the same way it was loaded (see [PcxImage::encoder]).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PcxImage {
  /// The parsed header.
  pub header: PcxHeader,
  /// The palette in use, `None` for monochrome and 24-bit images.
  pub palette: Option<PcxPalette>,
  /// The decoded pixels, always fully opaque.
  pub pixels: PixelBuffer,
}
impl PcxImage {
  /// An encoder set up with this image's variant, version, palette,
  /// resolution, and palette type.
  #[inline]
  #[must_use]
  pub fn encoder(&self) -> PcxEncoder<'_> {
    let (h_res, v_res) = self.header.resolution();
    let mut encoder = PcxEncoder::new(self.header.variant())
      .version(self.header.version())
      .resolution(h_res, v_res)
      .palette_type(self.header.palette_type());
    if let Some(palette) = self.palette.as_ref() {
      encoder = encoder.palette(palette);
    }
    encoder
  }
}

/// The largest width or height that [pcx_decode] will accept.
///
/// The format allows up to 65536, but a small file can declare a huge image,
/// so decoding stops here to avoid accidental out-of-memory problems.
pub const PCX_DECODE_DIMENSION_LIMIT: u32 = 17_000;

/// Decodes the bytes of a PCX file.
///
/// ## Failure
/// * Any header error (see [PcxHeader::try_from_bytes]).
/// * [PcxError::DimensionsTooLarge] if either dimension is above
///   [PCX_DECODE_DIMENSION_LIMIT].
/// * [PcxError::InsufficientBytes] if the compressed body ends before the
///   image is complete.
/// * The trailing palette of a 256 color file is missing or the wrong size.
/// * Allocation failure.
pub fn pcx_decode(bytes: &[u8]) -> Result<PcxImage, PcxError> {
  let (header, body) = PcxHeader::try_from_bytes(bytes)?;
  #[cfg(feature = "debug-logging")]
  log::debug!(
    "pcx header: v{} {:?} {}x{}, {} bytes per line ({} stored)",
    header.version(),
    header.variant(),
    header.width(),
    header.height(),
    header.bytes_per_line(),
    header.bytes_per_line_original()
  );
  if header.width() > PCX_DECODE_DIMENSION_LIMIT || header.height() > PCX_DECODE_DIMENSION_LIMIT {
    return Err(PcxError::DimensionsTooLarge);
  }
  // two bytes of body can expand to at most 63 bytes
  if header.decoded_len() / 32 > body.len() {
    return Err(PcxError::InsufficientBytes);
  }
  let mut decoded: Vec<u8> = Vec::new();
  decoded.try_reserve(header.decoded_len())?;
  decoded.resize(header.decoded_len(), 0);
  let consumed = pcx_rle_decode_bitmap(body, &header, &mut decoded)?;
  #[cfg(feature = "debug-logging")]
  log::debug!("pcx body: {} compressed bytes, {} decoded bytes", consumed, decoded.len());
  let palette = pcx_resolve_palette(&header, bytes, PCX_HEADER_LEN + consumed)?;
  let mut pixels = PixelBuffer::try_new_filled(header.width(), header.height(), RGBA8::BLACK)?;
  let colors = palette.as_ref().map(PcxPalette::colors).unwrap_or(&[]);
  pcx_planes_to_pixels(&header, colors, &decoded, &mut pixels.pixels);
  Ok(PcxImage { header, palette, pixels })
}

impl<P> Bitmap<P>
where
  P: From<r8g8b8a8_Srgb>,
{
  /// Attempts to parse the bytes of a PCX file into a bitmap.
  ///
  /// ## Failure
  /// * Anything [pcx_decode] can fail with.
  #[cfg_attr(docs_rs, doc(cfg(feature = "pcx")))]
  #[inline]
  pub fn try_from_pcx_bytes(bytes: &[u8]) -> Result<Self, PcxError> {
    let PcxImage { pixels: Bitmap { width, height, pixels }, .. } = pcx_decode(bytes)?;
    let mut v: Vec<P> = Vec::new();
    v.try_reserve(pixels.len())?;
    v.extend(pixels.into_iter().map(|p| P::from(r8g8b8a8_Srgb::from(p))));
    Ok(Self { width, height, pixels: v })
  }
}

/// Encodes a [PixelBuffer] as a PCX file.
///
/// ```no_run
/// # use pcx_codec::{pcx::*, PixelBuffer};
/// # fn f(image: &PixelBuffer) -> Result<(), pcx_codec::PcxError> {
/// let bytes = PcxEncoder::new(PcxVariant::TrueColor24).encode(image)?;
/// # Ok(()) }
/// ```
///
/// Planar and nibble images with no palette set use the EGA default palette.
/// CGA and 256 color images need a palette.
#[derive(Debug, Clone, Copy)]
pub struct PcxEncoder<'p> {
  variant: PcxVariant,
  palette: Option<&'p PcxPalette>,
  version: Option<u8>,
  resolution: (u16, u16),
  palette_type: u16,
}
impl<'p> PcxEncoder<'p> {
  /// An encoder for the given variant.
  #[inline]
  #[must_use]
  pub const fn new(variant: PcxVariant) -> Self {
    Self { variant, palette: None, version: None, resolution: (0, 0), palette_type: 1 }
  }

  /// Sets the palette.
  #[inline]
  #[must_use]
  pub const fn palette(mut self, palette: &'p PcxPalette) -> Self {
    self.palette = Some(palette);
    self
  }

  /// Overrides the version byte (otherwise see [default_version](Self::default_version)).
  #[inline]
  #[must_use]
  pub const fn version(mut self, version: u8) -> Self {
    self.version = Some(version);
    self
  }

  /// Sets the horizontal and vertical resolution fields.
  #[inline]
  #[must_use]
  pub const fn resolution(mut self, h_res: u16, v_res: u16) -> Self {
    self.resolution = (h_res, v_res);
    self
  }

  /// Sets the palette type field.
  #[inline]
  #[must_use]
  pub const fn palette_type(mut self, palette_type: u16) -> Self {
    self.palette_type = palette_type;
    self
  }

  /// The version written when none is set.
  ///
  /// * Monochrome, or CGA with a system palette: 0
  /// * The EGA default palette (or no palette): 3
  /// * A palette in the header, 256 color, and 24-bit: 5
  #[inline]
  #[must_use]
  pub fn default_version(&self) -> u8 {
    use PcxVariant::*;
    match (self.variant, self.palette.map(PcxPalette::source)) {
      (Monochrome, _) => PCX_VERSION_2_5,
      (Indexed256Color | TrueColor24, _) => PCX_VERSION_3_0,
      (Cga4Color, Some(PaletteSource::Cga(_))) => PCX_VERSION_2_5,
      (_, None | Some(PaletteSource::EgaDefault)) => PCX_VERSION_2_8_NO_PALETTE,
      (_, Some(_)) => PCX_VERSION_3_0,
    }
  }

  /// Encodes the image.
  ///
  /// ## Failure
  /// * [PcxError::PixelBufferSizeMismatch] if the pixel count isn't
  ///   `width * height`.
  /// * [PcxError::InvalidDimensions] if either dimension is 0 or above 65536.
  /// * [PcxError::PaletteMissing] for CGA or 256 colors without a palette.
  /// * [PcxError::PaletteSizeMismatch] for 256 colors without exactly 256
  ///   palette entries, or a header palette of more than 16.
  /// * [PcxError::PaletteDuplicate] for a literal CGA palette that repeats a
  ///   color in its first 4 entries, since it would read back as a CGA system
  ///   palette.
  /// * [PcxError::ColorNotInPalette] if a pixel has a color the variant can't
  ///   index.
  /// * Allocation failure.
  pub fn encode(&self, image: &PixelBuffer) -> Result<Vec<u8>, PcxError> {
    use PcxVariant::*;
    if !image.is_well_formed() {
      return Err(PcxError::PixelBufferSizeMismatch);
    }
    let ega;
    let palette: Option<&PcxPalette> = match (self.variant, self.palette) {
      (Monochrome | TrueColor24, _) => None,
      (Cga4Color | Indexed256Color, None) => return Err(PcxError::PaletteMissing),
      (_, None) => {
        ega = PcxPalette::try_ega_default()?;
        Some(&ega)
      }
      (_, Some(p)) => Some(p),
    };
    let region = match (self.variant, palette) {
      (_, None) | (Indexed256Color, _) => [0; PCX_HEADER_PALETTE_LEN],
      (_, Some(p)) if p.colors().len() > 16 => return Err(PcxError::PaletteSizeMismatch),
      (Cga4Color, Some(p)) => {
        let region = p.header_region();
        if !matches!(p.source(), PaletteSource::Cga(_)) {
          ColorDictionary::try_build_unique(pcx_header_palette_colors(&region, 4))?;
        }
        region
      }
      (_, Some(p)) => p.literal_region(),
    };
    if let (Indexed256Color, Some(p)) = (self.variant, palette) {
      if p.colors().len() != 256 {
        return Err(PcxError::PaletteSizeMismatch);
      }
    }
    let (h_res, v_res) = self.resolution;
    let header = PcxHeaderBuilder::new()
      .version(self.version.unwrap_or_else(|| self.default_version()))
      .variant(self.variant)
      .dimensions(image.width, image.height)?
      .resolution(h_res, v_res)
      .palette_region(region)
      .palette_type(self.palette_type)
      .build()?;
    let dictionary = palette.map(|p| p.dictionary_for(self.variant)).unwrap_or_default();
    let mut decoded: Vec<u8> = Vec::new();
    decoded.try_reserve(header.decoded_len())?;
    decoded.resize(header.decoded_len(), 0);
    pcx_pixels_to_planes(&header, &dictionary, &image.pixels, &mut decoded)?;
    let body = pcx_rle_encode_bitmap(&decoded, header.bytes_per_line())?;
    #[cfg(feature = "debug-logging")]
    log::debug!(
      "pcx encode: v{} {:?} {}x{}, compressed to {} bytes",
      header.version(),
      header.variant(),
      header.width(),
      header.height(),
      body.len()
    );
    let trailing = if self.variant == Indexed256Color { palette } else { None };
    let header_bytes: [u8; PCX_HEADER_LEN] = header.into();
    pcx_assemble_file(&header_bytes, &body, trailing)
  }
}
