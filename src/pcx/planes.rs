//! Conversion between the decoded plane bitmap and RGBA pixels.
//!
//! The decoded bitmap is plane-major within each row: row `r`, plane `p` is
//! the [bytes_per_line](PcxHeader::bytes_per_line) bytes starting at
//! `(r * color_planes + p) * bytes_per_line`.
//!
//! Packed pixels are stored high bits first. When the width doesn't fill the
//! last byte of a line, the unused low bits are 0 and ignored when decoding.

use bitfrob::u8_replicate_bits;

use super::{ColorDictionary, PcxHeader, PcxVariant};
use crate::{PcxError, RGB8, RGBA8};

/// Fills `out` (`width * height` pixels) from a decoded bitmap.
///
/// The palette is empty for the variants that don't use one.
pub type PlaneDecodeFn = fn(header: &PcxHeader, palette: &[RGB8], decoded: &[u8], out: &mut [RGBA8]);

/// Fills a decoded bitmap (`decoded_len` bytes) from pixels.
///
/// The dictionary is ignored by the variants that don't use a palette.
pub type PlaneEncodeFn = fn(
  header: &PcxHeader,
  dictionary: &ColorDictionary,
  pixels: &[RGBA8],
  out: &mut [u8],
) -> Result<(), PcxError>;

/// The decode and encode functions for one variant.
#[derive(Clone, Copy)]
#[allow(missing_docs)]
pub struct PlaneCodec {
  pub decode: PlaneDecodeFn,
  pub encode: PlaneEncodeFn,
}
impl core::fmt::Debug for PlaneCodec {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_str("PlaneCodec")
  }
}

impl PcxVariant {
  /// The transcoder pair for this variant.
  #[inline]
  #[must_use]
  pub fn plane_codec(self) -> PlaneCodec {
    use PcxVariant::*;
    match self {
      Monochrome => PlaneCodec { decode: decode_monochrome, encode: encode_monochrome },
      Cga4Color | Nibble16Color | Indexed256Color => {
        PlaneCodec { decode: decode_packed_indexed, encode: encode_packed_indexed }
      }
      Planar4Color | Planar8Color | Planar16Color => {
        PlaneCodec { decode: decode_planar, encode: encode_planar }
      }
      TrueColor24 => PlaneCodec { decode: decode_true_color, encode: encode_true_color },
    }
  }
}

/// Decoded bitmap to pixels, picking the transcoder by the header's variant.
#[inline]
pub fn pcx_planes_to_pixels(
  header: &PcxHeader, palette: &[RGB8], decoded: &[u8], out: &mut [RGBA8],
) {
  (header.variant().plane_codec().decode)(header, palette, decoded, out)
}

/// Pixels to decoded bitmap, picking the transcoder by the header's variant.
///
/// ## Failure
/// * [PcxError::ColorNotInPalette] if a pixel's color isn't in the dictionary.
#[inline]
pub fn pcx_pixels_to_planes(
  header: &PcxHeader, dictionary: &ColorDictionary, pixels: &[RGBA8], out: &mut [u8],
) -> Result<(), PcxError> {
  (header.variant().plane_codec().encode)(header, dictionary, pixels, out)
}

#[inline]
fn row_stride(header: &PcxHeader) -> usize {
  header.bytes_per_line() * usize::from(header.color_planes())
}

#[inline]
fn rows<'a>(
  header: &PcxHeader, decoded: &'a [u8], out: &'a mut [RGBA8],
) -> impl Iterator<Item = (&'a [u8], &'a mut [RGBA8])> {
  decoded.chunks_exact(row_stride(header)).zip(out.chunks_exact_mut(header.width() as usize))
}

#[inline]
fn rows_mut<'a>(
  header: &PcxHeader, out: &'a mut [u8], pixels: &'a [RGBA8],
) -> impl Iterator<Item = (&'a mut [u8], &'a [RGBA8])> {
  out.chunks_exact_mut(row_stride(header)).zip(pixels.chunks_exact(header.width() as usize))
}

#[inline]
fn lookup(dictionary: &ColorDictionary, p: RGBA8) -> Result<u8, PcxError> {
  dictionary.index_of(p.rgb()).ok_or(PcxError::ColorNotInPalette)
}

/// Unpacks one single-plane line, high bits first.
fn unpack_line(line: &[u8], bits: u32, row: &mut [RGBA8], mut f: impl FnMut(u8) -> RGBA8) {
  let base_mask: u8 = 0xFF << (8 - bits);
  let base_down_shift: u32 = 8 - bits;
  let mut x = 0;
  for byte in line.iter().copied() {
    let mut mask = base_mask;
    let mut down_shift = base_down_shift;
    while mask != 0 && x < row.len() {
      row[x] = f((byte & mask) >> down_shift);
      //
      mask = mask.checked_shr(bits).unwrap_or(0);
      down_shift = down_shift.wrapping_sub(bits);
      x += 1;
    }
  }
}

/// Packs one single-plane line, high bits first.
fn pack_line(
  row: &[RGBA8], bits: u32, line: &mut [u8],
  mut f: impl FnMut(RGBA8) -> Result<u8, PcxError>,
) -> Result<(), PcxError> {
  let per_byte = (8 / bits) as usize;
  for (byte, pixels) in line.iter_mut().zip(row.chunks(per_byte)) {
    let mut packed = 0_u8;
    let mut down_shift = 8 - bits;
    for p in pixels.iter().copied() {
      packed |= f(p)? << down_shift;
      down_shift = down_shift.wrapping_sub(bits);
    }
    *byte = packed;
  }
  Ok(())
}

fn decode_monochrome(header: &PcxHeader, _: &[RGB8], decoded: &[u8], out: &mut [RGBA8]) {
  for (line, row) in rows(header, decoded, out) {
    unpack_line(line, 1, row, |bit| {
      let y = u8_replicate_bits(1, bit);
      RGBA8 { r: y, g: y, b: y, a: 0xFF }
    });
  }
}

// Only the top bit of red matters.
fn encode_monochrome(
  header: &PcxHeader, _: &ColorDictionary, pixels: &[RGBA8], out: &mut [u8],
) -> Result<(), PcxError> {
  for (line, row) in rows_mut(header, out, pixels) {
    pack_line(row, 1, line, |p| Ok(p.r >> 7))?;
  }
  Ok(())
}

/// CGA (2 bit), nibble (4 bit), and 256 color (8 bit) indexes.
fn decode_packed_indexed(header: &PcxHeader, palette: &[RGB8], decoded: &[u8], out: &mut [RGBA8]) {
  let bits = u32::from(header.bits_per_pixel());
  for (line, row) in rows(header, decoded, out) {
    unpack_line(line, bits, row, |i| palette.get(usize::from(i)).copied().unwrap_or_default().opaque());
  }
}

fn encode_packed_indexed(
  header: &PcxHeader, dictionary: &ColorDictionary, pixels: &[RGBA8], out: &mut [u8],
) -> Result<(), PcxError> {
  let bits = u32::from(header.bits_per_pixel());
  for (line, row) in rows_mut(header, out, pixels) {
    pack_line(row, bits, line, |p| lookup(dictionary, p))?;
  }
  Ok(())
}

/// 1 bit per plane, 2 to 4 planes. The first plane is the lowest index bit.
fn decode_planar(header: &PcxHeader, palette: &[RGB8], decoded: &[u8], out: &mut [RGBA8]) {
  let bytes_per_line = header.bytes_per_line();
  for (lines, row) in rows(header, decoded, out) {
    for (x, p) in row.iter_mut().enumerate() {
      let (byte, bit) = (x / 8, 7 - (x % 8));
      let index = lines
        .chunks_exact(bytes_per_line)
        .enumerate()
        .fold(0_u8, |acc, (plane, line)| acc | ((line[byte] >> bit) & 1) << plane);
      *p = palette.get(usize::from(index)).copied().unwrap_or_default().opaque();
    }
  }
}

fn encode_planar(
  header: &PcxHeader, dictionary: &ColorDictionary, pixels: &[RGBA8], out: &mut [u8],
) -> Result<(), PcxError> {
  let bytes_per_line = header.bytes_per_line();
  for (lines, row) in rows_mut(header, out, pixels) {
    lines.fill(0);
    for (x, p) in row.iter().copied().enumerate() {
      let index = lookup(dictionary, p)?;
      let (byte, bit) = (x / 8, 7 - (x % 8));
      for (plane, line) in lines.chunks_exact_mut(bytes_per_line).enumerate() {
        line[byte] |= ((index >> plane) & 1) << bit;
      }
    }
  }
  Ok(())
}

/// Red, green, then blue plane, one byte per channel.
fn decode_true_color(header: &PcxHeader, _: &[RGB8], decoded: &[u8], out: &mut [RGBA8]) {
  let bytes_per_line = header.bytes_per_line();
  for (lines, row) in rows(header, decoded, out) {
    let (reds, rest) = lines.split_at(bytes_per_line);
    let (greens, blues) = rest.split_at(bytes_per_line);
    for (p, ((r, g), b)) in row.iter_mut().zip(reds.iter().zip(greens).zip(blues)) {
      *p = RGBA8 { r: *r, g: *g, b: *b, a: 0xFF };
    }
  }
}

fn encode_true_color(
  header: &PcxHeader, _: &ColorDictionary, pixels: &[RGBA8], out: &mut [u8],
) -> Result<(), PcxError> {
  let bytes_per_line = header.bytes_per_line();
  for (lines, row) in rows_mut(header, out, pixels) {
    let (reds, rest) = lines.split_at_mut(bytes_per_line);
    let (greens, blues) = rest.split_at_mut(bytes_per_line);
    for (p, ((r, g), b)) in
      row.iter().zip(reds.iter_mut().zip(greens.iter_mut()).zip(blues.iter_mut()))
    {
      *r = p.r;
      *g = p.g;
      *b = p.b;
    }
  }
  Ok(())
}
