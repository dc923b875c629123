//! The PCX run-length encoding.
//!
//! The compressed stream is a sequence of runs:
//! * A byte with both top bits set (`0xC0..=0xFF`) is a run marker. The low
//!   six bits are the count, and the byte after it is the value to repeat.
//! * Any other byte is a single literal.
//!
//! Since a literal can't have both top bits set, the encoder writes those
//! values as a run of one (`0xC1, value`).
//!
//! Runs are supposed to stop at the end of each plane line, but the decoder
//! doesn't assume that (see [pcx_rle_decode_bitmap]).

use super::PcxHeader;
use crate::PcxError;

use alloc::vec::Vec;

const RUN_MARKER: u8 = 0xC0;
const COUNT_MASK: u8 = 0x3F;

/// The longest run a single marker can describe.
pub const PCX_RLE_MAX_RUN: u8 = 63;

/// One run from the compressed stream: `count` copies of `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub struct PcxRun {
  pub count: u8,
  pub value: u8,
}

/// Iterates the runs of a compressed stream.
///
/// Iteration stops at the end of the data, including when the last byte is a
/// run marker with no value byte after it.
#[derive(Debug, Clone)]
pub struct PcxRleIter<'b> {
  bytes: &'b [u8],
  consumed: usize,
}
impl<'b> PcxRleIter<'b> {
  /// Starts at the front of `bytes`.
  #[inline]
  #[must_use]
  pub const fn new(bytes: &'b [u8]) -> Self {
    Self { bytes, consumed: 0 }
  }

  /// How many compressed bytes have been used so far.
  #[inline]
  #[must_use]
  pub const fn consumed(&self) -> usize {
    self.consumed
  }
}
impl Iterator for PcxRleIter<'_> {
  type Item = PcxRun;
  #[inline]
  fn next(&mut self) -> Option<PcxRun> {
    match self.bytes.get(self.consumed..)? {
      [ch, value, ..] if ch & RUN_MARKER == RUN_MARKER => {
        self.consumed += 2;
        Some(PcxRun { count: ch & COUNT_MASK, value: *value })
      }
      [ch, ..] if ch & RUN_MARKER != RUN_MARKER => {
        self.consumed += 1;
        Some(PcxRun { count: 1, value: *ch })
      }
      _ => None,
    }
  }
}

/// Iterate the runs of RLE compressed PCX data.
#[inline]
#[must_use]
pub fn pcx_iter_rle(bytes: &[u8]) -> PcxRleIter<'_> {
  PcxRleIter::new(bytes)
}

/// Expands runs into `out` until it's full.
///
/// There's no line handling here, a run that goes past the end of `out` just
/// has its extra copies dropped. Gives the number of compressed bytes used.
///
/// ## Failure
/// * The compressed data ran out before `out` was full.
#[inline]
pub fn pcx_rle_decode_line(encoded: &[u8], out: &mut [u8]) -> Result<usize, PcxError> {
  let mut runs = pcx_iter_rle(encoded);
  let mut written = 0;
  while written < out.len() {
    let PcxRun { count, value } = runs.next().ok_or(PcxError::InsufficientBytes)?;
    let end = out.len().min(written + usize::from(count));
    out[written..end].fill(value);
    written = end;
  }
  Ok(runs.consumed())
}

/// Expands a compressed image body into the plane-major decoded bitmap.
///
/// `out` should be [PcxHeader::decoded_len] bytes. Exactly
/// [PcxHeader::stored_line_count] stored lines of
/// [PcxHeader::bytes_per_line_original] bytes each are read, and only the first
/// [PcxHeader::bytes_per_line] bytes of each stored line are kept.
///
/// Two rules apply while a run is being copied out:
/// * When the header says every stored line has one padding byte
///   ([PcxHeader::not_even]) and the last copy of a run lands on that byte,
///   the copy is dropped.
/// * When a run still has copies left as it reaches the final byte of a stored
///   line, that copy is dropped and the line position goes back to 0 *without*
///   counting a new stored line. The rest of the run continues from there.
///
/// Gives the number of compressed bytes used.
///
/// ## Failure
/// * The compressed data ran out before `out` was filled.
pub fn pcx_rle_decode_bitmap(
  body: &[u8], header: &PcxHeader, out: &mut [u8],
) -> Result<usize, PcxError> {
  let stored = usize::from(header.bytes_per_line_original());
  let kept = header.bytes_per_line();
  let not_even = header.not_even();
  let target = header.decoded_len().min(out.len());
  let mut runs = pcx_iter_rle(body);
  let mut written = 0_usize;
  for _ in 0..header.stored_line_count() {
    let mut line_pos = 0_usize;
    while line_pos < stored {
      let PcxRun { count, value } = match runs.next() {
        Some(run) => run,
        None if written >= target => return Ok(runs.consumed()),
        None => return Err(PcxError::InsufficientBytes),
      };
      for j in 0..count {
        let last_copy = j + 1 == count;
        let at_line_end = line_pos + 1 == stored;
        if not_even && at_line_end && last_copy {
          line_pos += 1;
          break;
        }
        if at_line_end && !last_copy {
          line_pos = 0;
          continue;
        }
        if line_pos < kept {
          if written < target {
            out[written] = value;
          }
          written += 1;
        }
        line_pos += 1;
      }
    }
  }
  if written < target {
    return Err(PcxError::InsufficientBytes);
  }
  Ok(runs.consumed())
}

/// The most bytes that [pcx_rle_encode_line] can write for a line of
/// `line_len` bytes.
#[inline]
#[must_use]
pub const fn pcx_rle_max_encoded_len(line_len: usize) -> usize {
  line_len * 2
}

#[inline]
fn put(out: &mut [u8], written: &mut usize, byte: u8) -> Result<(), PcxError> {
  let slot = out.get_mut(*written).ok_or(PcxError::InsufficientBytes)?;
  *slot = byte;
  *written += 1;
  Ok(())
}

/// Compresses one plane line into `out`, giving the number of bytes written.
///
/// Runs are at most [PCX_RLE_MAX_RUN] long and never continue past the end of
/// `line`.
///
/// ## Failure
/// * `out` is too small. A buffer of [pcx_rle_max_encoded_len] bytes is always
///   enough.
pub fn pcx_rle_encode_line(line: &[u8], out: &mut [u8]) -> Result<usize, PcxError> {
  let mut written = 0;
  let mut i = 0;
  while i < line.len() {
    let value = line[i];
    let mut extra: u8 = 0;
    while extra < PCX_RLE_MAX_RUN - 1 && i + 1 < line.len() && line[i + 1] == value {
      extra += 1;
      i += 1;
    }
    if extra > 0 {
      put(out, &mut written, RUN_MARKER | (extra + 1))?;
      put(out, &mut written, value)?;
    } else {
      if value & RUN_MARKER == RUN_MARKER {
        put(out, &mut written, RUN_MARKER | 1)?;
      }
      put(out, &mut written, value)?;
    }
    i += 1;
  }
  Ok(written)
}

/// Compresses a decoded bitmap one stored line at a time.
///
/// ## Failure
/// * Allocation failure.
pub fn pcx_rle_encode_bitmap(decoded: &[u8], bytes_per_line: usize) -> Result<Vec<u8>, PcxError> {
  let mut out: Vec<u8> = Vec::new();
  if bytes_per_line == 0 {
    return Ok(out);
  }
  out.try_reserve(pcx_rle_max_encoded_len(decoded.len()))?;
  out.resize(pcx_rle_max_encoded_len(decoded.len()), 0);
  let mut written = 0;
  for line in decoded.chunks(bytes_per_line) {
    written += pcx_rle_encode_line(line, &mut out[written..])?;
  }
  out.truncate(written);
  Ok(out)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::pcx::PcxHeaderBuilder;

  #[test]
  fn test_escaped_literal() {
    let mut out = [0; 4];
    assert_eq!(pcx_rle_encode_line(&[0xFF], &mut out), Ok(2));
    assert_eq!(&out[..2], &[0xC1, 0xFF]);
    assert_eq!(pcx_rle_encode_line(&[0x3F, 0xC0], &mut out), Ok(3));
    assert_eq!(&out[..3], &[0x3F, 0xC1, 0xC0]);
  }

  #[test]
  fn test_no_repeats_stay_literal() {
    let mut out = [0; 8];
    assert_eq!(pcx_rle_encode_line(&[1, 2, 3, 4], &mut out), Ok(4));
    assert_eq!(&out[..4], &[1, 2, 3, 4]);
  }

  #[test]
  fn test_max_run_boundary() {
    let line = [0x05_u8; 64];
    let mut out = [0; 128];
    let n = pcx_rle_encode_line(&line, &mut out).unwrap();
    assert_eq!(&out[..n], &[0xFF, 0x05, 0x05]);
    assert!(pcx_iter_rle(&out[..n]).all(|run| run.count <= PCX_RLE_MAX_RUN));
    assert_eq!(pcx_iter_rle(&out[..n]).count(), 2);
    let mut back = [0; 64];
    assert_eq!(pcx_rle_decode_line(&out[..n], &mut back), Ok(n));
    assert_eq!(back, line);
  }

  #[test]
  fn test_high_runs_round_trip() {
    let line = [0xC0, 0xC0, 0xC0, 0xFE, 0x00, 0xFF, 0xFF, 0x12];
    let mut out = [0; 16];
    let n = pcx_rle_encode_line(&line, &mut out).unwrap();
    assert_eq!(&out[..n], &[0xC3, 0xC0, 0xC1, 0xFE, 0x00, 0xC2, 0xFF, 0x12]);
    let mut back = [0; 8];
    pcx_rle_decode_line(&out[..n], &mut back).unwrap();
    assert_eq!(back, line);
  }

  #[test]
  fn test_encode_needs_room() {
    let mut out = [0; 1];
    assert_eq!(pcx_rle_encode_line(&[0xFF], &mut out), Err(PcxError::InsufficientBytes));
  }

  #[test]
  fn test_decode_line_truncated() {
    let mut out = [0; 4];
    assert_eq!(pcx_rle_decode_line(&[0xC2, 7], &mut out), Err(PcxError::InsufficientBytes));
    // a marker without its value byte doesn't count as a run
    assert_eq!(pcx_rle_decode_line(&[0xC4], &mut out), Err(PcxError::InsufficientBytes));
  }

  #[test]
  fn test_odd_padding_is_dropped() {
    // 3 pixels wide, 8 bits, stored with 4 bytes per line.
    let header = PcxHeaderBuilder::new()
      .format(8, 1)
      .bounds(0, 0, 2, 1)
      .stored_bytes_per_line(4)
      .build()
      .unwrap();
    assert!(header.not_even());
    assert_eq!(header.decoded_len(), 6);
    // line 0 ends with a literal pad byte, line 1 has a run covering the pad.
    let body = [1, 2, 3, 0, 0xC4, 9];
    let mut out = [0; 6];
    assert_eq!(pcx_rle_decode_bitmap(&body, &header, &mut out), Ok(body.len()));
    assert_eq!(out, [1, 2, 3, 9, 9, 9]);
  }

  #[test]
  fn test_wide_padding_is_dropped() {
    // 2 pixels wide, 8 bits, stored with 4 bytes per line.
    let header = PcxHeaderBuilder::new()
      .format(8, 1)
      .bounds(0, 0, 1, 1)
      .stored_bytes_per_line(4)
      .build()
      .unwrap();
    assert!(!header.not_even());
    assert_eq!(header.decoded_len(), 4);
    // line 0 pads with a run, line 1 pads with literals.
    let body = [1, 2, 0xC2, 9, 3, 4, 5, 6];
    let mut out = [0; 4];
    assert_eq!(pcx_rle_decode_bitmap(&body, &header, &mut out), Ok(body.len()));
    assert_eq!(out, [1, 2, 3, 4]);
  }

  #[test]
  fn test_cross_line_run_resets_line_position() {
    // 4 pixels wide, 8 bits, two lines, no padding.
    let header = PcxHeaderBuilder::new().format(8, 1).bounds(0, 0, 3, 1).build().unwrap();
    assert!(!header.not_even());
    // The 6-run crosses the end of the first stored line: its fourth copy is
    // dropped and the line position restarts without starting line 1.
    let body = [0xC6, 0x07, 0x01, 0x02, 0x03, 0x04];
    let mut out = [0; 8];
    assert_eq!(pcx_rle_decode_bitmap(&body, &header, &mut out), Ok(body.len()));
    assert_eq!(out, [7, 7, 7, 7, 7, 1, 2, 3]);
  }

  #[test]
  fn test_decode_bitmap_truncated() {
    let header = PcxHeaderBuilder::new().format(8, 1).bounds(0, 0, 3, 1).build().unwrap();
    let mut out = [0; 8];
    assert_eq!(
      pcx_rle_decode_bitmap(&[0xC4, 1, 2], &header, &mut out),
      Err(PcxError::InsufficientBytes)
    );
  }

  #[test]
  fn test_encode_bitmap_splits_runs_per_line() {
    let decoded = [5, 5, 5, 5, 5, 5];
    let body = pcx_rle_encode_bitmap(&decoded, 3).unwrap();
    assert_eq!(body, [0xC3, 5, 0xC3, 5]);
  }
}
