use bytemuck::{pod_read_unaligned, Pod};

use crate::PcxError;
use core::mem::size_of;

/// Reads a `T` off the front of the bytes, giving the value and the bytes
/// after it.
#[inline]
pub(crate) fn try_pull_pod<T: Pod>(bytes: &[u8]) -> Result<(T, &[u8]), PcxError> {
  let position = size_of::<T>();
  if bytes.len() >= position {
    let (head, tail) = bytes.split_at(position);
    let a: T = pod_read_unaligned(head);
    Ok((a, tail))
  } else {
    Err(PcxError::InsufficientBytes)
  }
}

/// Bytes needed to hold `pixel_count` pixels of `bits_per_pixel` each, rounded
/// up to a whole byte.
#[inline]
#[must_use]
pub(crate) const fn packed_byte_len(bits_per_pixel: u32, pixel_count: u32) -> usize {
  let bits = bits_per_pixel as usize * pixel_count as usize;
  (bits / 8) + ((bits % 8 != 0) as usize)
}

#[test]
fn test_packed_byte_len() {
  assert_eq!(packed_byte_len(1, 0), 0);
  assert_eq!(packed_byte_len(1, 1), 1);
  assert_eq!(packed_byte_len(1, 8), 1);
  assert_eq!(packed_byte_len(1, 9), 2);
  assert_eq!(packed_byte_len(2, 5), 2);
  assert_eq!(packed_byte_len(4, 3), 2);
  assert_eq!(packed_byte_len(8, 3), 3);
}
