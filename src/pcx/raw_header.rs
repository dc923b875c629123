//! The on-disk header, byte for byte.
//!
//! Users get a [PcxHeader](super::PcxHeader) instead, which has the derived
//! geometry worked out and can't be left half-built.

use pack1::*;

pub(crate) const PCX_MANUFACTURER: u8 = 10;
pub(crate) const PCX_ENCODING_RLE: u8 = 1;
pub const PCX_HEADER_LEN: usize = 128;
pub const PCX_HEADER_PALETTE_LEN: usize = 48;

#[derive(Debug, Clone, Copy, bytemuck::Zeroable, bytemuck::Pod)]
#[repr(C)]
pub(crate) struct RawPcxHeader {
  /// always 10
  pub manufacturer: u8,
  pub version: u8,
  /// 1 means RLE, which is the only encoding this crate handles.
  pub encoding: u8,
  pub bits_per_pixel: u8,
  pub x_min: U16LE,
  pub y_min: U16LE,
  /// inclusive
  pub x_max: U16LE,
  /// inclusive
  pub y_max: U16LE,
  pub h_res: U16LE,
  pub v_res: U16LE,
  /// 16 color palette, or the CGA flag bytes.
  pub palette: [u8; PCX_HEADER_PALETTE_LEN],
  pub reserved: u8,
  pub color_planes: u8,
  pub bytes_per_line: U16LE,
  pub palette_type: U16LE,
  pub h_screen_size: U16LE,
  pub v_screen_size: U16LE,
  pub filler: [u8; 54],
}
const _: () = assert!(core::mem::size_of::<RawPcxHeader>() == PCX_HEADER_LEN);
