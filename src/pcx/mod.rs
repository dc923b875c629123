#![forbid(unsafe_code)]

//! Module for ZSoft PC Paintbrush files (PCX).
//!
//! ## Parsing The Format
//!
//! Note: All multi-byte values in PCX are little-endian encoded.
//!
//! * A PCX file always starts with a 128 byte header. It has the
//!   manufacturer byte (always 10), a version, the encoding (always 1, meaning
//!   RLE), the bits per pixel of a single plane, the image bounds, the number of
//!   color planes, and the bytes per plane line. There's also a 48 byte region
//!   that can hold a palette of up to 16 colors.
//! * Next is the compressed body. Each scan line is stored as one line per
//!   color plane, and each of those lines is stored with the header's bytes per
//!   line count. That count can be larger than the width needs, and if it's
//!   exactly one byte larger the extra byte is padding to throw away.
//! * Finally, 256 color files end with the byte `0x0C` and then 768 bytes of
//!   palette.
//!
//! The `(bits_per_pixel, color_planes)` pair picks one of eight layouts, see
//! [PcxVariant]. When there's less than 8 bits per pixel the pixels are packed
//! into each byte, with the leftmost pixel in the highest bits.
//!
//! ## Decoding
//! [pcx_decode] does the whole thing and gives a [PcxImage]. Each step is also
//! available on its own:
//! * [PcxHeader::try_from_bytes]
//! * [pcx_rle_decode_bitmap]
//! * [pcx_resolve_palette]
//! * [pcx_planes_to_pixels]
//!
//! ## Encoding
//! [PcxEncoder] goes from a [PixelBuffer](crate::PixelBuffer) to file bytes,
//! using [pcx_pixels_to_planes], [pcx_rle_encode_bitmap], and
//! [pcx_assemble_file].

mod raw_header;
pub use raw_header::{PCX_HEADER_LEN, PCX_HEADER_PALETTE_LEN};

mod header;
pub use header::*;

mod rle;
pub use rle::*;

mod palette;
pub use palette::*;

mod planes;
pub use planes::*;

mod file;
pub use file::*;

mod sinks;
pub use sinks::*;
