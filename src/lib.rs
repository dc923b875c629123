#![no_std]
#![cfg_attr(docs_rs, feature(doc_cfg))]
//#![warn(missing_docs)]

//! A crate for PCX image decoding and encoding.
//!
//! The codec works entirely on in-memory buffers: give it the bytes of a file
//! and get back pixels, or give it pixels and get back the bytes of a file.
//!
//! * The `alloc` feature enables [Bitmap] and [PixelBuffer].
//! * The `pcx` feature (on by default) enables the [pcx] module.
//! * The `debug-logging` feature emits [log](https://docs.rs/log) records
//!   about each decode and encode. Nothing is logged otherwise.

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(target_pointer_width = "16")]
compile_error!("this crate assumes 32-bit or bigger pointers!");

mod error;
pub use error::*;

pub mod pixels;
pub use pixels::*;

mod util;
pub(crate) use util::*;

#[cfg(feature = "alloc")]
pub mod image;
#[cfg(feature = "alloc")]
pub use image::*;

#[cfg(feature = "pcx")]
#[cfg_attr(docs_rs, doc(cfg(feature = "pcx")))]
pub mod pcx;
