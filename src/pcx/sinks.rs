//! Plumbing to the outside world.
//!
//! The codec never does any I/O itself. These traits are the shape of the
//! things that get bytes in and send pixels or files out, so the whole
//! load/show/save path can be wired up in one call.

use alloc::vec::Vec;

use super::{pcx_decode, PcxEncoder, PcxImage};
use crate::{PcxError, PixelBuffer};

/// Something that has the complete bytes of a file.
pub trait ByteSource {
  /// All of the bytes, there's no partial reads.
  fn bytes(&self) -> &[u8];
}
impl ByteSource for [u8] {
  #[inline]
  fn bytes(&self) -> &[u8] {
    self
  }
}
impl ByteSource for Vec<u8> {
  #[inline]
  fn bytes(&self) -> &[u8] {
    self.as_slice()
  }
}
impl<const N: usize> ByteSource for [u8; N] {
  #[inline]
  fn bytes(&self) -> &[u8] {
    self.as_slice()
  }
}

/// Something that shows decoded pixels.
pub trait PixelSink {
  /// `rgba` is `width * height` pixels of `[r, g, b, a]`, row-major, top row
  /// first.
  fn present(&mut self, width: u32, height: u32, rgba: &[u8]);
}

/// Something that saves an encoded file.
pub trait ByteSink {
  /// Takes the finished file and a name it could be saved as.
  fn accept(&mut self, bytes: Vec<u8>, suggested_name: &str);
}

/// Decodes everything from `source` and hands the pixels to `sink`.
///
/// The sink is only called if decoding worked. The decoded image is returned
/// either way so that it can be saved again.
///
/// ## Failure
/// * Anything [pcx_decode] can fail with.
#[inline]
pub fn pcx_decode_to_sink<S, K>(source: &S, sink: &mut K) -> Result<PcxImage, PcxError>
where
  S: ByteSource + ?Sized,
  K: PixelSink + ?Sized,
{
  let image = pcx_decode(source.bytes())?;
  sink.present(image.pixels.width, image.pixels.height, image.pixels.as_rgba_bytes());
  Ok(image)
}

impl PcxEncoder<'_> {
  /// Encodes the image and hands the file to `sink`.
  ///
  /// `stem` gets `.pcx` added to make the suggested name. The sink is never
  /// called if encoding fails.
  ///
  /// ## Failure
  /// * Anything [encode](Self::encode) can fail with.
  #[inline]
  pub fn encode_to_sink<K>(&self, image: &PixelBuffer, stem: &str, sink: &mut K) -> Result<(), PcxError>
  where
    K: ByteSink + ?Sized,
  {
    let bytes = self.encode(image)?;
    let mut name = alloc::string::String::new();
    name.try_reserve(stem.len() + 4)?;
    name.push_str(stem);
    name.push_str(".pcx");
    sink.accept(bytes, &name);
    Ok(())
  }
}
