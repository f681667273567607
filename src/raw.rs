#![forbid(unsafe_code)]

//! The raw compressed pixmap format.
//!
//! This is the simplest possible way to store an RGBA8 image losslessly:
//!
//! * The width, as a big-endian `u32`.
//! * The height, as a big-endian `u32`.
//! * One zlib stream holding the `width * height * 4` pixel bytes, top row
//!   first.
//!
//! There's no signature, filtering, palette, or checksum other than the zlib
//! stream's own Adler-32.

use alloc::vec::Vec;

use log::debug;

use crate::{
  parser_helpers::*,
  zlib::{compress_into, decompress_to_slice, ZlibStream},
  EncodeOptions, FormatError, FormatResult, ImageBuffer, DecodeOptions,
};

/// Size of the dimensions header.
pub const RAW_HEADER_LEN: usize = 8;

/// Reads and writes raw pixmaps, keeping its compressor between calls.
#[derive(Debug, Default)]
pub struct RawCodec {
  zlib: ZlibStream,
}
impl RawCodec {
  #[inline]
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Appends the encoded image to `out`.
  ///
  /// Only `compression_level` of the options matters, raw pixmaps are always
  /// top row first.
  pub fn encode_into(
    &mut self, image: &ImageBuffer, options: &EncodeOptions, out: &mut Vec<u8>,
  ) -> FormatResult<()> {
    let start = out.len();
    out.extend_from_slice(&image.width().to_be_bytes());
    out.extend_from_slice(&image.height().to_be_bytes());
    if let Err(e) = compress_into(&mut self.zlib, image.pixels(), options.compression_level, out) {
      out.truncate(start);
      return Err(e);
    }
    debug!("encoded {}x{} raw pixmap, {} bytes", image.width(), image.height(), out.len() - start);
    Ok(())
  }

  #[inline]
  pub fn encode(
    &mut self, image: &ImageBuffer, options: &EncodeOptions,
  ) -> FormatResult<Vec<u8>> {
    let mut out = Vec::new();
    self.encode_into(image, options, &mut out)?;
    Ok(out)
  }

  /// Decodes a raw pixmap.
  ///
  /// ## Failure
  /// * `Truncated` if there's not even a full header.
  /// * `InvalidHeader` if either dimension is 0.
  /// * `Oversized` if the image is over `options.max_image_bytes`.
  /// * `DecompressionFailed` if the stream is bad, or doesn't hold exactly
  ///   the image's bytes.
  pub fn decode(&mut self, bytes: &[u8], options: &DecodeOptions) -> FormatResult<ImageBuffer> {
    let (width_bytes, rest) = try_pull_byte_array::<4>(bytes)?;
    let (height_bytes, stream) = try_pull_byte_array::<4>(rest)?;
    let width = u32_be(width_bytes);
    let height = u32_be(height_bytes);
    if width == 0 || height == 0 {
      return Err(FormatError::InvalidHeader);
    }
    let len = match rgba8_byte_count(width, height) {
      Some(len) if len <= options.max_image_bytes => len,
      _ => return Err(FormatError::Oversized),
    };
    debug!("raw pixmap header: {width}x{height}");
    let mut pixels = try_zeroed_vec(len)?;
    let count =
      decompress_to_slice(&mut pixels, core::iter::once(stream), options.verify_checksums)?;
    if count != len {
      debug!("raw pixmap stream held {count} of {len} bytes");
      return Err(FormatError::DecompressionFailed);
    }
    ImageBuffer::from_pixels(width, height, pixels)
  }
}

/// Encodes a raw pixmap at the default compression level.
#[inline]
pub fn encode_raw(image: &ImageBuffer) -> FormatResult<Vec<u8>> {
  encode_raw_with(image, &EncodeOptions::default())
}

/// Encodes a raw pixmap.
#[inline]
pub fn encode_raw_with(image: &ImageBuffer, options: &EncodeOptions) -> FormatResult<Vec<u8>> {
  RawCodec::new().encode(image, options)
}

/// Decodes a raw pixmap with the default [`DecodeOptions`].
#[inline]
pub fn decode_raw(bytes: &[u8]) -> FormatResult<ImageBuffer> {
  RawCodec::new().decode(bytes, &DecodeOptions::default())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn checkerboard() -> ImageBuffer {
    let mut image = ImageBuffer::new(3, 2).unwrap();
    for (i, p) in image.as_rgba8_mut().iter_mut().enumerate() {
      *p = if i % 2 == 0 {
        crate::RGBA8::new(255, 255, 255, 255)
      } else {
        crate::RGBA8::new(0, 0, 0, 128)
      };
    }
    image
  }

  #[test]
  fn test_header_layout() {
    let image = checkerboard();
    let bytes = encode_raw(&image).unwrap();
    assert_eq!(&bytes[..RAW_HEADER_LEN], &[0, 0, 0, 3, 0, 0, 0, 2]);
    assert_eq!(decode_raw(&bytes).unwrap(), image);
  }

  #[test]
  fn test_codec_reuse() {
    let image = checkerboard();
    let mut codec = RawCodec::new();
    let fast = EncodeOptions { compression_level: 1, ..EncodeOptions::default() };
    let a = codec.encode(&image, &fast).unwrap();
    let b = codec.encode(&image, &EncodeOptions::default()).unwrap();
    let opts = DecodeOptions::default();
    assert_eq!(codec.decode(&a, &opts).unwrap(), image);
    assert_eq!(codec.decode(&b, &opts).unwrap(), image);
  }

  #[test]
  fn test_bad_headers() {
    assert_eq!(decode_raw(&[]), Err(FormatError::Truncated));
    assert_eq!(decode_raw(&[0, 0, 0, 1, 0, 0, 0]), Err(FormatError::Truncated));
    assert_eq!(decode_raw(&[0, 0, 0, 0, 0, 0, 0, 1]), Err(FormatError::InvalidHeader));
    assert_eq!(decode_raw(&[0, 0, 0, 1, 0, 0, 0, 0]), Err(FormatError::InvalidHeader));
    assert_eq!(decode_raw(&[255, 255, 255, 255, 255, 255, 255, 255]), Err(FormatError::Oversized));
  }

  #[test]
  fn test_stream_size_must_match() {
    let image = checkerboard();
    let mut bytes = encode_raw(&image).unwrap();
    // claim one more row than the stream holds
    bytes[7] = 3;
    assert_eq!(decode_raw(&bytes), Err(FormatError::DecompressionFailed));
    // and one fewer row, so the stream overflows
    bytes[7] = 1;
    assert_eq!(decode_raw(&bytes), Err(FormatError::DecompressionFailed));
    // missing the tail of the stream
    let bytes = encode_raw(&image).unwrap();
    assert_eq!(decode_raw(&bytes[..bytes.len() - 6]), Err(FormatError::DecompressionFailed));
  }
}
