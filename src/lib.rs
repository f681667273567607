#![no_std]
#![forbid(unsafe_code)]

//! A crate for encoding and decoding RGBA8 images.
//!
//! Two formats are supported:
//! * [PNG](png), decoding the common non-interlaced 8-bit and indexed color
//!   types, and encoding as RGBA8.
//! * The [raw compressed pixmap](raw) format, the image dimensions and then a
//!   zlib stream of the pixel bytes.
//!
//! Everything decodes to (and encodes from) an [`ImageBuffer`].
//!
//! ```
//! # fn main() -> Result<(), pixcodec::FormatError> {
//! let mut image = pixcodec::ImageBuffer::new(2, 1)?;
//! image.pixels_mut().copy_from_slice(&[255, 0, 0, 255, 0, 0, 255, 128]);
//!
//! let png = pixcodec::encode(&image, &pixcodec::EncodeOptions::default())?;
//! assert_eq!(pixcodec::decode(&png)?, image);
//!
//! let raw = pixcodec::encode_raw(&image)?;
//! assert_eq!(pixcodec::decode_raw(&raw)?, image);
//! # Ok(())
//! # }
//! ```
//!
//! The crate is `no_std`, but it does require `alloc`. Diagnostics go
//! through the [`log`] facade, install a logger to see them.

extern crate alloc;

#[cfg(target_pointer_width = "16")]
compile_error!("this crate assumes 32-bit or bigger pointers!");

use alloc::vec::Vec;

mod error;
pub use error::*;

pub mod pixel_formats;
pub use pixel_formats::*;

mod image;
pub use image::*;

mod parser_helpers;

pub mod zlib;

pub mod png;
pub use png::{DecodeOptions, EncodeOptions, ImageMetadata, PngDecoder, PngEncoder};

pub mod raw;
pub use raw::{decode_raw, encode_raw, encode_raw_with, RawCodec};

/// Decodes PNG bytes with the default [`DecodeOptions`].
#[inline]
pub fn decode(bytes: &[u8]) -> FormatResult<ImageBuffer> {
  decode_with(bytes, &DecodeOptions::default())
}

/// Decodes PNG bytes.
#[inline]
pub fn decode_with(bytes: &[u8], options: &DecodeOptions) -> FormatResult<ImageBuffer> {
  PngDecoder::with_options(*options).decode(bytes)
}

/// Encodes an image as PNG bytes.
#[inline]
pub fn encode(image: &ImageBuffer, options: &EncodeOptions) -> FormatResult<Vec<u8>> {
  PngEncoder::new().encode(image, options)
}

/// Reads the size and pixel format of PNG bytes without decoding them.
#[inline]
pub fn read_header(bytes: &[u8]) -> FormatResult<ImageMetadata> {
  png::read_header(bytes)
}
