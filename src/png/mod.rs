#![forbid(unsafe_code)]

//! Module for working with PNG data.
//!
//! * [Portable Network Graphics Specification (Second Edition)][png-spec]
//!
//! [png-spec]: https://www.w3.org/TR/2003/REC-PNG-20031110/
//!
//! ## What's Supported
//!
//! Decoding handles non-interlaced images with these pixel formats:
//! * Indexed color at 1, 2, 4, or 8 bits per pixel, with or without a
//!   transparency chunk.
//! * RGB at 8 bits per channel.
//! * RGBA at 8 bits per channel.
//!
//! Everything else (greyscale, 16-bit channels, interlacing) is rejected with
//! a specific [`FormatError`] rather than approximated. Output is always RGBA8.
//!
//! Encoding always writes RGBA8, non-interlaced, with every scanline using
//! filter type 0 (None).
//!
//! ## Container Layout
//!
//! The general format of a PNG is that the information is stored in "chunks",
//! after an 8 byte signature. Each chunk is a big-endian length, a 4 byte type
//! code, the data, and a CRC-32 of the type and data. There's four chunk types
//! that matter here:
//! * **Header** (`IHDR`) - Must be first. The image's dimensions and pixel
//!   format.
//! * **Palette** (`PLTE`) - Indexed color images only, the `RGB8` color of
//!   each index.
//! * **Transparency** (`tRNS`) - Optional, after the palette. The alpha of
//!   each palette index.
//! * **Image Data** (`IDAT`) - One or more chunks of compressed data. All of
//!   the compressed data forms a single zlib data stream.
//! * **End** (`IEND`) - The last chunk, lets you know you had the full PNG and
//!   your data wasn't truncated accidentally.
//!
//! Other ancillary chunks are skipped when decoding, and never written.
//!
//! ## Decoding Steps
//!
//! 1) [`RawChunkIter`] checks the signature and splits the bytes into chunks,
//!    checking each CRC.
//! 2) The header becomes an [`ImageMetadata`], and (for indexed images) the
//!    palette and transparency become a [`PaletteTable`].
//! 3) The image data chunks are concatenated and decompressed. This gives
//!    *filtered* data: each line is a filter type byte and then the line's
//!    bytes.
//! 4) A [`ScanlineReconstructor`] unfilters each line and expands it to RGBA8
//!    in the final buffer.
//!
//! [`PngDecoder`] runs all of that for you.

use core::fmt::{Debug, Write};

use alloc::vec::Vec;
use log::{debug, trace, warn};

use crate::{
  parser_helpers::*,
  pixel_formats::{RGB8, RGBA8},
  FormatError, FormatResult, ImageBuffer,
};

/// The first eight bytes of a PNG datastream should match these bytes.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

mod crc32;
pub use crc32::*;

mod raw_chunk;
pub use raw_chunk::*;

mod ihdr;
pub use ihdr::*;

mod plte;
pub use plte::*;

mod unfilter;
pub use unfilter::*;

mod decoder;
pub use decoder::*;

mod encoder;
pub use encoder::*;


/// Checks if the PNG's initial 8 bytes are correct.
///
/// * If this is the case, the rest of the bytes are very likely PNG data.
/// * If this is *not* the case, the rest of the bytes are very likely *not* PNG
///   data.
#[inline]
#[must_use]
pub const fn is_png_header_correct(bytes: &[u8]) -> bool {
  matches!(bytes, [137, 80, 78, 71, 13, 10, 26, 10, ..])
}
