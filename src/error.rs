use alloc::collections::TryReserveError;

use crate::png::ChunkType;

/// An error from the `pixcodec` crate.
///
/// Every decode or encode failure is terminal for that call. No partially
/// built [`ImageBuffer`](crate::ImageBuffer) is ever handed back alongside one
/// of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum FormatError {
  /// The first 8 bytes aren't the PNG signature.
  #[error("bytes do not start with the png signature")]
  BadSignature,

  /// A length field points past the end of the available bytes.
  #[error("input ended before the declared data")]
  Truncated,

  /// A declared size is larger than the decoder is willing to allocate.
  #[error("declared size exceeds the decoder limits")]
  Oversized,

  /// A chunk showed up somewhere the container rules don't allow it.
  #[error("unexpected {0:?} chunk")]
  UnexpectedChunk(ChunkType),

  /// The header is malformed (bad length, zero size, unknown methods).
  #[error("malformed image header")]
  InvalidHeader,

  /// Bit depth is valid PNG but not handled here (16), or not legal for the
  /// color type.
  #[error("unsupported bit depth {0}")]
  UnsupportedBitDepth(u8),

  /// Only indexed, RGB, and RGBA images are handled.
  #[error("unsupported color type {0}")]
  UnsupportedColorType(u8),

  /// Interlaced images aren't handled.
  #[error("interlaced images are not supported")]
  InterlaceUnsupported,

  /// A scanline declared a filter type outside `0..=4`.
  #[error("invalid scanline filter type {0}")]
  InvalidFilter(u8),

  /// The palette chunk has a bad length or too many entries.
  #[error("malformed palette")]
  InvalidPalette,

  /// An indexed image has no palette chunk before its image data.
  #[error("indexed image has no palette")]
  MissingPalette,

  /// A pixel referenced a palette entry that doesn't exist.
  #[error("palette index {0} out of range")]
  PaletteIndexOutOfRange(u8),

  /// The chunk's stored CRC doesn't match its contents.
  #[error("checksum mismatch in {0:?} chunk")]
  ChecksumMismatch(ChunkType),

  /// The zlib stream was corrupt, short, or too long.
  #[error("decompression failed")]
  DecompressionFailed,

  /// The deflate stream reported an internal failure while encoding.
  #[error("compression failed")]
  CompressionFailed,

  /// Width or height was zero, or the byte size overflows `usize`.
  #[error("invalid image dimensions {width}x{height}")]
  InvalidDimensions {
    /// declared width
    width: u32,
    /// declared height
    height: u32,
  },

  /// The pixel data given doesn't match `width * height * 4`.
  #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
  BufferSizeMismatch {
    /// `width * height * 4`
    expected: usize,
    /// the length actually given
    actual: usize,
  },
}

/// Result alias used throughout the crate.
pub type FormatResult<T> = Result<T, FormatError>;

impl From<TryReserveError> for FormatError {
  #[inline]
  fn from(_: TryReserveError) -> Self {
    Self::Oversized
  }
}
