#![forbid(unsafe_code)]

//! Zlib compression and decompression, shared by both formats.
//!
//! Both PNG image data and the raw pixmap format store a zlib stream
//! (deflate data with the 2 byte zlib header and Adler-32 trailer).
//! `miniz_oxide` does the actual work.

use alloc::vec::Vec;

use miniz_oxide::{
  deflate::core::{
    compress_to_output, create_comp_flags_from_zip_params, CompressorOxide, TDEFLFlush,
    TDEFLStatus,
  },
  inflate::decompress_slice_iter_to_slice,
  DataFormat,
};

use crate::{FormatError, FormatResult};

/// Used when the caller doesn't pick a level.
pub const DEFAULT_COMPRESSION_LEVEL: u8 = 6;

/// Levels above this are treated as this.
pub const MAX_COMPRESSION_LEVEL: u8 = 9;

/// A zlib compression stream that can be restarted.
///
/// The compressor's internal tables are a sizable allocation, so an encoder
/// keeps one of these and calls [`start`](Self::start) for each new stream
/// rather than building a fresh one.
pub struct ZlibStream {
  compressor: CompressorOxide,
}
impl core::fmt::Debug for ZlibStream {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("ZlibStream").finish_non_exhaustive()
  }
}
impl Default for ZlibStream {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}
impl ZlibStream {
  #[inline]
  #[must_use]
  pub fn new() -> Self {
    let flags = create_comp_flags_from_zip_params(i32::from(DEFAULT_COMPRESSION_LEVEL), 1, 0);
    Self { compressor: CompressorOxide::new(flags) }
  }

  /// Throws away any previous stream state and begins a new stream.
  ///
  /// Level 0 stores the data without compressing it, levels over
  /// [`MAX_COMPRESSION_LEVEL`] are clamped.
  #[inline]
  pub fn start(&mut self, level: u8) {
    self.compressor.reset();
    self.compressor.set_format_and_level(DataFormat::Zlib, level.min(MAX_COMPRESSION_LEVEL));
  }

  /// Compresses more input, appending any output that's ready to `out`.
  #[inline]
  pub fn write(&mut self, input: &[u8], out: &mut Vec<u8>) -> FormatResult<()> {
    self.push(input, TDEFLFlush::None, out)
  }

  /// Flushes everything and writes the stream trailer. Call
  /// [`start`](Self::start) before using the stream again.
  #[inline]
  pub fn finish(&mut self, out: &mut Vec<u8>) -> FormatResult<()> {
    self.push(&[], TDEFLFlush::Finish, out)
  }

  fn push(&mut self, input: &[u8], flush: TDEFLFlush, out: &mut Vec<u8>) -> FormatResult<()> {
    let finishing = matches!(flush, TDEFLFlush::Finish);
    let (status, consumed) = compress_to_output(&mut self.compressor, input, flush, |bytes| {
      out.extend_from_slice(bytes);
      true
    });
    match status {
      TDEFLStatus::Done if finishing => Ok(()),
      TDEFLStatus::Okay if !finishing && consumed == input.len() => Ok(()),
      _ => Err(FormatError::CompressionFailed),
    }
  }
}

/// Compresses all of `input` as one zlib stream appended to `out`.
pub fn compress_into(
  stream: &mut ZlibStream, input: &[u8], level: u8, out: &mut Vec<u8>,
) -> FormatResult<()> {
  stream.start(level);
  stream.write(input, out)?;
  stream.finish(out)
}

/// Decompresses a zlib stream, which may be split across several slices,
/// into `out`.
///
/// Gives the number of bytes written. The stream must end within the
/// slices, and must not produce more than `out.len()` bytes.
pub fn decompress_to_slice<'inp>(
  out: &mut [u8], input: impl Iterator<Item = &'inp [u8]>, verify_adler32: bool,
) -> FormatResult<usize> {
  match decompress_slice_iter_to_slice(out, input, true, !verify_adler32) {
    Ok(count) => Ok(count),
    Err(status) => {
      log::debug!("inflate stopped: {status:?}");
      Err(FormatError::DecompressionFailed)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use alloc::vec;

  #[test]
  fn test_stream_restarts_cleanly() {
    let data: Vec<u8> = (0..200_u8).cycle().take(5000).collect();
    let mut stream = ZlibStream::new();
    let mut first = Vec::new();
    compress_into(&mut stream, &data, 6, &mut first).unwrap();
    let mut second = Vec::new();
    compress_into(&mut stream, &data, 6, &mut second).unwrap();
    assert_eq!(first, second);
    assert!(first.len() < data.len());

    let mut back = vec![0; data.len()];
    let count = decompress_to_slice(&mut back, core::iter::once(&first[..]), true).unwrap();
    assert_eq!(count, data.len());
    assert_eq!(back, data);
  }

  #[test]
  fn test_level_zero_stores() {
    let data = [7_u8; 100];
    let mut stream = ZlibStream::new();
    let mut out = Vec::new();
    compress_into(&mut stream, &data, 0, &mut out).unwrap();
    // stored blocks can't be smaller than the input
    assert!(out.len() > data.len());
    let mut back = [0_u8; 100];
    assert_eq!(decompress_to_slice(&mut back, core::iter::once(&out[..]), true), Ok(100));
  }

  #[test]
  fn test_split_input_and_corruption() {
    let data: Vec<u8> = (0..=255_u8).collect();
    let mut stream = ZlibStream::new();
    let mut z = Vec::new();
    compress_into(&mut stream, &data, 9, &mut z).unwrap();
    let (a, b) = z.split_at(z.len() / 2);
    let mut back = vec![0; 256];
    assert_eq!(decompress_to_slice(&mut back, [a, b].into_iter(), true), Ok(256));
    assert_eq!(back, data);
    // missing the end of the stream
    assert_eq!(
      decompress_to_slice(&mut back, core::iter::once(a), true),
      Err(FormatError::DecompressionFailed)
    );
    // output buffer too small
    let mut small = vec![0; 10];
    assert_eq!(
      decompress_to_slice(&mut small, core::iter::once(&z[..]), true),
      Err(FormatError::DecompressionFailed)
    );
  }
}
