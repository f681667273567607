use super::*;

use crate::zlib::{ZlibStream, DEFAULT_COMPRESSION_LEVEL};

/// Settings for [`PngEncoder`], also used by the raw pixmap encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodeOptions {
  /// Zlib level, 0 (store only) through 9 (smallest). Larger values act as 9.
  ///
  /// Default: 6
  pub compression_level: u8,

  /// Writes the rows bottom to top.
  ///
  /// Default: `false`
  pub flip_vertically: bool,
}
impl Default for EncodeOptions {
  #[inline]
  fn default() -> Self {
    Self { compression_level: DEFAULT_COMPRESSION_LEVEL, flip_vertically: false }
  }
}

/// Writes an [`ImageBuffer`] as an RGBA8 PNG.
///
/// The output is the signature, `IHDR`, a single `IDAT`, and `IEND`. Every
/// scanline uses filter type 0.
#[derive(Debug, Default)]
pub struct PngEncoder {
  zlib: ZlibStream,
  crc: Crc32,
}
impl PngEncoder {
  #[inline]
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Encodes into a new `Vec`.
  pub fn encode(
    &mut self, image: &ImageBuffer, options: &EncodeOptions,
  ) -> FormatResult<Vec<u8>> {
    let mut out = Vec::new();
    self.encode_into(image, options, &mut out)?;
    Ok(out)
  }

  /// Appends an encoded PNG to `out`.
  ///
  /// ## Failure
  /// * `CompressionFailed` if the zlib stream fails.
  /// * `Oversized` if the compressed data can't fit in one chunk.
  ///
  /// On failure `out` is left as it was before the call.
  pub fn encode_into(
    &mut self, image: &ImageBuffer, options: &EncodeOptions, out: &mut Vec<u8>,
  ) -> FormatResult<()> {
    let start = out.len();
    let result = self.write_png(image, options, out);
    if result.is_err() {
      out.truncate(start);
    }
    result
  }

  fn write_png(
    &mut self, image: &ImageBuffer, options: &EncodeOptions, out: &mut Vec<u8>,
  ) -> FormatResult<()> {
    let start = out.len();
    out.extend_from_slice(&PNG_SIGNATURE);

    let mut ihdr = [0_u8; 13];
    ihdr[0..4].copy_from_slice(&image.width().to_be_bytes());
    ihdr[4..8].copy_from_slice(&image.height().to_be_bytes());
    ihdr[8] = 8;
    ihdr[9] = PngColorType::RGBA as u8;
    // compression, filter, and interlace methods all stay 0
    self.write_chunk(ChunkType::IHDR, &ihdr, out);

    // the IDAT length isn't known until the stream finishes
    let len_pos = out.len();
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&ChunkType::IDAT.0);
    let data_pos = out.len();
    self.zlib.start(options.compression_level);
    if options.flip_vertically {
      for row in image.rows().rev() {
        write_scanline(&mut self.zlib, row, out)?;
      }
    } else {
      for row in image.rows() {
        write_scanline(&mut self.zlib, row, out)?;
      }
    }
    self.zlib.finish(out)?;
    let data_len = out.len() - data_pos;
    if data_len > MAX_CHUNK_LENGTH as usize {
      return Err(FormatError::Oversized);
    }
    out[len_pos..data_pos - 4].copy_from_slice(&(data_len as u32).to_be_bytes());
    self.crc.reset();
    self.crc.update(&out[data_pos - 4..]);
    let crc = self.crc.finish();
    out.extend_from_slice(&crc.to_be_bytes());
    trace!("wrote IDAT, {data_len} bytes");

    self.write_chunk(ChunkType::IEND, &[], out);
    debug!(
      "encoded {}x{} png, {} bytes",
      image.width(),
      image.height(),
      out.len() - start
    );
    Ok(())
  }

  fn write_chunk(&mut self, chunk_ty: ChunkType, data: &[u8], out: &mut Vec<u8>) {
    debug_assert!(data.len() <= MAX_CHUNK_LENGTH as usize);
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(&chunk_ty.0);
    out.extend_from_slice(data);
    self.crc.reset();
    self.crc.update(&chunk_ty.0);
    self.crc.update(data);
    out.extend_from_slice(&self.crc.finish().to_be_bytes());
    trace!("wrote {chunk_ty:?}, {} bytes", data.len());
  }
}

fn write_scanline(zlib: &mut ZlibStream, row: &[u8], out: &mut Vec<u8>) -> FormatResult<()> {
  // filter type None
  zlib.write(&[0], out)?;
  zlib.write(row, out)
}
