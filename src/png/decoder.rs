use super::*;

/// Settings for [`PngDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodeOptions {
  /// Check each chunk's CRC and the zlib stream's Adler-32.
  ///
  /// Default: `true`
  pub verify_checksums: bool,

  /// The largest final image (`width * height * 4` bytes) that will be
  /// allocated. Larger images give `Oversized` before anything is allocated.
  ///
  /// Default: 1 GiB
  pub max_image_bytes: usize,
}
impl Default for DecodeOptions {
  #[inline]
  fn default() -> Self {
    Self { verify_checksums: true, max_image_bytes: 1 << 30 }
  }
}

/// Reads just the header, without decoding the image.
///
/// The first chunk after the signature must be `IHDR`.
pub fn read_header(bytes: &[u8]) -> FormatResult<ImageMetadata> {
  let mut chunks = RawChunkIter::new(bytes)?;
  first_header(&mut chunks)
}

fn first_header(chunks: &mut RawChunkIter<'_>) -> FormatResult<ImageMetadata> {
  match chunks.next() {
    Some(Ok(chunk)) if chunk.chunk_ty == ChunkType::IHDR => ImageMetadata::try_from(chunk.data),
    Some(Ok(chunk)) => Err(FormatError::UnexpectedChunk(chunk.chunk_ty)),
    Some(Err(e)) => Err(e),
    None => Err(FormatError::Truncated),
  }
}

/// Decodes PNG bytes into an [`ImageBuffer`].
///
/// The decoder keeps its working buffers (the decompressed data and the
/// scanline window) between calls, so decoding many images with one decoder
/// avoids most of the allocation. Every call starts by clearing them, nothing
/// from one image ever shows up in the next.
///
/// The compressed data is never copied. The `IDAT` payloads are handed to the
/// inflater as slices of the input.
#[derive(Debug, Clone, Default)]
pub struct PngDecoder {
  options: DecodeOptions,
  decompressed: Vec<u8>,
  reconstructor: ScanlineReconstructor,
}
impl PngDecoder {
  #[inline]
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  #[inline]
  #[must_use]
  pub fn with_options(options: DecodeOptions) -> Self {
    Self { options, ..Self::default() }
  }

  #[inline]
  #[must_use]
  pub const fn options(&self) -> &DecodeOptions {
    &self.options
  }

  /// Decodes a complete PNG.
  ///
  /// ## Failure
  /// The first problem found stops decoding. See [`FormatError`] for the
  /// possibilities.
  pub fn decode(&mut self, bytes: &[u8]) -> FormatResult<ImageBuffer> {
    self.decompressed.clear();

    let mut chunks = RawChunkIter::new(bytes)?.verify_crc(self.options.verify_checksums);
    let meta = first_header(&mut chunks)?;
    debug!("png header: {meta:?}");
    let rgba8_len = match meta.rgba8_len() {
      Some(len) if len <= self.options.max_image_bytes => len,
      _ => return Err(FormatError::Oversized),
    };
    let filtered_len = meta.filtered_len().ok_or(FormatError::Oversized)?;
    let is_indexed = meta.color_type() == PngColorType::Index;

    let mut plte: Option<&[u8]> = None;
    let mut trns: Option<&[u8]> = None;
    let mut palette: Option<PaletteTable> = None;
    let mut seen_idat = false;
    let mut compressed_len = 0_usize;
    let mut seen_iend = false;
    for chunk in chunks.by_ref() {
      let chunk = chunk?;
      match chunk.chunk_ty {
        ChunkType::PLTE => {
          if !is_indexed || plte.is_some() || seen_idat {
            return Err(FormatError::UnexpectedChunk(chunk.chunk_ty));
          }
          plte = Some(chunk.data);
        }
        ChunkType::tRNS => {
          if !is_indexed || plte.is_none() || trns.is_some() || seen_idat {
            return Err(FormatError::UnexpectedChunk(chunk.chunk_ty));
          }
          trns = Some(chunk.data);
        }
        ChunkType::IDAT => {
          if !seen_idat {
            if let Some(plte) = plte {
              palette = Some(PaletteTable::resolve(plte, trns, meta.bit_depth())?);
            } else if is_indexed {
              return Err(FormatError::MissingPalette);
            }
            seen_idat = true;
          }
          compressed_len += chunk.data.len();
        }
        ChunkType::IEND => {
          seen_iend = true;
        }
        other if other.is_critical() => return Err(FormatError::UnexpectedChunk(other)),
        other => warn!("skipping {other:?} chunk"),
      }
    }
    if !seen_iend {
      return Err(FormatError::Truncated);
    }
    if !chunks.remaining().is_empty() {
      warn!("ignoring {} bytes after IEND", chunks.remaining().len());
    }
    if !seen_idat {
      return Err(FormatError::DecompressionFailed);
    }

    self.decompressed.try_reserve(filtered_len)?;
    self.decompressed.resize(filtered_len, 0);
    // everything was checked above, so this pass only needs the IDAT payloads
    let idat_slices = RawChunkIter::new(bytes)?.verify_crc(false).filter_map(|chunk| match chunk {
      Ok(chunk) if chunk.chunk_ty == ChunkType::IDAT => Some(chunk.data),
      _ => None,
    });
    let count = crate::zlib::decompress_to_slice(
      &mut self.decompressed,
      idat_slices,
      self.options.verify_checksums,
    )?;
    trace!("inflated {count} of {filtered_len} bytes from {compressed_len} compressed");

    let mut pixels = try_zeroed_vec(rgba8_len)?;
    self.reconstructor.reconstruct(
      &meta,
      palette.as_ref(),
      &self.decompressed[..count],
      &mut pixels,
    )?;
    debug!("decoded {}x{} png", meta.width(), meta.height());
    ImageBuffer::from_pixels(meta.width(), meta.height(), pixels)
  }
}
