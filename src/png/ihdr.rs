use super::*;

/// The color types this crate decodes.
///
/// PNG also defines greyscale (0) and greyscale + alpha (4), those are
/// rejected with `UnsupportedColorType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PngColorType {
  /// Red, Green, Blue
  RGB = 2,
  /// Index into a palette.
  ///
  /// The palette will have RGB8 data. There may optionally be a transparency
  /// chunk.
  Index = 3,
  /// Red, Green, Blue, Alpha
  RGBA = 6,
}
impl PngColorType {
  /// The number of channels in this type of color.
  #[inline]
  #[must_use]
  pub const fn channel_count(self) -> usize {
    match self {
      Self::RGB => 3,
      Self::Index => 1,
      Self::RGBA => 4,
    }
  }
}
impl TryFrom<u8> for PngColorType {
  type Error = FormatError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      2 => PngColorType::RGB,
      3 => PngColorType::Index,
      6 => PngColorType::RGBA,
      other => return Err(FormatError::UnsupportedColorType(other)),
    })
  }
}

/// Image Header info, validated down to what this crate can decode.
///
/// The only way to get one is parsing an `IHDR` payload with `try_from`, so
/// the size and format combination is always one the decoder handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageMetadata {
  width: u32,
  height: u32,
  bit_depth: u8,
  color_type: PngColorType,
}
impl ImageMetadata {
  /// width in pixels, never 0
  #[inline]
  #[must_use]
  pub const fn width(&self) -> u32 {
    self.width
  }

  /// height in pixels, never 0
  #[inline]
  #[must_use]
  pub const fn height(&self) -> u32 {
    self.height
  }

  /// bits per channel: 1, 2, 4, or 8 for indexed images, 8 otherwise
  #[inline]
  #[must_use]
  pub const fn bit_depth(&self) -> u8 {
    self.bit_depth
  }

  #[inline]
  #[must_use]
  pub const fn color_type(&self) -> PngColorType {
    self.color_type
  }

  /// Bits used by a single pixel.
  #[inline]
  #[must_use]
  pub const fn bits_per_pixel(&self) -> usize {
    (self.bit_depth as usize) * self.color_type.channel_count()
  }

  /// Filter stride. Filters work on bytes, and when a pixel is less than a
  /// byte the stride is still 1.
  #[inline]
  #[must_use]
  pub const fn bytes_per_pixel(&self) -> usize {
    let bits = self.bits_per_pixel();
    if bits < 8 {
      1
    } else {
      bits / 8
    }
  }

  /// Bytes of pixel data per scanline, not counting the filter byte. Partial
  /// bytes at the end of the line round up.
  ///
  /// `None` if that doesn't fit in a `usize`.
  #[inline]
  #[must_use]
  pub const fn bytes_per_row(&self) -> Option<usize> {
    let width = self.width as usize;
    match self.bits_per_pixel() {
      bits @ (1 | 2 | 4) => {
        let per_byte = 8 / bits;
        Some(width / per_byte + (width % per_byte != 0) as usize)
      }
      bits => width.checked_mul(bits / 8),
    }
  }

  /// Size of the decompressed image data: each line is a filter byte plus
  /// pixel data.
  #[inline]
  #[must_use]
  pub fn filtered_len(&self) -> Option<usize> {
    self.bytes_per_row()?.checked_add(1)?.checked_mul(self.height as usize)
  }

  /// Size of the final RGBA8 buffer.
  #[inline]
  #[must_use]
  pub fn rgba8_len(&self) -> Option<usize> {
    rgba8_byte_count(self.width, self.height)
  }
}
impl TryFrom<&[u8]> for ImageMetadata {
  type Error = FormatError;
  fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
    match value {
      [w0, w1, w2, w3, h0, h1, h2, h3, bit_depth, color_type, compression_method, filter_method, interlace_method] =>
      {
        let width = u32::from_be_bytes([*w0, *w1, *w2, *w3]);
        let height = u32::from_be_bytes([*h0, *h1, *h2, *h3]);
        if width == 0 || height == 0 {
          return Err(FormatError::InvalidHeader);
        }
        // deflate is the only compression method, adaptive the only filter method
        if *compression_method != 0 || *filter_method != 0 {
          return Err(FormatError::InvalidHeader);
        }
        if *interlace_method != 0 {
          return Err(FormatError::InterlaceUnsupported);
        }
        if *bit_depth == 16 {
          return Err(FormatError::UnsupportedBitDepth(16));
        }
        let color_type = PngColorType::try_from(*color_type)?;
        let bit_depth = match color_type {
          PngColorType::Index if [1, 2, 4, 8].contains(bit_depth) => *bit_depth,
          PngColorType::RGB | PngColorType::RGBA if *bit_depth == 8 => 8,
          _ => return Err(FormatError::UnsupportedBitDepth(*bit_depth)),
        };
        Ok(Self { width, height, bit_depth, color_type })
      }
      _ => Err(FormatError::InvalidHeader),
    }
  }
}
