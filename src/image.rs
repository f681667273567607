#![forbid(unsafe_code)]

//! Provides the heap-allocated RGBA8 image type that every codec produces
//! and consumes.

use alloc::vec::Vec;

use crate::{
  parser_helpers::{rgba8_byte_count, try_zeroed_vec},
  pixel_formats::RGBA8,
  FormatError, FormatResult,
};

/// Converts an `(x,y)` position within a given `width` 2D space into a linear
/// pixel index.
#[inline]
#[must_use]
pub const fn xy_width_to_index(x: u32, y: u32, width: u32) -> usize {
  (y as usize) * (width as usize) + (x as usize)
}

/// An RGBA8 image, row-major, origin at the top left.
///
/// The pixel bytes always number exactly `width * height * 4`, and both
/// dimensions are always non-zero. The constructors enforce this, and the
/// fields stay private so nothing else can break it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageBuffer {
  width: u32,
  height: u32,
  pixels: Vec<u8>,
}
impl ImageBuffer {
  /// A fully transparent black image of the given size.
  pub fn new(width: u32, height: u32) -> FormatResult<Self> {
    let len = checked_len(width, height)?;
    Ok(Self { width, height, pixels: try_zeroed_vec(len)? })
  }

  /// Wraps existing RGBA8 bytes.
  ///
  /// ## Failure
  /// * Either dimension is 0, or the byte size overflows.
  /// * `pixels.len()` isn't `width * height * 4`.
  pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> FormatResult<Self> {
    let expected = checked_len(width, height)?;
    if pixels.len() != expected {
      return Err(FormatError::BufferSizeMismatch { expected, actual: pixels.len() });
    }
    Ok(Self { width, height, pixels })
  }

  #[inline]
  #[must_use]
  pub const fn width(&self) -> u32 {
    self.width
  }

  #[inline]
  #[must_use]
  pub const fn height(&self) -> u32 {
    self.height
  }

  /// All pixel bytes, `r, g, b, a` per pixel.
  #[inline]
  #[must_use]
  pub fn pixels(&self) -> &[u8] {
    &self.pixels
  }

  /// All pixel bytes, mutably. The length can't be changed through this.
  #[inline]
  #[must_use]
  pub fn pixels_mut(&mut self) -> &mut [u8] {
    &mut self.pixels
  }

  /// Gives up the image, keeping just the bytes.
  #[inline]
  #[must_use]
  pub fn into_pixels(self) -> Vec<u8> {
    self.pixels
  }

  /// The pixels as [`RGBA8`] values.
  #[inline]
  #[must_use]
  pub fn as_rgba8(&self) -> &[RGBA8] {
    bytemuck::cast_slice(&self.pixels)
  }

  /// The pixels as [`RGBA8`] values, mutably.
  #[inline]
  #[must_use]
  pub fn as_rgba8_mut(&mut self) -> &mut [RGBA8] {
    bytemuck::cast_slice_mut(&mut self.pixels)
  }

  /// Bytes in one row of pixels.
  #[inline]
  #[must_use]
  pub const fn row_stride(&self) -> usize {
    self.width as usize * 4
  }

  /// The bytes of row `y`, or `None` if `y` is out of bounds.
  #[inline]
  #[must_use]
  pub fn row(&self, y: u32) -> Option<&[u8]> {
    if y < self.height {
      let stride = self.row_stride();
      let start = y as usize * stride;
      Some(&self.pixels[start..start + stride])
    } else {
      None
    }
  }

  /// Iterates the rows from top to bottom.
  #[inline]
  pub fn rows(&self) -> impl DoubleEndedIterator<Item = &[u8]> + ExactSizeIterator {
    self.pixels.chunks_exact(self.row_stride())
  }

  /// Gets the pixel at the position, or `None` if the position is out of
  /// bounds.
  #[inline]
  #[must_use]
  pub fn get(&self, x: u32, y: u32) -> Option<RGBA8> {
    if x < self.width && y < self.height {
      Some(self.as_rgba8()[xy_width_to_index(x, y, self.width)])
    } else {
      None
    }
  }

  /// Gets the pixel at the position, or `None` if the position is out of
  /// bounds.
  #[inline]
  #[must_use]
  pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut RGBA8> {
    if x < self.width && y < self.height {
      let i = xy_width_to_index(x, y, self.width);
      Some(&mut self.as_rgba8_mut()[i])
    } else {
      None
    }
  }

  /// Flips the image top to bottom.
  #[inline]
  pub fn vertical_flip(&mut self) {
    let stride = self.row_stride();
    let mut data: &mut [u8] = self.pixels.as_mut_slice();
    let mut temp_height = self.height;
    while temp_height > 1 {
      let (low, mid) = data.split_at_mut(stride);
      let (mid, high) = mid.split_at_mut(mid.len() - stride);
      low.swap_with_slice(high);
      data = mid;
      temp_height -= 2;
    }
  }
}

fn checked_len(width: u32, height: u32) -> FormatResult<usize> {
  match rgba8_byte_count(width, height) {
    Some(len) if width > 0 && height > 0 => Ok(len),
    _ => Err(FormatError::InvalidDimensions { width, height }),
  }
}
