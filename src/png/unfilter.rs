//! From the PNG spec:
//!
//! > Filters are applied to **bytes**, not to pixels, regardless of the bit
//! > depth or color type of the image.
//!
//! Each scanline of the decompressed data is one filter type byte followed by
//! the filtered bytes of that line. Reconstruction goes top to bottom, and
//! every filter only looks at bytes that were already reconstructed: to the
//! left in the same line, or in the line above. The line above the first line
//! is all zeros.

use super::*;

/// Reconstruct Filter Type 1
///
/// * `fx` filtered X
/// * `ra` reconstructed `a`, the corresponding byte from the pixel to the left
///   (0 at the left edge).
#[inline]
const fn reconstruct_sub(fx: u8, ra: u8) -> u8 {
  fx.wrapping_add(ra)
}

/// Reconstruct Filter Type 2
///
/// * `fx` filtered X
/// * `rb` reconstructed `b`, the corresponding byte within the previous
///   scanline.
#[inline]
const fn reconstruct_up(fx: u8, rb: u8) -> u8 {
  fx.wrapping_add(rb)
}

/// Reconstruct Filter Type 3
///
/// The average is floored and computed without overflow.
#[inline]
const fn reconstruct_average(fx: u8, ra: u8, rb: u8) -> u8 {
  fx.wrapping_add(((ra as u16 + rb as u16) / 2) as u8)
}

/// Reconstruct Filter Type 4
///
/// * `rc` reconstructed `c`, the byte above `ra`.
#[inline]
const fn reconstruct_paeth(fx: u8, ra: u8, rb: u8, rc: u8) -> u8 {
  fx.wrapping_add(paeth_predict(ra, rb, rc))
}

/// The Paeth filter function computes a simple linear function of the three
/// neighboring bytes (left `a`, above `b`, upper left `c`).
///
/// The output is whichever neighbor is closest to `a + b - c`.
#[inline]
#[must_use]
pub(crate) const fn paeth_predict(a: u8, b: u8, c: u8) -> u8 {
  // i32 math so that `p` is exact, no wrapping.
  let a_ = a as i32;
  let b_ = b as i32;
  let c_ = c as i32;
  let p: i32 = a_ + b_ - c_;
  let pa = (p - a_).abs();
  let pb = (p - b_).abs();
  let pc = (p - c_).abs();
  // The order of these tests is fixed by the format, ties must go to `a`
  // then `b`.
  if pa <= pb && pa <= pc {
    a
  } else if pb <= pc {
    b
  } else {
    c
  }
}

/// Unfilters a single line in place.
///
/// * `line` is the filtered bytes, without the filter type byte.
/// * `prev` is the already reconstructed line above, all 0 for the first
///   line. It must be the same length as `line`.
/// * `bpp` is the filter stride, see
///   [`bytes_per_pixel`](ImageMetadata::bytes_per_pixel).
pub fn unfilter_scanline(
  filter_type: u8, line: &mut [u8], prev: &[u8], bpp: usize,
) -> FormatResult<()> {
  debug_assert_eq!(line.len(), prev.len());
  debug_assert!(bpp > 0);
  match filter_type {
    0 => (),
    1 => {
      for i in bpp..line.len() {
        line[i] = reconstruct_sub(line[i], line[i - bpp]);
      }
    }
    2 => {
      line.iter_mut().zip(prev.iter().copied()).for_each(|(x, b)| *x = reconstruct_up(*x, b));
    }
    3 => {
      // the first pixel has no left neighbor
      let lead = bpp.min(line.len());
      line[..lead]
        .iter_mut()
        .zip(prev.iter().copied())
        .for_each(|(x, b)| *x = reconstruct_average(*x, 0, b));
      for i in lead..line.len() {
        line[i] = reconstruct_average(line[i], line[i - bpp], prev[i]);
      }
    }
    4 => {
      // with no left or upper left, paeth always picks the byte above
      let lead = bpp.min(line.len());
      line[..lead]
        .iter_mut()
        .zip(prev.iter().copied())
        .for_each(|(x, b)| *x = reconstruct_paeth(*x, 0, b, 0));
      for i in lead..line.len() {
        line[i] = reconstruct_paeth(line[i], line[i - bpp], prev[i], prev[i - bpp]);
      }
    }
    other => return Err(FormatError::InvalidFilter(other)),
  }
  Ok(())
}

/// Splits bit-packed palette indexes out of a line's bytes.
///
/// The high bits are the leftmost packed pixel. A line that doesn't fill its
/// final byte has padding bits at the end, use `take` with the width to skip
/// them.
///
/// ## Panics
/// * If `bit_depth` isn't 1, 2, 4, or 8.
#[inline]
pub fn unpack_indices(line: &[u8], bit_depth: u8) -> impl Iterator<Item = u8> + '_ {
  assert!(matches!(bit_depth, 1 | 2 | 4 | 8), "illegal packed bit depth");
  let per_byte = 8 / bit_depth as u32;
  let mask = ((1_u16 << bit_depth) - 1) as u8;
  line.iter().copied().flat_map(move |byte| {
    (1..=per_byte).map(move |i| (byte >> (8 - i * bit_depth as u32)) & mask)
  })
}

/// Converts one reconstructed line into RGBA8 output.
fn expand_line(
  meta: &ImageMetadata, line: &[u8], palette: Option<&PaletteTable>, out: &mut [u8],
) -> FormatResult<()> {
  match meta.color_type() {
    PngColorType::RGBA => out.copy_from_slice(line),
    PngColorType::RGB => {
      let in_pixels: &[RGB8] = bytemuck::cast_slice(line);
      let out_pixels: &mut [RGBA8] = bytemuck::cast_slice_mut(out);
      out_pixels.iter_mut().zip(in_pixels.iter().copied()).for_each(|(p, rgb)| *p = rgb.into());
    }
    PngColorType::Index => {
      let palette = palette.ok_or(FormatError::MissingPalette)?;
      let out_pixels: &mut [RGBA8] = bytemuck::cast_slice_mut(out);
      for (p, i) in out_pixels.iter_mut().zip(unpack_indices(line, meta.bit_depth())) {
        *p = palette.get(i)?;
      }
    }
  }
  Ok(())
}

/// Turns decompressed scanline data into RGBA8 pixels.
///
/// Holds the two line buffers (the line being reconstructed and the one
/// above it), so that decoding many images with one reconstructor doesn't
/// allocate per image. They're resized and zeroed at the start of each call.
#[derive(Debug, Clone, Default)]
pub struct ScanlineReconstructor {
  previous: Vec<u8>,
  current: Vec<u8>,
}
impl ScanlineReconstructor {
  #[inline]
  #[must_use]
  pub const fn new() -> Self {
    Self { previous: Vec::new(), current: Vec::new() }
  }

  /// Reconstructs all the lines of `decompressed` into `out`.
  ///
  /// * `decompressed` can be longer than the image needs, the extra is
  ///   ignored. If it's shorter you get `Truncated`.
  /// * `out` must be exactly `width * height * 4` bytes.
  /// * `palette` is required for indexed images.
  pub fn reconstruct(
    &mut self, meta: &ImageMetadata, palette: Option<&PaletteTable>, decompressed: &[u8],
    out: &mut [u8],
  ) -> FormatResult<()> {
    let bytes_per_row = meta.bytes_per_row().ok_or(FormatError::Oversized)?;
    let filtered_len = meta.filtered_len().ok_or(FormatError::Oversized)?;
    if decompressed.len() < filtered_len {
      return Err(FormatError::Truncated);
    }
    if Some(out.len()) != meta.rgba8_len() {
      let expected = meta.rgba8_len().unwrap_or(usize::MAX);
      return Err(FormatError::BufferSizeMismatch { expected, actual: out.len() });
    }
    if meta.color_type() == PngColorType::Index && palette.is_none() {
      return Err(FormatError::MissingPalette);
    }
    let bpp = meta.bytes_per_pixel();

    self.previous.clear();
    self.previous.try_reserve(bytes_per_row)?;
    self.previous.resize(bytes_per_row, 0);
    self.current.clear();
    self.current.try_reserve(bytes_per_row)?;
    self.current.resize(bytes_per_row, 0);

    let lines = decompressed[..filtered_len].chunks_exact(bytes_per_row + 1);
    let out_rows = out.chunks_exact_mut(meta.width() as usize * 4);
    for (filterline, out_row) in lines.zip(out_rows) {
      let (filter_type, filtered) = filterline.split_first().ok_or(FormatError::Truncated)?;
      self.current.copy_from_slice(filtered);
      unfilter_scanline(*filter_type, &mut self.current, &self.previous, bpp)?;
      expand_line(meta, &self.current, palette, out_row)?;
      core::mem::swap(&mut self.previous, &mut self.current);
    }
    Ok(())
  }
}
