use super::*;

/// Palette data, already merged with any transparency data.
///
/// PNG stores palette colors (`PLTE`, always RGB) and palette alpha (`tRNS`)
/// in separate chunks. The transparency chunk can be shorter than the palette
/// and any entry it doesn't cover stays fully opaque.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PaletteTable {
  entries: [RGBA8; 256],
  len: usize,
}
impl Debug for PaletteTable {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    // currently prints no more than 4 palette entries
    f.debug_tuple("PaletteTable").field(&&self.entries[..self.len.min(4)]).field(&self.len).finish()
  }
}
impl PaletteTable {
  /// Builds the table from the `PLTE` payload and optional `tRNS` payload.
  ///
  /// ## Failure
  /// * `InvalidPalette` if the palette isn't a non-zero multiple of 3 bytes, or
  ///   holds more entries than the bit depth can index.
  /// * `UnexpectedChunk(tRNS)` if there's more alpha values than palette
  ///   entries.
  pub fn resolve(plte: &[u8], trns: Option<&[u8]>, bit_depth: u8) -> FormatResult<Self> {
    let colors: &[RGB8] =
      bytemuck::try_cast_slice(plte).map_err(|_| FormatError::InvalidPalette)?;
    let max_entries = 1_usize << bit_depth.min(8);
    if colors.is_empty() || colors.len() > max_entries {
      return Err(FormatError::InvalidPalette);
    }
    let alphas = trns.unwrap_or(&[]);
    if alphas.len() > colors.len() {
      return Err(FormatError::UnexpectedChunk(ChunkType::tRNS));
    }
    let mut entries = [RGBA8::default(); 256];
    for (entry, color) in entries.iter_mut().zip(colors.iter().copied()) {
      *entry = RGBA8::from(color);
    }
    for (entry, alpha) in entries.iter_mut().zip(alphas.iter().copied()) {
      entry.a = alpha;
    }
    Ok(Self { entries, len: colors.len() })
  }

  /// Looks up an index.
  #[inline]
  pub fn get(&self, index: u8) -> FormatResult<RGBA8> {
    self.entries().get(index as usize).copied().ok_or(FormatError::PaletteIndexOutOfRange(index))
  }

  /// The entries as a slice.
  #[inline]
  #[must_use]
  pub fn entries(&self) -> &[RGBA8] {
    &self.entries[..self.len]
  }

  #[inline]
  #[must_use]
  pub const fn len(&self) -> usize {
    self.len
  }

  /// Always `false`, a table can't be built without entries.
  #[inline]
  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.len == 0
  }
}
