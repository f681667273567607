use super::*;

/// Chunks longer than this are rejected outright, it's the largest length the
/// PNG container allows.
pub const MAX_CHUNK_LENGTH: u32 = (1 << 31) - 1;

/// A four character chunk type code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ChunkType(pub [u8; 4]);
#[allow(nonstandard_style)]
impl ChunkType {
  pub const IHDR: Self = Self(*b"IHDR");
  pub const PLTE: Self = Self(*b"PLTE");
  pub const IDAT: Self = Self(*b"IDAT");
  pub const IEND: Self = Self(*b"IEND");
  pub const tRNS: Self = Self(*b"tRNS");

  /// The type code read as a big-endian integer.
  #[inline]
  #[must_use]
  pub const fn as_u32(self) -> u32 {
    u32::from_be_bytes(self.0)
  }

  /// Critical chunks have an uppercase first letter. A decoder that doesn't
  /// understand a critical chunk can't display the image correctly.
  #[inline]
  #[must_use]
  pub const fn is_critical(self) -> bool {
    (self.0[0] & 32) == 0
  }
}
impl Debug for ChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_char(self.0[0] as char)?;
    f.write_char(self.0[1] as char)?;
    f.write_char(self.0[2] as char)?;
    f.write_char(self.0[3] as char)?;
    Ok(())
  }
}
impl From<u32> for ChunkType {
  #[inline]
  fn from(value: u32) -> Self {
    Self(value.to_be_bytes())
  }
}

/// An unparsed chunk from a PNG.
///
/// The data borrows from the PNG bytes being read.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawChunk<'b> {
  pub chunk_ty: ChunkType,
  pub data: &'b [u8],
  pub declared_crc: u32,
}
impl Debug for RawChunk<'_> {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("RawChunk")
      .field("chunk_ty", &self.chunk_ty)
      .field("data", &(&self.data[..self.data.len().min(12)], self.data.len()))
      .field("declared_crc", &self.declared_crc)
      .finish()
  }
}
impl RawChunk<'_> {
  /// `data.len()` as the `u32` that was declared for it.
  #[inline]
  #[must_use]
  pub fn length(&self) -> u32 {
    self.data.len() as u32
  }

  /// The CRC of this chunk's type and data, as computed from the bytes.
  #[inline]
  #[must_use]
  pub fn actual_crc(&self) -> u32 {
    png_crc(self.chunk_ty.0, self.data)
  }
}

/// An iterator that produces successive raw chunks from PNG bytes.
///
/// * Iteration ends after the `IEND` chunk or when the bytes run out exactly
///   on a chunk boundary.
/// * A chunk that doesn't fit within the bytes gives `Truncated`, a chunk
///   length over [`MAX_CHUNK_LENGTH`] gives `Oversized`, and (when checking is
///   on) a bad trailer gives `ChecksumMismatch`. After any error the iterator
///   is finished.
#[derive(Debug, Clone)]
pub struct RawChunkIter<'b> {
  spare: &'b [u8],
  verify_crc: bool,
  done: bool,
}
impl<'b> RawChunkIter<'b> {
  /// Checks the signature and prepares to iterate the chunks after it.
  #[inline]
  pub fn new(bytes: &'b [u8]) -> FormatResult<Self> {
    match bytes {
      [137, 80, 78, 71, 13, 10, 26, 10, rest @ ..] => {
        Ok(Self { spare: rest, verify_crc: true, done: false })
      }
      _ => Err(FormatError::BadSignature),
    }
  }

  /// Sets if chunk CRC values are checked (they are by default).
  #[inline]
  #[must_use]
  pub fn verify_crc(self, verify_crc: bool) -> Self {
    Self { verify_crc, ..self }
  }

  /// The bytes that haven't been read as chunks yet.
  #[inline]
  #[must_use]
  pub const fn remaining(&self) -> &'b [u8] {
    self.spare
  }

  fn read_chunk(&mut self) -> FormatResult<RawChunk<'b>> {
    let (len_bytes, rest) = try_pull_byte_array::<4>(self.spare)?;
    let chunk_len = u32_be(len_bytes);
    if chunk_len > MAX_CHUNK_LENGTH {
      return Err(FormatError::Oversized);
    }
    let (type_bytes, rest) = try_pull_byte_array::<4>(rest)?;
    let chunk_ty = ChunkType(type_bytes);
    let (data, rest) = try_pull_slice(rest, chunk_len as usize)?;
    let (crc_bytes, rest) = try_pull_byte_array::<4>(rest)?;
    let chunk = RawChunk { chunk_ty, data, declared_crc: u32_be(crc_bytes) };
    if self.verify_crc && chunk.actual_crc() != chunk.declared_crc {
      return Err(FormatError::ChecksumMismatch(chunk_ty));
    }
    self.spare = rest;
    Ok(chunk)
  }
}
impl<'b> Iterator for RawChunkIter<'b> {
  type Item = FormatResult<RawChunk<'b>>;
  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    if self.done || self.spare.is_empty() {
      return None;
    }
    let out = self.read_chunk();
    match &out {
      Ok(chunk) if chunk.chunk_ty == ChunkType::IEND => self.done = true,
      Ok(_) => (),
      Err(_) => self.done = true,
    }
    trace!("{out:?}");
    Some(out)
  }
}
impl core::iter::FusedIterator for RawChunkIter<'_> {}
