#![forbid(unsafe_code)]

//! Just has shorthands for various int parsing things you'd want to do.

use crate::FormatError;

#[inline]
#[must_use]
pub fn u32_be(bytes: [u8; 4]) -> u32 {
  u32::from_be_bytes(bytes)
}

/// Splits `N` bytes off the front, or fails with `Truncated`.
#[inline]
pub fn try_pull_byte_array<const N: usize>(bytes: &[u8]) -> Result<([u8; N], &[u8]), FormatError> {
  if bytes.len() >= N {
    let (head, tail) = bytes.split_at(N);
    let mut a = [0_u8; N];
    a.copy_from_slice(head);
    Ok((a, tail))
  } else {
    Err(FormatError::Truncated)
  }
}

/// Splits `len` bytes off the front, or fails with `Truncated`.
#[inline]
pub fn try_pull_slice(bytes: &[u8], len: usize) -> Result<(&[u8], &[u8]), FormatError> {
  if bytes.len() >= len {
    Ok(bytes.split_at(len))
  } else {
    Err(FormatError::Truncated)
  }
}

/// `width * height * 4`, if that fits in a `usize`.
#[inline]
#[must_use]
pub fn rgba8_byte_count(width: u32, height: u32) -> Option<usize> {
  (width as usize).checked_mul(height as usize)?.checked_mul(4)
}

/// Gets a zero-filled `Vec` of the given length, reporting allocation failure
/// instead of aborting.
#[inline]
pub fn try_zeroed_vec(len: usize) -> Result<alloc::vec::Vec<u8>, FormatError> {
  let mut v = alloc::vec::Vec::new();
  v.try_reserve_exact(len)?;
  // ferris plz make this into a memset
  v.resize(len, 0);
  Ok(v)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_try_pull_byte_array() {
    let (head, tail) = try_pull_byte_array::<4>(&[0, 0, 1, 2, 9]).unwrap();
    assert_eq!(u32_be(head), 0x0102);
    assert_eq!(tail, &[9]);
    assert_eq!(try_pull_byte_array::<4>(&[1, 2, 3]), Err(FormatError::Truncated));
  }

  #[test]
  fn test_rgba8_byte_count() {
    assert_eq!(rgba8_byte_count(3, 2), Some(24));
    assert_eq!(rgba8_byte_count(0, 2), Some(0));
    assert_eq!(rgba8_byte_count(u32::MAX, u32::MAX), None);
  }
}
