const CRC_TABLE: [u32; 256] = make_crc_table();

const fn make_crc_table() -> [u32; 256] {
  let mut out = [0; 256];
  let mut n = 0;
  while n < 256 {
    let mut c = n as u32;
    let mut k = 0;
    while k < 8 {
      if (c & 1) != 0 {
        c = 0xEDB8_8320_u32 ^ (c >> 1);
      } else {
        c >>= 1;
      }
      //
      k += 1;
    }
    out[n] = c;
    //
    n += 1;
  }
  out
}

/// Running CRC-32 state, as used for PNG chunk trailers.
///
/// Feed it the chunk type and then the chunk data, and `finish` gives the
/// value that belongs in the trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc32(u32);
impl Default for Crc32 {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}
impl Crc32 {
  #[inline]
  #[must_use]
  pub const fn new() -> Self {
    Self(u32::MAX)
  }

  #[inline]
  pub fn reset(&mut self) {
    self.0 = u32::MAX;
  }

  #[inline]
  pub fn update(&mut self, bytes: &[u8]) {
    let mut crc = self.0;
    for byte in bytes.iter().copied() {
      let i = (crc ^ u32::from(byte)) as u8 as usize;
      crc = CRC_TABLE[i] ^ (crc >> 8);
    }
    self.0 = crc;
  }

  #[inline]
  #[must_use]
  pub const fn finish(&self) -> u32 {
    self.0 ^ u32::MAX
  }
}

/// The CRC of a chunk's type followed by its data.
#[inline]
#[must_use]
pub(crate) fn png_crc(chunk_ty: [u8; 4], data: &[u8]) -> u32 {
  let mut crc = Crc32::new();
  crc.update(&chunk_ty);
  crc.update(data);
  crc.finish()
}

#[test]
fn test_crc_known_values() {
  // the standard check value
  let mut crc = Crc32::new();
  crc.update(b"123456789");
  assert_eq!(crc.finish(), 0xCBF4_3926);
  // every PNG ends with this exact trailer
  assert_eq!(png_crc(*b"IEND", &[]), 0xAE42_6082);
  // split updates give the same answer
  crc.reset();
  crc.update(b"1234");
  crc.update(b"56789");
  assert_eq!(crc.finish(), 0xCBF4_3926);
}
