use pixcodec::{EncodeOptions, FormatError, RawCodec};

#[test]
fn test_raw_round_trip() {
  let mut codec = RawCodec::new();
  let options = pixcodec::DecodeOptions::default();
  for (w, h) in [(1, 1), (3, 9), (128, 31)] {
    for image in [super::rand_image(w, h), super::gradient_image(w, h)] {
      let bytes = pixcodec::encode_raw(&image).unwrap();
      assert_eq!(&bytes[..4], &w.to_be_bytes());
      assert_eq!(&bytes[4..8], &h.to_be_bytes());
      assert_eq!(pixcodec::decode_raw(&bytes).unwrap(), image);
      assert_eq!(codec.decode(&bytes, &options).unwrap(), image);
    }
  }
}

#[test]
fn test_raw_levels() {
  let image = super::gradient_image(100, 100);
  let stored =
    pixcodec::encode_raw_with(&image, &EncodeOptions { compression_level: 0, ..Default::default() })
      .unwrap();
  let best =
    pixcodec::encode_raw_with(&image, &EncodeOptions { compression_level: 9, ..Default::default() })
      .unwrap();
  assert!(stored.len() > 100 * 100 * 4);
  assert!(best.len() < stored.len());
  assert_eq!(pixcodec::decode_raw(&stored).unwrap(), image);
  assert_eq!(pixcodec::decode_raw(&best).unwrap(), image);
}

#[test]
fn test_raw_ignores_flip() {
  let image = super::rand_image(4, 4);
  let options = EncodeOptions { flip_vertically: true, ..Default::default() };
  let bytes = pixcodec::encode_raw_with(&image, &options).unwrap();
  assert_eq!(pixcodec::decode_raw(&bytes).unwrap(), image);
}

#[test]
fn test_raw_random_no_panics() {
  for _ in 0..50 {
    let v = super::rand_bytes(64);
    let _ = pixcodec::decode_raw(&v);
  }
  let image = super::gradient_image(10, 10);
  let good = pixcodec::encode_raw(&image).unwrap();
  for cut in 0..good.len() {
    assert!(pixcodec::decode_raw(&good[..cut]).is_err());
  }
  // a png isn't a raw pixmap
  let png = pixcodec::encode(&image, &EncodeOptions::default()).unwrap();
  assert!(matches!(
    pixcodec::decode_raw(&png),
    Err(FormatError::Oversized | FormatError::DecompressionFailed)
  ));
}
