use pixcodec::{
  png::{RawChunkIter, PNG_SIGNATURE},
  DecodeOptions, EncodeOptions, PngDecoder, PngEncoder,
};
use walkdir::WalkDir;

#[test]
fn test_RawChunkIter_no_panics() {
  // iter ALL files in the test folder, even non-png files shouldn't panic it.
  for entry in WalkDir::new("tests/").into_iter().filter_map(|e| e.ok()) {
    println!("{}", entry.path().display());
    let v = match std::fs::read(entry.path()) {
      Ok(v) => v,
      Err(e) => {
        println!("Error reading file: {e:?}");
        continue;
      }
    };
    if let Ok(iter) = RawChunkIter::new(&v) {
      for _ in iter {
        //
      }
    }
    let _ = pixcodec::decode(&v);
    let _ = pixcodec::read_header(&v);
  }
  // even totally random data should never panic the iterator!
  for _ in 0..10 {
    let mut v = PNG_SIGNATURE.to_vec();
    v.extend(super::rand_bytes(1024));
    for _ in RawChunkIter::new(&v).unwrap() {
      //
    }
  }
}

#[test]
fn test_decode_random_no_panics() {
  let mut decoder = PngDecoder::new();
  for _ in 0..50 {
    let v = super::rand_bytes(256);
    assert!(decoder.decode(&v).is_err());
  }
  // a valid image with random damage
  let png = pixcodec::encode(&super::gradient_image(16, 16), &EncodeOptions::default()).unwrap();
  let lax = DecodeOptions { verify_checksums: false, max_image_bytes: 1 << 20 };
  let mut lax_decoder = PngDecoder::with_options(lax);
  for _ in 0..200 {
    let mut v = png.clone();
    let noise = super::rand_bytes(8);
    for pair in noise.chunks_exact(2) {
      let i = pair[0] as usize * v.len() / 256;
      v[i] ^= pair[1];
    }
    let _ = decoder.decode(&v);
    let _ = lax_decoder.decode(&v);
    let _ = decoder.decode(&v[..v.len() * noise[0] as usize / 256]);
  }
}

#[test]
fn test_round_trip_sizes() {
  let mut encoder = PngEncoder::new();
  let mut decoder = PngDecoder::new();
  for (w, h) in [(1, 1), (1, 17), (17, 1), (5, 3), (64, 64), (300, 2)] {
    for image in [super::rand_image(w, h), super::gradient_image(w, h)] {
      let png = encoder.encode(&image, &EncodeOptions::default()).unwrap();
      let back = decoder.decode(&png).unwrap();
      assert_eq!(back.pixels().len(), (w * h * 4) as usize);
      assert_eq!(back, image, "{w}x{h}");
    }
  }
}

#[test]
fn test_flipped_encode() {
  let image = super::rand_image(7, 5);
  let options = EncodeOptions { flip_vertically: true, ..EncodeOptions::default() };
  let back = pixcodec::decode(&pixcodec::encode(&image, &options).unwrap()).unwrap();
  for y in 0..5 {
    assert_eq!(back.row(y), image.row(4 - y));
  }
  // flipping twice is the original
  let mut twice = back.clone();
  twice.vertical_flip();
  assert_eq!(twice, image);
}

#[test]
fn test_header_of_encoded() {
  let image = super::gradient_image(40, 9);
  let png = pixcodec::encode(&image, &EncodeOptions::default()).unwrap();
  let meta = pixcodec::read_header(&png).unwrap();
  assert_eq!((meta.width(), meta.height(), meta.bit_depth()), (40, 9, 8));
  assert_eq!(meta.color_type(), pixcodec::png::PngColorType::RGBA);
}

#[test]
fn test_checksums_can_be_ignored() {
  let image = super::gradient_image(8, 8);
  let mut png = pixcodec::encode(&image, &EncodeOptions::default()).unwrap();
  // break the IEND trailer
  let last = png.len() - 1;
  png[last] ^= 1;
  assert_eq!(
    pixcodec::decode(&png),
    Err(pixcodec::FormatError::ChecksumMismatch(pixcodec::png::ChunkType::IEND))
  );
  let lax = DecodeOptions { verify_checksums: false, ..DecodeOptions::default() };
  assert_eq!(pixcodec::decode_with(&png, &lax).unwrap(), image);
}
