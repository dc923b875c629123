use pcx_codec::{pcx::*, Bitmap, PcxError, PixelBuffer, RGB8, RGBA8};
use pixel_formats::r8g8b8a8_Srgb;
use walkdir::WalkDir;

const SIZES: [(u32, u32); 6] = [(1, 1), (7, 3), (8, 2), (9, 4), (13, 1), (33, 5)];

/// An image where every pixel is a random pick from `colors`.
fn random_image(width: u32, height: u32, colors: &[RGB8]) -> PixelBuffer {
  let picks = super::rand_bytes((width * height) as usize);
  let pixels = picks.iter().map(|&b| colors[usize::from(b) % colors.len()].opaque()).collect();
  Bitmap { width, height, pixels }
}

fn assert_round_trip(encoder: PcxEncoder<'_>, colors: &[RGB8]) {
  for (width, height) in SIZES {
    let image = random_image(width, height, colors);
    let bytes = encoder.encode(&image).unwrap();
    let decoded = pcx_decode(&bytes).unwrap();
    assert_eq!(decoded.pixels, image, "{width}x{height}");
    // saving what was loaded gives back the same file
    assert_eq!(decoded.encoder().encode(&decoded.pixels).unwrap(), bytes, "{width}x{height}");
  }
}

fn distinct_256() -> Vec<RGB8> {
  (0..=255_u8).map(|i| RGB8::new(i, i ^ 0x55, 7)).collect()
}

#[test]
fn test_round_trip_monochrome() {
  super::init_logging();
  let colors = [RGB8::new(0, 0, 0), RGB8::new(255, 255, 255)];
  assert_round_trip(PcxEncoder::new(PcxVariant::Monochrome), &colors);
}

#[test]
fn test_round_trip_cga_system_palette() {
  super::init_logging();
  let cga = CgaDescriptor { background_color: 1, color_burst: true, palette_number: 1, intensity: true };
  let palette = PcxPalette::try_from_cga(cga).unwrap();
  assert_round_trip(PcxEncoder::new(PcxVariant::Cga4Color).palette(&palette), palette.colors());

  let bytes = PcxEncoder::new(PcxVariant::Cga4Color)
    .palette(&palette)
    .encode(&random_image(3, 3, palette.colors()))
    .unwrap();
  assert_eq!(bytes[1], PCX_VERSION_2_5);
  assert_eq!(pcx_decode(&bytes).unwrap().palette.unwrap().source(), PaletteSource::Cga(cga));
}

#[test]
fn test_round_trip_cga_header_palette() {
  let colors = [RGB8::new(0, 0, 0), RGB8::new(90, 10, 10), RGB8::new(10, 90, 10), RGB8::new(10, 10, 90)];
  let palette = PcxPalette::try_from_colors(&colors).unwrap();
  assert_round_trip(PcxEncoder::new(PcxVariant::Cga4Color).palette(&palette), &colors);
}

#[test]
fn test_round_trip_planar_ega_default() {
  super::init_logging();
  for variant in [PcxVariant::Planar4Color, PcxVariant::Planar8Color, PcxVariant::Planar16Color] {
    let count = variant.index_count().unwrap();
    assert_round_trip(PcxEncoder::new(variant), &PCX_EGA_PALETTE[..count]);
  }
}

#[test]
fn test_round_trip_planar_header_palette() {
  let colors: Vec<RGB8> = (0..16_u8).map(|i| RGB8::new(i * 16, 255 - i, i)).collect();
  for variant in [PcxVariant::Planar4Color, PcxVariant::Planar8Color, PcxVariant::Planar16Color] {
    let count = variant.index_count().unwrap();
    let palette = PcxPalette::try_from_colors(&colors[..count]).unwrap();
    assert_round_trip(PcxEncoder::new(variant).palette(&palette), &colors[..count]);
  }
}

#[test]
fn test_round_trip_nibble() {
  assert_round_trip(PcxEncoder::new(PcxVariant::Nibble16Color), &PCX_EGA_PALETTE);
  let colors: Vec<RGB8> = (0..16_u8).map(|i| RGB8::new(i, i, 200)).collect();
  let palette = PcxPalette::try_from_colors(&colors).unwrap();
  assert_round_trip(PcxEncoder::new(PcxVariant::Nibble16Color).palette(&palette), &colors);
}

#[test]
fn test_round_trip_256() {
  super::init_logging();
  let colors = distinct_256();
  let palette = PcxPalette::try_from_colors(&colors).unwrap();
  assert_round_trip(PcxEncoder::new(PcxVariant::Indexed256Color).palette(&palette), &colors);
}

#[test]
fn test_round_trip_true_color() {
  for (width, height) in SIZES {
    let bytes = super::rand_bytes((width * height * 3) as usize);
    let pixels = bytes.chunks_exact(3).map(|c| RGB8::new(c[0], c[1], c[2]).opaque()).collect();
    let image = Bitmap { width, height, pixels };
    let file = PcxEncoder::new(PcxVariant::TrueColor24).encode(&image).unwrap();
    assert_eq!(pcx_decode(&file).unwrap().pixels, image);
  }
}

#[test]
fn test_generic_bitmap_decode() {
  let image = random_image(5, 4, &PCX_EGA_PALETTE);
  let file = PcxEncoder::new(PcxVariant::Planar16Color).encode(&image).unwrap();
  let bitmap = Bitmap::<r8g8b8a8_Srgb>::try_from_pcx_bytes(&file).unwrap();
  assert_eq!((bitmap.width, bitmap.height), (5, 4));
  let expected: Vec<r8g8b8a8_Srgb> = image.pixels.iter().map(|&p| p.into()).collect();
  assert_eq!(bitmap.pixels, expected);
}

#[test]
fn test_monochrome_uses_red_top_bit() {
  let pixels = vec![
    RGBA8 { r: 0x80, g: 0, b: 0, a: 0 },
    RGBA8 { r: 0x7F, g: 0xFF, b: 0xFF, a: 0xFF },
  ];
  let file = PcxEncoder::new(PcxVariant::Monochrome).encode(&Bitmap { width: 2, height: 1, pixels }).unwrap();
  let image = pcx_decode(&file).unwrap();
  assert_eq!(image.pixels.pixels, [RGB8::new(255, 255, 255).opaque(), RGBA8::BLACK]);
}

#[test]
fn test_encode_rejects_unknown_color() {
  let mut image = random_image(4, 4, &PCX_EGA_PALETTE[..4]);
  image.pixels[5] = PCX_EGA_PALETTE[4].opaque();
  assert_eq!(
    PcxEncoder::new(PcxVariant::Planar4Color).encode(&image),
    Err(PcxError::ColorNotInPalette)
  );

  let palette = PcxPalette::try_from_colors(&distinct_256()).unwrap();
  let mut image = random_image(4, 4, palette.colors());
  image.pixels[0] = RGB8::new(1, 2, 3).opaque();
  assert_eq!(
    PcxEncoder::new(PcxVariant::Indexed256Color).palette(&palette).encode(&image),
    Err(PcxError::ColorNotInPalette)
  );
}

#[test]
fn test_encode_palette_requirements() {
  let image = random_image(2, 2, &PCX_EGA_PALETTE[..4]);
  assert_eq!(PcxEncoder::new(PcxVariant::Cga4Color).encode(&image), Err(PcxError::PaletteMissing));
  assert_eq!(PcxEncoder::new(PcxVariant::Indexed256Color).encode(&image), Err(PcxError::PaletteMissing));

  let small = PcxPalette::try_from_colors(&PCX_EGA_PALETTE).unwrap();
  assert_eq!(
    PcxEncoder::new(PcxVariant::Indexed256Color).palette(&small).encode(&image),
    Err(PcxError::PaletteSizeMismatch)
  );

  let big = PcxPalette::try_from_colors(&distinct_256()).unwrap();
  assert_eq!(
    PcxEncoder::new(PcxVariant::Planar16Color).palette(&big).encode(&image),
    Err(PcxError::PaletteSizeMismatch)
  );

  let repeats = PcxPalette::try_from_colors(&[PCX_EGA_PALETTE[0]; 4]).unwrap();
  assert_eq!(
    PcxEncoder::new(PcxVariant::Cga4Color).palette(&repeats).encode(&image),
    Err(PcxError::PaletteDuplicate)
  );
}

#[test]
fn test_encode_size_checks() {
  let bad = Bitmap { width: 3, height: 3, pixels: vec![RGBA8::BLACK; 8] };
  assert_eq!(PcxEncoder::new(PcxVariant::TrueColor24).encode(&bad), Err(PcxError::PixelBufferSizeMismatch));

  let empty: PixelBuffer = Bitmap { width: 0, height: 5, pixels: vec![] };
  assert_eq!(PcxEncoder::new(PcxVariant::TrueColor24).encode(&empty), Err(PcxError::InvalidDimensions));
}

#[test]
fn test_256_trailing_palette_errors() {
  let palette = PcxPalette::try_from_colors(&distinct_256()).unwrap();
  let image = Bitmap { width: 6, height: 2, pixels: vec![palette.colors()[1].opaque(); 12] };
  let file = PcxEncoder::new(PcxVariant::Indexed256Color).palette(&palette).encode(&image).unwrap();
  let marker_pos = file.len() - PCX_PALETTE_256_LEN - 1;
  assert_eq!(file[marker_pos], PCX_PALETTE_256_MARKER);

  let mut no_marker = file.clone();
  no_marker[marker_pos] = 0;
  assert_eq!(pcx_decode(&no_marker), Err(PcxError::PaletteMarkerMissing));

  let mut short = file.clone();
  short.pop();
  assert_eq!(pcx_decode(&short), Err(PcxError::PaletteSizeMismatch));
}

#[test]
fn test_truncated_body() {
  let image = random_image(16, 16, &PCX_EGA_PALETTE);
  let file = PcxEncoder::new(PcxVariant::TrueColor24).encode(&image).unwrap();
  let cut = &file[..PCX_HEADER_LEN + (file.len() - PCX_HEADER_LEN) / 2];
  assert_eq!(pcx_decode(cut), Err(PcxError::InsufficientBytes));
  assert_eq!(pcx_decode(&file[..PCX_HEADER_LEN]), Err(PcxError::InsufficientBytes));
}

#[test]
fn test_rle_lines_survive_round_trip() {
  for len in [1, 2, 63, 64, 65, 200, 1000] {
    let mut line = super::rand_bytes(len);
    // give the encoder some runs to find too
    for chunk in line.chunks_mut(17).step_by(2) {
      let v = chunk[0];
      chunk.fill(v);
    }
    let mut encoded = vec![0; pcx_rle_max_encoded_len(len)];
    let n = pcx_rle_encode_line(&line, &mut encoded).unwrap();
    assert!(pcx_iter_rle(&encoded[..n]).all(|run| run.count <= PCX_RLE_MAX_RUN));
    let mut back = vec![0; len];
    assert_eq!(pcx_rle_decode_line(&encoded[..n], &mut back), Ok(n));
    assert_eq!(back, line);
  }
}

#[derive(Default)]
struct Screen {
  shown: Vec<(u32, u32, usize)>,
}
impl PixelSink for Screen {
  fn present(&mut self, width: u32, height: u32, rgba: &[u8]) {
    self.shown.push((width, height, rgba.len()));
  }
}

#[derive(Default)]
struct Disk {
  saved: Vec<(String, Vec<u8>)>,
}
impl ByteSink for Disk {
  fn accept(&mut self, bytes: Vec<u8>, suggested_name: &str) {
    self.saved.push((suggested_name.to_string(), bytes));
  }
}

#[test]
fn test_sinks() {
  let image = random_image(7, 2, &PCX_EGA_PALETTE[..8]);
  let mut disk = Disk::default();
  PcxEncoder::new(PcxVariant::Planar8Color).encode_to_sink(&image, "ega8", &mut disk).unwrap();
  assert_eq!(disk.saved.len(), 1);
  assert_eq!(disk.saved[0].0, "ega8.pcx");

  let mut screen = Screen::default();
  let decoded = pcx_decode_to_sink(&disk.saved[0].1, &mut screen).unwrap();
  assert_eq!(screen.shown, [(7, 2, 7 * 2 * 4)]);
  assert_eq!(decoded.pixels, image);

  // failures never reach the sink
  let mut screen = Screen::default();
  assert!(pcx_decode_to_sink(&[0_u8; 10][..], &mut screen).is_err());
  assert!(screen.shown.is_empty());
  let mut disk = Disk::default();
  assert!(PcxEncoder::new(PcxVariant::Cga4Color).encode_to_sink(&image, "x", &mut disk).is_err());
  assert!(disk.saved.is_empty());
}

#[test]
fn test_pcx_decode_no_panics() {
  // iter ALL files in the test folder, even non-pcx files shouldn't panic it.
  for entry in WalkDir::new("tests/").into_iter().filter_map(|e| e.ok()) {
    if entry.file_type().is_dir() {
      continue;
    }
    println!("{}", entry.path().display());
    let v = match std::fs::read(entry.path()) {
      Ok(v) => v,
      Err(e) => {
        println!("Error reading file: {e:?}");
        continue;
      }
    };
    let _ = pcx_decode(&v);
  }
  // even totally random data should never panic the decoder!
  for _ in 0..10 {
    let v = super::rand_bytes(1024);
    let _ = pcx_decode(&v);
  }
  // random bodies behind headers that pass the basic checks
  for (i, variant) in PcxVariant::ALL.into_iter().cycle().take(64).enumerate() {
    let mut v = super::rand_bytes(2048);
    v[0] = 10;
    v[2] = 1;
    v[3] = variant.bits_per_pixel();
    v[4..8].fill(0);
    v[8..10].copy_from_slice(&(i as u16 % 40).to_le_bytes());
    v[10..12].copy_from_slice(&(i as u16 % 23).to_le_bytes());
    v[65] = variant.color_planes();
    v[66] = v[66] % 8 + 6;
    v[67] = 0;
    let _ = pcx_decode(&v);
  }
}

#[test]
fn test_true_color_from_rgba_bytes() {
  let bytes = super::rand_bytes(5 * 3 * 4);
  let mut image = PixelBuffer::try_from_rgba_bytes(5, 3, &bytes).unwrap();
  assert_eq!(image.as_rgba_bytes(), bytes.as_slice());
  assert_eq!(PixelBuffer::try_from_rgba_bytes(5, 3, &bytes[4..]), Err(PcxError::PixelBufferSizeMismatch));
  assert_eq!(PixelBuffer::try_from_rgba_bytes(5, 3, &bytes[1..]), Err(PcxError::PixelBufferSizeMismatch));
  // the file has no alpha, so decoding gives it back as opaque
  for p in image.pixels.iter_mut() {
    p.a = 0xFF;
  }
  let corner = RGBA8 { r: 1, g: 2, b: 3, a: 0xFF };
  *image.get_mut(4, 2).unwrap() = corner;
  assert!(image.get_mut(5, 0).is_none());
  let file = PcxEncoder::new(PcxVariant::TrueColor24).encode(&image).unwrap();
  let decoded = pcx_decode(&file).unwrap().pixels;
  assert_eq!(decoded.get(4, 2), Some(&corner));
  assert_eq!(decoded.get(0, 3), None);
  assert_eq!(decoded, image);
}
