use datpack_assets::{
  GlyphSheetError, font::SHEET_WIDTH, import_bitmap, import_font, import_palette,
  import_rle_sprite,
};
use datpack_library::dat::{
  Archive, Body, Object, Property,
  body::{Font, FontSize},
};
use image::{GrayImage, Luma, Rgb, RgbImage};
use pretty_assertions::assert_eq;

#[test]
fn colour_bitmap_matches_the_encoder_input() {
  let directory = tempfile::tempdir().unwrap();
  let path = directory.path().join("tiles.bmp");
  let source = RgbImage::from_fn(3, 2, |x, y| Rgb([x as u8 * 40, y as u8 * 90, 7]));
  source.save(&path).unwrap();

  let bitmap = import_bitmap(&path).unwrap();
  assert_eq!(bitmap.bits_per_pixel(), 24);
  assert_eq!((bitmap.width(), bitmap.height()), (3, 2));
  assert_eq!(bitmap.pixels(), source.as_raw().as_slice());
  assert_eq!(bitmap.pixel(2, 1), Some(&[80, 90, 7][..]));
}

#[test]
fn grey_glyph_sheet_becomes_a_sixteen_pixel_font() {
  let directory = tempfile::tempdir().unwrap();
  let path = directory.path().join("font16.bmp");
  let cell = (b'#' - b' ') as u32;
  let sheet = GrayImage::from_fn(SHEET_WIDTH, 16, |x, y| {
    // a frame around the cell for '#'
    let inside = x / 8 == cell;
    let edge = x % 8 == 0 || x % 8 == 7 || y == 0 || y == 15;
    Luma([if inside && edge { 255 } else { 30 }])
  });
  sheet.save(&path).unwrap();

  let font = import_font(&path, FontSize::Sixteen, 128).unwrap();
  let glyph = font.glyph(cell as usize).unwrap();
  assert_eq!(glyph[0], 0xFF);
  assert!(glyph[1..15].iter().all(|row| *row == 0x81));
  assert_eq!(glyph[15], 0xFF);
  assert!(font.glyph(0).unwrap().iter().all(|row| *row == 0));

  assert!(matches!(
    import_font(&path, FontSize::Eight, 128),
    Err(GlyphSheetError::GeometryMismatch { .. })
  ));
}

#[test]
fn imported_assets_survive_an_archive_round_trip() {
  let directory = tempfile::tempdir().unwrap();

  let bitmap_path = directory.path().join("sky.bmp");
  RgbImage::from_pixel(4, 4, Rgb([10, 20, 200]))
    .save(&bitmap_path)
    .unwrap();

  let font_path = directory.path().join("font8.bmp");
  GrayImage::from_pixel(SHEET_WIDTH, 8, Luma([255]))
    .save(&font_path)
    .unwrap();

  let palette_path = directory.path().join("game.pal");
  let mut riff = b"RIFF\x14\x00\x00\x00PAL data\x08\x00\x00\x00\x00\x03\x01\x00".to_vec();
  riff.extend_from_slice(&[252, 8, 4, 0]);
  std::fs::write(&palette_path, riff).unwrap();

  let sprite_path = directory.path().join("hero.rle");
  std::fs::write(&sprite_path, [0x82, 5, 5, 0]).unwrap();

  let mut archive = Archive::new();
  archive.push(
    Object::new(import_bitmap(&bitmap_path).unwrap().into()).with_property(Property::NAME, "sky.bmp"),
  );
  archive.push(Object::new(import_font(&font_path, FontSize::Eight, 128).unwrap().into()));
  archive.push(Object::new(import_palette(&palette_path).unwrap().into()));
  archive.push(Object::new(import_rle_sprite(&sprite_path).unwrap().into()));

  let output = directory.path().join("game.dat");
  archive.write_to_path(&output).unwrap();
  let decoded = Archive::read(&std::fs::read(&output).unwrap()).unwrap();
  assert_eq!(decoded, archive);

  let Body::Font(Font::Eight(glyphs)) = &decoded.objects[1].body else {
    panic!("expected an 8 pixel font")
  };
  assert!(glyphs.iter().all(|glyph| *glyph == [0xFF; 8]));
  let Body::Palette(palette) = &decoded.objects[2].body else {
    panic!("expected a palette")
  };
  assert_eq!(palette.colors()[0], [63, 2, 1]);
}
