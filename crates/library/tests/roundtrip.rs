use datpack_library::dat::{
  Archive, Body, DAT_MAGIC, Object, PACK_MAGIC, Property, ReadOptions, Warning,
  body::{Bitmap, FONT_GLYPH_COUNT, Font, Palette, RleSprite},
  read_archive,
};
use pretty_assertions::assert_eq;

fn decode(data: &[u8]) -> (Archive, Vec<Warning>) {
  let decoded = read_archive(data, &ReadOptions::default()).unwrap();
  (decoded.archive, decoded.warnings)
}

#[test]
fn single_bitmap_archive() {
  let mut archive = Archive::new();
  archive.push(
    Object::new(Bitmap::new(24, 2, 1, vec![10, 20, 30, 40, 50, 60]).unwrap().into())
      .with_property(Property::DATE, "2024-02-29 12:00:00")
      .with_property(Property::NAME, "tile.bmp")
      .with_property(Property::ORIG, "assets/tile.bmp"),
  );

  let data = archive.to_bytes().unwrap();
  assert_eq!(&data[..8], b"slh.ALL.");

  let (decoded, warnings) = decode(&data);
  assert!(warnings.is_empty());
  assert_eq!(decoded.pack_magic, PACK_MAGIC);
  assert_eq!(decoded.dat_magic, DAT_MAGIC);
  assert_eq!(decoded.objects.len(), 1);

  let object = &decoded.objects[0];
  assert_eq!(object.kind(), *b"BMP ");
  assert_eq!(object.properties, archive.objects[0].properties);
  assert_eq!(
    object
      .properties
      .iter()
      .map(|property| property.kind)
      .collect::<Vec<_>>(),
    vec![*b"DATE", *b"NAME", *b"ORIG"]
  );

  let Body::Bitmap(bitmap) = &object.body else {
    panic!("expected a bitmap, got {:?}", object.body)
  };
  assert_eq!(bitmap.width(), 2);
  assert_eq!(bitmap.height(), 1);
  assert_eq!(bitmap.bits_per_pixel(), 24);
  assert_eq!(bitmap.pixels(), &[10, 20, 30, 40, 50, 60]);
}

#[test]
fn mixed_archive_is_byte_identical_after_decode() {
  let mut colors = [[0u8; 3]; 256];
  for (index, color) in colors.iter_mut().enumerate() {
    *color = [(index % 64) as u8, (index / 4) as u8 % 64, 63];
  }
  let mut glyphs = Box::new([[0u8; 16]; FONT_GLYPH_COUNT]);
  glyphs[b'A' as usize - 32] = [0x18, 0x24, 0x42, 0x42, 0x7E, 0x42, 0x42, 0x42, 0, 0, 0, 0, 0, 0, 0, 0];

  let mut archive = Archive::new();
  archive.push(Object::new(Palette::new(colors).into()).with_property(Property::NAME, "game.pal"));
  archive.push(Object::new(Bitmap::new(8, 3, 2, vec![0, 1, 2, 3, 4, 5]).unwrap().into()));
  archive.push(Object::new(Bitmap::new(32, 1, 1, vec![1, 2, 3, 4]).unwrap().into()));
  archive.push(Object::new(RleSprite::new(8, 0, 0, vec![0xFE; 33]).unwrap().into()));
  archive.push(
    Object::new(Font::Sixteen(glyphs).into())
      .with_property(Property::NAME, "")
      .with_property(*b"XTRA", vec![0, 159, 146, 150]),
  );

  let data = archive.to_bytes().unwrap();
  let (decoded, warnings) = decode(&data);
  assert!(warnings.is_empty());
  assert_eq!(decoded, archive);
  assert_eq!(decoded.to_bytes().unwrap(), data);

  // non UTF-8 payloads survive but have no text value
  let extra = decoded.objects[4].property(*b"XTRA").unwrap();
  assert_eq!(extra.value(), None);
  assert_eq!(decoded.objects[4].name(), Some(""));
}

#[test]
fn unknown_object_between_known_ones() {
  let mut archive = Archive::new();
  archive.push(Object::new(Font::Eight(Box::new([[0x81; 8]; FONT_GLYPH_COUNT])).into()));
  archive.push(Object {
    properties: vec![Property::new(Property::NAME, "sample")],
    compressed_length: 7,
    uncompressed_length: 7,
    body: Body::Unknown {
      kind: *b"XYZ ",
      data: b"opaque!".to_vec(),
    },
  });
  archive.push(Object::new(Bitmap::new(8, 1, 1, vec![0x42]).unwrap().into()));

  let data = archive.to_bytes().unwrap();
  let (decoded, warnings) = decode(&data);

  assert_eq!(decoded, archive);
  assert_eq!(
    warnings,
    vec![Warning::UnknownObjectType {
      index: 1,
      kind: *b"XYZ ",
      skipped: 7
    }]
  );
  assert_eq!(
    decoded.objects[2].body,
    Body::Bitmap(Bitmap::new(8, 1, 1, vec![0x42]).unwrap())
  );
}

#[test]
fn bitmap_occupies_exactly_its_geometry() {
  for (bits_per_pixel, width, height) in [(8, 7, 3), (24, 5, 5), (32, 1, 9), (-32, 2, 3), (24, 0, 4)] {
    let length = Bitmap::pixel_len(bits_per_pixel, width, height);
    assert_eq!(
      length,
      width as usize * height as usize * (bits_per_pixel.unsigned_abs() as usize / 8)
    );

    let bitmap = Bitmap::new(bits_per_pixel, width, height, vec![0x5A; length]).unwrap();
    let object = Object::new(bitmap.into());
    assert_eq!(object.uncompressed_length as usize, 6 + length);

    let mut archive = Archive::new();
    archive.push(object);
    assert_eq!(archive.to_bytes().unwrap().len(), 12 + 12 + 6 + length);
  }
}

#[test]
fn default_read_logs_but_keeps_unknown_objects() {
  let mut data = b"slh.ALL.\x00\x00\x00\x01".to_vec();
  data.extend_from_slice(b"????\x00\x00\x00\x02\x00\x00\x00\x02\xAA\xBB");

  let archive = Archive::read(&data).unwrap();
  assert_eq!(
    archive.objects[0].body,
    Body::Unknown {
      kind: *b"????",
      data: vec![0xAA, 0xBB]
    }
  );
}
