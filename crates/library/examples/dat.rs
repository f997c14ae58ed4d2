use std::fs;

use datpack_library::dat::{
  Archive, Object, Property, ReadOptions, WriteError,
  body::{Bitmap, FONT_GLYPH_COUNT, Font, Palette},
  read_archive,
};

#[snafu::report]
fn main() -> Result<(), WriteError> {
  let mut archive = Archive::new();
  archive.push(
    Object::new(Bitmap::new(24, 2, 1, vec![10, 20, 30, 40, 50, 60]).unwrap().into())
      .with_property(Property::NAME, "pixels"),
  );
  archive.push(Object::new(Palette::from_colors(&[[63, 0, 0], [0, 63, 0]]).unwrap().into()));
  archive.push(Object::new(Font::Eight(Box::new([[0x55; 8]; FONT_GLYPH_COUNT])).into()));

  archive.write_to_path("target/example.dat")?;

  let data = fs::read("target/example.dat")?;
  let decoded = read_archive(&data, &ReadOptions::default()).unwrap();
  for object in &decoded.archive.objects {
    println!(
      "{:?} {:?} {} bytes",
      object.name(),
      String::from_utf8_lossy(&object.kind()),
      object.uncompressed_length
    );
  }
  println!("{} warnings", decoded.warnings.len());
  Ok(())
}
