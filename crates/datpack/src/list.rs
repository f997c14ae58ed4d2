use std::{fs, path::Path};

use datpack_library::dat::{
  Body, Object, ReadOptions,
  body::Font,
  read_archive, tag_display,
};
use snafu::{ResultExt, Whatever};
use tracing::warn;

pub fn run(path: &Path, max_properties: usize) -> Result<(), Whatever> {
  let data =
    fs::read(path).with_whatever_context(|_| format!("failed to read {}", path.display()))?;
  let decoded = read_archive(&data, &ReadOptions { max_properties })
    .with_whatever_context(|_| format!("{} is not a readable archive", path.display()))?;

  let archive = &decoded.archive;
  println!(
    "{}: {} objects, magics {:?} {:?}",
    path.display(),
    archive.objects.len(),
    tag_display(&archive.pack_magic.to_be_bytes()),
    tag_display(&archive.dat_magic.to_be_bytes())
  );
  for (index, object) in archive.objects.iter().enumerate() {
    for line in describe_object(index, object) {
      println!("{line}");
    }
  }

  for warning in &decoded.warnings {
    warn!("{warning}");
  }
  Ok(())
}

fn describe_object(index: usize, object: &Object) -> Vec<String> {
  let mut lines = vec![format!(
    "[{index}] {} {:?} compressed {} uncompressed {}: {}",
    object.name().unwrap_or("<unnamed>"),
    tag_display(&object.kind()),
    object.compressed_length,
    object.uncompressed_length,
    describe_body(&object.body)
  )];
  for property in &object.properties {
    let value = match property.value() {
      Some(value) => format!("{value:?}"),
      None => format!("{:02X?}", property.data),
    };
    lines.push(format!(
      "    {} ({} bytes) {value}",
      tag_display(&property.kind),
      property.data.len()
    ));
  }
  lines
}

fn describe_body(body: &Body) -> String {
  match body {
    Body::Bitmap(bitmap) => format!(
      "bitmap {}x{} at {} bpp",
      bitmap.width(),
      bitmap.height(),
      bitmap.bits_per_pixel()
    ),
    Body::Palette(palette) => match palette.out_of_range_entry() {
      Some(entry) => format!("palette, entry {entry} exceeds 6 bits"),
      None => "palette".to_owned(),
    },
    Body::RleSprite(sprite) => format!(
      "rle sprite {}x{} at {} bpp, {} bytes",
      sprite.width(),
      sprite.height(),
      sprite.bits_per_pixel(),
      sprite.data().len()
    ),
    Body::Font(Font::Ranges(ranges)) => format!(
      "font with {} ranges, {} glyphs",
      ranges.len(),
      ranges.iter().map(|range| range.glyphs.len()).sum::<usize>()
    ),
    Body::Font(font) => format!(
      "{} pixel font, {} glyphs",
      font.size() as i16,
      font.glyphs().count()
    ),
    Body::Unknown { data, .. } => format!("unknown, {} bytes kept", data.len()),
  }
}
