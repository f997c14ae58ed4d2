use std::{
  io::{BufWriter, Write},
  path::Path,
};

use snafu::{OptionExt, ResultExt, ensure};
use tempfile::NamedTempFile;
use tracing::debug;
use zerocopy::{
  IntoBytes,
  big_endian::{I32, U32},
};

use crate::dat::{
  Archive, Object, WriteError, tag_display,
  property::{PROPERTY_MAGIC, write_properties},
  types::{ArchiveHeader, ObjectHeader},
  write_error::{OverflowedSnafu, PersistSnafu, ReservedKindSnafu},
};

impl Archive {
  /// Encodes the archive in wire order. Declared lengths are written as stored.
  pub fn write(&self, mut writer: impl Write) -> Result<(), WriteError> {
    let object_count = u32::try_from(self.objects.len())
      .ok()
      .context(OverflowedSnafu {
        what: "object count",
      })?;
    let header = ArchiveHeader {
      pack_magic: U32::new(self.pack_magic),
      dat_magic: U32::new(self.dat_magic),
      object_count: U32::new(object_count),
    };
    writer.write_all(header.as_bytes())?;

    for (index, object) in self.objects.iter().enumerate() {
      debug!(
        "writing object {index}: {} with {} properties",
        tag_display(&object.kind()),
        object.properties.len()
      );
      write_object(object, &mut writer)?;
    }

    writer.flush()?;
    Ok(())
  }

  pub fn to_bytes(&self) -> Result<Vec<u8>, WriteError> {
    let mut data = Vec::new();
    self.write(&mut data)?;
    Ok(data)
  }

  /// Writes to a temporary file next to `path` and moves it into place once
  /// complete, so a failed write never leaves a partial archive behind.
  pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<(), WriteError> {
    let path = path.as_ref();
    let directory = path
      .parent()
      .filter(|parent| !parent.as_os_str().is_empty())
      .unwrap_or(Path::new("."));

    let mut file = NamedTempFile::new_in(directory)?;
    self.write(BufWriter::new(file.as_file_mut()))?;
    file.persist(path).context(PersistSnafu { path })?;
    Ok(())
  }
}

fn write_object(object: &Object, writer: &mut impl Write) -> Result<(), WriteError> {
  // a "prop" type tag would be read back as the start of another property
  ensure!(object.kind() != PROPERTY_MAGIC, ReservedKindSnafu);
  i32::try_from(object.body.encoded_len())
    .ok()
    .context(OverflowedSnafu { what: "object body" })?;

  write_properties(&object.properties, writer)?;
  let header = ObjectHeader {
    kind: object.kind(),
    compressed_length: I32::new(object.compressed_length),
    uncompressed_length: I32::new(object.uncompressed_length),
  };
  writer.write_all(header.as_bytes())?;
  object.body.write(writer)
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::dat::{
    Body, Property,
    body::{Bitmap, FONT_GLYPH_COUNT, Font, Palette, RleSprite},
  };

  #[test]
  fn writes_header_properties_and_body_in_order() {
    let mut archive = Archive::new();
    archive.push(
      Object::new(Body::Bitmap(Bitmap::new(8, 1, 1, vec![0x7F]).unwrap()))
        .with_property(Property::NAME, "dot"),
    );

    let data = archive.to_bytes().unwrap();
    let mut expected = b"slh.ALL.\x00\x00\x00\x01".to_vec();
    expected.extend_from_slice(b"propNAME\x00\x00\x00\x03dot");
    expected.extend_from_slice(b"BMP \x00\x00\x00\x07\x00\x00\x00\x07");
    expected.extend_from_slice(&[0x00, 0x08, 0x00, 0x01, 0x00, 0x01, 0x7F]);
    assert_eq!(data, expected);
  }

  #[test]
  fn every_body_kind_round_trips() {
    let mut archive = Archive::new();
    archive.push(Object::new(
      Bitmap::new(32, 2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8])
        .unwrap()
        .into(),
    ));
    archive.push(
      Object::new(Palette::from_colors(&[[63, 2, 1]]).unwrap().into())
        .with_property(Property::ORIG, "game.pal"),
    );
    archive.push(Object::new(
      RleSprite::new(8, 4, 4, vec![0x84, 1, 2, 3, 4, 0x00])
        .unwrap()
        .into(),
    ));
    archive.push(Object::new(
      Font::Eight(Box::new([[0xAA; 8]; FONT_GLYPH_COUNT])).into(),
    ));
    archive.push(Object::new(
      Font::Sixteen(Box::new([[0x18; 16]; FONT_GLYPH_COUNT])).into(),
    ));
    archive.push(Object {
      properties: vec![Property::new(Property::NAME, "mystery")],
      compressed_length: 3,
      uncompressed_length: 9,
      body: Body::Unknown {
        kind: *b"XYZ ",
        data: vec![9, 8, 7],
      },
    });

    let data = archive.to_bytes().unwrap();
    let decoded = crate::dat::read_archive(&data, &Default::default()).unwrap();
    assert_eq!(decoded.archive, archive);
    assert_eq!(decoded.archive.to_bytes().unwrap(), data);
  }

  #[test]
  fn property_tag_is_not_an_object_type() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("bad.dat");

    let mut archive = Archive::new();
    archive.push(Object::new(Body::Unknown {
      kind: *b"prop",
      data: vec![1, 2, 3],
    }));

    assert!(matches!(
      archive.to_bytes().unwrap_err(),
      WriteError::ReservedKind { .. }
    ));
    assert!(matches!(
      archive.write_to_path(&path).unwrap_err(),
      WriteError::ReservedKind { .. }
    ));
    assert!(!path.exists());
  }

  #[test]
  #[cfg(target_pointer_width = "64")]
  fn body_longer_than_a_length_field_is_rejected() {
    // zeroed allocations are not touched until written, so this stays cheap
    let object = Object::new(Body::Unknown {
      kind: *b"HUGE",
      data: vec![0; i32::MAX as usize + 1],
    });
    let error = write_object(&object, &mut Vec::new()).unwrap_err();
    assert!(matches!(
      error,
      WriteError::Overflowed {
        what: "object body",
        ..
      }
    ));
  }

  #[test]
  fn atomic_write_replaces_file() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("out.dat");
    std::fs::write(&path, b"stale").unwrap();

    let mut archive = Archive::new();
    archive.push(Object::new(Palette::default().into()));
    archive.write_to_path(&path).unwrap();

    let written = std::fs::read(&path).unwrap();
    assert_eq!(written, archive.to_bytes().unwrap());
    assert_eq!(std::fs::read_dir(directory.path()).unwrap().count(), 1);
  }

  #[test]
  fn failed_write_leaves_no_file() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("fonts.dat");

    let mut archive = Archive::new();
    archive.push(Object::new(Font::Ranges(Vec::new()).into()));
    let error = archive.write_to_path(&path).unwrap_err();

    assert!(matches!(error, WriteError::RangeFontUnsupported { .. }));
    assert!(!path.exists());
    assert_eq!(std::fs::read_dir(directory.path()).unwrap().count(), 0);
  }
}
