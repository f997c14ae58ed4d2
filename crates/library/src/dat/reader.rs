use std::fmt;

use snafu::ResultExt;
use tracing::debug;

use crate::{
  cursor::ByteCursor,
  dat::{
    Archive, Object, ReadError, tag_display,
    body::{Body, ObjectKind},
    property::read_properties,
    read_error::{
      BodySnafu, HeaderSnafu, ObjectHeaderSnafu, PropertiesSnafu, UnknownBodyOutOfBoundsSnafu,
    },
    types::{ArchiveHeader, ObjectHeader},
  },
};

#[derive(Debug, Clone)]
pub struct ReadOptions {
  /// Upper bound on the properties of a single object. The wire format has no
  /// count, so this is what stops a corrupt chain.
  pub max_properties: usize,
}

impl Default for ReadOptions {
  fn default() -> Self {
    Self {
      max_properties: 100,
    }
  }
}

/// Something odd about an archive that did not stop it from being read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
  UnknownObjectType {
    index: u32,
    kind: [u8; 4],
    skipped: usize,
  },
  /// The body's geometry disagrees with the declared uncompressed length.
  LengthMismatch {
    index: u32,
    declared: i32,
    actual: usize,
  },
  PaletteChannelOutOfRange { index: u32, entry: usize },
  TrailingData { offset: usize, length: usize },
}

impl fmt::Display for Warning {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Warning::UnknownObjectType {
        index,
        kind,
        skipped,
      } => write!(
        f,
        "object {index} has unknown type {:?}, skipped {skipped} bytes",
        tag_display(kind)
      ),
      Warning::LengthMismatch {
        index,
        declared,
        actual,
      } => write!(
        f,
        "object {index} declares {declared} uncompressed bytes but its body is {actual} bytes"
      ),
      Warning::PaletteChannelOutOfRange { index, entry } => write!(
        f,
        "palette in object {index} has a channel above 63 at entry {entry}"
      ),
      Warning::TrailingData { offset, length } => {
        write!(f, "{length} unread bytes after the last object at 0x{offset:X}")
      }
    }
  }
}

#[derive(Debug)]
pub struct Decoded {
  pub archive: Archive,
  pub warnings: Vec<Warning>,
}

/// Decodes a whole archive.
///
/// Unknown object types are not errors: their bodies are skipped using the
/// declared compressed length and kept as [`Body::Unknown`]. Anything else that
/// cannot be read fails the whole decode, since the position of every later
/// object depends on it.
pub fn read_archive(data: &[u8], options: &ReadOptions) -> Result<Decoded, ReadError> {
  let mut cursor = ByteCursor::new(data);
  let header = cursor.read::<ArchiveHeader>().context(HeaderSnafu)?;
  let object_count = header.object_count.get();
  debug!(
    "pack magic 0x{:08X}, dat magic 0x{:08X}, {object_count} objects",
    header.pack_magic.get(),
    header.dat_magic.get()
  );

  // never trust the count for allocation
  let mut objects = Vec::with_capacity((object_count as usize).min(cursor.remaining() / 12));
  let mut warnings = Vec::new();
  for index in 0..object_count {
    objects.push(read_object(&mut cursor, index, options, &mut warnings)?);
  }

  if !cursor.is_empty() {
    warnings.push(Warning::TrailingData {
      offset: cursor.offset(),
      length: cursor.remaining(),
    });
  }

  Ok(Decoded {
    archive: Archive {
      pack_magic: header.pack_magic.get(),
      dat_magic: header.dat_magic.get(),
      objects,
    },
    warnings,
  })
}

fn read_object(
  cursor: &mut ByteCursor<'_>,
  index: u32,
  options: &ReadOptions,
  warnings: &mut Vec<Warning>,
) -> Result<Object, ReadError> {
  let properties =
    read_properties(cursor, options.max_properties).context(PropertiesSnafu { index })?;
  let header = cursor
    .read::<ObjectHeader>()
    .context(ObjectHeaderSnafu { index })?;
  let compressed_length = header.compressed_length.get();
  let uncompressed_length = header.uncompressed_length.get();
  debug!(
    "object {index}: {} with {} properties, compressed {compressed_length}, uncompressed {uncompressed_length}",
    tag_display(&header.kind),
    properties.len()
  );

  let body = match ObjectKind::from_tag(header.kind) {
    Some(kind) => {
      let body_start = cursor.offset();
      let body = Body::read(kind, cursor).context(BodySnafu { index, kind })?;
      let actual = cursor.offset() - body_start;
      if usize::try_from(uncompressed_length).ok() != Some(actual) {
        warnings.push(Warning::LengthMismatch {
          index,
          declared: uncompressed_length,
          actual,
        });
      }
      if let Body::Palette(palette) = &body {
        if let Some(entry) = palette.out_of_range_entry() {
          warnings.push(Warning::PaletteChannelOutOfRange { index, entry });
        }
      }
      body
    }
    None => {
      let skipped = usize::try_from(compressed_length).unwrap_or(0);
      let data = cursor
        .read_bytes(skipped)
        .context(UnknownBodyOutOfBoundsSnafu {
          index,
          kind: tag_display(&header.kind),
        })?;
      debug!(
        "object {index} has unknown type {:?}, skipping {skipped} bytes",
        tag_display(&header.kind)
      );
      warnings.push(Warning::UnknownObjectType {
        index,
        kind: header.kind,
        skipped,
      });
      Body::Unknown {
        kind: header.kind,
        data: data.to_vec(),
      }
    }
  };

  Ok(Object {
    properties,
    compressed_length,
    uncompressed_length,
    body,
  })
}
