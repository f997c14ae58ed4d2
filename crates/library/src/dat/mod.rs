pub mod body;
pub mod property;
pub mod reader;
mod types;
pub mod writer;

use std::borrow::Cow;

use tracing::warn;

pub use body::{Body, ObjectKind};
pub use property::Property;
pub use read_error::ReadError;
pub use reader::{Decoded, ReadOptions, Warning, read_archive};
pub use write_error::WriteError;

/// `slh.`, the pack magic of an archive stored without compression.
pub const PACK_MAGIC: u32 = 0x736C682E;
/// `ALL.`
pub const DAT_MAGIC: u32 = 0x414C4C2E;

/// Renders a four byte tag for diagnostics, replacing anything that is not UTF-8.
pub fn tag_display(tag: &[u8; 4]) -> Cow<'_, str> {
  String::from_utf8_lossy(tag)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
  pub pack_magic: u32,
  pub dat_magic: u32,
  pub objects: Vec<Object>,
}

impl Archive {
  pub fn new() -> Self {
    Self {
      pack_magic: PACK_MAGIC,
      dat_magic: DAT_MAGIC,
      objects: Vec::new(),
    }
  }

  pub fn push(&mut self, object: Object) {
    self.objects.push(object);
  }

  /// Decodes an archive with the default [`ReadOptions`], logging any
  /// recoverable problems instead of returning them.
  pub fn read(data: &[u8]) -> Result<Self, ReadError> {
    let decoded = read_archive(data, &ReadOptions::default())?;
    for warning in &decoded.warnings {
      warn!("{warning}");
    }
    Ok(decoded.archive)
  }
}

impl Default for Archive {
  fn default() -> Self {
    Self::new()
  }
}

/// One typed entry of an archive.
///
/// The type tag is not stored separately; it is always derived from [`Object::body`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
  pub properties: Vec<Property>,
  pub compressed_length: i32,
  pub uncompressed_length: i32,
  pub body: Body,
}

impl Object {
  /// Wraps a body, declaring both lengths as the body's encoded size.
  ///
  /// A body too long for a length field saturates here and is rejected with
  /// [`WriteError::Overflowed`] when written.
  pub fn new(body: Body) -> Self {
    let length = i32::try_from(body.encoded_len()).unwrap_or(i32::MAX);
    Self {
      properties: Vec::new(),
      compressed_length: length,
      uncompressed_length: length,
      body,
    }
  }

  pub fn with_property(mut self, kind: [u8; 4], value: impl Into<Vec<u8>>) -> Self {
    self.properties.push(Property::new(kind, value));
    self
  }

  pub fn kind(&self) -> [u8; 4] {
    self.body.kind()
  }

  pub fn property(&self, kind: [u8; 4]) -> Option<&Property> {
    self.properties.iter().find(|property| property.kind == kind)
  }

  pub fn name(&self) -> Option<&str> {
    self.property(Property::NAME).and_then(Property::value)
  }
}

pub mod read_error {
  use snafu::Snafu;

  use crate::{
    cursor::CursorError,
    dat::{body::BodyReadError, property::PropertyError},
  };

  #[derive(Snafu, Debug)]
  #[snafu(visibility(pub(crate)))]
  pub enum ReadError {
    #[snafu(display("the archive header is out of bounds"))]
    Header {
      #[snafu(backtrace)]
      source: CursorError,
    },
    #[snafu(display("object {index} has a malformed property chain"))]
    Properties {
      index: u32,
      #[snafu(backtrace)]
      source: PropertyError,
    },
    #[snafu(display("the header of object {index} is out of bounds"))]
    ObjectHeader {
      index: u32,
      #[snafu(backtrace)]
      source: CursorError,
    },
    #[snafu(display("failed to read the {kind:?} body of object {index}"))]
    Body {
      index: u32,
      kind: super::ObjectKind,
      #[snafu(backtrace)]
      source: BodyReadError,
    },
    #[snafu(display("the opaque body of object {index} ({kind}) runs past the end of the archive"))]
    UnknownBodyOutOfBounds {
      index: u32,
      kind: String,
      #[snafu(backtrace)]
      source: CursorError,
    },
  }
}

pub mod write_error {
  use std::{io, path::PathBuf};

  use snafu::{Backtrace, GenerateImplicitData, Snafu};

  #[derive(Snafu, Debug)]
  #[snafu(visibility(pub(crate)))]
  pub enum WriteError {
    #[snafu(display("error while writing: {source}"))]
    Io {
      source: io::Error,
      backtrace: Backtrace,
    },
    #[snafu(display("{what} is too large to serialize"))]
    Overflowed {
      what: &'static str,
      backtrace: Backtrace,
    },
    #[snafu(display("\"prop\" is reserved for properties and cannot be an object type"))]
    ReservedKind { backtrace: Backtrace },
    #[snafu(display("fonts made of variable width ranges cannot be written"))]
    RangeFontUnsupported { backtrace: Backtrace },
    #[snafu(display("failed to move the finished archive to {}: {source}", path.display()))]
    Persist {
      path: PathBuf,
      source: tempfile::PersistError,
      backtrace: Backtrace,
    },
  }

  impl From<io::Error> for WriteError {
    #[track_caller]
    fn from(value: io::Error) -> Self {
      WriteError::Io {
        source: value,
        backtrace: Backtrace::generate(),
      }
    }
  }
}
