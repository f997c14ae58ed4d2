mod bitmap;
mod font;
mod palette;
mod rle;

use std::io::Write;

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use snafu::{Backtrace, Snafu};

pub use bitmap::Bitmap;
pub use font::{FONT_GLYPH_COUNT, Font, FontRange, FontSize, Glyph};
pub use palette::{PALETTE_ENTRIES, Palette};
pub use rle::RleSprite;

use crate::{cursor::CursorError, dat::WriteError};

/// Object type tags, stored as the big endian value of their four characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u32)]
pub enum ObjectKind {
  /// `BMP `
  Bitmap = 0x424D5020,
  /// `PAL `
  Palette = 0x50414C20,
  /// `RLE `
  RleSprite = 0x524C4520,
  /// `FONT`
  Font = 0x464F4E54,
}

impl ObjectKind {
  pub fn from_tag(tag: [u8; 4]) -> Option<Self> {
    Self::from_u32(u32::from_be_bytes(tag))
  }

  pub fn tag(self) -> [u8; 4] {
    (self as u32).to_be_bytes()
  }
}

#[derive(Snafu, Debug)]
#[snafu(visibility(pub(crate)))]
pub enum BodyReadError {
  #[snafu(context(false), display("body is truncated: {source}"))]
  Truncated {
    #[snafu(backtrace)]
    source: CursorError,
  },
  #[snafu(display(
    "font size selector {selector} is not supported, the body length cannot be inferred"
  ))]
  UnsupportedFontSelector { selector: i16, backtrace: Backtrace },
  #[snafu(display("font declares {count} ranges"))]
  NegativeRangeCount { count: i16, backtrace: Backtrace },
  #[snafu(display("font range ends at {end:#X} before it starts at {start:#X}"))]
  MalformedFontRange {
    start: u32,
    end: u32,
    backtrace: Backtrace,
  },
}

/// Raised when a body would be built from buffers that disagree with its header fields.
#[derive(Snafu, Debug)]
#[snafu(visibility(pub(crate)))]
pub enum BodyError {
  #[snafu(display(
    "{width}x{height} at {bits_per_pixel} bpp needs {expected} pixel bytes, got {actual}"
  ))]
  PixelCountMismatch {
    bits_per_pixel: i16,
    width: u16,
    height: u16,
    expected: usize,
    actual: usize,
    backtrace: Backtrace,
  },
  #[snafu(display("a palette holds at most 256 entries, got {actual}"))]
  TooManyColors { actual: usize, backtrace: Backtrace },
  #[snafu(display("sprite data of {actual} bytes does not fit a 32 bit length"))]
  SpriteTooLarge { actual: usize, backtrace: Backtrace },
}

/// The typed payload of an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
  Bitmap(Bitmap),
  Palette(Palette),
  RleSprite(RleSprite),
  Font(Font),
  /// A body whose tag is not recognised, kept as the `compressed length`
  /// bytes that followed its header so it can be written back untouched.
  Unknown { kind: [u8; 4], data: Vec<u8> },
}

impl Body {
  pub fn kind(&self) -> [u8; 4] {
    match self {
      Body::Bitmap(_) => ObjectKind::Bitmap.tag(),
      Body::Palette(_) => ObjectKind::Palette.tag(),
      Body::RleSprite(_) => ObjectKind::RleSprite.tag(),
      Body::Font(_) => ObjectKind::Font.tag(),
      Body::Unknown { kind, .. } => *kind,
    }
  }

  pub fn encoded_len(&self) -> usize {
    match self {
      Body::Bitmap(bitmap) => bitmap.encoded_len(),
      Body::Palette(palette) => palette.encoded_len(),
      Body::RleSprite(sprite) => sprite.encoded_len(),
      Body::Font(font) => font.encoded_len(),
      Body::Unknown { data, .. } => data.len(),
    }
  }

  pub(crate) fn read(
    kind: ObjectKind,
    cursor: &mut crate::cursor::ByteCursor<'_>,
  ) -> Result<Self, BodyReadError> {
    Ok(match kind {
      ObjectKind::Bitmap => Body::Bitmap(Bitmap::read(cursor)?),
      ObjectKind::Palette => Body::Palette(Palette::read(cursor)?),
      ObjectKind::RleSprite => Body::RleSprite(RleSprite::read(cursor)?),
      ObjectKind::Font => Body::Font(Font::read(cursor)?),
    })
  }

  pub(crate) fn write(&self, writer: &mut impl Write) -> Result<(), WriteError> {
    match self {
      Body::Bitmap(bitmap) => bitmap.write(writer),
      Body::Palette(palette) => palette.write(writer),
      Body::RleSprite(sprite) => sprite.write(writer),
      Body::Font(font) => font.write(writer),
      Body::Unknown { data, .. } => Ok(writer.write_all(data)?),
    }
  }
}

impl From<Bitmap> for Body {
  fn from(value: Bitmap) -> Self {
    Body::Bitmap(value)
  }
}

impl From<Palette> for Body {
  fn from(value: Palette) -> Self {
    Body::Palette(value)
  }
}

impl From<RleSprite> for Body {
  fn from(value: RleSprite) -> Self {
    Body::RleSprite(value)
  }
}

impl From<Font> for Body {
  fn from(value: Font) -> Self {
    Body::Font(value)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tags_match_their_characters() {
    for (kind, tag) in [
      (ObjectKind::Bitmap, *b"BMP "),
      (ObjectKind::Palette, *b"PAL "),
      (ObjectKind::RleSprite, *b"RLE "),
      (ObjectKind::Font, *b"FONT"),
    ] {
      assert_eq!(kind.tag(), tag);
      assert_eq!(ObjectKind::from_tag(tag), Some(kind));
    }
    assert_eq!(ObjectKind::from_tag(*b"XYZ "), None);
    assert_eq!(ObjectKind::from_tag(*b"bmp "), None);
  }

  #[test]
  fn unknown_body_keeps_its_tag() {
    let body = Body::Unknown {
      kind: *b"SAMP",
      data: vec![1, 2, 3],
    };
    assert_eq!(body.kind(), *b"SAMP");
    assert_eq!(body.encoded_len(), 3);
  }
}
