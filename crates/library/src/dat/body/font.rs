use std::io::Write;

use either::Either;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use snafu::ensure;
use zerocopy::{IntoBytes, big_endian::I16};

use crate::{
  cursor::{ByteCursor, CursorError},
  dat::{
    WriteError,
    body::{
      BodyReadError, MalformedFontRangeSnafu, NegativeRangeCountSnafu,
      UnsupportedFontSelectorSnafu,
    },
    types::{FontRangeHeader, GlyphHeader},
    write_error::RangeFontUnsupportedSnafu,
  },
};

/// Printable ASCII, `' '` through `'~'`.
pub const FONT_GLYPH_COUNT: usize = 95;

/// The selector that opens every font body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum FontSize {
  Ranges = 0,
  Eight = 8,
  Sixteen = 16,
}

/// A bitmap font. Fixed fonts store one byte per glyph row, most significant
/// bit leftmost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Font {
  Eight(Box<[[u8; 8]; FONT_GLYPH_COUNT]>),
  Sixteen(Box<[[u8; 16]; FONT_GLYPH_COUNT]>),
  /// Variable width ranges. These can be read but not written.
  Ranges(Vec<FontRange>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontRange {
  pub mono: bool,
  pub start: u32,
  pub end: u32,
  pub glyphs: Vec<Glyph>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
  pub width: u16,
  pub height: u16,
  pub data: Vec<u8>,
}

impl Font {
  pub fn size(&self) -> FontSize {
    match self {
      Font::Eight(_) => FontSize::Eight,
      Font::Sixteen(_) => FontSize::Sixteen,
      Font::Ranges(_) => FontSize::Ranges,
    }
  }

  /// Raw glyph data in order, across all ranges for range fonts.
  pub fn glyphs(&self) -> impl Iterator<Item = &[u8]> {
    match self {
      Font::Eight(glyphs) => Either::Left(Either::Left(glyphs.iter().map(|glyph| glyph.as_slice()))),
      Font::Sixteen(glyphs) => {
        Either::Left(Either::Right(glyphs.iter().map(|glyph| glyph.as_slice())))
      }
      Font::Ranges(ranges) => Either::Right(
        ranges
          .iter()
          .flat_map(|range| range.glyphs.iter().map(|glyph| glyph.data.as_slice())),
      ),
    }
  }

  pub fn glyph(&self, index: usize) -> Option<&[u8]> {
    self.glyphs().nth(index)
  }

  pub fn encoded_len(&self) -> usize {
    size_of::<I16>()
      + match self {
        Font::Eight(glyphs) => glyphs.as_bytes().len(),
        Font::Sixteen(glyphs) => glyphs.as_bytes().len(),
        Font::Ranges(ranges) => {
          size_of::<I16>()
            + ranges
              .iter()
              .map(|range| {
                size_of::<FontRangeHeader>()
                  + range
                    .glyphs
                    .iter()
                    .map(|glyph| size_of::<GlyphHeader>() + glyph.data.len())
                    .sum::<usize>()
              })
              .sum::<usize>()
        }
      }
  }

  pub(crate) fn read(cursor: &mut ByteCursor<'_>) -> Result<Self, BodyReadError> {
    let selector = cursor.read_i16()?;
    let font = match FontSize::from_i16(selector) {
      Some(FontSize::Eight) => Font::Eight(read_fixed(cursor)?),
      Some(FontSize::Sixteen) => Font::Sixteen(read_fixed(cursor)?),
      Some(FontSize::Ranges) => Font::Ranges(read_ranges(cursor)?),
      // without a known layout there is no way to find where the next object starts
      None => return UnsupportedFontSelectorSnafu { selector }.fail(),
    };
    Ok(font)
  }

  pub(crate) fn write(&self, writer: &mut impl Write) -> Result<(), WriteError> {
    let glyphs = match self {
      Font::Eight(glyphs) => glyphs.as_bytes(),
      Font::Sixteen(glyphs) => glyphs.as_bytes(),
      Font::Ranges(_) => return RangeFontUnsupportedSnafu.fail(),
    };
    writer.write_all(I16::new(self.size() as i16).as_bytes())?;
    writer.write_all(glyphs)?;
    Ok(())
  }
}

fn read_fixed<const H: usize>(
  cursor: &mut ByteCursor<'_>,
) -> Result<Box<[[u8; H]; FONT_GLYPH_COUNT]>, CursorError> {
  let bytes = cursor.read_bytes(H * FONT_GLYPH_COUNT)?;
  let mut glyphs = Box::new([[0u8; H]; FONT_GLYPH_COUNT]);
  glyphs.as_mut_bytes().copy_from_slice(bytes);
  Ok(glyphs)
}

fn read_ranges(cursor: &mut ByteCursor<'_>) -> Result<Vec<FontRange>, BodyReadError> {
  let count = cursor.read_i16()?;
  ensure!(count >= 0, NegativeRangeCountSnafu { count });
  let mut ranges = Vec::new();

  for _ in 0..count {
    let header = cursor.read::<FontRangeHeader>()?;
    let (start, end) = (header.start.get(), header.end.get());
    ensure!(end >= start, MalformedFontRangeSnafu { start, end });

    // each glyph consumes at least its header, so a bogus range runs out of data
    let mut glyphs = Vec::new();
    for _ in start..=end {
      let glyph = cursor.read::<GlyphHeader>()?;
      let (width, height) = (glyph.width.get(), glyph.height.get());
      let data = cursor.read_bytes(width as usize * height as usize)?.to_vec();
      glyphs.push(Glyph {
        width,
        height,
        data,
      });
    }

    ranges.push(FontRange {
      mono: header.mono != 0,
      start,
      end,
      glyphs,
    });
  }

  Ok(ranges)
}
