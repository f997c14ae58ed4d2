use std::{convert::Infallible, path::Path};

use datpack_library::dat::body::{Bitmap, FONT_GLYPH_COUNT, Font, FontSize};
use snafu::{Backtrace, Snafu, ensure};
use tracing::debug;

use crate::bmp::{BmpError, import_bitmap};

/// Width of every glyph cell on a sheet, one packed byte per row.
pub const GLYPH_WIDTH: u32 = 8;
/// A glyph sheet holds every printable ASCII character side by side.
pub const SHEET_WIDTH: u32 = GLYPH_WIDTH * FONT_GLYPH_COUNT as u32;

#[derive(Snafu, Debug)]
pub enum LuminanceError {
  #[snafu(display("cannot take the luminance of {bits_per_pixel} bit pixels"))]
  UnsupportedDepth {
    bits_per_pixel: i16,
    backtrace: Backtrace,
  },
}

#[derive(Snafu, Debug)]
pub enum GlyphSheetError {
  #[snafu(context(false), display("failed to load the glyph sheet: {source}"))]
  Bitmap {
    #[snafu(backtrace)]
    source: BmpError,
  },
  #[snafu(context(false), display("{source}"))]
  Luminance {
    #[snafu(backtrace)]
    source: LuminanceError,
  },
  #[snafu(display("only 8 and 16 pixel fonts can be built from a glyph sheet, not {size:?}"))]
  UnsupportedSize { size: FontSize, backtrace: Backtrace },
  #[snafu(display(
    "glyph sheet is {width}x{height}, a {expected_height} pixel font needs 760x{expected_height}"
  ))]
  GeometryMismatch {
    width: u32,
    height: u32,
    expected_height: u32,
    backtrace: Backtrace,
  },
  #[snafu(display("pixel source produced {actual} values for {expected} pixels"))]
  LuminanceCount {
    expected: usize,
    actual: usize,
    backtrace: Backtrace,
  },
}

impl From<Infallible> for GlyphSheetError {
  fn from(value: Infallible) -> Self {
    match value {}
  }
}

/// Anything a glyph sheet can be read from.
pub trait PixelSource {
  type Error;

  fn width(&self) -> u32;
  fn height(&self) -> u32;

  /// Brightness of every pixel from 0 to 255, rows top to bottom.
  fn luminance(&self) -> Result<Vec<u8>, Self::Error>;
}

impl PixelSource for Bitmap {
  type Error = LuminanceError;

  fn width(&self) -> u32 {
    self.width() as u32
  }

  fn height(&self) -> u32 {
    self.height() as u32
  }

  /// Single byte pixels are taken as they are; colour pixels average their
  /// first three channels without weighting.
  fn luminance(&self) -> Result<Vec<u8>, Self::Error> {
    match self.bytes_per_pixel() {
      1 => Ok(self.pixels().to_vec()),
      size @ (3 | 4) => Ok(
        self
          .pixels()
          .chunks_exact(size)
          .map(|pixel| ((pixel[0] as u16 + pixel[1] as u16 + pixel[2] as u16) / 3) as u8)
          .collect(),
      ),
      _ => UnsupportedDepthSnafu {
        bits_per_pixel: self.bits_per_pixel(),
      }
      .fail(),
    }
  }
}

/// Thresholds a sheet of 95 side by side 8 pixel wide cells into a fixed font.
///
/// A pixel whose luminance is at least `threshold` sets its bit, leftmost pixel
/// in the most significant bit.
pub fn font_from_glyph_sheet<S>(
  source: &S,
  size: FontSize,
  threshold: u8,
) -> Result<Font, GlyphSheetError>
where
  S: PixelSource,
  GlyphSheetError: From<S::Error>,
{
  let expected_height = match size {
    FontSize::Eight => 8,
    FontSize::Sixteen => 16,
    FontSize::Ranges => return UnsupportedSizeSnafu { size }.fail(),
  };
  let (width, height) = (source.width(), source.height());
  ensure!(
    width == SHEET_WIDTH && height == expected_height,
    GeometryMismatchSnafu {
      width,
      height,
      expected_height
    }
  );

  let luminance = source.luminance()?;
  let expected = (width * height) as usize;
  ensure!(
    luminance.len() == expected,
    LuminanceCountSnafu {
      expected,
      actual: luminance.len()
    }
  );
  debug!("thresholding {width}x{height} glyph sheet at {threshold}");

  Ok(match size {
    FontSize::Eight => Font::Eight(pack_glyphs(&luminance, threshold)),
    _ => Font::Sixteen(pack_glyphs(&luminance, threshold)),
  })
}

fn pack_glyphs<const H: usize>(luminance: &[u8], threshold: u8) -> Box<[[u8; H]; FONT_GLYPH_COUNT]> {
  let (sheet_width, glyph_width) = (SHEET_WIDTH as usize, GLYPH_WIDTH as usize);
  let mut glyphs = Box::new([[0u8; H]; FONT_GLYPH_COUNT]);

  for (index, glyph) in glyphs.iter_mut().enumerate() {
    for (y, row) in glyph.iter_mut().enumerate() {
      let start = y * sheet_width + index * glyph_width;
      *row = luminance[start..start + glyph_width]
        .iter()
        .enumerate()
        .filter(|(_, value)| **value >= threshold)
        .fold(0u8, |row, (x, _)| row | (0x80u8 >> x));
    }
  }

  glyphs
}

pub fn import_font(
  path: impl AsRef<Path>,
  size: FontSize,
  threshold: u8,
) -> Result<Font, GlyphSheetError> {
  let sheet = import_bitmap(path)?;
  font_from_glyph_sheet(&sheet, size, threshold)
}
