use std::io::Write;

use snafu::ensure;
use zerocopy::{
  IntoBytes,
  big_endian::{I16, U16},
};

use crate::{
  cursor::{ByteCursor, CursorError},
  dat::{
    WriteError,
    body::{BodyError, PixelCountMismatchSnafu},
    types::BitmapHeader,
  },
};

/// Uncompressed pixels, tightly packed rows, top row first.
///
/// A negative bit depth marks a bitmap with an alpha channel; the byte width of a
/// pixel comes from its magnitude.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
  bits_per_pixel: i16,
  width: u16,
  height: u16,
  pixels: Vec<u8>,
}

impl Bitmap {
  pub fn new(
    bits_per_pixel: i16,
    width: u16,
    height: u16,
    pixels: Vec<u8>,
  ) -> Result<Self, BodyError> {
    let expected = Self::pixel_len(bits_per_pixel, width, height);
    ensure!(
      pixels.len() == expected,
      PixelCountMismatchSnafu {
        bits_per_pixel,
        width,
        height,
        expected,
        actual: pixels.len(),
      }
    );

    Ok(Self {
      bits_per_pixel,
      width,
      height,
      pixels,
    })
  }

  /// `width * height * (bpp / 8)`: the exact size of the pixel buffer.
  pub fn pixel_len(bits_per_pixel: i16, width: u16, height: u16) -> usize {
    width as usize * height as usize * (bits_per_pixel.unsigned_abs() as usize / 8)
  }

  pub fn bits_per_pixel(&self) -> i16 {
    self.bits_per_pixel
  }

  pub fn bytes_per_pixel(&self) -> usize {
    self.bits_per_pixel.unsigned_abs() as usize / 8
  }

  pub fn width(&self) -> u16 {
    self.width
  }

  pub fn height(&self) -> u16 {
    self.height
  }

  pub fn pixels(&self) -> &[u8] {
    &self.pixels
  }

  /// The bytes of pixel (`x`, `y`), `None` outside the image.
  pub fn pixel(&self, x: u16, y: u16) -> Option<&[u8]> {
    if x >= self.width || y >= self.height {
      return None;
    }
    let stride = self.width as usize * self.bytes_per_pixel();
    let start = y as usize * stride + x as usize * self.bytes_per_pixel();
    self.pixels.get(start..start + self.bytes_per_pixel())
  }

  pub fn encoded_len(&self) -> usize {
    size_of::<BitmapHeader>() + self.pixels.len()
  }

  pub(crate) fn read(cursor: &mut ByteCursor<'_>) -> Result<Self, CursorError> {
    let header = cursor.read::<BitmapHeader>()?;
    let bits_per_pixel = header.bits_per_pixel.get();
    let width = header.width.get();
    let height = header.height.get();
    let pixels = cursor
      .read_bytes(Self::pixel_len(bits_per_pixel, width, height))?
      .to_vec();

    Ok(Self {
      bits_per_pixel,
      width,
      height,
      pixels,
    })
  }

  pub(crate) fn write(&self, writer: &mut impl Write) -> Result<(), WriteError> {
    let header = BitmapHeader {
      bits_per_pixel: I16::new(self.bits_per_pixel),
      width: U16::new(self.width),
      height: U16::new(self.height),
    };
    writer.write_all(header.as_bytes())?;
    writer.write_all(&self.pixels)?;
    Ok(())
  }
}
