use std::io::Write;

use snafu::ensure;
use zerocopy::{
  IntoBytes,
  big_endian::{I16, U16, U32},
};

use crate::{
  cursor::{ByteCursor, CursorError},
  dat::{
    WriteError,
    body::{BodyError, SpriteTooLargeSnafu},
    types::RleSpriteHeader,
  },
};

/// An already run-length encoded sprite. The encoded stream is carried as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RleSprite {
  bits_per_pixel: i16,
  width: u16,
  height: u16,
  data: Vec<u8>,
}

impl RleSprite {
  pub fn new(bits_per_pixel: i16, width: u16, height: u16, data: Vec<u8>) -> Result<Self, BodyError> {
    ensure!(
      u32::try_from(data.len()).is_ok(),
      SpriteTooLargeSnafu { actual: data.len() }
    );

    Ok(Self {
      bits_per_pixel,
      width,
      height,
      data,
    })
  }

  pub fn bits_per_pixel(&self) -> i16 {
    self.bits_per_pixel
  }

  pub fn width(&self) -> u16 {
    self.width
  }

  pub fn height(&self) -> u16 {
    self.height
  }

  pub fn data(&self) -> &[u8] {
    &self.data
  }

  pub fn encoded_len(&self) -> usize {
    size_of::<RleSpriteHeader>() + self.data.len()
  }

  pub(crate) fn read(cursor: &mut ByteCursor<'_>) -> Result<Self, CursorError> {
    let header = cursor.read::<RleSpriteHeader>()?;
    let data = cursor.read_bytes(header.length.get() as usize)?.to_vec();

    Ok(Self {
      bits_per_pixel: header.bits_per_pixel.get(),
      width: header.width.get(),
      height: header.height.get(),
      data,
    })
  }

  pub(crate) fn write(&self, writer: &mut impl Write) -> Result<(), WriteError> {
    let header = RleSpriteHeader {
      bits_per_pixel: I16::new(self.bits_per_pixel),
      width: U16::new(self.width),
      height: U16::new(self.height),
      // checked on construction
      length: U32::new(self.data.len() as u32),
    };
    writer.write_all(header.as_bytes())?;
    writer.write_all(&self.data)?;
    Ok(())
  }
}
