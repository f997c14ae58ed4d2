use std::io::Write;

use snafu::ensure;
use zerocopy::IntoBytes;

use crate::{
  cursor::{ByteCursor, CursorError},
  dat::{
    WriteError,
    body::{BodyError, TooManyColorsSnafu},
  },
};

pub const PALETTE_ENTRIES: usize = 256;

/// 256 RGB entries with 6 bit channels. The wire form is exactly these 768 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
  colors: Box<[[u8; 3]; PALETTE_ENTRIES]>,
}

impl Palette {
  pub const MAX_CHANNEL: u8 = 63;
  const ENCODED_LEN: usize = PALETTE_ENTRIES * 3;

  pub fn new(colors: [[u8; 3]; PALETTE_ENTRIES]) -> Self {
    Self {
      colors: Box::new(colors),
    }
  }

  /// Builds a palette from up to 256 leading entries; the rest stay black.
  pub fn from_colors(colors: &[[u8; 3]]) -> Result<Self, BodyError> {
    ensure!(
      colors.len() <= PALETTE_ENTRIES,
      TooManyColorsSnafu {
        actual: colors.len()
      }
    );
    let mut palette = Self::default();
    palette.colors[..colors.len()].copy_from_slice(colors);
    Ok(palette)
  }

  pub fn colors(&self) -> &[[u8; 3]; PALETTE_ENTRIES] {
    &self.colors
  }

  /// The first entry with a channel above [`Palette::MAX_CHANNEL`].
  pub fn out_of_range_entry(&self) -> Option<usize> {
    self
      .colors
      .iter()
      .position(|color| color.iter().any(|channel| *channel > Self::MAX_CHANNEL))
  }

  pub fn encoded_len(&self) -> usize {
    Self::ENCODED_LEN
  }

  pub(crate) fn read(cursor: &mut ByteCursor<'_>) -> Result<Self, CursorError> {
    let bytes = cursor.read_bytes(Self::ENCODED_LEN)?;
    let mut palette = Self::default();
    palette.colors.as_mut_bytes().copy_from_slice(bytes);
    Ok(palette)
  }

  pub(crate) fn write(&self, writer: &mut impl Write) -> Result<(), WriteError> {
    writer.write_all(self.colors.as_bytes())?;
    Ok(())
  }
}

impl Default for Palette {
  fn default() -> Self {
    Self {
      colors: Box::new([[0; 3]; PALETTE_ENTRIES]),
    }
  }
}
