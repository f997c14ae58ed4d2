use snafu::{Backtrace, OptionExt, Snafu};
use zerocopy::{
  FromBytes,
  big_endian::{I16, I32, U16, U32},
};

#[derive(Snafu, Debug)]
pub enum CursorError {
  #[snafu(display(
    "attempted to read {needed} bytes at offset 0x{offset:X}, but the buffer is only 0x{size:X} bytes"
  ))]
  OutOfBounds {
    offset: usize,
    needed: usize,
    size: usize,
    backtrace: Backtrace,
  },
}

/// Forward-only reader over a borrowed buffer.
///
/// Every read either yields a value and advances, or fails with
/// [`CursorError::OutOfBounds`] and leaves the position untouched.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
  data: &'a [u8],
  offset: usize,
}

impl<'a> ByteCursor<'a> {
  pub fn new(data: &'a [u8]) -> Self {
    Self { data, offset: 0 }
  }

  pub fn offset(&self) -> usize {
    self.offset
  }

  pub fn remaining(&self) -> usize {
    self.data.len() - self.offset
  }

  pub fn is_empty(&self) -> bool {
    self.remaining() == 0
  }

  /// Looks at the next `N` bytes without consuming them.
  pub fn peek_array<const N: usize>(&self) -> Option<[u8; N]> {
    self
      .data
      .get(self.offset..)
      .and_then(|rest| rest.first_chunk::<N>())
      .copied()
  }

  pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], CursorError> {
    let bytes = self
      .offset
      .checked_add(count)
      .and_then(|end| self.data.get(self.offset..end))
      .context(OutOfBoundsSnafu {
        offset: self.offset,
        needed: count,
        size: self.data.len(),
      })?;
    self.offset += count;
    Ok(bytes)
  }

  pub fn skip(&mut self, count: usize) -> Result<(), CursorError> {
    self.read_bytes(count).map(|_| ())
  }

  /// Reads a fixed layout wire struct.
  pub fn read<T: FromBytes>(&mut self) -> Result<T, CursorError> {
    let bytes = self.read_bytes(size_of::<T>())?;
    Ok(T::read_from_bytes(bytes).unwrap())
  }

  pub fn read_u16(&mut self) -> Result<u16, CursorError> {
    self.read::<U16>().map(|value| value.get())
  }

  pub fn read_u32(&mut self) -> Result<u32, CursorError> {
    self.read::<U32>().map(|value| value.get())
  }

  pub fn read_i16(&mut self) -> Result<i16, CursorError> {
    self.read::<I16>().map(|value| value.get())
  }

  pub fn read_i32(&mut self) -> Result<i32, CursorError> {
    self.read::<I32>().map(|value| value.get())
  }
}
