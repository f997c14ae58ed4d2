use std::{
  fs, io,
  path::{Path, PathBuf},
};

use datpack_library::{
  cursor::{ByteCursor, CursorError},
  dat::body::{PALETTE_ENTRIES, Palette},
};
use snafu::{Backtrace, ResultExt, Snafu, ensure};
use tracing::debug;
use zerocopy::{
  FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
  little_endian::{U16, U32},
};

#[derive(Snafu, Debug)]
pub enum PaletteError {
  #[snafu(display("failed to read {}: {source}", path.display()))]
  Io {
    path: PathBuf,
    source: io::Error,
    backtrace: Backtrace,
  },
  #[snafu(display("palette is truncated: {source}"))]
  ShortRead {
    #[snafu(backtrace)]
    source: CursorError,
  },
  #[snafu(display("expected {expected:?} but found {found:?}"))]
  IncorrectChunk {
    expected: &'static str,
    found: String,
    backtrace: Backtrace,
  },
  #[snafu(display("palette version 0x{version:04X} is not supported, expected 0x0300"))]
  UnsupportedVersion { version: u16, backtrace: Backtrace },
  #[snafu(display("palette has no entries"))]
  Empty { backtrace: Backtrace },
  #[snafu(display("palette has {count} entries, at most 256 fit"))]
  TooManyEntries { count: u16, backtrace: Backtrace },
}

/// `RIFF` <size> `PAL ` `data` <size> <version> <count>, all little endian.
#[derive(Debug, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct RiffPaletteHeader {
  riff: [u8; 4],
  riff_size: U32,
  form: [u8; 4],
  chunk: [u8; 4],
  chunk_size: U32,
  version: U16,
  count: U16,
}

#[derive(Debug, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct PaletteEntry {
  red: u8,
  green: u8,
  blue: u8,
  flags: u8,
}

const VERSION: u16 = 0x0300;

fn check_chunk(found: [u8; 4], expected: &'static str) -> Result<(), PaletteError> {
  ensure!(
    found.as_slice() == expected.as_bytes(),
    IncorrectChunkSnafu {
      expected,
      found: String::from_utf8_lossy(&found),
    }
  );
  Ok(())
}

/// Decodes a RIFF palette, reducing every 8 bit channel to 6 bits.
///
/// Entries past the stored count stay black.
pub fn decode_palette(data: &[u8]) -> Result<Palette, PaletteError> {
  let mut cursor = ByteCursor::new(data);
  let header = cursor.read::<RiffPaletteHeader>().context(ShortReadSnafu)?;
  check_chunk(header.riff, "RIFF")?;
  check_chunk(header.form, "PAL ")?;
  check_chunk(header.chunk, "data")?;

  let version = header.version.get();
  ensure!(version == VERSION, UnsupportedVersionSnafu { version });
  let count = header.count.get();
  ensure!(count != 0, EmptySnafu);
  ensure!(
    count as usize <= PALETTE_ENTRIES,
    TooManyEntriesSnafu { count }
  );
  debug!("RIFF palette with {count} entries");

  let mut colors = [[0u8; 3]; PALETTE_ENTRIES];
  for color in colors.iter_mut().take(count as usize) {
    let entry = cursor.read::<PaletteEntry>().context(ShortReadSnafu)?;
    *color = [entry.red / 4, entry.green / 4, entry.blue / 4];
  }

  Ok(Palette::new(colors))
}

pub fn import_palette(path: impl AsRef<Path>) -> Result<Palette, PaletteError> {
  let path = path.as_ref();
  let data = fs::read(path).context(IoSnafu { path })?;
  decode_palette(&data)
}
