use std::{
  fs, io,
  path::{Path, PathBuf},
};

use datpack_library::dat::body::{BodyError, RleSprite};
use snafu::{Backtrace, ResultExt, Snafu};
use tracing::debug;

#[derive(Snafu, Debug)]
pub enum RleError {
  #[snafu(display("failed to read {}: {source}", path.display()))]
  Io {
    path: PathBuf,
    source: io::Error,
    backtrace: Backtrace,
  },
  #[snafu(display("{} cannot be stored as a sprite", path.display()))]
  TooLarge {
    path: PathBuf,
    #[snafu(backtrace)]
    source: BodyError,
  },
}

/// Wraps an already encoded sprite stream. Nothing is compressed or inspected,
/// so the sprite is stored as 8 bits per pixel with no geometry.
pub fn import_rle_sprite(path: impl AsRef<Path>) -> Result<RleSprite, RleError> {
  let path = path.as_ref();
  let data = fs::read(path).context(IoSnafu { path })?;
  debug!("wrapping {} bytes of sprite data from {}", data.len(), path.display());
  RleSprite::new(8, 0, 0, data).context(TooLargeSnafu { path })
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn file_becomes_an_opaque_sprite() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("hero.rle");
    fs::write(&path, [0x83, 1, 2, 3, 0x00]).unwrap();

    let sprite = import_rle_sprite(&path).unwrap();
    assert_eq!(sprite.bits_per_pixel(), 8);
    assert_eq!((sprite.width(), sprite.height()), (0, 0));
    assert_eq!(sprite.data(), &[0x83, 1, 2, 3, 0x00]);
  }

  #[test]
  fn missing_file() {
    let error = import_rle_sprite("/nonexistent/hero.rle").unwrap_err();
    assert!(matches!(error, RleError::Io { .. }));
  }
}
