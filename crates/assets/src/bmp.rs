use std::{
  fs, io,
  path::{Path, PathBuf},
};

use datpack_library::{
  cursor::{ByteCursor, CursorError},
  dat::body::{Bitmap, BodyError},
  util::align_up,
};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use snafu::{Backtrace, OptionExt, ResultExt, Snafu, ensure};
use tracing::debug;
use zerocopy::{
  FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
  little_endian::{I32, U16, U32},
};

#[derive(Snafu, Debug)]
#[snafu(visibility(pub(crate)))]
pub enum BmpError {
  #[snafu(display("failed to read {}: {source}", path.display()))]
  Io {
    path: PathBuf,
    source: io::Error,
    backtrace: Backtrace,
  },
  #[snafu(display("expected signature \"BM\", got {signature:?}"))]
  IncorrectSignature {
    signature: [u8; 2],
    backtrace: Backtrace,
  },
  #[snafu(display("compressed bitmaps are not supported (method {compression})"))]
  Compressed {
    compression: u32,
    backtrace: Backtrace,
  },
  #[snafu(display("{bits_per_pixel} bits per pixel is not supported, expected 8, 24 or 32"))]
  UnsupportedDepth {
    bits_per_pixel: u16,
    backtrace: Backtrace,
  },
  #[snafu(display("bitmap is truncated: {source}"))]
  ShortRead {
    #[snafu(backtrace)]
    source: CursorError,
  },
  #[snafu(display("{width}x{height} is not a valid 16 bit image size"))]
  InvalidDimensions {
    width: i32,
    height: i32,
    backtrace: Backtrace,
  },
  #[snafu(display("decoded pixels do not match the bitmap geometry"))]
  Pixels {
    #[snafu(backtrace)]
    source: BodyError,
  },
}

#[derive(Debug, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct FileHeader {
  signature: [u8; 2],
  file_size: U32,
  reserved: [u8; 4],
  pixel_offset: U32,
}

/// `BITMAPINFOHEADER`. Later header versions start with the same fields.
#[derive(Debug, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct InfoHeader {
  header_size: U32,
  width: I32,
  /// Positive for bottom-up rows, negative for top-down.
  height: I32,
  planes: U16,
  bits_per_pixel: U16,
  compression: U32,
  image_size: U32,
  horizontal_resolution: I32,
  vertical_resolution: I32,
  colors_used: U32,
  colors_important: U32,
}

const SIGNATURE: [u8; 2] = *b"BM";
const COMPRESSION_NONE: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum BitDepth {
  /// Palette indices, copied through as they are.
  Indexed = 8,
  Bgr = 24,
  Bgra = 32,
}

impl BitDepth {
  pub fn bytes_per_pixel(self) -> usize {
    self as usize / 8
  }
}

/// Decodes an uncompressed BMP into tightly packed, top-down rows.
///
/// 24 and 32 bit pixels come out as RGB and RGBA. The colour table of an 8 bit
/// file is skipped; palettes are imported separately.
pub fn decode_bmp(data: &[u8]) -> Result<Bitmap, BmpError> {
  let mut cursor = ByteCursor::new(data);
  let file_header = cursor.read::<FileHeader>().context(ShortReadSnafu)?;
  ensure!(
    file_header.signature == SIGNATURE,
    IncorrectSignatureSnafu {
      signature: file_header.signature
    }
  );
  let info = cursor.read::<InfoHeader>().context(ShortReadSnafu)?;

  let compression = info.compression.get();
  ensure!(
    compression == COMPRESSION_NONE,
    CompressedSnafu { compression }
  );
  let bits_per_pixel = info.bits_per_pixel.get();
  let depth = BitDepth::from_u16(bits_per_pixel).context(UnsupportedDepthSnafu { bits_per_pixel })?;

  let (raw_width, raw_height) = (info.width.get(), info.height.get());
  let dimensions = u16::try_from(raw_width)
    .ok()
    .zip(u16::try_from(raw_height.unsigned_abs()).ok());
  let (width, height) = dimensions.context(InvalidDimensionsSnafu {
    width: raw_width,
    height: raw_height,
  })?;
  let bottom_up = raw_height > 0;

  let row_length = width as usize * depth.bytes_per_pixel();
  let stride = align_up(width as usize * bits_per_pixel as usize, 32) / 8;
  debug!(
    "{width}x{height} {bits_per_pixel} bpp bitmap, stride {stride}, {}",
    if bottom_up { "bottom-up" } else { "top-down" }
  );

  let mut rows = ByteCursor::new(data);
  rows
    .skip(file_header.pixel_offset.get() as usize)
    .context(ShortReadSnafu)?;
  let image = rows
    .read_bytes(stride * height as usize)
    .context(ShortReadSnafu)?;

  let mut pixels = Vec::with_capacity(row_length * height as usize);
  for y in 0..height as usize {
    let source_row = if bottom_up { height as usize - 1 - y } else { y };
    let start = source_row * stride;
    pixels.extend_from_slice(&image[start..start + row_length]);
  }

  if depth != BitDepth::Indexed {
    for pixel in pixels.chunks_exact_mut(depth.bytes_per_pixel()) {
      pixel.swap(0, 2);
    }
  }

  Bitmap::new(bits_per_pixel as i16, width, height, pixels).context(PixelsSnafu)
}

pub fn import_bitmap(path: impl AsRef<Path>) -> Result<Bitmap, BmpError> {
  let path = path.as_ref();
  let data = fs::read(path).context(IoSnafu { path })?;
  decode_bmp(&data)
}
