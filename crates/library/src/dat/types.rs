use zerocopy::{
  FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
  big_endian::{I16, I32, U16, U32},
};

#[derive(Debug, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct ArchiveHeader {
  pub pack_magic: U32,
  pub dat_magic: U32,
  pub object_count: U32,
}

#[derive(Debug, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct PropertyHeader {
  pub magic: [u8; 4],
  pub kind: [u8; 4],
  pub length: U32,
}

#[derive(Debug, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct ObjectHeader {
  pub kind: [u8; 4],
  pub compressed_length: I32,
  pub uncompressed_length: I32,
}

#[derive(Debug, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct BitmapHeader {
  pub bits_per_pixel: I16,
  pub width: U16,
  pub height: U16,
}

#[derive(Debug, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct RleSpriteHeader {
  pub bits_per_pixel: I16,
  pub width: U16,
  pub height: U16,
  pub length: U32,
}

#[derive(Debug, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct FontRangeHeader {
  pub mono: u8,
  pub start: U32,
  pub end: U32,
}

#[derive(Debug, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct GlyphHeader {
  pub width: U16,
  pub height: U16,
}
