use std::io::Write;

use snafu::{Backtrace, OptionExt, ResultExt, Snafu, ensure};
use tracing::trace;
use zerocopy::{IntoBytes, big_endian::U32};

use crate::{
  cursor::{ByteCursor, CursorError},
  dat::{WriteError, tag_display, types::PropertyHeader, write_error::OverflowedSnafu},
};

/// Marks the start of every property record.
pub const PROPERTY_MAGIC: [u8; 4] = *b"prop";

#[derive(Snafu, Debug)]
pub enum PropertyError {
  #[snafu(display("more than {limit} properties in a row at offset 0x{offset:X}"))]
  ChainTooLong {
    limit: usize,
    offset: usize,
    backtrace: Backtrace,
  },
  #[snafu(display("property {index} is truncated"))]
  Truncated {
    index: usize,
    #[snafu(backtrace)]
    source: CursorError,
  },
}

/// A typed metadata record attached to an object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Property {
  pub kind: [u8; 4],
  pub data: Vec<u8>,
}

impl Property {
  pub const DATE: [u8; 4] = *b"DATE";
  pub const NAME: [u8; 4] = *b"NAME";
  pub const ORIG: [u8; 4] = *b"ORIG";

  pub fn new(kind: [u8; 4], data: impl Into<Vec<u8>>) -> Self {
    Self {
      kind,
      data: data.into(),
    }
  }

  /// The payload as text, if it is valid UTF-8.
  pub fn value(&self) -> Option<&str> {
    std::str::from_utf8(&self.data).ok()
  }

  pub fn encoded_len(&self) -> usize {
    size_of::<PropertyHeader>() + self.data.len()
  }
}

/// Reads properties for as long as the next four bytes are [`PROPERTY_MAGIC`].
///
/// There is no count on the wire. The first four bytes that are not the magic
/// end the chain and are left unread, since they belong to the object's type tag.
pub fn read_properties(
  cursor: &mut ByteCursor<'_>,
  limit: usize,
) -> Result<Vec<Property>, PropertyError> {
  let mut properties = Vec::new();

  while cursor.peek_array::<4>() == Some(PROPERTY_MAGIC) {
    ensure!(
      properties.len() < limit,
      ChainTooLongSnafu {
        limit,
        offset: cursor.offset()
      }
    );

    let index = properties.len();
    let header = cursor
      .read::<PropertyHeader>()
      .context(TruncatedSnafu { index })?;
    let data = cursor
      .read_bytes(header.length.get() as usize)
      .context(TruncatedSnafu { index })?;

    trace!(
      "property {index}: {} ({} bytes)",
      tag_display(&header.kind),
      data.len()
    );
    properties.push(Property {
      kind: header.kind,
      data: data.to_vec(),
    });
  }

  Ok(properties)
}

/// Writes each property in order. No terminator follows; whatever is written
/// next must not start with [`PROPERTY_MAGIC`].
pub fn write_properties(
  properties: &[Property],
  writer: &mut impl Write,
) -> Result<(), WriteError> {
  for property in properties {
    let length = u32::try_from(property.data.len())
      .ok()
      .context(OverflowedSnafu {
        what: "property payload",
      })?;
    let header = PropertyHeader {
      magic: PROPERTY_MAGIC,
      kind: property.kind,
      length: U32::new(length),
    };
    writer.write_all(header.as_bytes())?;
    writer.write_all(&property.data)?;
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;
  use proptest::prelude::*;

  use super::*;

  fn encode(properties: &[Property]) -> Vec<u8> {
    let mut data = Vec::new();
    write_properties(properties, &mut data).unwrap();
    data
  }

  #[test]
  fn stops_at_first_non_sentinel() {
    let properties = vec![
      Property::new(Property::DATE, "2025-10-23 08:05:00"),
      Property::new(Property::NAME, "CAR_SPRITESHEET_BMP"),
      Property::new(Property::ORIG, "/foo"),
    ];
    let mut data = encode(&properties);
    data.extend_from_slice(b"BMP ");

    let mut cursor = ByteCursor::new(&data);
    let decoded = read_properties(&mut cursor, 100).unwrap();

    assert_eq!(decoded, properties);
    assert_eq!(cursor.offset(), data.len() - 4);
    assert_eq!(cursor.peek_array::<4>(), Some(*b"BMP "));
  }

  #[test]
  fn empty_chain_consumes_nothing() {
    let mut cursor = ByteCursor::new(b"FONT\0\0\0\0");
    assert!(read_properties(&mut cursor, 100).unwrap().is_empty());
    assert_eq!(cursor.offset(), 0);
  }

  #[test]
  fn empty_payloads_are_kept() {
    let properties = vec![Property::new(*b"XTRA", Vec::new())];
    let mut data = encode(&properties);
    data.extend_from_slice(b"PAL ");

    let decoded = read_properties(&mut ByteCursor::new(&data), 100).unwrap();
    assert_eq!(decoded, properties);
  }

  #[test]
  fn chain_longer_than_limit_is_rejected() {
    let properties = vec![Property::new(Property::NAME, "x"); 4];
    let mut data = encode(&properties);
    data.extend_from_slice(b"RLE ");

    let error = read_properties(&mut ByteCursor::new(&data), 3).unwrap_err();
    assert!(matches!(error, PropertyError::ChainTooLong { limit: 3, .. }));
    assert_eq!(
      read_properties(&mut ByteCursor::new(&data), 4).unwrap().len(),
      4
    );
  }

  #[test]
  fn truncated_payload_is_rejected() {
    let mut data = encode(&[Property::new(Property::ORIG, "a/long/path.bmp")]);
    data.truncate(data.len() - 3);

    let error = read_properties(&mut ByteCursor::new(&data), 100).unwrap_err();
    assert!(matches!(error, PropertyError::Truncated { index: 0, .. }));
  }

  #[test]
  fn truncated_header_is_rejected() {
    let data = b"propNA";
    let error = read_properties(&mut ByteCursor::new(data), 100).unwrap_err();
    assert!(matches!(error, PropertyError::Truncated { index: 0, .. }));
  }

  fn property() -> impl Strategy<Value = Property> {
    (
      prop::array::uniform4(any::<u8>()),
      prop::collection::vec(any::<u8>(), 0..64),
    )
      .prop_map(|(kind, data)| Property { kind, data })
  }

  proptest! {
    #[test]
    fn chain_round_trips_before_any_non_sentinel(
      properties in prop::collection::vec(property(), 0..8),
      next in prop::array::uniform4(any::<u8>()).prop_filter("not the sentinel", |tag| *tag != PROPERTY_MAGIC),
    ) {
      let mut data = encode(&properties);
      let chain_len = data.len();
      data.extend_from_slice(&next);

      let mut cursor = ByteCursor::new(&data);
      let decoded = read_properties(&mut cursor, 100).unwrap();

      prop_assert_eq!(decoded, properties);
      prop_assert_eq!(cursor.offset(), chain_len);
      prop_assert_eq!(cursor.peek_array::<4>(), Some(next));
    }
  }
}
