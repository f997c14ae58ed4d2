//! Reader and writer for Allegro 4 style `.dat` asset archives.
//!
//! An archive is a short header followed by a flat list of objects. Each object
//! carries a chain of `prop` records, a four byte type tag, two declared lengths
//! and a body whose layout is selected by the tag. Everything on the wire is big
//! endian; everything in memory is host order.

pub mod cursor;
pub mod dat;
pub mod util;
