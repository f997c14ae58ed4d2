//! Importers that turn loose source files into archive bodies.

pub mod bmp;
pub mod font;
pub mod palette;
pub mod rle;

pub use bmp::{BmpError, decode_bmp, import_bitmap};
pub use font::{GlyphSheetError, PixelSource, font_from_glyph_sheet, import_font};
pub use palette::{PaletteError, decode_palette, import_palette};
pub use rle::{RleError, import_rle_sprite};
