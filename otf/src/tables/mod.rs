pub mod cff;
pub mod cmap;
pub mod maxp;
pub mod post;

use std::io::{self, Cursor};

/// A table of an OpenType font. Each table is unpacked from a cursor that only spans the table's
/// own data, so offsets inside of a table are relative to the cursor's start.
pub trait FontTable: Sized {
    type UnpackDep;

    fn unpack<R: io::Read + AsRef<[u8]>>(
        rd: &mut Cursor<R>,
        dep: Self::UnpackDep,
    ) -> Result<Self, io::Error>;
}

/// A table that is referenced by a tag from the font's offset table.
pub trait NamedTable {
    fn name() -> &'static str;
}

/// A glyph of a font, together with its PostScript name (if the font carries names) and all code
/// points that are mapped to it by the font's character maps.
#[derive(Debug, PartialEq, Clone)]
pub struct Glyph {
    pub index: u16,
    pub name: Option<String>,
    pub code_points: Vec<u32>,
}
