use std::io::{self, Cursor};

use super::{FontTable, NamedTable};
use byteorder::{BigEndian, ReadBytesExt};

/// This table establishes the memory requirements for this font. Only the glyph count is of
/// interest here, which is the first field of both the CFF (0.5) and TrueType (1.0) versions.
/// References:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/maxp
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6maxp.html
#[derive(Debug, PartialEq, Clone)]
pub struct MaxpTable {
    /// The number of glyphs in the font.
    pub(crate) num_glyphs: u16,
}

impl NamedTable for MaxpTable {
    fn name() -> &'static str {
        "maxp"
    }
}

impl FontTable for MaxpTable {
    type UnpackDep = ();

    fn unpack<R: io::Read + AsRef<[u8]>>(
        rd: &mut Cursor<R>,
        _: Self::UnpackDep,
    ) -> Result<Self, io::Error> {
        let version = rd.read_u32::<BigEndian>()?;
        match version {
            0x00005000 | 0x00010000 => Ok(MaxpTable {
                num_glyphs: rd.read_u16::<BigEndian>()?,
            }),
            _ => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("Invalid MAXP version {:#010x}", version),
            )),
        }
    }
}
