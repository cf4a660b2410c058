mod format12;
mod format4;

use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::rc::Rc;

use super::{FontTable, NamedTable};
use byteorder::{BigEndian, ReadBytesExt};
use format12::Format12;
use format4::Format4;

/// The supported `(platform ID, encoding ID)` combinations, in the order of preference:
/// | platform ID | encoding ID |                                          |
/// |-------------|-------------|------------------------------------------|
/// | 0           | 4           | Unicode >= 2.0, non-BMP allowed          |
/// | 3           | 10          | Windows, full Unicode                    |
/// | 0           | 3           | Unicode >= 2.0, BMP only                 |
/// | 3           | 1           | Windows, compatbility with older devices |
/// | 3           | 0           | Windows, symbol                          |
const SUPPORTED_ENCODINGS: [(u16, u16); 5] = [(0, 4), (3, 10), (0, 3), (3, 1), (3, 0)];

/// A font's CMAP table, which defines the mapping of character codes to the glyph index values
/// used in the font. Encoding records are kept in the order of `SUPPORTED_ENCODINGS`.
///
/// Supported subtable formats are: 4 and 12
///
/// Not supported character encodings and subtable formats are ignored. An error is returned, if
/// there is not a single supported character encoding and subtable combination.
///
/// See OpenType spec: https://docs.microsoft.com/en-us/typography/opentype/spec/cmap
#[derive(Debug, PartialEq, Clone)]
pub struct CmapTable {
    pub(crate) encoding_records: Vec<EncodingRecord>,
}

impl NamedTable for CmapTable {
    fn name() -> &'static str {
        "cmap"
    }
}

impl FontTable for CmapTable {
    type UnpackDep = ();

    fn unpack<R: io::Read + AsRef<[u8]>>(
        rd: &mut Cursor<R>,
        _: Self::UnpackDep,
    ) -> Result<Self, io::Error> {
        let _version = rd.read_u16::<BigEndian>()?;
        let num_tables = rd.read_u16::<BigEndian>()?;

        let mut headers = Vec::with_capacity(num_tables as usize);
        for _ in 0..num_tables {
            headers.push((
                rd.read_u16::<BigEndian>()?,
                rd.read_u16::<BigEndian>()?,
                rd.read_u32::<BigEndian>()?,
            ));
        }

        // records of different encodings often point to the very same subtable
        let mut subtables: HashMap<u32, Rc<Subtable>> = HashMap::new();
        let mut encoding_records = Vec::with_capacity(headers.len().min(SUPPORTED_ENCODINGS.len()));
        for (platform_id, encoding_id, offset) in headers {
            // skip unsupported encodings
            if !SUPPORTED_ENCODINGS.contains(&(platform_id, encoding_id)) {
                continue;
            }

            let subtable = match subtables.get(&offset) {
                Some(subtable) => Rc::clone(subtable),
                None => {
                    rd.set_position(u64::from(offset));
                    let subtable = match Subtable::unpack(rd, ()) {
                        Ok(subtable) => Rc::new(subtable),
                        // skip unsupported subtable formats
                        Err(err) if err.kind() == io::ErrorKind::InvalidData => continue,
                        Err(err) => return Err(err),
                    };
                    subtables.insert(offset, Rc::clone(&subtable));
                    subtable
                }
            };

            encoding_records.push(EncodingRecord {
                platform_id,
                encoding_id,
                subtable,
            });
        }

        if encoding_records.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "Font does not contain any supported CMAP",
            ));
        }

        encoding_records.sort_by_key(|r| {
            SUPPORTED_ENCODINGS
                .iter()
                .position(|e| *e == (r.platform_id, r.encoding_id))
        });

        Ok(CmapTable { encoding_records })
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct EncodingRecord {
    pub(crate) platform_id: u16,
    pub(crate) encoding_id: u16,
    pub(crate) subtable: Rc<Subtable>,
}

#[derive(Debug, PartialEq)]
pub enum Subtable {
    Format4(Format4),
    Format12(Format12),
}

impl Subtable {
    pub fn glyph_id(&self, codepoint: u32) -> Option<u16> {
        match self {
            Subtable::Format4(subtable) => subtable.glyph_id(codepoint),
            Subtable::Format12(subtable) => subtable.glyph_id(codepoint),
        }
    }

    /// All `(code point, glyph id)` pairs of the subtable, ordered by code point. Code points
    /// mapped to the missing glyph (`0`) are not included.
    pub fn mappings(&self) -> Vec<(u32, u16)> {
        match self {
            Subtable::Format4(subtable) => subtable.mappings(),
            Subtable::Format12(subtable) => subtable.mappings(),
        }
    }
}

impl FontTable for Subtable {
    type UnpackDep = ();

    fn unpack<R: io::Read + AsRef<[u8]>>(
        rd: &mut Cursor<R>,
        _: Self::UnpackDep,
    ) -> Result<Self, io::Error> {
        let format = rd.read_u16::<BigEndian>()?;

        match format {
            4 => {
                // length including format and length
                let length = rd.read_u16::<BigEndian>()?;
                let length = length.checked_sub(4).ok_or_else(|| invalid_length(format))?;
                let mut rd = rd.by_ref().take(u64::from(length));
                Ok(Subtable::Format4(Format4::unpack(&mut rd)?))
            }
            12 => {
                rd.read_u16::<BigEndian>()?; // reserved
                // length including format, reserved and length
                let length = rd.read_u32::<BigEndian>()?;
                let length = length.checked_sub(8).ok_or_else(|| invalid_length(format))?;
                let mut rd = rd.by_ref().take(u64::from(length));
                Ok(Subtable::Format12(Format12::unpack(&mut rd)?))
            }
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("CMAP subtable format {} is not supported", format),
            )),
        }
    }
}

fn invalid_length(format: u16) -> io::Error {
    io::Error::new(
        io::ErrorKind::Other,
        format!("Invalid length of CMAP subtable format {}", format),
    )
}
