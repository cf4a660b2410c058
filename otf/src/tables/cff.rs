mod standard_strings;

use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::mem;

use super::{FontTable, NamedTable};
use byteorder::{BigEndian, ReadBytesExt};
use standard_strings::STANDARD_STRINGS;

/// Top DICT operators (two byte operators are stored as `1200 + second byte`).
const OP_CHARSET: u16 = 15;
const OP_CHAR_STRINGS: u16 = 17;
const OP_ROS: u16 = 1230;

/// The predefined ISOAdobe charset maps glyph `n` to SID `n` for the first 229 glyphs.
const ISO_ADOBE_LEN: u16 = 229;

/// The Compact Font Format table containing the outlines of `OTTO` fonts. Only the parts needed
/// to name glyphs are read: the header, the Top DICT and String INDEXes, the glyph count of
/// the CharStrings INDEX and the charset.
/// References:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/cff
/// - Adobe Technical Note #5176, The Compact Font Format Specification
#[derive(Debug, PartialEq, Clone)]
pub struct CffTable {
    pub(crate) num_glyphs: u16,
    pub(crate) charset: Charset,
    /// Custom strings, referenced by SIDs starting at 391.
    pub(crate) strings: Vec<String>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Charset {
    IsoAdobe,
    /// The predefined Expert charsets and CID-keyed fonts, whose glyphs have no names.
    Unnamed,
    /// The SIDs of all glyphs but `.notdef` (glyph 0), ordered by glyph id.
    Sids(Vec<u16>),
}

impl CffTable {
    pub fn glyph_name(&self, glyph_id: u16) -> Option<&str> {
        if glyph_id >= self.num_glyphs {
            return None;
        }

        let sid = match &self.charset {
            _ if glyph_id == 0 => 0,
            Charset::IsoAdobe if glyph_id < ISO_ADOBE_LEN => glyph_id,
            Charset::IsoAdobe | Charset::Unnamed => return None,
            Charset::Sids(sids) => *sids.get(usize::from(glyph_id) - 1)?,
        };
        self.string(sid)
    }

    fn string(&self, sid: u16) -> Option<&str> {
        let sid = usize::from(sid);
        match sid.checked_sub(STANDARD_STRINGS.len()) {
            None => Some(STANDARD_STRINGS[sid]),
            Some(ix) => self.strings.get(ix).map(String::as_str),
        }
    }
}

impl NamedTable for CffTable {
    fn name() -> &'static str {
        "CFF "
    }
}

impl FontTable for CffTable {
    type UnpackDep = ();

    fn unpack<R: io::Read + AsRef<[u8]>>(
        rd: &mut Cursor<R>,
        _: Self::UnpackDep,
    ) -> Result<Self, io::Error> {
        let major = rd.read_u8()?;
        if major != 1 {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("CFF version {} is not supported", major),
            ));
        }
        let _minor = rd.read_u8()?;
        let hdr_size = rd.read_u8()?;
        let _off_size = rd.read_u8()?;
        rd.set_position(u64::from(hdr_size));

        let _names = read_index(rd)?;
        let top_dicts = read_index(rd)?;
        let strings = read_index(rd)?;

        let top_dict = top_dicts
            .first()
            .map(|data| parse_dict(data))
            .transpose()?
            .ok_or_else(|| cff_error("CFF font without Top DICT"))?;

        let char_strings_offset = top_dict
            .get(&OP_CHAR_STRINGS)
            .and_then(|operands| operands.first())
            .and_then(Number::as_offset)
            .ok_or_else(|| cff_error("CFF font without CharStrings"))?;
        rd.set_position(char_strings_offset);
        let num_glyphs = rd.read_u16::<BigEndian>()?;

        let charset = if top_dict.contains_key(&OP_ROS) {
            Charset::Unnamed
        } else {
            let offset = match top_dict.get(&OP_CHARSET) {
                Some(operands) => operands
                    .first()
                    .and_then(Number::as_offset)
                    .ok_or_else(|| cff_error("Invalid CFF charset offset"))?,
                None => 0,
            };
            match offset {
                0 => Charset::IsoAdobe,
                1 | 2 => Charset::Unnamed,
                offset => {
                    rd.set_position(offset);
                    read_charset(rd, num_glyphs)?
                }
            }
        };

        Ok(CffTable {
            num_glyphs,
            charset,
            strings: strings
                .iter()
                .map(|s| String::from_utf8_lossy(s).into_owned())
                .collect(),
        })
    }
}

fn cff_error(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::Other, msg.to_string())
}

/// Reads an INDEX structure (a count, an offset array and the data of all items).
fn read_index<R: io::Read + AsRef<[u8]>>(rd: &mut Cursor<R>) -> Result<Vec<Vec<u8>>, io::Error> {
    let count = rd.read_u16::<BigEndian>()?;
    if count == 0 {
        return Ok(Vec::new());
    }

    let off_size = rd.read_u8()?;
    if !(1..=4).contains(&off_size) {
        return Err(cff_error("Invalid CFF INDEX offset size"));
    }

    let mut offsets = Vec::with_capacity(usize::from(count) + 1);
    for _ in 0..=count {
        offsets.push(rd.read_uint::<BigEndian>(usize::from(off_size))?);
    }

    // offsets are 1-based, relative to the byte preceding the item data
    let skip = offsets[0]
        .checked_sub(1)
        .ok_or_else(|| cff_error("Invalid CFF INDEX offset"))?;
    rd.set_position(rd.position() + skip);

    let mut items = Vec::with_capacity(usize::from(count));
    for window in offsets.windows(2) {
        let len = window[1]
            .checked_sub(window[0])
            .ok_or_else(|| cff_error("CFF INDEX offsets are not ascending"))?;
        // the item length comes from the file, so check it against the data before allocating
        let remaining = (rd.get_ref().as_ref().len() as u64).saturating_sub(rd.position());
        if len > remaining {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "CFF INDEX item exceeds table data",
            ));
        }
        let mut item = vec![0; len as usize];
        rd.read_exact(&mut item)?;
        items.push(item);
    }

    Ok(items)
}

#[derive(Debug, PartialEq, Clone, Copy)]
enum Number {
    Integer(i32),
    Real(f64),
}

impl Number {
    fn as_offset(&self) -> Option<u64> {
        match *self {
            Number::Integer(n) if n >= 0 => Some(n as u64),
            _ => None,
        }
    }
}

/// Parses a DICT into a map of operator to its operands.
fn parse_dict(data: &[u8]) -> Result<HashMap<u16, Vec<Number>>, io::Error> {
    let mut rd = Cursor::new(data);
    let mut dict = HashMap::new();
    let mut operands = Vec::new();

    while let Ok(b0) = rd.read_u8() {
        let b0i = i32::from(b0);
        match b0 {
            0..=11 | 13..=21 => {
                dict.insert(u16::from(b0), mem::take(&mut operands));
            }
            12 => {
                let b1 = rd.read_u8()?;
                dict.insert(1200 + u16::from(b1), mem::take(&mut operands));
            }
            28 => operands.push(Number::Integer(i32::from(rd.read_i16::<BigEndian>()?))),
            29 => operands.push(Number::Integer(rd.read_i32::<BigEndian>()?)),
            30 => operands.push(Number::Real(read_real(&mut rd)?)),
            32..=246 => operands.push(Number::Integer(b0i - 139)),
            247..=250 => {
                let b1 = i32::from(rd.read_u8()?);
                operands.push(Number::Integer((b0i - 247) * 256 + b1 + 108));
            }
            251..=254 => {
                let b1 = i32::from(rd.read_u8()?);
                operands.push(Number::Integer(-(b0i - 251) * 256 - b1 - 108));
            }
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("Invalid CFF DICT byte {}", b0),
                ))
            }
        }
    }

    Ok(dict)
}

/// Reads a real number operand, encoded as a sequence of nibbles terminated by `0xf`.
fn read_real<R: io::Read>(rd: &mut R) -> Result<f64, io::Error> {
    let mut s = String::new();
    'bytes: loop {
        let byte = rd.read_u8()?;
        for &nibble in [byte >> 4, byte & 0xf].iter() {
            match nibble {
                0..=9 => s.push(char::from(b'0' + nibble)),
                0xa => s.push('.'),
                0xb => s.push('E'),
                0xc => s.push_str("E-"),
                0xe => s.push('-'),
                0xf => break 'bytes,
                _ => return Err(cff_error("Invalid CFF real number")),
            }
        }
    }
    s.parse()
        .map_err(|_| cff_error("Invalid CFF real number"))
}

fn read_charset<R: io::Read>(rd: &mut R, num_glyphs: u16) -> Result<Charset, io::Error> {
    let format = rd.read_u8()?;
    let count = usize::from(num_glyphs.saturating_sub(1));
    let mut sids = Vec::with_capacity(count);

    match format {
        0 => {
            for _ in 0..count {
                sids.push(rd.read_u16::<BigEndian>()?);
            }
        }
        1 | 2 => {
            while sids.len() < count {
                let first = rd.read_u16::<BigEndian>()?;
                let n_left = if format == 1 {
                    u16::from(rd.read_u8()?)
                } else {
                    rd.read_u16::<BigEndian>()?
                };
                sids.extend((0..=n_left).map(|i| first.saturating_add(i)));
            }
            sids.truncate(count);
        }
        _ => {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("Invalid CFF charset format {}", format),
            ))
        }
    }

    Ok(Charset::Sids(sids))
}
