mod mac_names;

use std::io::{self, Cursor, Read};

use super::{FontTable, NamedTable};
use byteorder::{BigEndian, ReadBytesExt};
use mac_names::MACINTOSH_NAMES;

/// This table contains additional information needed to use OTF fonts on PostScript printers,
/// including the PostScript names of all glyphs (versions 1.0 and 2.0 only).
/// References:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/post
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6post.html
#[derive(Debug, PartialEq, Clone)]
pub struct PostTable {
    pub(crate) glyph_names: GlyphNames,
}

#[derive(Debug, PartialEq, Clone)]
pub enum GlyphNames {
    /// Version 3.0 tables (and unknown versions) do not carry glyph names.
    None,
    /// Version 1.0: the font uses exactly the 258 standard Macintosh glyphs.
    Standard,
    /// Version 2.0: every glyph refers to either a standard Macintosh name (index < 258) or to one
    /// of the names stored in the table (index - 258).
    Custom {
        indices: Vec<u16>,
        names: Vec<String>,
    },
}

impl PostTable {
    pub fn glyph_name(&self, glyph_id: u16) -> Option<&str> {
        match &self.glyph_names {
            GlyphNames::None => None,
            GlyphNames::Standard => MACINTOSH_NAMES.get(usize::from(glyph_id)).copied(),
            GlyphNames::Custom { indices, names } => {
                let index = usize::from(*indices.get(usize::from(glyph_id))?);
                match index.checked_sub(MACINTOSH_NAMES.len()) {
                    None => Some(MACINTOSH_NAMES[index]),
                    Some(index) => names.get(index).map(String::as_str),
                }
            }
        }
    }
}

impl NamedTable for PostTable {
    fn name() -> &'static str {
        "post"
    }
}

impl FontTable for PostTable {
    type UnpackDep = ();

    fn unpack<R: io::Read + AsRef<[u8]>>(
        rd: &mut Cursor<R>,
        _: Self::UnpackDep,
    ) -> Result<Self, io::Error> {
        let version = rd.read_u32::<BigEndian>()?;
        // italic angle, underline metrics, fixed pitch flag and memory hints
        let mut header = [0; 28];
        rd.read_exact(&mut header)?;

        let glyph_names = match version {
            0x00010000 => GlyphNames::Standard,
            0x00020000 => {
                let num_glyphs = rd.read_u16::<BigEndian>()?;
                let mut indices = vec![0; usize::from(num_glyphs)];
                rd.read_u16_into::<BigEndian>(&mut indices)?;

                // Pascal strings until the end of the table
                let mut names = Vec::new();
                while let Ok(len) = rd.read_u8() {
                    let mut name = vec![0; usize::from(len)];
                    rd.read_exact(&mut name)?;
                    names.push(String::from_utf8_lossy(&name).into_owned());
                }

                GlyphNames::Custom { indices, names }
            }
            _ => GlyphNames::None,
        };

        Ok(PostTable { glyph_names })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::test_font;

    fn unpack(data: Vec<u8>) -> PostTable {
        PostTable::unpack(&mut Cursor::new(&data[..]), ()).unwrap()
    }

    #[test]
    fn test_post_table_version1_names() {
        let post = unpack(test_font::post_v1());
        assert_eq!(post.glyph_names, GlyphNames::Standard);
        assert_eq!(post.glyph_name(0), Some(".notdef"));
        assert_eq!(post.glyph_name(3), Some("space"));
        assert_eq!(post.glyph_name(257), Some("dcroat"));
        assert_eq!(post.glyph_name(258), None);
    }

    #[test]
    fn test_post_table_version2_names() {
        let post = unpack(test_font::post_v2(&[0, 68, 259, 258, 300], &["ff", "ffi"]));
        assert_eq!(post.glyph_name(0), Some(".notdef"));
        assert_eq!(post.glyph_name(1), Some("a"));
        assert_eq!(post.glyph_name(2), Some("ffi"));
        assert_eq!(post.glyph_name(3), Some("ff"));
        // refers to a string that does not exist
        assert_eq!(post.glyph_name(4), None);
        assert_eq!(post.glyph_name(5), None);
    }

    #[test]
    fn test_post_table_version3_has_no_names() {
        let post = unpack(test_font::post_v3());
        assert_eq!(post.glyph_names, GlyphNames::None);
        assert_eq!(post.glyph_name(0), None);
    }

    #[test]
    fn test_post_table_truncated_name() {
        let mut data = test_font::post_v2(&[258], &["grave.cap"]);
        data.truncate(data.len() - 1);
        let err = PostTable::unpack(&mut Cursor::new(&data[..]), ()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
