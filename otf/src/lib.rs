//! A read-only OpenType reader that extracts what is needed to relate a font's glyphs to Unicode:
//! the glyph names (from the `CFF ` or `post` table) and the code points mapped to each glyph
//! (from the `cmap` table). Outlines, metrics and all other tables are skipped.

mod tables;
#[cfg(any(test, feature = "test-utils"))]
#[doc(hidden)]
pub mod utils;

use std::collections::BTreeSet;
use std::io::{self, Cursor, Read};

use byteorder::{BigEndian, ReadBytesExt};
pub use tables::Glyph;
use tables::{FontTable, NamedTable};

#[derive(Debug, PartialEq, Clone)]
pub struct OpenTypeFont {
    sfnt_version: SfntVersion,
    maxp_table: tables::maxp::MaxpTable,
    cmap_table: tables::cmap::CmapTable,
    post_table: Option<tables::post::PostTable>,
    cff_table: Option<tables::cff::CffTable>,
}

impl OpenTypeFont {
    pub fn from_slice(data: impl AsRef<[u8]>) -> Result<Self, io::Error> {
        let data = data.as_ref();
        let offset_table = OffsetTable::unpack(&mut Cursor::new(data), ())?;

        let maxp_table = offset_table.unpack_required_table((), data)?;
        let cmap_table = offset_table.unpack_required_table((), data)?;
        let post_table = offset_table.unpack_table((), data)?;
        let cff_table = offset_table.unpack_table((), data)?;

        Ok(OpenTypeFont {
            sfnt_version: offset_table.sfnt_version,
            maxp_table,
            cmap_table,
            post_table,
            cff_table,
        })
    }

    pub fn num_glyphs(&self) -> u16 {
        self.maxp_table.num_glyphs
    }

    /// Whether the font contains CFF outlines (`OTTO`) instead of TrueType outlines.
    pub fn is_cff(&self) -> bool {
        self.sfnt_version == SfntVersion::CFF
    }

    pub fn glyph_id(&self, codepoint: u32) -> Option<u16> {
        self.cmap_table
            .encoding_records
            .first()
            .and_then(|record| record.subtable.glyph_id(codepoint))
    }

    /// The PostScript name of the glyph. Names are taken from the `CFF ` table if the font has
    /// one, and from the `post` table otherwise.
    pub fn glyph_name(&self, glyph_id: u16) -> Option<&str> {
        if glyph_id >= self.num_glyphs() {
            return None;
        }

        match (&self.cff_table, &self.post_table) {
            (Some(cff), _) => cff.glyph_name(glyph_id),
            (None, Some(post)) => post.glyph_name(glyph_id),
            (None, None) => None,
        }
    }

    /// All glyphs of the font, ordered by their index. The code points of a glyph are collected
    /// from every supported character map of the font and are sorted ascending.
    pub fn glyphs(&self) -> Vec<Glyph> {
        let num_glyphs = self.num_glyphs();
        let mut code_points = vec![BTreeSet::new(); usize::from(num_glyphs)];
        for record in &self.cmap_table.encoding_records {
            for (code_point, glyph_id) in record.subtable.mappings() {
                if let Some(set) = code_points.get_mut(usize::from(glyph_id)) {
                    set.insert(code_point);
                }
            }
        }

        code_points
            .into_iter()
            .zip(0..num_glyphs)
            .map(|(code_points, index)| Glyph {
                index,
                name: self.glyph_name(index).map(str::to_string),
                code_points: code_points.into_iter().collect(),
            })
            .collect()
    }
}

/// This table contains a dictionary of all font tables included in the file.
/// References:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/otff
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6.html
#[derive(Debug, PartialEq)]
struct OffsetTable {
    /// OpenType fonts that contain TrueType outlines should use the value of 0x00010000. OpenType
    /// fonts containing CFF data (version 1 or 2) should use 0x4F54544F ('OTTO', when
    /// re-interpreted as a Tag).
    sfnt_version: SfntVersion,
    /// Table records of the font.
    tables: Vec<TableRecord>,
}

impl OffsetTable {
    fn get_table_record(&self, tag: &str) -> Option<&TableRecord> {
        // Records should be sorted by tag, but not every font out there follows that rule.
        self.tables.iter().find(|r| r.tag == tag)
    }

    fn unpack_table<T>(&self, dep: T::UnpackDep, data: &[u8]) -> Result<Option<T>, io::Error>
    where
        T: FontTable + NamedTable,
    {
        let record = match self.get_table_record(T::name()) {
            Some(record) => record,
            None => return Ok(None),
        };

        let start = record.offset as usize;
        let table_data = start
            .checked_add(record.length as usize)
            .and_then(|end| data.get(start..end))
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("{} table exceeds font data", T::name()),
                )
            })?;

        Ok(Some(T::unpack(&mut Cursor::new(table_data), dep)?))
    }

    fn unpack_required_table<T>(&self, dep: T::UnpackDep, data: &[u8]) -> Result<T, io::Error>
    where
        T: FontTable + NamedTable,
    {
        self.unpack_table(dep, data)?.ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::Other,
                format!("{} table missing", T::name()),
            )
        })
    }
}

impl FontTable for OffsetTable {
    type UnpackDep = ();

    fn unpack<R: io::Read + AsRef<[u8]>>(
        rd: &mut Cursor<R>,
        _: Self::UnpackDep,
    ) -> Result<Self, io::Error> {
        let sfnt_version = SfntVersion::unpack(rd, ())?;
        let num_tables = rd.read_u16::<BigEndian>()?;
        let _search_range = rd.read_u16::<BigEndian>()?;
        let _entry_selector = rd.read_u16::<BigEndian>()?;
        let _range_shift = rd.read_u16::<BigEndian>()?;

        let mut tables = Vec::with_capacity(num_tables as usize);
        for _ in 0..num_tables {
            tables.push(TableRecord::unpack(rd, ())?);
        }

        Ok(OffsetTable {
            sfnt_version,
            tables,
        })
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
enum SfntVersion {
    TrueType,
    CFF,
}

impl FontTable for SfntVersion {
    type UnpackDep = ();

    fn unpack<R: io::Read + AsRef<[u8]>>(
        rd: &mut Cursor<R>,
        _: Self::UnpackDep,
    ) -> Result<Self, io::Error> {
        match rd.read_u32::<BigEndian>()? {
            // 'true' is used by older Apple fonts
            0x00010000 | 0x74727565 => Ok(SfntVersion::TrueType),
            0x4F54544F => Ok(SfntVersion::CFF),
            v => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("Unknown sfnt_version {:#010x}", v),
            )),
        }
    }
}

#[derive(Debug, PartialEq)]
struct TableRecord {
    tag: String,
    offset: u32,
    length: u32,
}

impl FontTable for TableRecord {
    type UnpackDep = ();

    fn unpack<R: io::Read + AsRef<[u8]>>(
        rd: &mut Cursor<R>,
        _: Self::UnpackDep,
    ) -> Result<Self, io::Error> {
        let mut tag = [0; 4];
        rd.read_exact(&mut tag)?;
        let _check_sum = rd.read_u32::<BigEndian>()?;
        Ok(TableRecord {
            tag: String::from_utf8_lossy(&tag).to_string(),
            offset: rd.read_u32::<BigEndian>()?,
            length: rd.read_u32::<BigEndian>()?,
        })
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::utils::test_font::{self, FontBuilder};

    fn truetype_font() -> Vec<u8> {
        FontBuilder::new(0x00010000)
            .table("maxp", test_font::maxp(4))
            .table(
                "cmap",
                test_font::cmap_format4(&[(0x41, 0x43, 1)], &[(3, 1)]),
            )
            .table("post", test_font::post_v2(&[0, 36, 258, 259], &["Alpha", "beta"]))
            .build()
    }

    #[test]
    fn test_offset_table_unpack() {
        let data = truetype_font();
        let table = OffsetTable::unpack(&mut Cursor::new(&data[..]), ()).unwrap();
        assert_eq!(table.sfnt_version, SfntVersion::TrueType);
        assert_eq!(table.tables.len(), 3);
        assert_eq!(
            table.tables.iter().map(|r| r.tag.as_str()).collect::<Vec<_>>(),
            vec!["cmap", "maxp", "post"]
        );
    }

    #[test]
    fn test_unknown_sfnt_version() {
        let data = FontBuilder::new(0xdeadbeef).build();
        let err = OpenTypeFont::from_slice(&data).unwrap_err();
        assert_eq!(err.to_string(), "Unknown sfnt_version 0xdeadbeef");
    }

    #[test]
    fn test_missing_cmap() {
        let data = FontBuilder::new(0x00010000)
            .table("maxp", test_font::maxp(1))
            .build();
        let err = OpenTypeFont::from_slice(&data).unwrap_err();
        assert_eq!(err.to_string(), "cmap table missing");
    }

    #[test]
    fn test_table_out_of_bounds() {
        let mut data = truetype_font();
        data.truncate(data.len() - 4);
        let err = OpenTypeFont::from_slice(&data).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_truetype_glyphs() {
        let font = OpenTypeFont::from_slice(truetype_font()).unwrap();
        assert!(!font.is_cff());
        assert_eq!(font.num_glyphs(), 4);
        assert_eq!(font.glyph_id(0x42), Some(2));
        assert_eq!(font.glyph_name(3), Some("beta"));
        assert_eq!(font.glyph_name(4), None);
        assert_eq!(
            font.glyphs(),
            vec![
                Glyph {
                    index: 0,
                    name: Some(".notdef".to_string()),
                    code_points: vec![],
                },
                Glyph {
                    index: 1,
                    name: Some("A".to_string()),
                    code_points: vec![0x41],
                },
                Glyph {
                    index: 2,
                    name: Some("Alpha".to_string()),
                    code_points: vec![0x42],
                },
                Glyph {
                    index: 3,
                    name: Some("beta".to_string()),
                    code_points: vec![0x43],
                },
            ]
        );
    }

    #[test]
    fn test_cff_glyph_names_take_precedence() {
        let data = FontBuilder::new(0x4F54544F)
            .table("maxp", test_font::maxp(3))
            .table("cmap", test_font::cmap_format4(&[(0x61, 0x62, 1)], &[(3, 1)]))
            .table("post", test_font::post_v3())
            .table("CFF ", test_font::cff(&[66, 67], &[]))
            .build();
        let font = OpenTypeFont::from_slice(&data).unwrap();
        assert!(font.is_cff());
        assert_eq!(
            font.glyphs()
                .into_iter()
                .map(|g| (g.name, g.code_points))
                .collect::<Vec<_>>(),
            vec![
                (Some(".notdef".to_string()), vec![]),
                (Some("a".to_string()), vec![0x61]),
                (Some("b".to_string()), vec![0x62]),
            ]
        );
    }

    #[test]
    fn test_code_points_from_all_encodings() {
        let format4 = test_font::cmap_format4_subtable(&[(0x41, 0x41, 1)]);
        let format12 = test_font::cmap_format12_subtable(&[(0x1D400, 0x1D400, 1)]);
        let cmap = test_font::cmap(&[(0, 3, 0), (3, 10, 1)], &[format4, format12]);

        let data = FontBuilder::new(0x00010000)
            .table("maxp", test_font::maxp(2))
            .table("cmap", cmap)
            .build();
        let font = OpenTypeFont::from_slice(&data).unwrap();
        let glyphs = font.glyphs();
        assert_eq!(glyphs[1].name, None);
        assert_eq!(glyphs[1].code_points, vec![0x41, 0x1D400]);
    }
}
