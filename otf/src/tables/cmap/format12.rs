use std::convert::TryFrom;
use std::io;

use byteorder::{BigEndian, ReadBytesExt};

/// Highest valid Unicode scalar value, groups reaching beyond it are clamped.
const MAX_CODE_POINT: u32 = 0x10FFFF;

/// Segmented coverage, the standard character-to-glyph-index mapping subtable for fonts
/// supporting Unicode character repertoires that include supplementary-plane characters.
#[derive(Debug, PartialEq, Clone)]
pub struct Format12 {
    sequential_map_groups: Vec<SequentialMapGroup>,
}

impl Format12 {
    pub fn unpack<R: io::Read>(rd: &mut R) -> Result<Self, io::Error> {
        let _language = rd.read_u32::<BigEndian>()?;
        let num_groups = rd.read_u32::<BigEndian>()?;

        // do not trust num_groups for the allocation, the reader is bounded by the subtable length
        let mut groups = Vec::with_capacity((num_groups as usize).min(1024));
        for _ in 0..num_groups {
            groups.push(SequentialMapGroup {
                start_char_code: rd.read_u32::<BigEndian>()?,
                end_char_code: rd.read_u32::<BigEndian>()?,
                start_glyph_id: rd.read_u32::<BigEndian>()?,
            });
        }

        Ok(Format12 {
            sequential_map_groups: groups,
        })
    }

    pub fn glyph_id(&self, codepoint: u32) -> Option<u16> {
        // groups are sorted by their (non-overlapping) code point ranges
        let ix = self
            .sequential_map_groups
            .partition_point(|g| g.end_char_code < codepoint);
        self.sequential_map_groups
            .get(ix)
            .and_then(|g| g.glyph_id(codepoint))
    }

    pub fn mappings(&self) -> Vec<(u32, u16)> {
        self.sequential_map_groups
            .iter()
            .flat_map(|g| {
                (g.start_char_code..=g.end_char_code.min(MAX_CODE_POINT))
                    .filter_map(move |c| g.glyph_id(c).map(|id| (c, id)))
            })
            .collect()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct SequentialMapGroup {
    start_char_code: u32,
    end_char_code: u32,
    start_glyph_id: u32,
}

impl SequentialMapGroup {
    fn glyph_id(&self, codepoint: u32) -> Option<u16> {
        if codepoint < self.start_char_code || codepoint > self.end_char_code {
            return None;
        }
        let id = self
            .start_glyph_id
            .checked_add(codepoint - self.start_char_code)?;
        u16::try_from(id).ok().filter(|id| *id != 0)
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;
    use crate::utils::test_font;

    fn format12(groups: &[(u32, u32, u32)]) -> Format12 {
        let data = test_font::cmap_format12_subtable(groups);
        // skip format, reserved and length
        Format12::unpack(&mut Cursor::new(&data[8..])).unwrap()
    }

    #[test]
    fn test_cmap_subtable_format12_glyph_id() {
        let subtable = format12(&[(0x41, 0x5A, 10), (0x1D400, 0x1D419, 100)]);

        assert_eq!(subtable.sequential_map_groups.len(), 2);
        assert_eq!(subtable.glyph_id(0x40), None);
        assert_eq!(subtable.glyph_id(0x41), Some(10));
        assert_eq!(subtable.glyph_id(0x5A), Some(35));
        assert_eq!(subtable.glyph_id(0x5B), None);
        assert_eq!(subtable.glyph_id(0x1D401), Some(101));
        assert_eq!(subtable.glyph_id(0x1D41A), None);
    }

    #[test]
    fn test_cmap_subtable_format12_mappings() {
        let subtable = format12(&[(0x20, 0x21, 0), (0x1D400, 0x1D401, 7)]);

        // 0x20 maps to the missing glyph
        assert_eq!(
            subtable.mappings(),
            vec![(0x21, 1), (0x1D400, 7), (0x1D401, 8)]
        );
    }

    #[test]
    fn test_cmap_subtable_format12_truncated() {
        let data = test_font::cmap_format12_subtable(&[(0x41, 0x5A, 10)]);
        let err = Format12::unpack(&mut Cursor::new(&data[8..data.len() - 2])).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
