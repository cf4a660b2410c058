use std::convert::TryFrom;
use std::io::{self, Read};

use byteorder::{BigEndian, ReadBytesExt};

/// Segment mapping to delta values, the standard character-to-glyph-index mapping subtable for
/// fonts that support only Unicode Basic Multilingual Plane characters.
#[derive(Debug, PartialEq, Clone)]
pub struct Format4 {
    /// End characterCode for each segment, last=0xFFFF.
    pub(crate) end_code: Vec<u16>,
    /// Start character code for each segment.
    pub(crate) start_code: Vec<u16>,
    /// Delta for all character codes in segment.
    pub(crate) id_delta: Vec<i16>,
    /// Offsets into glyph_id_array or 0
    pub(crate) id_range_offset: Vec<u16>,
    /// Glyph index array (arbitrary length)
    pub(crate) glyph_id_array: Vec<u8>,
}

impl Format4 {
    pub fn unpack<R: io::Read>(rd: &mut R) -> Result<Self, io::Error> {
        let _language = rd.read_u16::<BigEndian>()?;
        let seg_count_x2 = rd.read_u16::<BigEndian>()?;
        let seg_count = (seg_count_x2 / 2) as usize;
        let _search_range = rd.read_u16::<BigEndian>()?;
        let _entry_selector = rd.read_u16::<BigEndian>()?;
        let _range_shift = rd.read_u16::<BigEndian>()?;
        let mut end_code = vec![0; seg_count];
        rd.read_u16_into::<BigEndian>(&mut end_code)?;
        let _reserved_pad = rd.read_u16::<BigEndian>()?;
        let mut start_code = vec![0; seg_count];
        rd.read_u16_into::<BigEndian>(&mut start_code)?;
        let mut id_delta = vec![0; seg_count];
        rd.read_i16_into::<BigEndian>(&mut id_delta)?;
        let mut id_range_offset = vec![0; seg_count];
        rd.read_u16_into::<BigEndian>(&mut id_range_offset)?;

        let mut glyph_id_array = Vec::new();
        rd.read_to_end(&mut glyph_id_array)?;

        Ok(Format4 {
            end_code,
            start_code,
            id_delta,
            id_range_offset,
            glyph_id_array,
        })
    }

    pub fn glyph_id(&self, codepoint: u32) -> Option<u16> {
        // Return None for codepoints > `u16::MAX`
        let codepoint = u16::try_from(codepoint).ok()?;

        // Search for the first end_code that is greater than or equal to the character code
        let ix = match self.end_code.binary_search(&codepoint) {
            Ok(ix) | Err(ix) => ix,
        };
        let start_code = *self.start_code.get(ix)?;
        if start_code > codepoint {
            return None;
        }

        let id_delta = *self.id_delta.get(ix)?;
        let id_range_offset = *self.id_range_offset.get(ix)?;
        let val = if id_range_offset == 0 {
            codepoint
        } else {
            // byte position relative to the segment's own id_range_offset entry
            let pos = 2 * ix
                + usize::from(id_range_offset)
                + 2 * usize::from(codepoint - start_code);
            let val = if pos / 2 < self.id_range_offset.len() {
                self.id_range_offset[pos / 2]
            } else {
                let offset = pos - self.id_range_offset.len() * 2;
                self.glyph_id_array
                    .get(offset..)?
                    .read_u16::<BigEndian>()
                    .ok()?
            };
            if val == 0 {
                return None;
            }
            val
        };

        // id_delta arithmetic is modulo 65536
        Some(val.wrapping_add(id_delta as u16)).filter(|id| *id != 0)
    }

    pub fn mappings(&self) -> Vec<(u32, u16)> {
        self.start_code
            .iter()
            .zip(&self.end_code)
            .filter(|(start, end)| start <= end && **start != u16::MAX)
            .flat_map(|(start, end)| *start..=*end)
            .filter_map(|c| {
                let c = u32::from(c);
                self.glyph_id(c).map(|id| (c, id))
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;
    use crate::utils::test_font;

    #[test]
    fn test_cmap_subtable_format4_unpack() {
        let data = test_font::cmap_format4_subtable(&[(10, 20, 1), (30, 90, 12)]);
        // skip format and length
        let format4 = Format4::unpack(&mut Cursor::new(&data[4..])).unwrap();

        assert_eq!(format4.end_code, vec![20, 90, 0xFFFF]);
        assert_eq!(format4.start_code, vec![10, 30, 0xFFFF]);
        assert_eq!(format4.id_delta, vec![-9, -18, 1]);
        assert_eq!(format4.id_range_offset, vec![0, 0, 0]);
        assert!(format4.glyph_id_array.is_empty());
    }

    #[test]
    fn test_cmap_subtable_format4_codepoint_to_glyph_id_without_range_offset() {
        let format4 = Format4 {
            end_code: vec![20, 90, 480, 0xFFFF],
            start_code: vec![10, 30, 153, 0xFFFF],
            id_delta: vec![-9, -18, -27, 1],
            id_range_offset: vec![0, 0, 0, 0],
            glyph_id_array: Vec::new(),
        };

        assert_eq!(format4.glyph_id(10), Some(1));
        assert_eq!(format4.glyph_id(20), Some(11));
        assert_eq!(format4.glyph_id(25), None);
        assert_eq!(format4.glyph_id(30), Some(12));
        assert_eq!(format4.glyph_id(90), Some(72));
        assert_eq!(format4.glyph_id(0xFFFF), None);
        assert_eq!(format4.glyph_id(0x10000), None);
    }

    #[test]
    fn test_cmap_subtable_format4_codepoint_to_glyph_id_with_range_offset() {
        let format4 = Format4 {
            end_code: vec![12, 0xFFFF],
            start_code: vec![10, 0xFFFF],
            id_delta: vec![0, 1],
            id_range_offset: vec![4, 0],
            glyph_id_array: vec![
                0x00, 0x01, // glyph_id_array 0: 1
                0x00, 0x00, // glyph_id_array 1: missing glyph
                0x00, 0x03, // glyph_id_array 2: 3
            ],
        };

        assert_eq!(format4.glyph_id(0), None);
        assert_eq!(format4.glyph_id(10), Some(1));
        assert_eq!(format4.glyph_id(11), None);
        assert_eq!(format4.glyph_id(12), Some(3));
        assert_eq!(format4.glyph_id(13), None);
        assert_eq!(format4.mappings(), vec![(10, 1), (12, 3)]);
    }

    #[test]
    fn test_cmap_subtable_format4_symbol_range_wraps_around() {
        // symbol fonts map their glyphs into the private use area starting at 0xF020
        let data = test_font::cmap_format4_subtable(&[(0xF020, 0xF022, 3)]);
        let format4 = Format4::unpack(&mut Cursor::new(&data[4..])).unwrap();

        assert_eq!(
            format4.mappings(),
            vec![(0xF020, 3), (0xF021, 4), (0xF022, 5)]
        );
    }
}
