//! Builders for tiny synthetic font binaries used throughout the unit tests.

use byteorder::{BigEndian, WriteBytesExt};

pub struct FontBuilder {
    sfnt_version: u32,
    tables: Vec<(String, Vec<u8>)>,
}

impl FontBuilder {
    pub fn new(sfnt_version: u32) -> Self {
        FontBuilder {
            sfnt_version,
            tables: Vec::new(),
        }
    }

    pub fn table(mut self, tag: &str, data: Vec<u8>) -> Self {
        self.tables.push((tag.to_string(), data));
        self
    }

    pub fn build(mut self) -> Vec<u8> {
        self.tables.sort_by(|a, b| a.0.cmp(&b.0));

        let mut out = Vec::new();
        out.write_u32::<BigEndian>(self.sfnt_version).unwrap();
        out.write_u16::<BigEndian>(self.tables.len() as u16).unwrap();
        out.extend_from_slice(&[0; 6]); // search_range, entry_selector, range_shift

        let mut offset = 12 + 16 * self.tables.len();
        for (tag, data) in &self.tables {
            out.extend_from_slice(tag.as_bytes());
            out.write_u32::<BigEndian>(0).unwrap(); // check_sum
            out.write_u32::<BigEndian>(offset as u32).unwrap();
            out.write_u32::<BigEndian>(data.len() as u32).unwrap();
            offset += padded_len(data.len());
        }

        for (_, data) in &self.tables {
            out.extend_from_slice(data);
            out.resize(out.len() + padded_len(data.len()) - data.len(), 0);
        }

        out
    }
}

fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

pub fn maxp(num_glyphs: u16) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u32::<BigEndian>(0x00005000).unwrap();
    out.write_u16::<BigEndian>(num_glyphs).unwrap();
    out
}

/// A `cmap` table with the given `(platform_id, encoding_id, subtable index)` records.
pub fn cmap(records: &[(u16, u16, usize)], subtables: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u16::<BigEndian>(0).unwrap();
    out.write_u16::<BigEndian>(records.len() as u16).unwrap();

    let mut offsets = Vec::with_capacity(subtables.len());
    let mut offset = 4 + 8 * records.len();
    for subtable in subtables {
        offsets.push(offset);
        offset += subtable.len();
    }

    for (platform_id, encoding_id, ix) in records {
        out.write_u16::<BigEndian>(*platform_id).unwrap();
        out.write_u16::<BigEndian>(*encoding_id).unwrap();
        out.write_u32::<BigEndian>(offsets[*ix] as u32).unwrap();
    }
    for subtable in subtables {
        out.extend_from_slice(subtable);
    }
    out
}

/// A `cmap` table where all `encodings` share one format 4 subtable built from `segments`.
pub fn cmap_format4(segments: &[(u16, u16, u16)], encodings: &[(u16, u16)]) -> Vec<u8> {
    let records = encodings
        .iter()
        .map(|(platform_id, encoding_id)| (*platform_id, *encoding_id, 0))
        .collect::<Vec<_>>();
    cmap(&records, &[cmap_format4_subtable(segments)])
}

/// A format 4 subtable of `(start code, end code, first glyph id)` segments, all mapped through
/// `id_delta`.
pub fn cmap_format4_subtable(segments: &[(u16, u16, u16)]) -> Vec<u8> {
    let mut segments = segments.to_vec();
    segments.push((0xFFFF, 0xFFFF, 0));
    let seg_count = segments.len() as u16;

    let mut out = Vec::new();
    out.write_u16::<BigEndian>(4).unwrap();
    out.write_u16::<BigEndian>(16 + 8 * seg_count).unwrap();
    out.write_u16::<BigEndian>(0).unwrap(); // language
    out.write_u16::<BigEndian>(seg_count * 2).unwrap();
    out.extend_from_slice(&[0; 6]); // search_range, entry_selector, range_shift
    for (_, end, _) in &segments {
        out.write_u16::<BigEndian>(*end).unwrap();
    }
    out.write_u16::<BigEndian>(0).unwrap(); // reserved_pad
    for (start, _, _) in &segments {
        out.write_u16::<BigEndian>(*start).unwrap();
    }
    for (start, _, first) in &segments {
        let delta = if *start == 0xFFFF {
            1
        } else {
            first.wrapping_sub(*start)
        };
        out.write_u16::<BigEndian>(delta).unwrap();
    }
    for _ in &segments {
        out.write_u16::<BigEndian>(0).unwrap();
    }
    out
}

/// A format 12 subtable of `(start code, end code, first glyph id)` groups.
pub fn cmap_format12_subtable(groups: &[(u32, u32, u32)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u16::<BigEndian>(12).unwrap();
    out.write_u16::<BigEndian>(0).unwrap(); // reserved
    out.write_u32::<BigEndian>(16 + 12 * groups.len() as u32)
        .unwrap();
    out.write_u32::<BigEndian>(0).unwrap(); // language
    out.write_u32::<BigEndian>(groups.len() as u32).unwrap();
    for (start, end, first) in groups {
        out.write_u32::<BigEndian>(*start).unwrap();
        out.write_u32::<BigEndian>(*end).unwrap();
        out.write_u32::<BigEndian>(*first).unwrap();
    }
    out
}

fn post_header(version: u32) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u32::<BigEndian>(version).unwrap();
    out.extend_from_slice(&[0; 28]);
    out
}

pub fn post_v1() -> Vec<u8> {
    post_header(0x00010000)
}

pub fn post_v2(indices: &[u16], names: &[&str]) -> Vec<u8> {
    let mut out = post_header(0x00020000);
    out.write_u16::<BigEndian>(indices.len() as u16).unwrap();
    for ix in indices {
        out.write_u16::<BigEndian>(*ix).unwrap();
    }
    for name in names {
        out.push(name.len() as u8);
        out.extend_from_slice(name.as_bytes());
    }
    out
}

pub fn post_v3() -> Vec<u8> {
    post_header(0x00030000)
}

fn index(items: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u16::<BigEndian>(items.len() as u16).unwrap();
    if items.is_empty() {
        return out;
    }
    out.push(1); // off_size
    let mut offset = 1;
    out.push(offset);
    for item in items {
        offset += item.len() as u8;
        out.push(offset);
    }
    for item in items {
        out.extend_from_slice(item);
    }
    out
}

/// A bare `CFF ` table using a format 0 charset with the given SIDs for glyphs 1.., custom
/// `strings` are available starting at SID 391.
pub fn cff(sids: &[u16], strings: &[&str]) -> Vec<u8> {
    let header = [1u8, 0, 4, 1];
    let name_index = index(&[&b"Test"[..]]);
    let string_index = index(&strings.iter().map(|s| s.as_bytes()).collect::<Vec<_>>());
    let global_subr_index = index(&[]);

    // the top dict has a fixed size, since offsets are always encoded as 5 byte integers
    let top_dict_index_len = 2 + 1 + 2 + 12;
    let charset_offset = header.len()
        + name_index.len()
        + top_dict_index_len
        + string_index.len()
        + global_subr_index.len();
    let char_strings_offset = charset_offset + 1 + 2 * sids.len();

    let mut top_dict = Vec::new();
    top_dict.push(29);
    top_dict.write_i32::<BigEndian>(charset_offset as i32).unwrap();
    top_dict.push(15);
    top_dict.push(29);
    top_dict
        .write_i32::<BigEndian>(char_strings_offset as i32)
        .unwrap();
    top_dict.push(17);

    let mut charset = vec![0];
    for sid in sids {
        charset.write_u16::<BigEndian>(*sid).unwrap();
    }

    let endchar: &[u8] = &[14];
    let char_strings = index(&vec![endchar; sids.len() + 1]);

    let mut out = header.to_vec();
    out.extend(name_index);
    out.extend(index(&[&top_dict[..]]));
    out.extend(string_index);
    out.extend(global_subr_index);
    out.extend(charset);
    out.extend(char_strings);
    out
}
