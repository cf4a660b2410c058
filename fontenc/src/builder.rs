use std::collections::{btree_map, BTreeMap, BTreeSet};

use serde::Serialize;

use crate::machine::Encodings;

/// Maps code points of a font (indices into its encoding) to Unicode scalar values.
pub type CodepointTable = BTreeMap<usize, u32>;

/// A glyph of an outline font together with every Unicode code point the font maps to it.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct GlyphRecord {
    pub name: String,
    pub unicode: BTreeSet<u32>,
}

impl GlyphRecord {
    pub fn new<S, I>(name: S, unicode: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = u32>,
    {
        GlyphRecord {
            name: name.into(),
            unicode: unicode.into_iter().collect(),
        }
    }

    /// The Unicode value used for the glyph, which is the largest of its candidates. `None` if the
    /// glyph is not mapped to Unicode at all.
    pub fn resolved_unicode(&self) -> Option<u32> {
        self.unicode.iter().next_back().copied()
    }
}

/// Something that can list the named glyphs of a font.
pub trait GlyphSource {
    fn glyph_records(&self) -> Vec<GlyphRecord>;
}

impl GlyphSource for [GlyphRecord] {
    fn glyph_records(&self) -> Vec<GlyphRecord> {
        self.to_vec()
    }
}

impl GlyphSource for Vec<GlyphRecord> {
    fn glyph_records(&self) -> Vec<GlyphRecord> {
        self.clone()
    }
}

/// Resolves the Unicode value of every glyph in `glyph_names` that has a record in `records`.
///
/// Glyph names are matched to their first position in the encoding. If two records end up at the
/// same position, the later one wins.
pub fn build_codepoint_table(glyph_names: &[String], records: &[GlyphRecord]) -> CodepointTable {
    let mut table = CodepointTable::new();
    for record in records {
        let unicode = match record.resolved_unicode() {
            Some(unicode) => unicode,
            None => continue,
        };

        match glyph_names.iter().position(|name| *name == record.name) {
            Some(code_point) => {
                table.insert(code_point, unicode);
            }
            None => log::trace!("Glyph {} is not part of the encoding", record.name),
        }
    }
    table
}

/// The codepoint tables of all processed fonts, keyed by base font name.
///
/// Serializes as a JSON object of font names to `{ "<code point>": <unicode> }` objects.
#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CodepointTables {
    tables: BTreeMap<String, CodepointTable>,
    #[serde(skip)]
    font_names: Vec<String>,
}

impl CodepointTables {
    pub fn new() -> Self {
        CodepointTables::default()
    }

    /// Builds and stores the table of `base_name` from its records. Returns `false` without doing
    /// anything if `encodings` has no entry for the font.
    ///
    /// Inserting a font a second time replaces its table but keeps its original position in
    /// [`CodepointTables::font_names`].
    pub fn insert_font(
        &mut self,
        encodings: &Encodings,
        base_name: &str,
        records: &[GlyphRecord],
    ) -> bool {
        let glyph_names = match encodings.get(base_name) {
            Some(glyph_names) => glyph_names,
            None => {
                log::debug!("No encoding for font {}, skipping", base_name);
                return false;
            }
        };

        let table = build_codepoint_table(glyph_names, records);
        log::debug!(
            "Resolved {} of {} code points for font {}",
            table.len(),
            glyph_names.len(),
            base_name
        );

        if self.tables.insert(base_name.to_string(), table).is_none() {
            self.font_names.push(base_name.to_string());
        }
        true
    }

    pub fn insert_source<S>(&mut self, encodings: &Encodings, base_name: &str, source: &S) -> bool
    where
        S: GlyphSource + ?Sized,
    {
        if !encodings.contains_key(base_name) {
            return false;
        }
        self.insert_font(encodings, base_name, &source.glyph_records())
    }

    pub fn get(&self, base_name: &str) -> Option<&CodepointTable> {
        self.tables.get(base_name)
    }

    /// Names of all fonts with a table, in the order they were first inserted.
    pub fn font_names(&self) -> &[String] {
        &self.font_names
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, CodepointTable> {
        self.tables.iter()
    }
}

impl<'a> IntoIterator for &'a CodepointTables {
    type Item = (&'a String, &'a CodepointTable);
    type IntoIter = btree_map::Iter<'a, String, CodepointTable>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.iter()
    }
}
