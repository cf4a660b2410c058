use otf::{Glyph, OpenTypeFont};

use crate::builder::{GlyphRecord, GlyphSource};

impl GlyphSource for OpenTypeFont {
    fn glyph_records(&self) -> Vec<GlyphRecord> {
        named_glyphs(self.glyphs())
    }
}

fn named_glyphs(glyphs: Vec<Glyph>) -> Vec<GlyphRecord> {
    glyphs
        .into_iter()
        .filter_map(|glyph| {
            let name = glyph.name?;
            Some(GlyphRecord::new(name, glyph.code_points))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_unnamed_glyphs_are_dropped() {
        let glyphs = vec![
            Glyph {
                index: 0,
                name: Some(".notdef".to_string()),
                code_points: vec![],
            },
            Glyph {
                index: 1,
                name: None,
                code_points: vec![0x41],
            },
            Glyph {
                index: 2,
                name: Some("ff".to_string()),
                code_points: vec![0x0B, 0xFB00],
            },
        ];

        assert_eq!(
            named_glyphs(glyphs),
            vec![
                GlyphRecord::new(".notdef", vec![]),
                GlyphRecord::new("ff", vec![0x0B, 0xFB00]),
            ]
        );
    }
}
