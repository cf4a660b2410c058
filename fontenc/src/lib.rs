//! Reads the PostScript encoding vectors used by TeX fonts (e.g. `dvips-all.enc`) and relates
//! them to Unicode.
//!
//! An encoding file is first split into [`Token`]s, which are then executed by a small stack
//! [`Machine`] that understands just enough PostScript to collect, for every encoding name, the
//! list of 256 glyph names. Together with the glyphs of an outline font ([`GlyphSource`]), these
//! lists are turned into [`CodepointTables`] that map each code point of a font to Unicode.
//!
//! ```
//! let encodings = fontenc::interpret("/cmr10 [ /.notdef 2 { /A } repeat /B ] def").unwrap();
//! assert_eq!(encodings["cmr10"], vec![".notdef", "A", "A", "B"]);
//! ```

mod builder;
mod error;
mod machine;
#[cfg(feature = "otf")]
mod opentype;
mod token;

pub use builder::{build_codepoint_table, CodepointTable, CodepointTables, GlyphRecord, GlyphSource};
pub use error::{Error, Malformed};
pub use machine::{interpret, Encodings, Machine, Operand};
pub use token::{tokenize, Token, Tokenizer};
