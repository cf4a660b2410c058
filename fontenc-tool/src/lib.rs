//! The pipeline behind the `fontenc` command: interpret an encoding file, find the OpenType fonts
//! it has entries for, and build their codepoint tables.

mod error;
mod pipeline;

pub use error::Error;
pub use pipeline::{
    build, build_tables, dump, find_fonts, read_encodings, write_json, BuildOptions,
};
