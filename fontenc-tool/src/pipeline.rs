use std::path::{Path, PathBuf};

use async_std::{fs, task};
use fontenc::{CodepointTables, Encodings, GlyphRecord, GlyphSource};
use futures_util::future::join_all;
use otf::OpenTypeFont;
use serde::Serialize;

use crate::error::Error;

/// Inputs of a `build` run.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// The encoding file, e.g. `dvips-all.enc`.
    pub encoding: PathBuf,
    /// Directory of the extracted font archive.
    pub fonts: PathBuf,
    /// Directory of additional fonts that replace archive fonts of the same name. Ignored if it
    /// does not exist.
    pub overrides: Option<PathBuf>,
}

pub async fn read_encodings(path: &Path) -> Result<Encodings, Error> {
    let source = fs::read_to_string(path).await.map_err(Error::io(path))?;
    fontenc::interpret(&source).map_err(|source| Error::Encoding {
        path: path.to_path_buf(),
        source,
    })
}

/// Interprets an encoding file and renders the result as pretty printed JSON.
pub async fn dump(path: &Path) -> Result<String, Error> {
    let encodings = read_encodings(path).await?;
    serde_json::to_string_pretty(&encodings).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// All `.otf` files below `dir` (recursively), in alphabetical order.
pub fn find_fonts(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let pattern = format!("{}/**/*.otf", glob::Pattern::escape(&dir.to_string_lossy()));
    let mut fonts = Vec::new();
    for entry in glob::glob(&pattern)? {
        fonts.push(entry?);
    }
    Ok(fonts)
}

fn base_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
}

async fn load_glyph_records(path: PathBuf) -> Result<Vec<GlyphRecord>, Error> {
    let data = fs::read(path.as_path()).await.map_err(Error::io(&path))?;
    let font = OpenTypeFont::from_slice(&data).map_err(|source| Error::Font {
        path: path.clone(),
        source,
    })?;
    Ok(font.glyph_records())
}

async fn font_dirs(opts: &BuildOptions) -> Result<Vec<PathBuf>, Error> {
    fs::metadata(opts.fonts.as_path())
        .await
        .map_err(Error::io(&opts.fonts))?;
    let mut dirs = vec![opts.fonts.clone()];

    if let Some(overrides) = &opts.overrides {
        match fs::metadata(overrides.as_path()).await {
            Ok(meta) if meta.is_dir() => dirs.push(overrides.clone()),
            _ => log::debug!("No override directory at {}", overrides.display()),
        }
    }

    Ok(dirs)
}

/// Builds the codepoint tables of all fonts that have an entry in `encodings`.
///
/// Fonts are read and parsed concurrently, but inserted in the order they were found, so that a
/// font of a later directory replaces the one of the same name from an earlier directory. Fonts
/// that cannot be parsed are skipped.
pub async fn build_tables(
    encodings: &Encodings,
    font_dirs: &[PathBuf],
) -> Result<CodepointTables, Error> {
    let mut fonts = Vec::new();
    for dir in font_dirs {
        for path in find_fonts(dir)? {
            match base_name(&path) {
                Some(name) if encodings.contains_key(&name) => fonts.push((name, path)),
                _ => log::debug!("Skipping {} (no encoding)", path.display()),
            }
        }
    }

    let tasks = fonts
        .iter()
        .map(|(name, path)| {
            log::info!("Processing {}...", name);
            task::spawn(load_glyph_records(path.clone()))
        })
        .collect::<Vec<_>>();
    let results = join_all(tasks).await;

    let mut tables = CodepointTables::new();
    for ((name, _), result) in fonts.iter().zip(results) {
        match result {
            Ok(records) => {
                tables.insert_font(encodings, name, &records);
            }
            Err(Error::Font { path, source }) => {
                log::warn!("Skipping font {}: {}", path.display(), source);
            }
            Err(err) => return Err(err),
        }
    }

    log::info!("Processed {} fonts.", tables.len());
    Ok(tables)
}

pub async fn build(opts: &BuildOptions) -> Result<CodepointTables, Error> {
    let encodings = read_encodings(&opts.encoding).await?;
    let dirs = font_dirs(opts).await?;
    build_tables(&encodings, &dirs).await
}

/// Writes `value` as compact JSON to `path`.
pub async fn write_json<T>(path: &Path, value: &T) -> Result<(), Error>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string(value).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).await.map_err(Error::io(path))
}
