use std::io;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error accessing {}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("Error interpreting encoding file {}", path.display())]
    Encoding {
        path: PathBuf,
        source: fontenc::Error,
    },
    #[error("Error parsing font {}", path.display())]
    Font { path: PathBuf, source: io::Error },
    #[error("Error writing JSON to {}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid font search pattern")]
    Pattern(#[from] glob::PatternError),
    #[error("Error searching for fonts")]
    Glob(#[from] glob::GlobError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Error::Io { path, source }
    }
}
