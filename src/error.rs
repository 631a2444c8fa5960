use std::path::PathBuf;
use thiserror::Error;

/// Failures of a single plotting invocation. None of them are recovered
/// locally; a failing input produces no images.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input line or token.
    #[error("format error in {context}: {message}")]
    Format { context: String, message: String },

    #[error("declarationNotFound: no fixedStep line within the first {lookahead} lines of {path:?}")]
    DeclarationNotFound { path: PathBuf, lookahead: usize },

    /// A categorical value with no colour assigned.
    #[error("unknown category label: {0}")]
    UnknownLabel(String),

    #[error("no recognized chromosomes in {path:?}")]
    EmptyResult { path: PathBuf },

    #[error("i/o error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image of {width}x{height} pixels exceeds the {limit} pixel limit")]
    TooLarge { width: u32, height: u32, limit: u64 },

    #[error("rendering failed: {0}")]
    Render(#[from] image::ImageError),

    #[error("invalid configuration {path:?}: {message}")]
    Config { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn format<C: Into<String>, M: Into<String>>(context: C, message: M) -> Self {
        Self::Format {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
