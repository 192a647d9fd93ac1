use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Archive error on {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("Invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Classpath root does not exist: {0}")]
    MissingRoot(PathBuf),
    #[error("Resource is not part of this root: {0}")]
    UnknownResource(String),
    #[error("Failed to parse {resource}: {message}")]
    Parse { resource: String, message: String },
    #[error("Failed to resolve type {name}: {message}")]
    Resolution { name: String, message: String },
    #[error("Runtime error: {0}")]
    Runtime(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScanError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScanError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
