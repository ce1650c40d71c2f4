//! Error types for the library layer.

use std::path::PathBuf;

/// Fatal errors of a pipeline run. Any of these aborts the build, since
/// catalogs built from partial input cannot be trusted.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// An input file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// An input file is not valid JSON or does not have the expected shape.
    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// A CSV catalog could not be decoded.
    #[error("failed to parse {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },
    /// A generated table could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A built-in text pattern failed to compile.
    #[error("pattern compile error: {0}")]
    Pattern(#[from] regex::Error),
}
