//! @ai:module:intent Define error types for the provider audit
//! @ai:module:layer domain
//! @ai:module:public_api Error, Result
//! @ai:module:stateless true

use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Unified error type for every run-aborting failure
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load the Go grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),

    #[error("Failed to parse {0}")]
    Unparsable(PathBuf),

    #[error("Unexpected provider registration in {file}:{line}: {message}")]
    Registration {
        file: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Duplicate {kind} {name:?} in {file}:{line}")]
    DuplicateEntry {
        file: PathBuf,
        line: usize,
        kind: String,
        name: String,
    },

    #[error("Invalid configuration {path}: {message}")]
    Config { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
