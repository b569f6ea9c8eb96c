use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read slice file {path}: {source}")]
    ReadSlice { path: PathBuf, source: std::io::Error },

    #[error("failed to write generated file {path}: {source}")]
    WriteGenerated { path: PathBuf, source: std::io::Error },

    #[error("failed to create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: std::io::Error },
}

pub type Result<T> = std::result::Result<T, Error>;
