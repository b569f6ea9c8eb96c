use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },

    #[error("failed to create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: std::io::Error },

    #[error("failed to spawn compiler: {0}")]
    Spawn(std::io::Error),

    #[error(transparent)]
    Index(#[from] javastub_index::Error),

    #[error(transparent)]
    Collect(#[from] javastub_collect::Error),

    #[error(transparent)]
    Materialize(#[from] javastub_materialize::Error),

    #[error(transparent)]
    Classfile(#[from] javastub_classfile::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
