//! Errors raised while reading or writing data files.

use std::path::PathBuf;

use bateman_core::error::DataError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("{}: {source}", path.display())] Io { path: PathBuf, #[source] source: std::io::Error },
    #[error(transparent)] Csv(#[from] csv::Error),
    #[error(transparent)] Json(#[from] serde_json::Error),
    #[error(transparent)] Data(#[from] DataError),
}

impl FileError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
