//! Error types for the album marker store.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or recording an album binding.
///
/// A missing marker is not an error; it means "no album yet".
#[derive(Error, Debug)]
pub enum StateError {
    /// The marker exists but could not be read or is not valid UTF-8.
    #[error("Failed to read album marker {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Writing or renaming the marker file failed.
    #[error("Failed to write album marker {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An empty id would read back as "no binding".
    #[error("Refusing to record an empty album id in {0}")]
    EmptyAlbumId(PathBuf),
}
