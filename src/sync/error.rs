use std::path::PathBuf;

use thiserror::Error;

use crate::immich::ImmichError;
use crate::state::StateError;

/// Why a single folder could not be reconciled.
///
/// Each variant carries the operation and identifiers involved so the walker
/// can log it and move on to the next folder.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The folder has a marker that could not be read, so its binding is
    /// unknown and nothing may be created for it.
    #[error("Cannot tell which album {folder} belongs to: {source}")]
    ReadMarker { folder: PathBuf, source: StateError },

    #[error("Failed to list {path}: {source}")]
    ListFolder {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to look up asset {path}: {source}")]
    ResolveAsset { path: String, source: ImmichError },

    #[error("Failed to create album '{album}': {source}")]
    CreateAlbum { album: String, source: ImmichError },

    #[error("Failed to add {count} assets to album {album_id}: {source}")]
    AddAssets {
        album_id: String,
        count: usize,
        source: ImmichError,
    },

    /// The album exists remotely but its marker could not be written; the
    /// next run would create a second album unless the marker is restored.
    #[error("Album {album_id} was created with {added} assets but its marker could not be saved: {source}")]
    RecordAlbum {
        album_id: String,
        added: usize,
        source: StateError,
    },
}

impl SyncError {
    /// Whether the underlying cause looks temporary, so rerunning the same
    /// command later is likely to succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            SyncError::ResolveAsset { source, .. }
            | SyncError::CreateAlbum { source, .. }
            | SyncError::AddAssets { source, .. } => source.is_transient(),
            SyncError::ReadMarker { .. }
            | SyncError::ListFolder { .. }
            | SyncError::RecordAlbum { .. } => false,
        }
    }

    /// Assets that did land in an album before the folder failed.
    pub fn assets_added(&self) -> usize {
        match self {
            SyncError::RecordAlbum { added, .. } => *added,
            _ => 0,
        }
    }
}
