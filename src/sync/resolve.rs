//! Folder resolution: map the files directly inside one folder to Immich
//! asset ids by their original path as the server recorded it.

use std::path::{Path, PathBuf};

use tokio::fs;

use super::error::SyncError;
use crate::immich::AssetDirectory;
use crate::state::AlbumStateStore;

/// Rewrites a local path into the path the Immich server recorded for the
/// same file, e.g. `/home/me/Pictures` → `/mnt/media/pictures`.
///
/// Only the first occurrence of the local prefix is replaced. A path that
/// does not contain it is passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRewrite {
    original: String,
    replacement: String,
}

impl PathRewrite {
    pub fn new(original: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            replacement: replacement.into(),
        }
    }

    pub fn apply(&self, local_path: &str) -> String {
        local_path.replacen(&self.original, &self.replacement, 1)
    }
}

/// Resolution outcome for one folder. Both lists keep enumeration order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FolderAssets {
    /// Asset ids of files found on the server.
    pub resolved: Vec<String>,
    /// Rewritten paths with no matching asset.
    pub missing: Vec<String>,
}

/// List the regular files directly inside `folder`, sorted by name.
///
/// Symlinks to files count as files; subdirectories, symlinks to
/// directories, dangling links and the state store's own marker files do
/// not.
pub(crate) async fn list_media_files(
    folder: &Path,
    store: &dyn AlbumStateStore,
) -> Result<Vec<PathBuf>, SyncError> {
    let list_err = |source| SyncError::ListFolder {
        path: folder.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(folder).await.map_err(list_err)?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(list_err)? {
        if store.is_state_file(&entry.file_name()) {
            continue;
        }
        let path = entry.path();
        let file_type = entry.file_type().await.map_err(list_err)?;
        let is_file = if file_type.is_symlink() {
            match fs::metadata(&path).await {
                Ok(meta) => meta.is_file(),
                Err(e) => {
                    tracing::debug!(path = %path.display(), "Skipping dangling symlink: {}", e);
                    false
                }
            }
        } else {
            file_type.is_file()
        };
        if is_file {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Look up every file of `folder` on the server.
///
/// Stops at the first failed lookup: a partial asset list would make the
/// album silently incomplete.
pub async fn resolve_folder(
    directory: &dyn AssetDirectory,
    store: &dyn AlbumStateStore,
    folder: &Path,
    rewrite: &PathRewrite,
) -> Result<FolderAssets, SyncError> {
    let files = list_media_files(folder, store).await?;
    let mut assets = FolderAssets::default();

    for file in files {
        let local = file.to_string_lossy();
        let remote_path = rewrite.apply(&local);
        tracing::debug!("Searching for: {}", remote_path);

        match directory.resolve_asset_by_path(&remote_path).await {
            Ok(Some(asset_id)) => {
                tracing::debug!("File {} is {}", remote_path, asset_id);
                assets.resolved.push(asset_id);
            }
            Ok(None) => {
                tracing::info!("File {} is missing", remote_path);
                assets.missing.push(remote_path);
            }
            Err(source) => {
                return Err(SyncError::ResolveAsset {
                    path: remote_path,
                    source,
                });
            }
        }
    }

    Ok(assets)
}
