//! Reconciliation of a single folder with its album.

use std::path::Path;

use super::error::SyncError;
use super::resolve::resolve_folder;
use super::{album_name, FolderAction, ProcessingResult, SyncConfig};
use crate::immich::AssetDirectory;
use crate::state::AlbumStateStore;

/// Bring one folder's album up to date with the files directly inside it.
///
/// - Bound folder with `skip_existing`: returns at once, no remote calls.
/// - Dry run: resolves assets and reports counts, changes nothing.
/// - Bound folder: appends the resolved assets to the recorded album.
/// - Unbound folder: creates an album named after the folder and records its
///   id. The marker is written only after the album exists.
///
/// Any failed remote call aborts the folder with an error; nothing is
/// recorded for it. So does a marker that exists but cannot be read.
pub async fn reconcile_folder(
    directory: &dyn AssetDirectory,
    store: &dyn AlbumStateStore,
    folder: &Path,
    config: &SyncConfig,
) -> Result<ProcessingResult, SyncError> {
    let album = album_name(folder);
    let bound_album = store
        .read(folder)
        .await
        .map_err(|source| SyncError::ReadMarker {
            folder: folder.to_path_buf(),
            source,
        })?;

    match &bound_album {
        Some(album_id) => {
            tracing::debug!("Album {} exists with id {}", album, album_id);
            if config.skip_existing {
                tracing::info!("Skipping existing album {}", album);
                return Ok(ProcessingResult {
                    folder: folder.to_path_buf(),
                    album_name: album,
                    added: 0,
                    missing: 0,
                    missing_paths: Vec::new(),
                    action: FolderAction::SkippedExisting {
                        album_id: album_id.clone(),
                    },
                });
            }
        }
        None => tracing::debug!("Album {} does not exist", album),
    }

    let assets = resolve_folder(directory, store, folder, &config.rewrite).await?;

    let action = if config.dry_run {
        match &bound_album {
            Some(album_id) => tracing::info!(
                "DRY RUN: would add {} assets to album {} ({})",
                assets.resolved.len(),
                album,
                album_id
            ),
            None => tracing::info!(
                "DRY RUN: would create album {} with {} assets",
                album,
                assets.resolved.len()
            ),
        }
        tracing::debug!(asset_ids = ?assets.resolved, "DRY RUN: resolved assets");
        FolderAction::DryRun {
            album_id: bound_album,
        }
    } else if let Some(album_id) = bound_album {
        tracing::debug!("Adding {} assets to album {}", assets.resolved.len(), album_id);
        directory
            .add_assets_to_album(&album_id, &assets.resolved)
            .await
            .map_err(|source| SyncError::AddAssets {
                album_id: album_id.clone(),
                count: assets.resolved.len(),
                source,
            })?;
        FolderAction::Extended { album_id }
    } else {
        let album_id = directory
            .create_album(&album, &assets.resolved)
            .await
            .map_err(|source| SyncError::CreateAlbum {
                album: album.clone(),
                source,
            })?;
        tracing::debug!("Creating marker for album {}", album);
        store
            .write(folder, &album_id)
            .await
            .map_err(|source| SyncError::RecordAlbum {
                album_id: album_id.clone(),
                added: assets.resolved.len(),
                source,
            })?;
        FolderAction::Created { album_id }
    };

    Ok(ProcessingResult {
        folder: folder.to_path_buf(),
        album_name: album,
        added: assets.resolved.len(),
        missing: assets.missing.len(),
        missing_paths: assets.missing,
        action,
    })
}
