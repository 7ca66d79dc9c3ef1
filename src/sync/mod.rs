//! Album sync engine — walks a folder tree and reconciles each folder with
//! one Immich album, one folder at a time.
//!
//! A folder's files are looked up on the server by their rewritten original
//! path. Unbound folders get a new album named after the folder; folders
//! that already carry a marker have their assets appended to it. Failures
//! are confined to the folder they happen in: the walk logs them and moves
//! on, and the caller turns them into a non-zero exit status.

pub mod error;
pub mod reconcile;
pub mod resolve;
#[cfg(test)]
pub(crate) mod testing;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::Instrument;

use crate::immich::AssetDirectory;
use crate::state::AlbumStateStore;

pub use error::SyncError;
pub use reconcile::reconcile_folder;
pub use resolve::PathRewrite;

/// Subset of application config consumed by the sync engine.
/// Decoupled from CLI parsing so the engine can be tested independently.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub(crate) rewrite: PathRewrite,
    pub(crate) recursive: bool,
    pub(crate) dry_run: bool,
    /// Names of subfolders not to descend into. Matched against the folder
    /// name only, never the full path.
    pub(crate) skip: HashSet<String>,
    pub(crate) skip_existing: bool,
}

/// What happened to a folder's album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderAction {
    Created { album_id: String },
    Extended { album_id: String },
    SkippedExisting { album_id: String },
    /// Nothing was changed; `album_id` is the binding that would be extended.
    DryRun { album_id: Option<String> },
    Failed { error: String, transient: bool },
}

/// Per-folder summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingResult {
    pub folder: PathBuf,
    pub album_name: String,
    /// Assets sent to the album (or that would be, in a dry run).
    pub added: usize,
    pub missing: usize,
    /// Rewritten paths with no matching asset, in enumeration order.
    pub missing_paths: Vec<String>,
    pub action: FolderAction,
}

impl ProcessingResult {
    fn failed(folder: &Path, error: &SyncError) -> Self {
        Self {
            folder: folder.to_path_buf(),
            album_name: album_name(folder),
            added: error.assets_added(),
            missing: 0,
            missing_paths: Vec::new(),
            action: FolderAction::Failed {
                error: error.to_string(),
                transient: error.is_transient(),
            },
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.action, FolderAction::Failed { .. })
    }
}

/// Album name for a folder: its last path component.
pub(crate) fn album_name(folder: &Path) -> String {
    match folder.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => folder.display().to_string(),
    }
}

/// Immediate subdirectories of `folder`, sorted by name. Symlinked
/// directories are not followed.
async fn list_subfolders(folder: &Path) -> Result<Vec<PathBuf>, SyncError> {
    let list_err = |source| SyncError::ListFolder {
        path: folder.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(folder).await.map_err(list_err)?;
    let mut dirs = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(list_err)? {
        if entry.file_type().await.map_err(list_err)?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Reconcile `root`, and with `recursive` every folder below it, returning
/// one result per visited folder in visit order.
///
/// Folders are visited depth-first, parent before children, siblings in
/// name order. `root` itself is always processed; subfolders whose name is
/// in `config.skip` are pruned together with everything below them. A
/// folder that fails is reported as [`FolderAction::Failed`] and the walk
/// continues with the next one.
pub async fn sync_albums(
    directory: &dyn AssetDirectory,
    store: &dyn AlbumStateStore,
    root: &Path,
    config: &SyncConfig,
) -> Vec<ProcessingResult> {
    let mut results = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(folder) = pending.pop() {
        let span = tracing::info_span!("folder", album = %album_name(&folder));

        if config.recursive {
            match list_subfolders(&folder).await {
                Ok(children) => {
                    // Reversed so the stack pops them in name order.
                    for child in children.into_iter().rev() {
                        if config.skip.contains(&album_name(&child)) {
                            tracing::info!("Skipping folder: {}", child.display());
                        } else {
                            pending.push(child);
                        }
                    }
                }
                Err(e) => {
                    span.in_scope(|| tracing::error!("{}", e));
                    results.push(ProcessingResult::failed(&folder, &e));
                    continue;
                }
            }
        }

        let result = async {
            tracing::info!("Processing folder: {}", folder.display());
            match reconcile_folder(directory, store, &folder, config).await {
                Ok(result) => {
                    log_result(&result);
                    result
                }
                Err(e) => {
                    tracing::error!(transient = e.is_transient(), "{}", e);
                    ProcessingResult::failed(&folder, &e)
                }
            }
        }
        .instrument(span)
        .await;
        results.push(result);
    }

    results
}

fn log_result(result: &ProcessingResult) {
    match &result.action {
        FolderAction::Created { album_id } => tracing::info!(
            "Created album {} ({}) with {} files, {} missing",
            result.album_name,
            album_id,
            result.added,
            result.missing
        ),
        FolderAction::Extended { album_id } => tracing::info!(
            "Added {} files to album {} ({}), {} missing",
            result.added,
            result.album_name,
            album_id,
            result.missing
        ),
        FolderAction::DryRun { .. } => tracing::info!(
            "DRY RUN: album {} has {} files, {} missing",
            result.album_name,
            result.added,
            result.missing
        ),
        FolderAction::SkippedExisting { .. } | FolderAction::Failed { .. } => {}
    }
    if !result.missing_paths.is_empty() {
        tracing::debug!(missing = ?result.missing_paths, "Files not found on the server");
    }
}

/// Totals over a walk.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub folders: usize,
    pub created: usize,
    pub extended: usize,
    pub skipped: usize,
    pub failed: usize,
    pub added: usize,
    pub missing: usize,
}

impl SyncSummary {
    /// Dry-run results count as the action they would have taken.
    pub fn from_results(results: &[ProcessingResult]) -> Self {
        let mut summary = Self {
            folders: results.len(),
            ..Self::default()
        };
        for result in results {
            match &result.action {
                FolderAction::Created { .. } | FolderAction::DryRun { album_id: None } => {
                    summary.created += 1
                }
                FolderAction::Extended { .. } | FolderAction::DryRun { album_id: Some(_) } => {
                    summary.extended += 1
                }
                FolderAction::SkippedExisting { .. } => summary.skipped += 1,
                FolderAction::Failed { .. } => summary.failed += 1,
            }
            summary.added += result.added;
            summary.missing += result.missing;
        }
        summary
    }

    pub fn log(&self, dry_run: bool) {
        if dry_run {
            tracing::info!("── Dry Run Summary ──");
            tracing::info!(
                "  {} albums would be created, {} extended",
                self.created,
                self.extended
            );
        } else {
            tracing::info!("── Summary ──");
            tracing::info!("  {} albums created, {} extended", self.created, self.extended);
        }
        tracing::info!(
            "  {} folders, {} skipped, {} failed",
            self.folders,
            self.skipped,
            self.failed
        );
        tracing::info!("  {} files matched, {} missing", self.added, self.missing);
    }
}
