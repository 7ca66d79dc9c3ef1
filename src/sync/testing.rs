//! In-memory `AssetDirectory` for sync tests.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::immich::{AssetDirectory, ImmichError};
use crate::state::{AlbumStateStore, StateError, MARKER_FILE_NAME};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Resolve(String),
    Create { name: String, asset_ids: Vec<String> },
    Add { album_id: String, asset_ids: Vec<String> },
}

/// Serves assets from a path → id map and records every call.
#[derive(Default)]
pub(crate) struct FakeDirectory {
    pub(crate) assets: HashMap<String, String>,
    pub(crate) calls: Mutex<Vec<Call>>,
    pub(crate) next_album: AtomicU32,
    pub(crate) fail_resolve: bool,
    pub(crate) fail_create: bool,
    pub(crate) fail_add: bool,
}

impl FakeDirectory {
    pub(crate) fn with_assets<'a>(assets: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            assets: assets
                .into_iter()
                .map(|(path, id)| (path.to_string(), id.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn resolve_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Resolve(_)))
            .count()
    }

    pub(crate) fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Resolve(_)))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn unavailable(endpoint: &str) -> ImmichError {
        ImmichError::Status {
            status: 503,
            endpoint: endpoint.to_string(),
            body: "service unavailable".into(),
        }
    }
}

#[async_trait::async_trait]
impl AssetDirectory for FakeDirectory {
    async fn resolve_asset_by_path(
        &self,
        original_path: &str,
    ) -> Result<Option<String>, ImmichError> {
        self.record(Call::Resolve(original_path.to_string()));
        if self.fail_resolve {
            return Err(Self::unavailable("search/metadata"));
        }
        Ok(self.assets.get(original_path).cloned())
    }

    async fn create_album(&self, name: &str, asset_ids: &[String]) -> Result<String, ImmichError> {
        self.record(Call::Create {
            name: name.to_string(),
            asset_ids: asset_ids.to_vec(),
        });
        if self.fail_create {
            return Err(Self::unavailable("albums"));
        }
        let n = self.next_album.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("album-{n}"))
    }

    async fn add_assets_to_album(
        &self,
        album_id: &str,
        asset_ids: &[String],
    ) -> Result<(), ImmichError> {
        self.record(Call::Add {
            album_id: album_id.to_string(),
            asset_ids: asset_ids.to_vec(),
        });
        if self.fail_add {
            return Err(Self::unavailable("albums/assets"));
        }
        Ok(())
    }
}

/// Reads like an empty folder, refuses every write.
pub(crate) struct ReadOnlyStore;

#[async_trait::async_trait]
impl AlbumStateStore for ReadOnlyStore {
    async fn read(&self, _folder: &Path) -> Result<Option<String>, StateError> {
        Ok(None)
    }

    async fn write(&self, folder: &Path, _album_id: &str) -> Result<(), StateError> {
        Err(StateError::Write {
            path: folder.join(MARKER_FILE_NAME),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }

    fn is_state_file(&self, file_name: &OsStr) -> bool {
        file_name == MARKER_FILE_NAME
    }
}
