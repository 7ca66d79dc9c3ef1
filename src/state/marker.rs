//! Album marker trait and the plain-file implementation.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::error::StateError;

/// Name of the marker file written into every folder that has an album.
pub const MARKER_FILE_NAME: &str = ".album";

/// Suffix of the scratch file a marker is written to before being renamed
/// into place.
const PART_SUFFIX: &str = ".part";

/// Storage for folder → album bindings.
///
/// Object-safe so the sync engine can take `&dyn AlbumStateStore`.
#[async_trait]
pub trait AlbumStateStore: Send + Sync {
    /// Album id previously recorded for `folder`, if any.
    ///
    /// A missing marker is the normal state of a folder that was never
    /// synced, so this returns `Ok(None)`. A marker that exists but cannot be
    /// read is an error: treating it as absent would bind the folder to a
    /// second album.
    async fn read(&self, folder: &Path) -> Result<Option<String>, StateError>;

    /// Record `album_id` as the binding for `folder`, replacing any existing
    /// marker.
    async fn write(&self, folder: &Path, album_id: &str) -> Result<(), StateError>;

    /// Whether a directory entry is this store's own bookkeeping and must not
    /// be treated as a media file.
    fn is_state_file(&self, file_name: &OsStr) -> bool;
}

/// Keeps each binding in a `.album` file inside the folder itself, holding
/// the bare album id with no trailing newline.
#[derive(Debug, Clone)]
pub struct MarkerFileStore {
    file_name: String,
}

impl Default for MarkerFileStore {
    fn default() -> Self {
        Self {
            file_name: MARKER_FILE_NAME.to_string(),
        }
    }
}

impl MarkerFileStore {
    pub fn marker_path(&self, folder: &Path) -> PathBuf {
        folder.join(&self.file_name)
    }

    fn part_path(&self, folder: &Path) -> PathBuf {
        folder.join(format!("{}{}", self.file_name, PART_SUFFIX))
    }
}

#[async_trait]
impl AlbumStateStore for MarkerFileStore {
    async fn read(&self, folder: &Path) -> Result<Option<String>, StateError> {
        let path = self.marker_path(folder);
        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StateError::Read { path, source }),
        };

        let id = contents.trim();
        if id.is_empty() {
            tracing::warn!(path = %path.display(), "Ignoring empty album marker");
            return Ok(None);
        }
        Ok(Some(id.to_string()))
    }

    async fn write(&self, folder: &Path, album_id: &str) -> Result<(), StateError> {
        if album_id.trim().is_empty() {
            return Err(StateError::EmptyAlbumId(folder.to_path_buf()));
        }

        let path = self.marker_path(folder);
        let part_path = self.part_path(folder);

        // Write to a scratch file and rename so a crash mid-write never
        // leaves a truncated id behind.
        if let Err(source) = fs::write(&part_path, album_id).await {
            let _ = fs::remove_file(&part_path).await;
            return Err(StateError::Write {
                path: part_path,
                source,
            });
        }
        if let Err(source) = fs::rename(&part_path, &path).await {
            let _ = fs::remove_file(&part_path).await;
            return Err(StateError::Write { path, source });
        }

        tracing::debug!(path = %path.display(), album_id, "Recorded album marker");
        Ok(())
    }

    fn is_state_file(&self, file_name: &OsStr) -> bool {
        let Some(name) = file_name.to_str() else {
            return false;
        };
        match name.strip_prefix(self.file_name.as_str()) {
            Some("") => true,
            Some(rest) => rest == PART_SUFFIX,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_missing_marker_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = MarkerFileStore::default();
        assert_eq!(store.read(dir.path()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = MarkerFileStore::default();
        store.write(dir.path(), "album-1").await.unwrap();
        assert_eq!(store.read(dir.path()).await.unwrap().as_deref(), Some("album-1"));
    }

    #[tokio::test]
    async fn test_marker_contents_are_bare_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = MarkerFileStore::default();
        store.write(dir.path(), "abc").await.unwrap();
        let raw = std::fs::read_to_string(dir.path().join(MARKER_FILE_NAME)).unwrap();
        assert_eq!(raw, "abc");
        assert!(!dir.path().join(".album.part").exists());
    }

    #[tokio::test]
    async fn test_write_overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        let store = MarkerFileStore::default();
        store.write(dir.path(), "old").await.unwrap();
        store.write(dir.path(), "new").await.unwrap();
        assert_eq!(store.read(dir.path()).await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_read_trims_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MARKER_FILE_NAME), "album-7\n").unwrap();
        let store = MarkerFileStore::default();
        assert_eq!(store.read(dir.path()).await.unwrap().as_deref(), Some("album-7"));
    }

    #[tokio::test]
    async fn test_read_blank_marker_is_none() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MARKER_FILE_NAME), "  \n").unwrap();
        let store = MarkerFileStore::default();
        assert_eq!(store.read(dir.path()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_unreadable_marker_fails() {
        // A directory where the marker file should be cannot be read as text.
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(MARKER_FILE_NAME)).unwrap();
        let store = MarkerFileStore::default();
        let err = store.read(dir.path()).await.unwrap_err();
        assert!(matches!(err, StateError::Read { ref path, .. } if path.ends_with(MARKER_FILE_NAME)));
    }

    #[tokio::test]
    async fn test_read_undecodable_marker_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MARKER_FILE_NAME), b"old-album\xff").unwrap();
        let store = MarkerFileStore::default();
        let err = store.read(dir.path()).await.unwrap_err();
        assert!(matches!(err, StateError::Read { .. }));
        assert_eq!(
            std::fs::read(dir.path().join(MARKER_FILE_NAME)).unwrap(),
            b"old-album\xff"
        );
    }

    #[tokio::test]
    async fn test_write_empty_id_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = MarkerFileStore::default();
        let err = store.write(dir.path(), " ").await.unwrap_err();
        assert!(matches!(err, StateError::EmptyAlbumId(_)));
        assert!(!dir.path().join(MARKER_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn test_write_into_missing_folder_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = MarkerFileStore::default();
        let err = store
            .write(&dir.path().join("gone"), "album")
            .await
            .unwrap_err();
        assert!(matches!(err, StateError::Write { .. }));
    }

    #[test]
    fn test_is_state_file() {
        let store = MarkerFileStore::default();
        assert!(store.is_state_file(OsStr::new(".album")));
        assert!(store.is_state_file(OsStr::new(".album.part")));
        assert!(!store.is_state_file(OsStr::new(".albums")));
        assert!(!store.is_state_file(OsStr::new("album")));
        assert!(!store.is_state_file(OsStr::new("IMG_0001.jpg")));
    }
}
