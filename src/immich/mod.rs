//! Immich API boundary — the three calls the album sync needs: look up an
//! asset by its original path, create an album, append assets to an album.

mod client;
pub mod error;
pub mod types;

pub use client::ImmichClient;
pub use error::ImmichError;

/// Remote asset and album operations used by the sync engine.
///
/// The concrete implementation is [`ImmichClient`]; tests substitute an
/// in-memory directory. Implementations must not retry internally: a failed
/// call is reported once and the caller decides what happens to the folder.
#[async_trait::async_trait]
pub trait AssetDirectory: Send + Sync {
    /// Find the asset whose recorded original path equals `original_path`
    /// exactly. When several match, the first one the server returns wins.
    async fn resolve_asset_by_path(
        &self,
        original_path: &str,
    ) -> Result<Option<String>, ImmichError>;

    /// Create an album named `name` holding `asset_ids` (possibly none) and
    /// return the new album's id.
    async fn create_album(&self, name: &str, asset_ids: &[String]) -> Result<String, ImmichError>;

    /// Append `asset_ids` to an existing album. Assets already in the album
    /// are not an error.
    async fn add_assets_to_album(
        &self,
        album_id: &str,
        asset_ids: &[String],
    ) -> Result<(), ImmichError>;
}
