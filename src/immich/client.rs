use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::error::ImmichError;
use super::types::{
    AlbumResponse, BulkIdResponse, BulkIdsRequest, CreateAlbumRequest, MetadataSearchRequest,
    MetadataSearchResponse,
};
use super::AssetDirectory;

const API_KEY_HEADER: &str = "x-api-key";

/// Error bodies can be whole HTML pages from a reverse proxy; keep the log
/// line readable.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// HTTP client for an Immich server.
///
/// The API key and endpoint are fixed at construction and reused for every
/// call. `api_host` is the API root including its `/api` suffix, e.g.
/// `https://photos.example.com/api`.
#[derive(Clone)]
pub struct ImmichClient {
    http: Client,
    api_host: String,
}

impl std::fmt::Debug for ImmichClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImmichClient")
            .field("api_host", &self.api_host)
            .finish_non_exhaustive()
    }
}

impl ImmichClient {
    pub fn new(api_host: &str, api_key: &str, timeout: Duration) -> Result<Self, ImmichError> {
        let api_host = api_host.trim_end_matches('/').to_string();
        if !(api_host.starts_with("http://") || api_host.starts_with("https://")) {
            return Err(ImmichError::Config(format!(
                "API host must start with http:// or https://, got '{api_host}'"
            )));
        }

        let mut key = HeaderValue::from_str(api_key)
            .map_err(|_| ImmichError::Config("API key contains invalid characters".into()))?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ImmichError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { http, api_host })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.api_host, endpoint)
    }

    /// Send a request and decode a JSON body, mapping each failure mode to
    /// its own error variant.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        endpoint: &str,
    ) -> Result<T, ImmichError> {
        let response = request
            .send()
            .await
            .map_err(|source| ImmichError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImmichError::Status {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
                body: truncate_body(&body),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| ImmichError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;
        serde_json::from_slice(&bytes).map_err(|e| ImmichError::Decode {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }
}

fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

fn album_assets_endpoint(album_id: &str) -> String {
    format!("albums/{album_id}/assets")
}

#[async_trait::async_trait]
impl AssetDirectory for ImmichClient {
    async fn resolve_asset_by_path(
        &self,
        original_path: &str,
    ) -> Result<Option<String>, ImmichError> {
        let endpoint = "search/metadata";
        let request = self
            .http
            .post(self.url(endpoint))
            .json(&MetadataSearchRequest { original_path });

        let response: MetadataSearchResponse = self.send_json(request, endpoint).await?;
        let matches = response.assets.items.len();
        if matches > 1 {
            debug!(path = original_path, matches, "Several assets share this path, using the first");
        }
        Ok(response
            .assets
            .items
            .into_iter()
            .next()
            .map(|asset| asset.id.into_string()))
    }

    async fn create_album(&self, name: &str, asset_ids: &[String]) -> Result<String, ImmichError> {
        let endpoint = "albums";
        debug!(album = name, assets = asset_ids.len(), "Creating album");
        let request = self.http.post(self.url(endpoint)).json(&CreateAlbumRequest {
            album_name: name,
            asset_ids,
        });

        let album: AlbumResponse = self.send_json(request, endpoint).await?;
        let id = album.id.into_string();
        if id.trim().is_empty() {
            return Err(ImmichError::Decode {
                endpoint: endpoint.to_string(),
                reason: "album id is empty".into(),
            });
        }
        debug!(
            album = album.album_name.as_deref().unwrap_or(name),
            album_id = %id,
            "Album created"
        );
        Ok(id)
    }

    async fn add_assets_to_album(
        &self,
        album_id: &str,
        asset_ids: &[String],
    ) -> Result<(), ImmichError> {
        let endpoint = album_assets_endpoint(album_id);
        debug!(album_id, assets = asset_ids.len(), "Adding assets to album");
        let request = self
            .http
            .put(self.url(&endpoint))
            .json(&BulkIdsRequest { ids: asset_ids });

        let results: Vec<BulkIdResponse> = self.send_json(request, &endpoint).await?;
        for result in results.iter().filter(|r| !r.success) {
            if result.is_duplicate() {
                debug!(album_id, asset_id = %result.id, "Asset already in album");
            } else {
                warn!(
                    album_id,
                    asset_id = %result.id,
                    error = result.error.as_deref().unwrap_or("unknown"),
                    "Server rejected asset"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(host: &str) -> ImmichClient {
        ImmichClient::new(host, "secret", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_url_joins_endpoint() {
        let c = client("https://photos.example.com/api");
        assert_eq!(
            c.url("search/metadata"),
            "https://photos.example.com/api/search/metadata"
        );
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let c = client("http://localhost:2283/api/");
        assert_eq!(c.url("albums"), "http://localhost:2283/api/albums");
    }

    #[test]
    fn test_album_assets_endpoint() {
        assert_eq!(album_assets_endpoint("abc-123"), "albums/abc-123/assets");
    }

    #[test]
    fn test_rejects_host_without_scheme() {
        let err = ImmichClient::new("localhost:2283/api", "k", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, ImmichError::Config(_)));
    }

    #[test]
    fn test_rejects_api_key_with_newline() {
        let err =
            ImmichClient::new("http://localhost/api", "bad\nkey", Duration::from_secs(5))
                .unwrap_err();
        assert!(matches!(err, ImmichError::Config(_)));
    }

    #[test]
    fn test_debug_hides_client_internals() {
        let rendered = format!("{:?}", client("http://localhost/api"));
        assert!(rendered.contains("http://localhost/api"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_truncate_body_short() {
        assert_eq!(truncate_body("  nope \n"), "nope");
    }

    #[test]
    fn test_truncate_body_long() {
        let long = "x".repeat(MAX_ERROR_BODY_CHARS + 10);
        let out = truncate_body(&long);
        assert_eq!(out.chars().count(), MAX_ERROR_BODY_CHARS + 1);
        assert!(out.ends_with('…'));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let c = client("http://127.0.0.1:1/api");
        let err = c.resolve_asset_by_path("/a.jpg").await.unwrap_err();
        assert!(matches!(err, ImmichError::Transport { .. }));
        assert!(err.is_transient());
    }
}
