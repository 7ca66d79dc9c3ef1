//! Request and response bodies for the handful of Immich endpoints we call.
//! Only the fields we read are modelled; serde ignores the rest.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataSearchRequest<'a> {
    pub original_path: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct MetadataSearchResponse {
    pub assets: AssetPage,
}

#[derive(Debug, Deserialize)]
pub struct AssetPage {
    #[serde(default)]
    pub items: Vec<AssetSummary>,
}

#[derive(Debug, Deserialize)]
pub struct AssetSummary {
    pub id: RemoteId,
}

/// Identifiers are UUID strings on current servers, but older builds handed
/// out integers. Both normalize to their string form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RemoteId {
    Text(String),
    Number(i64),
}

impl RemoteId {
    pub fn into_string(self) -> String {
        match self {
            RemoteId::Text(s) => s,
            RemoteId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlbumRequest<'a> {
    pub album_name: &'a str,
    pub asset_ids: &'a [String],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumResponse {
    pub id: RemoteId,
    #[serde(default)]
    pub album_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BulkIdsRequest<'a> {
    pub ids: &'a [String],
}

/// Per-asset outcome of an append. `error` is `"duplicate"` when the asset
/// was already in the album.
#[derive(Debug, Deserialize)]
pub struct BulkIdResponse {
    pub id: String,
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl BulkIdResponse {
    pub fn is_duplicate(&self) -> bool {
        self.error.as_deref() == Some("duplicate")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_request_uses_camel_case() {
        let body = serde_json::to_value(MetadataSearchRequest {
            original_path: "/mnt/photos/a.jpg",
        })
        .unwrap();
        assert_eq!(body, json!({"originalPath": "/mnt/photos/a.jpg"}));
    }

    #[test]
    fn test_search_response_keeps_item_order() {
        let resp: MetadataSearchResponse = serde_json::from_value(json!({
            "albums": {"items": [], "total": 0},
            "assets": {
                "items": [{"id": "first", "originalPath": "/x"}, {"id": "second"}],
                "total": 2,
                "nextPage": null
            }
        }))
        .unwrap();
        let ids: Vec<String> = resp
            .assets
            .items
            .into_iter()
            .map(|a| a.id.into_string())
            .collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn test_search_response_without_items() {
        let resp: MetadataSearchResponse =
            serde_json::from_value(json!({"assets": {"total": 0}})).unwrap();
        assert!(resp.assets.items.is_empty());
    }

    #[test]
    fn test_numeric_id_normalized_to_string() {
        let asset: AssetSummary = serde_json::from_value(json!({"id": 56})).unwrap();
        assert_eq!(asset.id.into_string(), "56");
    }

    #[test]
    fn test_create_album_request_shape() {
        let ids = vec!["a".to_string(), "b".to_string()];
        let body = serde_json::to_value(CreateAlbumRequest {
            album_name: "Holidays",
            asset_ids: &ids,
        })
        .unwrap();
        assert_eq!(body, json!({"albumName": "Holidays", "assetIds": ["a", "b"]}));
    }

    #[test]
    fn test_create_album_request_allows_empty_assets() {
        let body = serde_json::to_value(CreateAlbumRequest {
            album_name: "Empty",
            asset_ids: &[],
        })
        .unwrap();
        assert_eq!(body, json!({"albumName": "Empty", "assetIds": []}));
    }

    #[test]
    fn test_bulk_response_duplicate() {
        let results: Vec<BulkIdResponse> = serde_json::from_value(json!([
            {"id": "a", "success": true},
            {"id": "b", "success": false, "error": "duplicate"},
            {"id": "c", "success": false, "error": "not_found"}
        ]))
        .unwrap();
        assert!(!results[0].is_duplicate());
        assert!(results[1].is_duplicate());
        assert!(!results[2].is_duplicate());
    }
}
