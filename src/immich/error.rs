use thiserror::Error;

/// Typed failures of the Immich API boundary.
///
/// A lookup that finds nothing is not an error; it is `Ok(None)` from
/// [`AssetDirectory::resolve_asset_by_path`](super::AssetDirectory). Every
/// variant here means the service could not answer the question.
#[derive(Debug, Error)]
pub enum ImmichError {
    #[error("Invalid API configuration: {0}")]
    Config(String),

    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {endpoint}: {body}")]
    Status {
        status: u16,
        endpoint: String,
        body: String,
    },

    #[error("Unexpected response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },
}

impl ImmichError {
    /// Whether the failure looks temporary (network trouble, overload, 5xx)
    /// rather than a rejected request such as a bad key or malformed body.
    pub fn is_transient(&self) -> bool {
        match self {
            ImmichError::Transport { .. } => true,
            ImmichError::Status { status, .. } => *status == 429 || *status >= 500,
            ImmichError::Config(_) | ImmichError::Decode { .. } => false,
        }
    }
}
