use thiserror::Error;

/// Failure to retrieve or decode a season's draw document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::Status {
                status: status.as_u16(),
                url: err.url().map(ToString::to_string).unwrap_or_default(),
            },
            None if err.is_decode() => Self::Parse(err.to_string()),
            None => Self::Network(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Failure to load a single image asset. Never leaves the prefetcher.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("network error loading {url}: {reason}")]
    Network { url: String, reason: String },
    #[error("unexpected status {status} loading {url}")]
    Status { status: u16, url: String },
}
