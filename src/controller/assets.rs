use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use std::sync::Arc;
use tracing::debug;

use crate::model::AssetId;
use crate::mvu::error::AssetError;

/// Loads one image asset.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    async fn load(&self, asset: &AssetId) -> Result<(), AssetError>;
}

/// Warms an HTTP cache by downloading each asset body.
pub struct HttpAssetLoader {
    client: Client,
}

impl HttpAssetLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpAssetLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssetLoader for HttpAssetLoader {
    async fn load(&self, asset: &AssetId) -> Result<(), AssetError> {
        let network = |e: reqwest::Error| AssetError::Network {
            url: asset.to_string(),
            reason: e.to_string(),
        };
        let resp = self.client.get(asset.as_str()).send().await.map_err(network)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AssetError::Status {
                status: status.as_u16(),
                url: asset.to_string(),
            });
        }
        resp.bytes().await.map_err(network)?;
        Ok(())
    }
}

/// Outcome of a `warm` call. Informational only; a warm never fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarmReport {
    pub loaded: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct AssetPrefetcher {
    loader: Arc<dyn AssetLoader>,
}

impl AssetPrefetcher {
    #[must_use]
    pub fn new(loader: Arc<dyn AssetLoader>) -> Self {
        Self { loader }
    }

    /// Starts every load at once and resolves when all of them have settled.
    pub async fn warm(&self, assets: &[AssetId]) -> WarmReport {
        let loads = assets.iter().map(|asset| async move {
            let result = self.loader.load(asset).await;
            if let Err(e) = &result {
                debug!(asset = %asset, error = %e, "asset prefetch failed");
            }
            result
        });

        join_all(loads)
            .await
            .into_iter()
            .fold(WarmReport::default(), |mut report, result| {
                match result {
                    Ok(()) => report.loaded += 1,
                    Err(_) => report.failed += 1,
                }
                report
            })
    }
}
