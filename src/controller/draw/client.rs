use async_trait::async_trait;
use reqwest::Client;

use crate::model::{DrawData, Season};
use crate::mvu::error::FetchError;

/// Retrieval and decoding of one season's draw.
#[async_trait]
pub trait DrawDataSource: Send + Sync {
    async fn fetch_draw(&self, season: Season) -> Result<DrawData, FetchError>;
}

/// Reads draw documents from `{base}/data/{season}.json`.
pub struct HttpDrawSource {
    client: Client,
    base_url: String,
}

impl HttpDrawSource {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn url_for(&self, season: Season) -> String {
        format!("{}/data/{season}.json", self.base_url)
    }
}

#[async_trait]
impl DrawDataSource for HttpDrawSource {
    async fn fetch_draw(&self, season: Season) -> Result<DrawData, FetchError> {
        let url = self.url_for(season);
        let resp = self.client.get(&url).send().await?.error_for_status()?;
        let body = resp.bytes().await?;
        DrawData::from_json(&body)
    }
}
