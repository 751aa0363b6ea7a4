use crate::config::{AppConfig, MAX_SEARCH_RESULTS};
use crate::error::{UpstreamError, UpstreamResult};
use crate::models::*;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

const SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Web search used to ground answers. Implementations never fail: any
/// problem is reported as an empty result list.
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Vec<Snippet>;
}

pub struct GoogleSearchService {
    client: Client,
    search_url: String,
    api_key: Option<String>,
    engine_id: Option<String>,
}

impl GoogleSearchService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.upstream_timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build search HTTP client: {}", e))?;

        Ok(Self {
            client,
            search_url: SEARCH_URL.to_string(),
            api_key: config.search_api_key.clone(),
            engine_id: config.search_engine_id.clone(),
        })
    }

    pub fn with_search_url(mut self, search_url: impl Into<String>) -> Self {
        self.search_url = search_url.into();
        self
    }

    async fn try_search(&self, query: &str, limit: usize) -> UpstreamResult<Vec<Snippet>> {
        let (api_key, engine_id) = match (self.api_key.as_deref(), self.engine_id.as_deref()) {
            (Some(key), Some(cx)) => (key, cx),
            _ => {
                return Err(UpstreamError::ConfigurationMissing(
                    "GOOGLE_SEARCH_API_KEY / GOOGLE_SEARCH_CX".to_string(),
                ))
            }
        };

        let limit = limit.clamp(1, MAX_SEARCH_RESULTS);
        let num = limit.to_string();

        let response = self
            .client
            .get(&self.search_url)
            .query(&[("key", api_key), ("cx", engine_id), ("q", query), ("num", num.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(UpstreamError::UpstreamTransportFailure(format!(
                "search API returned {}: {}",
                status, error_text
            )));
        }

        let body: SearchResponse = response.json().await?;
        Ok(into_snippets(body, limit))
    }
}

#[async_trait]
impl SearchClient for GoogleSearchService {
    async fn search(&self, query: &str, limit: usize) -> Vec<Snippet> {
        match self.try_search(query, limit).await {
            Ok(snippets) => {
                log::info!("Search returned {} snippets", snippets.len());
                snippets
            }
            Err(e) => {
                log::warn!("Search failed, continuing without context: {}", e);
                Vec::new()
            }
        }
    }
}

pub fn into_snippets(response: SearchResponse, limit: usize) -> Vec<Snippet> {
    response
        .items
        .into_iter()
        .take(limit)
        .map(Snippet::from)
        .collect()
}
