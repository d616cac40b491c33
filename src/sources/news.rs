//! Top headlines from [newsapi.org](https://newsapi.org).

use super::status_error;
use crate::error::FactFetchError;
use crate::models::Headline;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org";

const NAME: &str = "newsapi.org";

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    articles: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
struct ApiArticle {
    title: Option<String>,
    description: Option<String>,
    source: Option<ApiSource>,
}

#[derive(Debug, Deserialize)]
struct ApiSource {
    name: Option<String>,
}

impl ApiArticle {
    fn into_headline(self) -> Option<Headline> {
        let title = self.title.filter(|t| !t.trim().is_empty())?;
        Some(Headline {
            title: title.trim().to_string(),
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            source_name: self
                .source
                .and_then(|s| s.name)
                .unwrap_or_else(|| "unknown source".to_string()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewsApi {
    client: Client,
    api_key: String,
    base_url: String,
}

impl NewsApi {
    pub fn new(client: Client, api_key: String) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Most recent top headline matching `query`.
    #[instrument(level = "info", skip_all, fields(%query))]
    pub async fn latest_headline(&self, query: &str) -> Result<Headline, FactFetchError> {
        let url = Url::parse_with_params(
            &format!("{}/v2/top-headlines", self.base_url.trim_end_matches('/')),
            &[("q", query), ("pageSize", "1")],
        )
        .map_err(|e| FactFetchError::Transport {
            source_name: NAME,
            message: e.to_string(),
        })?;

        let response = self
            .client
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| FactFetchError::Transport {
                source_name: NAME,
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(status_error(NAME, response).await);
        }

        let body: NewsResponse = response.json().await.map_err(|e| FactFetchError::Decode {
            source_name: NAME,
            message: e.to_string(),
        })?;

        let headline = body
            .articles
            .into_iter()
            .find_map(ApiArticle::into_headline)
            .ok_or_else(|| FactFetchError::NotFound(format!("no {query} news found")))?;

        info!(title = %headline.title, source = %headline.source_name, "Fetched headline");
        Ok(headline)
    }
}
