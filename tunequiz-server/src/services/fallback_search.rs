//! Fallback web search API client (SerpAPI)
//!
//! Only constructed when a key is configured; without it the fallback tier
//! is skipped entirely.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tunequiz_common::text;

const SERPAPI_BASE_URL: &str = "https://serpapi.com/search.json";
const USER_AGENT: &str = concat!("TuneQuiz/", env!("CARGO_PKG_VERSION"));

/// Search API errors, shared with the metadata lookup client
#[derive(Debug, Error)]
pub enum SearchApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// One organic or video result
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct WebResult {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Result lists the fallback tier reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebSearchResults {
    #[serde(default)]
    pub organic_results: Vec<WebResult>,
    #[serde(default)]
    pub video_results: Vec<WebResult>,
}

impl WebSearchResults {
    /// Organic results first, then video results
    pub fn all(&self) -> impl Iterator<Item = &WebResult> {
        self.organic_results.iter().chain(self.video_results.iter())
    }
}

/// Fallback search seam
#[async_trait]
pub trait FallbackSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<WebSearchResults, SearchApiError>;
}

/// SerpAPI Google engine client
pub struct SerpApiClient {
    http_client: reqwest::Client,
    api_key: String,
}

impl SerpApiClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, SearchApiError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| SearchApiError::NetworkError(e.to_string()))?;

        Ok(Self { http_client, api_key })
    }
}

#[async_trait]
impl FallbackSearch for SerpApiClient {
    async fn search(&self, query: &str) -> Result<WebSearchResults, SearchApiError> {
        tracing::debug!(query = %query, "Querying fallback search API");

        let response = self
            .http_client
            .get(SERPAPI_BASE_URL)
            .query(&[("q", query), ("engine", "google"), ("api_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| SearchApiError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SearchApiError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            return Err(SearchApiError::ApiError(status.as_u16(), text::diagnostic(&body)));
        }

        tracing::debug!(response = %text::diagnostic(&body), "Fallback search API response");

        serde_json::from_str(&body).map_err(|e| SearchApiError::ParseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_parse_with_missing_sections() {
        let results: WebSearchResults = serde_json::from_str(
            r#"{"search_metadata":{"id":"x"},"organic_results":[{"link":"https://www.youtube.com/watch?v=a","title":"A","position":1}]}"#,
        )
        .unwrap();

        assert_eq!(results.organic_results.len(), 1);
        assert!(results.video_results.is_empty());
        assert_eq!(results.all().count(), 1);
    }

    #[test]
    fn test_all_orders_organic_before_video() {
        let results = WebSearchResults {
            organic_results: vec![WebResult { link: Some("o".into()), title: None }],
            video_results: vec![WebResult { link: Some("v".into()), title: None }],
        };
        let links: Vec<_> = results.all().filter_map(|r| r.link.as_deref()).collect();
        assert_eq!(links, vec!["o", "v"]);
    }

    #[test]
    fn test_client_creation() {
        assert!(SerpApiClient::new("key".into(), Duration::from_secs(15)).is_ok());
    }
}
