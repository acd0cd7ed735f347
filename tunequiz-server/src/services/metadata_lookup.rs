//! Public metadata lookup (YouTube oEmbed)

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::fallback_search::SearchApiError;

const OEMBED_URL: &str = "https://www.youtube.com/oembed";
const USER_AGENT: &str = concat!("TuneQuiz/", env!("CARGO_PKG_VERSION"));

/// Display metadata for a source
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct MediaMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author_name: String,
}

/// Metadata lookup seam
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    async fn lookup(&self, source_ref: &str) -> Result<MediaMetadata, SearchApiError>;
}

/// oEmbed client
pub struct OEmbedClient {
    http_client: reqwest::Client,
}

impl OEmbedClient {
    pub fn new(timeout: Duration) -> Result<Self, SearchApiError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| SearchApiError::NetworkError(e.to_string()))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl MetadataLookup for OEmbedClient {
    async fn lookup(&self, source_ref: &str) -> Result<MediaMetadata, SearchApiError> {
        let response = self
            .http_client
            .get(OEMBED_URL)
            .query(&[("url", source_ref), ("format", "json")])
            .send()
            .await
            .map_err(|e| SearchApiError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SearchApiError::ApiError(status.as_u16(), error_text));
        }

        let metadata: MediaMetadata = response
            .json()
            .await
            .map_err(|e| SearchApiError::ParseError(e.to_string()))?;

        tracing::debug!(
            source_ref = %source_ref,
            title = %metadata.title,
            author = %metadata.author_name,
            "Resolved display metadata"
        );
        Ok(metadata)
    }
}
