//! Song resolution pipeline
//!
//! Turns "a guessable song in language L" into `(title, artist, source_ref)`
//! by trying tiers in a fixed order:
//!
//! 1. [`CacheTier`]: curated candidates from the per-language cache
//! 2. [`FallbackApiTier`]: web search API (only with a configured key)
//! 3. [`MediaSearchTier`]: generic top-K media search
//! 4. placeholder song
//!
//! Every tier runs candidates through the shared [`FilterChain`](crate::services::filter_chain::FilterChain) and claims
//! the winner atomically in the used-video registry. Tier failures are
//! logged and absorbed, so [`ResolutionPipeline::resolve`] always returns a
//! song.

mod tier_cache;
mod tier_fallback_api;
mod tier_media_search;

pub use tier_cache::CacheTier;
pub use tier_fallback_api::FallbackApiTier;
pub use tier_media_search::MediaSearchTier;

use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::OnceCell;

use super::curation_client::Curator;
use super::fallback_search::SearchApiError;
use super::filter_chain::FilterChain;
use super::song_cache::CacheError;
use super::tool_runner::ToolError;
use crate::models::ResolvedSong;

/// Tier failure; absorbed by the pipeline
#[derive(Debug, Error)]
pub enum TierError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    SearchApi(#[from] SearchApiError),

    #[error("no acceptable candidate among {examined} examined")]
    NoCandidate { examined: usize },
}

/// One resolution attempt
///
/// Carries the lazily crafted search query so tiers 2 and 3 share a single
/// curation call.
pub struct ResolutionRequest {
    pub language: String,
    pub clip_length_seconds: u32,
    crafted_query: OnceCell<String>,
}

impl ResolutionRequest {
    pub fn new(language: impl Into<String>, clip_length_seconds: u32) -> Self {
        Self {
            language: language.into(),
            clip_length_seconds,
            crafted_query: OnceCell::new(),
        }
    }

    /// Fixed query used when curation is unavailable
    pub fn template_query(&self) -> String {
        format!("popular songs in {} YouTube from the last 2 years", self.language)
    }

    /// Curation-crafted query, else the template; computed at most once
    pub async fn search_query(&self, curator: &Curator) -> &str {
        self.crafted_query
            .get_or_init(|| async {
                match curator.craft_search_query(&self.language).await {
                    Ok(query) => query,
                    Err(e) => {
                        let query = self.template_query();
                        tracing::info!(error = %e, query = %query, "Using template search query");
                        query
                    }
                }
            })
            .await
    }
}

/// One step of the fallback order
#[async_trait]
pub trait ResolutionTier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn resolve(&self, request: &ResolutionRequest) -> Result<ResolvedSong, TierError>;
}

/// Remove and return a uniformly random element
pub(crate) fn take_random<T>(items: &mut Vec<T>) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    let index = rand::thread_rng().gen_range(0..items.len());
    Some(items.swap_remove(index))
}

/// Claim a uniformly random screened survivor
///
/// A survivor whose id was claimed elsewhere since screening is dropped and
/// another is drawn. `None` once every survivor is lost.
pub(crate) fn claim_random<T>(filters: &FilterChain, mut survivors: Vec<(String, T)>) -> Option<T> {
    while let Some((video_id, item)) = take_random(&mut survivors) {
        if filters.claim(&video_id) {
            return Some(item);
        }
        tracing::debug!(video_id = %video_id, "Lost claim race, picking another result");
    }
    None
}

/// Ordered tiers plus the placeholder
pub struct ResolutionPipeline {
    tiers: Vec<Arc<dyn ResolutionTier>>,
}

impl ResolutionPipeline {
    pub fn new(tiers: Vec<Arc<dyn ResolutionTier>>) -> Self {
        Self { tiers }
    }

    pub fn tier_names(&self) -> Vec<&'static str> {
        self.tiers.iter().map(|tier| tier.name()).collect()
    }

    /// Resolve a song; falls back to the placeholder when every tier fails
    pub async fn resolve(&self, language: &str, clip_length_seconds: u32) -> ResolvedSong {
        let request = ResolutionRequest::new(language, clip_length_seconds);
        let started = Instant::now();

        for tier in &self.tiers {
            match tier.resolve(&request).await {
                Ok(song) => {
                    tracing::info!(
                        tier = tier.name(),
                        language = %language,
                        title = %song.title,
                        artist = %song.artist,
                        source_ref = %song.source_ref,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Song resolved"
                    );
                    return song;
                }
                Err(e) => {
                    tracing::info!(tier = tier.name(), language = %language, error = %e, "Resolution tier failed, trying next");
                }
            }
        }

        tracing::warn!(language = %language, "All resolution tiers failed, serving placeholder");
        ResolvedSong::placeholder()
    }
}
