//! Tier 1: curated cache candidates, one media lookup each

use async_trait::async_trait;
use std::sync::Arc;

use super::{ResolutionRequest, ResolutionTier, TierError};
use crate::models::ResolvedSong;
use crate::services::filter_chain::FilterChain;
use crate::services::media_tool::MediaTool;
use crate::services::song_cache::LanguageSongCache;

pub struct CacheTier {
    cache: Arc<LanguageSongCache>,
    media: Arc<dyn MediaTool>,
    filters: FilterChain,
}

impl CacheTier {
    pub const NAME: &'static str = "cache";

    pub fn new(cache: Arc<LanguageSongCache>, media: Arc<dyn MediaTool>, filters: FilterChain) -> Self {
        Self { cache, media, filters }
    }
}

#[async_trait]
impl ResolutionTier for CacheTier {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Walk at most one full cycle of the batch in cursor order
    async fn resolve(&self, request: &ResolutionRequest) -> Result<ResolvedSong, TierError> {
        let batch_len = self.cache.ensure_fresh(&request.language).await?;

        for _ in 0..batch_len {
            // Fails if another request swapped in a different language meanwhile
            let pick = self.cache.next_candidate_for(&request.language)?;
            let candidate = pick.candidate;
            let query = candidate.search_query();

            let hit = match self.media.search(&query, 1).await {
                Ok(hits) => match hits.into_iter().next() {
                    Some(hit) => hit,
                    None => {
                        tracing::debug!(query = %query, "No media match for cached song");
                        continue;
                    }
                },
                Err(e) => {
                    tracing::debug!(query = %query, error = %e, "Media search failed for cached song");
                    continue;
                }
            };

            match self
                .filters
                .accept(&candidate.title, &hit.source_ref, hit.duration_seconds)
            {
                Ok(video_id) => {
                    tracing::info!(
                        title = %candidate.title,
                        artist = %candidate.artist,
                        video_id = %video_id,
                        position = pick.position + 1,
                        batch_len = pick.batch_len,
                        "Using cached song"
                    );
                    return Ok(ResolvedSong {
                        title: candidate.title,
                        artist: candidate.artist,
                        source_ref: hit.source_ref,
                        tier: Self::NAME,
                    });
                }
                Err(rejection) => {
                    tracing::debug!(query = %query, reason = %rejection, "Skipping cached song");
                }
            }
        }

        Err(TierError::NoCandidate { examined: batch_len })
    }
}
