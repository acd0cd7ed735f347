//! Tier 3: generic top-K media search, random pick

use async_trait::async_trait;
use std::sync::Arc;

use super::{claim_random, ResolutionRequest, ResolutionTier, TierError};
use crate::models::{ResolvedSong, SearchHit};
use crate::services::curation_client::Curator;
use crate::services::filter_chain::FilterChain;
use crate::services::media_tool::MediaTool;

/// Results requested per search
pub const TOP_K: usize = 5;

pub struct MediaSearchTier {
    media: Arc<dyn MediaTool>,
    curator: Curator,
    filters: FilterChain,
}

impl MediaSearchTier {
    pub const NAME: &'static str = "media_search";

    pub fn new(media: Arc<dyn MediaTool>, curator: Curator, filters: FilterChain) -> Self {
        Self {
            media,
            curator,
            filters,
        }
    }
}

#[async_trait]
impl ResolutionTier for MediaSearchTier {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn resolve(&self, request: &ResolutionRequest) -> Result<ResolvedSong, TierError> {
        let query = request.search_query(&self.curator).await;
        let hits = self.media.search(query, TOP_K).await?;
        let examined = hits.len();

        let survivors: Vec<(String, SearchHit)> = hits
            .into_iter()
            .filter_map(|hit| {
                match self
                    .filters
                    .screen(&hit.title, &hit.source_ref, hit.duration_seconds)
                {
                    Ok(video_id) => Some((video_id, hit)),
                    Err(rejection) => {
                        tracing::debug!(title = %hit.title, reason = %rejection, "Skipping media result");
                        None
                    }
                }
            })
            .collect();

        let hit = claim_random(&self.filters, survivors).ok_or(TierError::NoCandidate { examined })?;
        Ok(ResolvedSong {
            title: hit.title,
            artist: hit.uploader,
            source_ref: hit.source_ref,
            tier: Self::NAME,
        })
    }
}
