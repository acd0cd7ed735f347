//! Tier 2: web search API results, probed and filtered, random pick
//!
//! Display metadata comes from the public lookup; when that fails the search
//! result title is used with an empty artist.

use async_trait::async_trait;
use std::sync::Arc;

use super::{claim_random, ResolutionRequest, ResolutionTier, TierError};
use crate::models::ResolvedSong;
use crate::services::curation_client::Curator;
use crate::services::fallback_search::FallbackSearch;
use crate::services::filter_chain::FilterChain;
use crate::services::media_tool::MediaTool;
use crate::services::metadata_lookup::MetadataLookup;

const WATCH_URL_MARKER: &str = "youtube.com/watch";

struct Survivor {
    link: String,
    title: String,
}

pub struct FallbackApiTier {
    search: Arc<dyn FallbackSearch>,
    metadata: Arc<dyn MetadataLookup>,
    media: Arc<dyn MediaTool>,
    curator: Curator,
    filters: FilterChain,
}

impl FallbackApiTier {
    pub const NAME: &'static str = "fallback_api";

    pub fn new(
        search: Arc<dyn FallbackSearch>,
        metadata: Arc<dyn MetadataLookup>,
        media: Arc<dyn MediaTool>,
        curator: Curator,
        filters: FilterChain,
    ) -> Self {
        Self {
            search,
            metadata,
            media,
            curator,
            filters,
        }
    }

    /// Display title and artist, falling back to the search result title
    async fn display_metadata(&self, survivor: Survivor) -> (String, String, String) {
        match self.metadata.lookup(&survivor.link).await {
            Ok(meta) if !meta.title.trim().is_empty() => (meta.title, meta.author_name, survivor.link),
            Ok(_) => (survivor.title, String::new(), survivor.link),
            Err(e) => {
                tracing::debug!(link = %survivor.link, error = %e, "Metadata lookup failed, using search title");
                (survivor.title, String::new(), survivor.link)
            }
        }
    }
}

#[async_trait]
impl ResolutionTier for FallbackApiTier {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn resolve(&self, request: &ResolutionRequest) -> Result<ResolvedSong, TierError> {
        let query = request.search_query(&self.curator).await;
        let results = self.search.search(query).await?;

        let links: Vec<(String, String)> = results
            .all()
            .filter_map(|result| {
                let link = result.link.as_deref()?;
                link.contains(WATCH_URL_MARKER)
                    .then(|| (link.to_string(), result.title.clone().unwrap_or_default()))
            })
            .collect();
        let examined = links.len();

        let mut survivors = Vec::new();
        for (link, title) in links {
            let duration = match self.media.probe_duration(&link).await {
                Ok(duration) => duration,
                Err(e) => {
                    tracing::debug!(link = %link, error = %e, "Duration probe failed, treating as unknown");
                    None
                }
            };
            match self.filters.screen(&title, &link, duration) {
                Ok(video_id) => survivors.push((video_id, Survivor { link, title })),
                Err(rejection) => tracing::debug!(link = %link, reason = %rejection, "Skipping search result"),
            }
        }

        let survivor = claim_random(&self.filters, survivors).ok_or(TierError::NoCandidate { examined })?;
        let (title, artist, source_ref) = self.display_metadata(survivor).await;
        Ok(ResolvedSong {
            title,
            artist,
            source_ref,
            tier: Self::NAME,
        })
    }
}
