//! tunequiz-server library interface
//!
//! Exposes the application state, router and services for the binary and
//! for integration tests.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::http::{header, Method};
use axum::Router;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServiceSettings;
use crate::services::{
    AudioTrimmer, CacheTier, ClipPreparer, CurationService, Curator, FallbackApiTier, FallbackSearch,
    FfmpegTrimmer, FilterChain, GeminiClient, LanguageSongCache, MediaSearchTier, MediaTool,
    MetadataLookup, OEmbedClient, ResolutionPipeline, ResolutionTier, RoundStore, SerpApiClient,
    UsedVideoRegistry, YtDlpTool,
};

/// External collaborators behind their trait seams
pub struct Collaborators {
    pub curation: Arc<dyn CurationService>,
    pub media: Arc<dyn MediaTool>,
    pub trimmer: Arc<dyn AudioTrimmer>,
    /// `None` disables the fallback search tier
    pub fallback_search: Option<Arc<dyn FallbackSearch>>,
    pub metadata: Arc<dyn MetadataLookup>,
}

impl Collaborators {
    /// Production clients and tools built from resolved settings
    pub fn from_settings(settings: &ServiceSettings) -> anyhow::Result<Self> {
        let curation = GeminiClient::new(settings.gemini_api_key.clone(), settings.curation_model.clone())?;
        let fallback_search = match &settings.serpapi_api_key {
            Some(key) => Some(Arc::new(SerpApiClient::new(key.clone(), settings.http_timeout)?) as Arc<dyn FallbackSearch>),
            None => None,
        };

        Ok(Self {
            curation: Arc::new(curation),
            media: Arc::new(YtDlpTool::new(
                settings.yt_dlp.clone(),
                settings.search_timeout,
                settings.probe_timeout,
                settings.download_timeout,
            )),
            trimmer: Arc::new(FfmpegTrimmer::new(settings.ffmpeg.clone(), settings.trim_timeout)),
            fallback_search,
            metadata: Arc::new(OEmbedClient::new(settings.http_timeout)?),
        })
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ResolutionPipeline>,
    pub song_cache: Arc<LanguageSongCache>,
    pub registry: Arc<UsedVideoRegistry>,
    pub rounds: Arc<RoundStore>,
    pub preparer: ClipPreparer,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Wire the stateful services around the given collaborators
    pub fn new(settings: &ServiceSettings, collaborators: Collaborators) -> Self {
        Self::build(
            settings.scratch_dir.clone(),
            Curator::new(collaborators.curation.clone(), settings.query_timeout, settings.batch_timeout),
            collaborators,
        )
    }

    fn build(scratch_dir: PathBuf, curator: Curator, collaborators: Collaborators) -> Self {
        let registry = Arc::new(UsedVideoRegistry::new());
        let filters = FilterChain::new(registry.clone());
        let song_cache = Arc::new(LanguageSongCache::new(curator.clone()));
        let rounds = Arc::new(RoundStore::new());

        let mut tiers: Vec<Arc<dyn ResolutionTier>> = vec![Arc::new(CacheTier::new(
            song_cache.clone(),
            collaborators.media.clone(),
            filters.clone(),
        ))];
        match collaborators.fallback_search {
            Some(search) => tiers.push(Arc::new(FallbackApiTier::new(
                search,
                collaborators.metadata.clone(),
                collaborators.media.clone(),
                curator.clone(),
                filters.clone(),
            ))),
            None => tracing::info!("Fallback search API key not configured, skipping that tier"),
        }
        tiers.push(Arc::new(MediaSearchTier::new(
            collaborators.media.clone(),
            curator,
            filters,
        )));

        let pipeline = ResolutionPipeline::new(tiers);
        tracing::info!(tiers = ?pipeline.tier_names(), "Resolution pipeline ready");

        let preparer = ClipPreparer::new(
            rounds.clone(),
            collaborators.media,
            collaborators.trimmer,
            scratch_dir,
        );

        Self {
            pipeline: Arc::new(pipeline),
            song_cache,
            registry,
            rounds,
            preparer,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .merge(api::round_routes())
        .merge(api::cache_routes())
        .merge(api::health_routes())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
