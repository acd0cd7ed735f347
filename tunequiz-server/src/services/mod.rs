//! Service modules for song resolution and clip preparation
//!
//! External collaborators (curation service, media tool, audio trimmer,
//! fallback search, metadata lookup) sit behind `async_trait` seams; the
//! stateful services are created once at startup and shared through `Arc`.

pub mod audio_trimmer;
pub mod clip_preparer;
pub mod curation_client;
pub mod fallback_search;
pub mod filter_chain;
pub mod guess;
pub mod media_tool;
pub mod metadata_lookup;
pub mod resolution;
pub mod round_store;
pub mod song_cache;
pub mod tool_runner;
pub mod used_registry;

pub use audio_trimmer::{AudioTrimmer, FfmpegTrimmer};
pub use clip_preparer::{ClipJob, ClipPreparer, CLIP_FILE_NAME};
pub use curation_client::{CurationError, CurationService, Curator, GeminiClient};
pub use fallback_search::{FallbackSearch, SearchApiError, SerpApiClient, WebResult, WebSearchResults};
pub use filter_chain::{FilterChain, Rejection};
pub use media_tool::{MediaTool, YtDlpTool};
pub use metadata_lookup::{MediaMetadata, MetadataLookup, OEmbedClient};
pub use resolution::{
    CacheTier, FallbackApiTier, MediaSearchTier, ResolutionPipeline, ResolutionRequest, ResolutionTier,
    TierError,
};
pub use round_store::RoundStore;
pub use song_cache::{CacheError, CursorPick, LanguageSongCache};
pub use tool_runner::ToolError;
pub use used_registry::{extract_video_id, UsedVideoRegistry};
