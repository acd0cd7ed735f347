//! Hand-written fake collaborators
//!
//! Each fake answers from canned data and counts its calls, so tests can
//! drive every resolution tier and the clip preparer without network access
//! or external binaries.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tunequiz_server::models::{SearchHit, SongCandidate};
use tunequiz_server::services::{
    AudioTrimmer, CurationError, CurationService, FallbackSearch, MediaMetadata, MediaTool,
    MetadataLookup, SearchApiError, ToolError, UsedVideoRegistry, WebResult, WebSearchResults,
};
use tunequiz_server::Collaborators;

/// Bytes the fake media tool writes as "downloaded" audio
pub const RAW_AUDIO: &[u8] = b"ID3\x03\x00\x00\x00\x00\x00\x00fake_mp3_data";

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

pub fn hit(video_id: &str, title: &str, uploader: &str, duration: Option<u32>) -> SearchHit {
    SearchHit {
        source_ref: watch_url(video_id),
        title: title.to_string(),
        uploader: uploader.to_string(),
        duration_seconds: duration,
    }
}

// ============================================================================
// Curation
// ============================================================================

/// Curation fake keyed by the language named in the prompt
#[derive(Default)]
pub struct FakeCuration {
    configured: bool,
    batches: Mutex<HashMap<String, Vec<SongCandidate>>>,
    query: Option<String>,
    pub batch_calls: AtomicUsize,
    pub query_calls: AtomicUsize,
}

impl FakeCuration {
    pub fn new() -> Self {
        Self {
            configured: true,
            ..Default::default()
        }
    }

    /// No credential: the service must never be called
    pub fn unconfigured() -> Self {
        Self::default()
    }

    pub fn with_batch(self, language: &str, songs: &[(&str, &str)]) -> Self {
        let songs = songs
            .iter()
            .map(|(title, artist)| SongCandidate::new(*title, *artist))
            .collect();
        self.batches.lock().insert(language.to_string(), songs);
        self
    }

    pub fn with_query(mut self, query: &str) -> Self {
        self.query = Some(query.to_string());
        self
    }
}

#[async_trait]
impl CurationService for FakeCuration {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn generate(&self, prompt: &str) -> Result<String, CurationError> {
        if !prompt.contains("JSON array") {
            self.query_calls.fetch_add(1, Ordering::SeqCst);
            return self.query.clone().ok_or(CurationError::EmptyResponse);
        }

        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        let batches = self.batches.lock();
        let songs = batches
            .iter()
            .find(|(language, _)| prompt.contains(&format!("in the {} language", language)))
            .map(|(_, songs)| songs)
            .ok_or(CurationError::NoValidEntries)?;

        let entries: Vec<serde_json::Value> = songs
            .iter()
            .map(|s| serde_json::json!({"title": s.title, "artist": s.artist}))
            .collect();
        Ok(format!("```json\n{}\n```", serde_json::Value::Array(entries)))
    }
}

// ============================================================================
// Media tool
// ============================================================================

#[derive(Default)]
pub struct FakeMedia {
    results: Mutex<HashMap<String, Vec<SearchHit>>>,
    durations: Mutex<HashMap<String, u32>>,
    download_delay: Option<Duration>,
    fail_download: bool,
    claims_on_probe: Mutex<Vec<(String, String, Arc<UsedVideoRegistry>)>>,
    pub searches: AtomicUsize,
    pub downloads: AtomicUsize,
}

impl FakeMedia {
    pub fn new() -> Self {
        Self::default()
    }

    /// Results for an exact search query
    pub fn with_results(self, query: &str, hits: Vec<SearchHit>) -> Self {
        self.results.lock().insert(query.to_string(), hits);
        self
    }

    pub fn with_duration(self, source_ref: &str, seconds: u32) -> Self {
        self.durations.lock().insert(source_ref.to_string(), seconds);
        self
    }

    pub fn with_download_delay(mut self, delay: Duration) -> Self {
        self.download_delay = Some(delay);
        self
    }

    pub fn failing_downloads(mut self) -> Self {
        self.fail_download = true;
        self
    }

    /// When `probed` is probed, mark `video_id` used, as a concurrent
    /// resolution would
    pub fn claim_when_probed(&self, probed: &str, video_id: &str, registry: Arc<UsedVideoRegistry>) {
        self.claims_on_probe
            .lock()
            .push((probed.to_string(), video_id.to_string(), registry));
    }
}

#[async_trait]
impl MediaTool for FakeMedia {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, ToolError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        let mut hits = self.results.lock().get(query).cloned().unwrap_or_default();
        hits.truncate(top_k);
        Ok(hits)
    }

    async fn probe_duration(&self, source_ref: &str) -> Result<Option<u32>, ToolError> {
        for (probed, video_id, registry) in self.claims_on_probe.lock().iter() {
            if probed == source_ref {
                registry.mark_used(video_id);
            }
        }
        Ok(self.durations.lock().get(source_ref).copied())
    }

    async fn download(&self, _source_ref: &str, dest_dir: &Path) -> Result<PathBuf, ToolError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.download_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_download {
            return Err(ToolError::Failed {
                tool: "yt-dlp".to_string(),
                status: "exit status: 1".to_string(),
                output: format!("ERROR: Video unavailable\n{}", "x".repeat(2000)),
            });
        }
        let path = dest_dir.join("raw.webm");
        tokio::fs::write(&path, RAW_AUDIO).await?;
        Ok(path)
    }
}

// ============================================================================
// Trimmer
// ============================================================================

/// Copies the input to the output and records requested lengths
#[derive(Default)]
pub struct FakeTrimmer {
    pub lengths: Mutex<Vec<u32>>,
}

#[async_trait]
impl AudioTrimmer for FakeTrimmer {
    async fn trim(&self, input: &Path, seconds: u32, output: &Path) -> Result<PathBuf, ToolError> {
        self.lengths.lock().push(seconds);
        tokio::fs::copy(input, output).await?;
        Ok(output.to_path_buf())
    }
}

// ============================================================================
// Fallback search and metadata lookup
// ============================================================================

#[derive(Default)]
pub struct FakeFallbackSearch {
    results: WebSearchResults,
    pub queries: Mutex<Vec<String>>,
}

fn web_results(links: &[(&str, &str)]) -> Vec<WebResult> {
    links
        .iter()
        .map(|(link, title)| WebResult {
            link: Some(link.to_string()),
            title: Some(title.to_string()),
        })
        .collect()
}

impl FakeFallbackSearch {
    pub fn with_organic(links: &[(&str, &str)]) -> Self {
        Self {
            results: WebSearchResults {
                organic_results: web_results(links),
                video_results: Vec::new(),
            },
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Only `video_results`, no organic results
    pub fn with_videos(links: &[(&str, &str)]) -> Self {
        Self {
            results: WebSearchResults {
                organic_results: Vec::new(),
                video_results: web_results(links),
            },
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl FallbackSearch for FakeFallbackSearch {
    async fn search(&self, query: &str) -> Result<WebSearchResults, SearchApiError> {
        self.queries.lock().push(query.to_string());
        Ok(self.results.clone())
    }
}

/// Answers from a map; unknown links fail like an unreachable endpoint
#[derive(Default)]
pub struct FakeMetadata {
    entries: HashMap<String, MediaMetadata>,
}

impl FakeMetadata {
    pub fn with_entry(mut self, source_ref: &str, title: &str, author: &str) -> Self {
        self.entries.insert(
            source_ref.to_string(),
            MediaMetadata {
                title: title.to_string(),
                author_name: author.to_string(),
            },
        );
        self
    }
}

#[async_trait]
impl MetadataLookup for FakeMetadata {
    async fn lookup(&self, source_ref: &str) -> Result<MediaMetadata, SearchApiError> {
        self.entries
            .get(source_ref)
            .cloned()
            .ok_or_else(|| SearchApiError::NetworkError("connection refused".to_string()))
    }
}

// ============================================================================
// Bundle
// ============================================================================

/// Fakes plus typed handles for assertions
pub struct FakeSet {
    pub curation: Arc<FakeCuration>,
    pub media: Arc<FakeMedia>,
    pub trimmer: Arc<FakeTrimmer>,
    pub fallback: Option<Arc<FakeFallbackSearch>>,
    pub metadata: Arc<FakeMetadata>,
}

impl FakeSet {
    pub fn new(curation: FakeCuration, media: FakeMedia) -> Self {
        Self {
            curation: Arc::new(curation),
            media: Arc::new(media),
            trimmer: Arc::new(FakeTrimmer::default()),
            fallback: None,
            metadata: Arc::new(FakeMetadata::default()),
        }
    }

    pub fn with_fallback(mut self, fallback: FakeFallbackSearch, metadata: FakeMetadata) -> Self {
        self.fallback = Some(Arc::new(fallback));
        self.metadata = Arc::new(metadata);
        self
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            curation: self.curation.clone(),
            media: self.media.clone(),
            trimmer: self.trimmer.clone(),
            fallback_search: self
                .fallback
                .clone()
                .map(|f| f as Arc<dyn FallbackSearch>),
            metadata: self.metadata.clone(),
        }
    }
}
