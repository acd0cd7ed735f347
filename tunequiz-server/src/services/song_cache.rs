//! Per-language cache of curated song candidates
//!
//! Holds one batch at a time. The batch is replaced wholesale when a
//! different language is requested, when it is empty, or on explicit
//! refresh; otherwise only the cursor moves.
//!
//! Locking: the mutex guards batch and cursor and is taken only for in-memory
//! reads and swaps. The curation call in [`LanguageSongCache::refresh`] runs
//! with the lock released, and Tier 1 re-locks per candidate.

use parking_lot::Mutex;
use thiserror::Error;

use super::curation_client::{CurationError, Curator};
use crate::models::SongCandidate;

/// Song cache errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("song cache is empty")]
    EmptyCache,

    #[error(transparent)]
    Curation(#[from] CurationError),
}

/// Candidate handed out by the cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPick {
    pub candidate: SongCandidate,
    /// Zero-based position of the candidate in its batch
    pub position: usize,
    pub batch_len: usize,
}

/// Batch plus cyclic cursor; `cursor < items.len()` whenever non-empty
#[derive(Debug, Default)]
struct CachedBatch {
    language: String,
    items: Vec<SongCandidate>,
    cursor: usize,
}

impl CachedBatch {
    fn advance(&mut self) -> Option<CursorPick> {
        if self.items.is_empty() {
            return None;
        }
        let position = self.cursor;
        let candidate = self.items[position].clone();
        self.cursor = (position + 1) % self.items.len();
        Some(CursorPick {
            candidate,
            position,
            batch_len: self.items.len(),
        })
    }
}

/// Curated candidate cache shared by all requests
pub struct LanguageSongCache {
    batch: Mutex<CachedBatch>,
    curator: Curator,
}

impl LanguageSongCache {
    pub fn new(curator: Curator) -> Self {
        Self {
            batch: Mutex::new(CachedBatch::default()),
            curator,
        }
    }

    /// Load a batch only if the cache is empty or holds another language
    ///
    /// Returns the size of the batch now cached for `language`.
    pub async fn ensure_fresh(&self, language: &str) -> Result<usize, CacheError> {
        {
            let batch = self.batch.lock();
            if !batch.items.is_empty() && batch.language == language {
                return Ok(batch.items.len());
            }
        }
        tracing::info!(language = %language, "Song cache empty or language mismatch, refreshing");
        self.refresh(language).await
    }

    /// Unconditionally replace the batch with a fresh one for `language`
    ///
    /// On failure the previous batch stays in place.
    pub async fn refresh(&self, language: &str) -> Result<usize, CacheError> {
        let songs = match self.curator.song_batch(language).await {
            Ok(songs) => songs,
            Err(e) => {
                tracing::warn!(language = %language, error = %e, "Song cache refresh failed, keeping previous batch");
                return Err(e.into());
            }
        };
        Ok(self.install(language, songs))
    }

    /// Swap in a batch and reset the cursor
    pub(crate) fn install(&self, language: &str, songs: Vec<SongCandidate>) -> usize {
        let loaded = songs.len();
        let mut batch = self.batch.lock();
        *batch = CachedBatch {
            language: language.to_string(),
            items: songs,
            cursor: 0,
        };
        tracing::info!(language = %language, songs = loaded, "Song cache loaded");
        loaded
    }

    /// Candidate at the cursor, advancing it cyclically
    pub fn next_candidate(&self) -> Result<CursorPick, CacheError> {
        self.batch.lock().advance().ok_or(CacheError::EmptyCache)
    }

    /// As [`next_candidate`](Self::next_candidate), but only from a batch for `language`
    pub fn next_candidate_for(&self, language: &str) -> Result<CursorPick, CacheError> {
        let mut batch = self.batch.lock();
        if batch.language != language {
            return Err(CacheError::EmptyCache);
        }
        batch.advance().ok_or(CacheError::EmptyCache)
    }

    /// Language of the loaded batch, if any
    pub fn language(&self) -> Option<String> {
        let batch = self.batch.lock();
        (!batch.items.is_empty()).then(|| batch.language.clone())
    }

    pub fn len(&self) -> usize {
        self.batch.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.lock().items.is_empty()
    }
}
