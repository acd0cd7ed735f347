//! Song-level value types

use serde::{Deserialize, Serialize};

/// A curated (title, artist) pair, before any media has been located for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongCandidate {
    pub title: String,
    /// May be empty when the curation service omitted it
    pub artist: String,
}

impl SongCandidate {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }

    /// Free-text query for the media search tool
    pub fn search_query(&self) -> String {
        if self.artist.is_empty() {
            self.title.clone()
        } else {
            format!("{} {}", self.title, self.artist)
        }
    }
}

/// One result from the media search tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Canonical page URL of the media
    pub source_ref: String,
    pub title: String,
    pub uploader: String,
    /// Length in seconds when the tool reported one
    pub duration_seconds: Option<u32>,
}

/// Output of the resolution pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSong {
    pub title: String,
    pub artist: String,
    pub source_ref: String,
    /// Name of the tier that produced this song
    pub tier: &'static str,
}

impl ResolvedSong {
    pub const PLACEHOLDER_TITLE: &'static str = "Sample Song";
    pub const PLACEHOLDER_ARTIST: &'static str = "Sample Artist";
    pub const PLACEHOLDER_SOURCE: &'static str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    /// Fixed last-resort song
    pub fn placeholder() -> Self {
        Self {
            title: Self::PLACEHOLDER_TITLE.to_string(),
            artist: Self::PLACEHOLDER_ARTIST.to_string(),
            source_ref: Self::PLACEHOLDER_SOURCE.to_string(),
            tier: "placeholder",
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.tier == "placeholder"
    }
}
