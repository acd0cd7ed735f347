//! Candidate validation shared by every resolution tier
//!
//! Stages, in order:
//! 1. Duration: a known length outside [20, 480] seconds rejects (single
//!    tracks only, no albums or compilations). Unknown length passes.
//! 2. Banned keywords: case-insensitive substring match on the display title.
//! 3. Dedup: the media id must be extractable and not already used.
//!
//! [`FilterChain::accept`] runs all three and claims the id atomically.
//! Random-pick tiers screen every result first with [`FilterChain::screen`]
//! and claim only the one they pick.

use std::fmt;
use std::sync::Arc;

use super::used_registry::{extract_video_id, UsedVideoRegistry};

pub const MIN_DURATION_SECS: u32 = 20;
pub const MAX_DURATION_SECS: u32 = 480;

/// Lower-case title fragments that mark non-single uploads
pub const BANNED_KEYWORDS: &[&str] = &[
    "mix",
    "compilation",
    "medley",
    "playlist",
    "full album",
    "full song",
    "continuous",
    "best of",
    "mega mix",
    "mashup",
    "various artists",
    "compilations",
    "album",
    "album version",
    "greatest hits",
    "popular songs",
    "top hits",
];

/// Why a candidate was turned away
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Duration(u32),
    BannedKeyword(&'static str),
    NoVideoId,
    AlreadyUsed(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Duration(secs) => write!(
                f,
                "duration {}s outside {}..={}s",
                secs, MIN_DURATION_SECS, MAX_DURATION_SECS
            ),
            Rejection::BannedKeyword(word) => write!(f, "title contains banned keyword '{}'", word),
            Rejection::NoVideoId => write!(f, "no video id in source reference"),
            Rejection::AlreadyUsed(id) => write!(f, "video {} already used", id),
        }
    }
}

/// Stage 1
pub fn check_duration(duration_seconds: Option<u32>) -> Result<(), Rejection> {
    match duration_seconds {
        Some(secs) if !(MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&secs) => {
            Err(Rejection::Duration(secs))
        }
        _ => Ok(()),
    }
}

/// Stage 2
pub fn check_title(title: &str) -> Result<(), Rejection> {
    let lowered = title.to_lowercase();
    match BANNED_KEYWORDS.iter().find(|word| lowered.contains(*word)) {
        Some(word) => Err(Rejection::BannedKeyword(word)),
        None => Ok(()),
    }
}

/// Validation chain bound to the process-wide registry
#[derive(Debug, Clone)]
pub struct FilterChain {
    registry: Arc<UsedVideoRegistry>,
}

impl FilterChain {
    pub fn new(registry: Arc<UsedVideoRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<UsedVideoRegistry> {
        &self.registry
    }

    /// Run all stages without claiming; returns the media id
    pub fn screen(
        &self,
        title: &str,
        source_ref: &str,
        duration_seconds: Option<u32>,
    ) -> Result<String, Rejection> {
        check_duration(duration_seconds)?;
        check_title(title)?;
        let id = extract_video_id(source_ref).ok_or(Rejection::NoVideoId)?;
        if self.registry.contains(&id) {
            return Err(Rejection::AlreadyUsed(id));
        }
        Ok(id)
    }

    /// Claim a screened id; `false` means another resolution got there first
    pub fn claim(&self, video_id: &str) -> bool {
        self.registry.check_and_mark(video_id)
    }

    /// Run all stages and claim the id on success
    pub fn accept(
        &self,
        title: &str,
        source_ref: &str,
        duration_seconds: Option<u32>,
    ) -> Result<String, Rejection> {
        let id = self.screen(title, source_ref, duration_seconds)?;
        if self.claim(&id) {
            Ok(id)
        } else {
            Err(Rejection::AlreadyUsed(id))
        }
    }
}
