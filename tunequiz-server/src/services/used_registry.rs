//! Process-wide registry of media already served
//!
//! Append-only for the life of the process and shared across all languages:
//! a video used for one language is barred for every other. Acceptance goes
//! through [`UsedVideoRegistry::check_and_mark`] so two concurrent
//! resolutions can never both claim the same identifier.

use parking_lot::Mutex;
use reqwest::Url;
use std::collections::HashSet;

/// Path prefixes that carry the video id as the next segment
const ID_PATH_PREFIXES: &[&str] = &["/shorts/", "/embed/", "/live/", "/v/"];

/// Extract the canonical video id from a source reference
///
/// Handles `youtu.be/<id>`, `/shorts/<id>`-style paths, and the `v=` query
/// parameter. Falls back to a plain-text `v=` scan when the reference does
/// not parse as a URL.
pub fn extract_video_id(source_ref: &str) -> Option<String> {
    let source_ref = source_ref.trim();
    if source_ref.is_empty() {
        return None;
    }

    if let Ok(url) = Url::parse(source_ref) {
        if url.host_str() == Some("youtu.be") {
            let id = url.path().trim_start_matches('/').split('/').next().unwrap_or("");
            if !id.is_empty() {
                return Some(id.to_string());
            }
        }

        if let Some((_, id)) = url.query_pairs().find(|(key, _)| key == "v") {
            if !id.is_empty() {
                return Some(id.into_owned());
            }
        }

        let path = url.path();
        for prefix in ID_PATH_PREFIXES {
            if let Some(rest) = path.strip_prefix(prefix) {
                let id = rest.split('/').next().unwrap_or("");
                if !id.is_empty() {
                    return Some(id.to_string());
                }
            }
        }
    }

    let start = source_ref.find("v=")? + 2;
    let rest = &source_ref[start..];
    let end = rest
        .find(|c: char| matches!(c, '&' | '?' | '#'))
        .unwrap_or(rest.len());
    let id = &rest[..end];
    (!id.is_empty()).then(|| id.to_string())
}

/// Set of media identifiers already handed out
#[derive(Debug, Default)]
pub struct UsedVideoRegistry {
    used: Mutex<HashSet<String>>,
}

impl UsedVideoRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.used.lock().contains(id)
    }

    pub fn mark_used(&self, id: &str) {
        self.used.lock().insert(id.to_string());
    }

    /// Claim `id` if unused
    ///
    /// Returns `true` only for the caller that inserted it.
    pub fn check_and_mark(&self, id: &str) -> bool {
        self.used.lock().insert(id.to_string())
    }

    pub fn len(&self) -> usize {
        self.used.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.lock().is_empty()
    }
}
