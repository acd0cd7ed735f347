//! Curation service client
//!
//! The curation service is a generative text model. It is asked for two
//! things: a concise web search query for popular songs in a language, and a
//! JSON list of 10-15 (title, artist) pairs. Neither answer is trusted to be
//! well-formed; see [`parse_song_list`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tunequiz_common::text;

use crate::models::SongCandidate;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const USER_AGENT: &str = concat!("TuneQuiz/", env!("CARGO_PKG_VERSION"));

/// Curation service errors
#[derive(Debug, Error)]
pub enum CurationError {
    #[error("curation service not configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("curation request timed out after {0}s")]
    Timeout(u64),

    #[error("curation service returned no content")]
    EmptyResponse,

    #[error("could not parse song list: {0}")]
    Unparseable(String),

    #[error("no valid songs found in curation response")]
    NoValidEntries,
}

/// Generative text seam
#[async_trait]
pub trait CurationService: Send + Sync {
    /// Whether a credential is available; unconfigured services are never called
    fn is_configured(&self) -> bool {
        true
    }

    async fn generate(&self, prompt: &str) -> Result<String, CurationError>;
}

// ============================================================================
// Gemini REST client
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

/// Gemini `generateContent` client
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Result<Self, CurationError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| CurationError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            model: model.into(),
        })
    }
}

#[async_trait]
impl CurationService for GeminiClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, prompt: &str) -> Result<String, CurationError> {
        let api_key = self.api_key.as_deref().ok_or(CurationError::NotConfigured)?;
        let url = format!("{}/models/{}:generateContent", GEMINI_BASE_URL, self.model);

        tracing::debug!(model = %self.model, "Querying curation service");

        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CurationError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CurationError::ApiError(status.as_u16(), text::diagnostic(&error_text)));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| CurationError::Unparseable(e.to_string()))?;

        let text = parsed.text().trim().to_string();
        if text.is_empty() {
            return Err(CurationError::EmptyResponse);
        }
        Ok(text)
    }
}

// ============================================================================
// Prompts and tolerant parsing
// ============================================================================

fn search_query_prompt(language: &str) -> String {
    format!(
        "Produce a short web search query (one line) to find popular YouTube songs in the {} language. \
         Prefer concise keywords only, suitable for use in a search engine (no extra explanation). \
         Bias results toward recent releases (last 2 years).",
        language
    )
}

fn song_list_prompt(language: &str) -> String {
    format!(
        r#"Provide a JSON array of 10-15 popular and recent songs in the {} language from the last 2 years.
For each song, include the title and artist name.
Return ONLY a valid JSON array like:
[{{"title":"Song Title","artist":"Artist Name"}}]

Requirements:
- Include only well-known official songs
- Avoid compilations, covers, remixes, and album uploads
- Prefer recent releases from the last 2 years
- One song per entry"#,
        language
    )
}

/// Case-insensitive string field lookup
fn string_field<'a>(entry: &'a serde_json::Map<String, Value>, name: &str) -> Option<&'a str> {
    entry
        .iter()
        .find(|(key, _)| key.trim().eq_ignore_ascii_case(name))
        .and_then(|(_, value)| value.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn songs_from_entries(entries: &[Value]) -> Vec<SongCandidate> {
    let songs: Vec<SongCandidate> = entries
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|entry| {
            let title = string_field(entry, "title")?;
            let artist = string_field(entry, "artist").unwrap_or("");
            Some(SongCandidate::new(title, artist))
        })
        .collect();

    if songs.len() < entries.len() {
        tracing::debug!(kept = songs.len(), total = entries.len(), "Dropped invalid curation entries");
    }
    songs
}

/// Parse a curation response into song candidates
///
/// Tolerates fencing and prose around the list, any key casing, and invalid
/// entries (dropped). Each `[` is tried as the start of the list in turn, so
/// bracketed prose such as `[12]` or `[1] Source` does not hide the real list.
/// Fails only when nothing usable remains.
pub fn parse_song_list(raw: &str) -> Result<Vec<SongCandidate>, CurationError> {
    let mut first_error = None;
    let mut found_list = false;

    for (start, _) in raw.match_indices('[') {
        match serde_json::Deserializer::from_str(&raw[start..])
            .into_iter::<Vec<Value>>()
            .next()
        {
            Some(Ok(entries)) => {
                found_list = true;
                let songs = songs_from_entries(&entries);
                if !songs.is_empty() {
                    return Ok(songs);
                }
            }
            Some(Err(e)) => {
                first_error.get_or_insert_with(|| e.to_string());
            }
            None => {}
        }
    }

    if found_list {
        Err(CurationError::NoValidEntries)
    } else {
        Err(CurationError::Unparseable(
            first_error.unwrap_or_else(|| "no JSON list in response".to_string()),
        ))
    }
}

/// Curation operations with per-purpose time budgets
#[derive(Clone)]
pub struct Curator {
    service: Arc<dyn CurationService>,
    query_timeout: Duration,
    batch_timeout: Duration,
}

impl Curator {
    pub fn new(service: Arc<dyn CurationService>, query_timeout: Duration, batch_timeout: Duration) -> Self {
        Self {
            service,
            query_timeout,
            batch_timeout,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.service.is_configured()
    }

    async fn generate_within(&self, prompt: &str, limit: Duration) -> Result<String, CurationError> {
        if !self.service.is_configured() {
            return Err(CurationError::NotConfigured);
        }
        tokio::time::timeout(limit, self.service.generate(prompt))
            .await
            .map_err(|_| CurationError::Timeout(limit.as_secs()))?
    }

    /// One-line search query for popular songs in `language`
    pub async fn craft_search_query(&self, language: &str) -> Result<String, CurationError> {
        let text = self
            .generate_within(&search_query_prompt(language), self.query_timeout)
            .await?;
        let query = text
            .lines()
            .map(|line| line.trim().trim_matches('`').trim_matches('"').trim())
            .find(|line| !line.is_empty())
            .ok_or(CurationError::EmptyResponse)?
            .to_string();

        tracing::info!(language = %language, query = %query, "Curation service crafted search query");
        Ok(query)
    }

    /// Fresh batch of 10-15 candidates for `language`
    pub async fn song_batch(&self, language: &str) -> Result<Vec<SongCandidate>, CurationError> {
        let text = self
            .generate_within(&song_list_prompt(language), self.batch_timeout)
            .await?;
        tracing::debug!(response = %text::diagnostic(&text), "Curation song list response");

        let songs = parse_song_list(&text)?;
        tracing::info!(language = %language, songs = songs.len(), "Parsed curated song batch");
        Ok(songs)
    }
}
