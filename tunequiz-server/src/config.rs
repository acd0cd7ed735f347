//! Configuration resolution for tunequiz-server
//!
//! Listener address: command line (or its `TUNEQUIZ_*` env fallback) → TOML
//! → compiled default. API keys: ENV → TOML; a blank value counts as absent.

use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tunequiz_common::config::{is_set, TomlConfig};

pub const GEMINI_KEY_ENV: &str = "GEMINI_API_KEY";
pub const SERPAPI_KEY_ENV: &str = "SERPAPI_API_KEY";

/// Pick an API key from the environment value or the TOML value
///
/// Warns when both carry a usable key; the environment wins.
pub fn resolve_api_key(
    label: &str,
    env_value: Option<String>,
    toml_value: Option<&String>,
) -> Option<String> {
    let env_key = env_value.filter(|key| is_set(key));
    let toml_key = toml_value.filter(|key| is_set(key));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "{} API key found in multiple sources: environment, TOML. Using environment (highest priority).",
            label
        );
    }

    if let Some(key) = env_key {
        info!("{} API key loaded from environment variable", label);
        return Some(key.trim().to_string());
    }
    if let Some(key) = toml_key {
        info!("{} API key loaded from TOML config", label);
        return Some(key.trim().to_string());
    }

    info!("{} API key not configured", label);
    None
}

/// Runtime settings derived from the TOML layer and the environment
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub scratch_dir: PathBuf,
    pub gemini_api_key: Option<String>,
    pub serpapi_api_key: Option<String>,
    pub curation_model: String,
    pub yt_dlp: String,
    pub ffmpeg: String,
    pub query_timeout: Duration,
    pub batch_timeout: Duration,
    pub http_timeout: Duration,
    pub search_timeout: Duration,
    pub probe_timeout: Duration,
    pub download_timeout: Duration,
    pub trim_timeout: Duration,
}

impl ServiceSettings {
    /// Resolve settings, reading API keys from the process environment
    pub fn resolve(toml: &TomlConfig) -> Self {
        Self::with_env_keys(
            toml,
            std::env::var(GEMINI_KEY_ENV).ok(),
            std::env::var(SERPAPI_KEY_ENV).ok(),
        )
    }

    pub fn with_env_keys(toml: &TomlConfig, gemini_env: Option<String>, serpapi_env: Option<String>) -> Self {
        Self {
            scratch_dir: toml.scratch_root(),
            gemini_api_key: resolve_api_key("Gemini", gemini_env, toml.gemini_api_key.as_ref()),
            serpapi_api_key: resolve_api_key("SerpAPI", serpapi_env, toml.serpapi_api_key.as_ref()),
            curation_model: toml.curation.model.clone(),
            yt_dlp: toml.tools.yt_dlp.clone(),
            ffmpeg: toml.tools.ffmpeg.clone(),
            query_timeout: Duration::from_secs(toml.curation.query_timeout_secs),
            batch_timeout: Duration::from_secs(toml.curation.batch_timeout_secs),
            http_timeout: Duration::from_secs(toml.http.timeout_secs),
            search_timeout: Duration::from_secs(toml.tools.search_timeout_secs),
            probe_timeout: Duration::from_secs(toml.tools.probe_timeout_secs),
            download_timeout: Duration::from_secs(toml.tools.download_timeout_secs),
            trim_timeout: Duration::from_secs(toml.tools.trim_timeout_secs),
        }
    }
}
